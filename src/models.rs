use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutineError {
    #[error("unknown routine category '{0}', expected one of morning, afternoon, evening")]
    UnknownCategory(String),
    #[error("routine id '{0}' appears more than once")]
    DuplicateId(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Morning,
    Afternoon,
    Evening,
}

impl Category {
    /// Display order of the page.
    pub const ALL: [Category; 3] = [Category::Morning, Category::Afternoon, Category::Evening];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Morning => "morning",
            Category::Afternoon => "afternoon",
            Category::Evening => "evening",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::Morning => "Morning Routine",
            Category::Afternoon => "Afternoon Routine",
            Category::Evening => "Evening Routine",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Morning => "\u{2600}",
            Category::Afternoon => "\u{1F307}",
            Category::Evening => "\u{263E}",
        }
    }

    pub fn color_class(self) -> &'static str {
        match self {
            Category::Morning => "text-accent",
            Category::Afternoon => "text-primary",
            Category::Evening => "text-muted",
        }
    }

    /// Entrance delay step the section starts from. Items continue the count.
    pub fn base_delay(self) -> u32 {
        match self {
            Category::Morning => 2,
            Category::Afternoon => 7,
            Category::Evening => 11,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = RoutineError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim() {
            "morning" => Ok(Category::Morning),
            "afternoon" => Ok(Category::Afternoon),
            "evening" => Ok(Category::Evening),
            other => Err(RoutineError::UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
}

impl Routine {
    pub fn new(id: &str, title: &str, description: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.map(str::to_string),
            completed: false,
        }
    }
}

/// The three ordered category sequences. Ids are unique across all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutineCollection {
    morning: Vec<Routine>,
    afternoon: Vec<Routine>,
    evening: Vec<Routine>,
}

impl RoutineCollection {
    pub fn new(
        morning: Vec<Routine>,
        afternoon: Vec<Routine>,
        evening: Vec<Routine>,
    ) -> Result<Self, RoutineError> {
        let collection = Self {
            morning,
            afternoon,
            evening,
        };
        if let Some(id) = collection.duplicate_id() {
            return Err(RoutineError::DuplicateId(id.to_string()));
        }
        Ok(collection)
    }

    /// For sequences whose ids are known to be unique, like the built-in seed.
    pub(crate) fn from_unique(
        morning: Vec<Routine>,
        afternoon: Vec<Routine>,
        evening: Vec<Routine>,
    ) -> Self {
        let collection = Self {
            morning,
            afternoon,
            evening,
        };
        debug_assert!(
            collection.duplicate_id().is_none(),
            "routine ids must be unique"
        );
        collection
    }

    fn duplicate_id(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.iter()
            .map(|routine| routine.id.as_str())
            .find(|id| !seen.insert(*id))
    }

    pub fn get(&self, category: Category) -> &[Routine] {
        match category {
            Category::Morning => &self.morning,
            Category::Afternoon => &self.afternoon,
            Category::Evening => &self.evening,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Routine> {
        self.morning.iter().chain(&self.afternoon).chain(&self.evening)
    }

    pub fn find(&self, id: &str) -> Option<&Routine> {
        self.iter().find(|routine| routine.id == id)
    }

    pub fn progress(&self) -> Progress {
        Progress::of(self.iter())
    }

    pub fn section_progress(&self, category: Category) -> Progress {
        Progress::of(self.get(category).iter())
    }

    /// Rebuilds every sequence through `f`, keeping order. Skips the
    /// uniqueness check since ids are carried over unchanged.
    pub(crate) fn map_routines(&self, mut f: impl FnMut(&Routine) -> Routine) -> Self {
        Self {
            morning: self.morning.iter().map(&mut f).collect(),
            afternoon: self.afternoon.iter().map(&mut f).collect(),
            evening: self.evening.iter().map(&mut f).collect(),
        }
    }
}

/// Completion counts for any run of routines. Always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn of<'a>(routines: impl IntoIterator<Item = &'a Routine>) -> Self {
        routines
            .into_iter()
            .fold(Progress { completed: 0, total: 0 }, |acc, routine| Progress {
                completed: acc.completed + usize::from(routine.completed),
                total: acc.total + 1,
            })
    }

    /// `None` for an empty set, where a ratio has no meaning.
    pub fn percentage(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.completed as f64 / self.total as f64 * 100.0)
        }
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    pub session: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SectionResponse {
    pub category: Category,
    pub title: String,
    pub completed: usize,
    pub total: usize,
    pub routines: Vec<Routine>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub session: String,
    pub weekday: String,
    pub date: String,
    pub completed: usize,
    pub total: usize,
    pub percentage: Option<f64>,
    pub remaining_message: String,
    pub last_check_in: Option<String>,
    pub sections: Vec<SectionResponse>,
}
