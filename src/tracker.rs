use crate::models::{Progress, Routine, RoutineCollection};
use chrono::{DateTime, Local};

/// Reference routines every session starts from.
pub fn seed_routines() -> RoutineCollection {
    let morning = vec![
        Routine::new("m1", "Wake up early", Some("Before 7:00 AM")),
        Routine::new("m2", "Morning meditation", Some("10 minutes mindfulness")),
        Routine::new("m3", "Healthy breakfast", Some("Fuel your body right")),
        Routine::new("m4", "Exercise", Some("30 min workout or yoga")),
    ];
    let afternoon = vec![
        Routine::new("a1", "Deep work session", Some("Focus on priorities")),
        Routine::new("a2", "Take a walk", Some("Fresh air break")),
        Routine::new("a3", "Drink water", Some("Stay hydrated")),
    ];
    let evening = vec![
        Routine::new("e1", "Review the day", Some("Reflect on wins")),
        Routine::new("e2", "Prepare for tomorrow", Some("Plan ahead")),
        Routine::new("e3", "Screen-free time", Some("1 hour before bed")),
        Routine::new("e4", "Quality sleep", Some("8 hours rest")),
    ];

    RoutineCollection::from_unique(morning, afternoon, evening)
}

/// Flips the routine with `id`, returning a fresh collection. Unknown ids
/// produce a value-equal copy.
pub fn toggle(collection: &RoutineCollection, id: &str) -> RoutineCollection {
    collection.map_routines(|routine| {
        if routine.id == id {
            Routine {
                completed: !routine.completed,
                ..routine.clone()
            }
        } else {
            routine.clone()
        }
    })
}

pub fn remaining_message(progress: &Progress) -> String {
    if progress.is_complete() {
        "Amazing! All routines complete!".to_string()
    } else {
        format!("{} routines remaining", progress.remaining())
    }
}

/// Owner of one page session's routine collection.
#[derive(Debug, Clone)]
pub struct Tracker {
    routines: RoutineCollection,
    last_toggled_at: Option<DateTime<Local>>,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(seed_routines())
    }
}

impl Tracker {
    pub fn new(routines: RoutineCollection) -> Self {
        Self {
            routines,
            last_toggled_at: None,
        }
    }

    pub fn routines(&self) -> &RoutineCollection {
        &self.routines
    }

    pub fn last_toggled_at(&self) -> Option<DateTime<Local>> {
        self.last_toggled_at
    }

    /// Returns whether a routine actually flipped.
    pub fn toggle(&mut self, id: &str, now: DateTime<Local>) -> bool {
        if self.routines.find(id).is_none() {
            return false;
        }
        self.routines = toggle(&self.routines, id);
        self.last_toggled_at = Some(now);
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
