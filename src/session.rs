use crate::animation::AnimationFlags;
use crate::tracker::Tracker;
use std::collections::HashMap;
use uuid::Uuid;

pub const DEFAULT_SESSION_CAPACITY: usize = 512;

/// Tracker state of one loaded page.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub tracker: Tracker,
    pub animations: AnimationFlags,
    touched: u64,
}

/// Page sessions keyed by token. Holds at most `capacity` entries and
/// evicts the least recently used one to make room.
#[derive(Debug)]
pub struct Sessions {
    entries: HashMap<String, Session>,
    capacity: usize,
    tick: u64,
}

impl Default for Sessions {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }
}

impl Sessions {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            tick: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    /// Starts a seeded session and returns its token.
    pub fn create(&mut self) -> String {
        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        let token = Uuid::new_v4().simple().to_string();
        self.tick += 1;
        self.entries.insert(
            token.clone(),
            Session {
                touched: self.tick,
                ..Session::default()
            },
        );
        token
    }

    pub fn get_mut(&mut self, token: &str) -> Option<&mut Session> {
        self.tick += 1;
        let tick = self.tick;
        let session = self.entries.get_mut(token)?;
        session.touched = tick;
        Some(session)
    }

    /// Resumes `token` when it is still live, otherwise starts a new session.
    pub fn resume_or_create(&mut self, token: Option<&str>) -> (String, &mut Session) {
        let token = match token {
            Some(token) if self.contains(token) => token.to_string(),
            _ => self.create(),
        };
        self.tick += 1;
        let tick = self.tick;
        let session = self.entries.entry(token.clone()).or_default();
        session.touched = tick;
        (token, session)
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, session)| session.touched)
            .map(|(token, _)| token.clone());
        if let Some(token) = oldest {
            self.entries.remove(&token);
        }
    }
}
