use crate::clock::{Clock, SystemClock};
use crate::session::Sessions;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<Mutex<Sessions>>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(sessions: Sessions, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(sessions)),
            clock,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Sessions::default(), Arc::new(SystemClock))
    }
}
