use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};
use tokio::time::{sleep_until, Instant};

/// How long a row keeps its check animation after being activated.
pub const CHECK_ANIMATION: Duration = Duration::from_millis(300);

/// Boolean that clears itself a fixed time after each trigger.
///
/// Every trigger spawns its own timer and none are cancelled, so a quick
/// double activation leaves two timers running. Both write `false`, which
/// makes the overlap harmless.
#[derive(Debug, Clone)]
pub struct TransientFlag {
    active: Arc<AtomicBool>,
    duration: Duration,
}

impl TransientFlag {
    pub fn new(duration: Duration) -> Self {
        Self {
            active: Arc::new(AtomicBool::new(false)),
            duration,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Must be called inside a tokio runtime.
    pub fn trigger(&self) {
        self.active.store(true, Ordering::SeqCst);
        let active = Arc::clone(&self.active);
        let deadline = Instant::now() + self.duration;
        tokio::spawn(async move {
            sleep_until(deadline).await;
            active.store(false, Ordering::SeqCst);
        });
    }
}

/// One transient flag per routine id, created on first activation.
#[derive(Debug, Clone)]
pub struct AnimationFlags {
    flags: Arc<Mutex<HashMap<String, TransientFlag>>>,
    duration: Duration,
}

impl Default for AnimationFlags {
    fn default() -> Self {
        Self::new(CHECK_ANIMATION)
    }
}

impl AnimationFlags {
    pub fn new(duration: Duration) -> Self {
        Self {
            flags: Arc::new(Mutex::new(HashMap::new())),
            duration,
        }
    }

    pub fn trigger(&self, id: &str) {
        let flag = {
            let mut flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);
            flags
                .entry(id.to_string())
                .or_insert_with(|| TransientFlag::new(self.duration))
                .clone()
        };
        flag.trigger();
    }

    pub fn is_active(&self, id: &str) -> bool {
        let flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);
        flags.get(id).is_some_and(TransientFlag::is_active)
    }
}
