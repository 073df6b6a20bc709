use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Liveness of a long-lived view (a quiz session). Dropping or unmounting it
/// flips every [`Scope`] handed out so far; completions that arrive later are
/// discarded instead of being applied.
#[derive(Debug)]
pub struct Mount {
    alive: Arc<AtomicBool>,
}

impl Mount {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn scope(&self) -> Scope {
        Scope {
            alive: Arc::clone(&self.alive),
        }
    }

    pub fn unmount(&self) {
        self.alive.store(false, Ordering::Release);
    }

    pub fn is_mounted(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

impl Default for Mount {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Handle carried across an await point to check the owning view is still mounted.
#[derive(Debug, Clone)]
pub struct Scope {
    alive: Arc<AtomicBool>,
}

impl Scope {
    pub fn is_mounted(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Runs `update` only while mounted.
    pub fn apply<T>(&self, update: impl FnOnce() -> T) -> Option<T> {
        if self.is_mounted() {
            Some(update())
        } else {
            None
        }
    }
}
