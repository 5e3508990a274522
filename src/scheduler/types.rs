//! Scheduler trait and cancellation handle

use crate::error::Result;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Callback invoked on every tick
pub type TickFn = Arc<dyn Fn() + Send + Sync>;

/// A source of repeating ticks
pub trait Scheduler: Send + Sync {
    /// Fire `tick` every `interval` until the returned handle is cancelled
    fn schedule(&self, interval: Duration, tick: TickFn) -> Result<ScheduleHandle>;
}

/// Cancels a scheduled timer
///
/// Cancelling is idempotent. Dropping the handle cancels the timer.
pub struct ScheduleHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl ScheduleHandle {
    /// Wrap the action that stops the timer
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop the timer. Does nothing if already cancelled.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Whether `cancel` has run
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for ScheduleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
