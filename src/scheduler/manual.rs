//! Hand-driven scheduler for deterministic tests and embedders with their
//! own event loop

use super::types::{ScheduleHandle, Scheduler, TickFn};
use crate::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

struct Timer {
    interval: Duration,
    tick: TickFn,
    active: Arc<AtomicBool>,
}

/// Scheduler whose timers only fire when [`ManualScheduler::tick`] is called
///
/// Clones share the same set of timers.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    timers: Arc<Mutex<Vec<Timer>>>,
}

impl ManualScheduler {
    /// Create a scheduler with no timers
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every active timer once. Returns how many fired.
    pub fn tick(&self) -> usize {
        // Collect first so callbacks may schedule or cancel without deadlocking
        let ticks: Vec<TickFn> = {
            let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
            timers.retain(|t| t.active.load(Ordering::SeqCst));
            timers.iter().map(|t| Arc::clone(&t.tick)).collect()
        };
        for tick in &ticks {
            tick();
        }
        ticks.len()
    }

    /// Number of timers that have not been cancelled
    pub fn active_timers(&self) -> usize {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|t| t.active.load(Ordering::SeqCst))
            .count()
    }

    /// Intervals of the active timers, in registration order
    pub fn intervals(&self) -> Vec<Duration> {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|t| t.active.load(Ordering::SeqCst))
            .map(|t| t.interval)
            .collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, interval: Duration, tick: TickFn) -> Result<ScheduleHandle> {
        let active = Arc::new(AtomicBool::new(true));
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Timer {
                interval,
                tick,
                active: Arc::clone(&active),
            });

        Ok(ScheduleHandle::new(move || {
            active.store(false, Ordering::SeqCst);
        }))
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("active_timers", &self.active_timers())
            .finish()
    }
}
