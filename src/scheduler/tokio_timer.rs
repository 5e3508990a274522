//! Wall-clock scheduler backed by `tokio::time::interval`

use super::types::{ScheduleHandle, Scheduler, TickFn};
use crate::error::{Error, Result};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// Scheduler that spawns one tokio task per timer
///
/// If a tick is late (the runtime was busy), the next one is pushed back
/// instead of firing a burst of catch-up ticks.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    runtime: Option<Handle>,
}

impl TokioScheduler {
    /// Use the runtime current at `schedule` time
    pub fn new() -> Self {
        Self::default()
    }

    /// Always spawn timers on `runtime`
    pub fn with_runtime(runtime: Handle) -> Self {
        Self {
            runtime: Some(runtime),
        }
    }

    fn runtime(&self) -> Result<Handle> {
        match &self.runtime {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current()
                .map_err(|e| Error::scheduler(format!("no tokio runtime available: {e}"))),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, interval: Duration, tick: TickFn) -> Result<ScheduleHandle> {
        if interval.is_zero() {
            return Err(Error::scheduler("interval must be greater than zero"));
        }
        let runtime = self.runtime()?;

        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tick();
            }
        });
        debug!("Scheduled timer every {:?}", interval);

        Ok(ScheduleHandle::new(move || task.abort()))
    }
}
