//! Scheduler module
//!
//! The repeating timer that drives polling, behind a trait so tests can fire
//! ticks by hand.
//!
//! # Contract
//!
//! - `schedule` registers a callback that fires every `interval`, starting one
//!   full interval after the call. It must not invoke the callback
//!   synchronously.
//! - The returned [`ScheduleHandle`] cancels the timer on `cancel()` or drop.

mod manual;
mod tokio_timer;
mod types;

pub use manual::ManualScheduler;
pub use tokio_timer::TokioScheduler;
pub use types::{ScheduleHandle, Scheduler, TickFn};
