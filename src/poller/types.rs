//! Poller types
//!
//! Configuration and lifecycle events for the polling paginator.

use crate::error::{Error, Result};
use crate::pagination::{PageRequest, FIRST_PAGE};
use std::time::Duration;

/// Default polling period
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// How many intervals a fetch may take before it is abandoned
pub const DEFAULT_TIMEOUT_INTERVALS: u32 = 2;

/// Configuration for a polling paginator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatorConfig {
    /// Records requested per fetch
    pub page_size: u32,
    /// Time between ticks
    pub interval: Duration,
    /// Per-fetch timeout. Defaults to two intervals.
    pub fetch_timeout: Option<Duration>,
    /// Page selected before the first tick
    pub initial_page: u64,
}

impl PaginatorConfig {
    /// Config with the given page size and default interval
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            interval: DEFAULT_INTERVAL,
            fetch_timeout: None,
            initial_page: FIRST_PAGE,
        }
    }

    /// Set the polling interval
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the per-fetch timeout
    #[must_use]
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Set the starting page
    #[must_use]
    pub fn initial_page(mut self, page: u64) -> Self {
        self.initial_page = page;
        self
    }

    /// Timeout applied to each fetch
    pub fn effective_fetch_timeout(&self) -> Duration {
        self.fetch_timeout
            .unwrap_or_else(|| self.interval.saturating_mul(DEFAULT_TIMEOUT_INTERVALS))
    }

    /// Reject values the poller cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be greater than 0"));
        }
        if self.interval.is_zero() {
            return Err(Error::invalid_value("interval", "must be greater than 0"));
        }
        if self.fetch_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::invalid_value(
                "fetch_timeout",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Something that happened to a dispatched fetch
#[derive(Debug)]
pub enum PollEvent {
    /// A fetch was sent
    Dispatched(PageRequest),
    /// A fetch succeeded and its records were handed to `on_update`
    Delivered {
        /// The fetch
        request: PageRequest,
        /// Number of records delivered
        records: usize,
    },
    /// A fetch came back, successfully or not, after the page had moved on,
    /// a newer fetch was delivered, or polling was stopped
    Stale {
        /// The fetch
        request: PageRequest,
        /// Page current when the result arrived
        current_page: u64,
    },
    /// A fetch for the current page failed or timed out. The previous records
    /// stay in place.
    Failed {
        /// The fetch
        request: PageRequest,
        /// What went wrong
        error: Error,
    },
}

impl PollEvent {
    /// The fetch this event is about
    pub fn request(&self) -> &PageRequest {
        match self {
            Self::Dispatched(request)
            | Self::Delivered { request, .. }
            | Self::Stale { request, .. }
            | Self::Failed { request, .. } => request,
        }
    }

    /// Check if this is a delivery
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// Check if this is a discarded result
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }

    /// Check if this is a failure
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
