//! Builder for [`PollingPaginator`]

use super::types::PaginatorConfig;
use super::{EventFn, PollEvent, PollingPaginator, UpdateFn};
use crate::error::{Error, Result};
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::source::{FnSource, PageSource};
use crate::types::RecordSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Collects the parts of a paginator and validates them on `build`
///
/// `source`, `page_size` and `on_update` are required. The interval defaults
/// to one second and the scheduler to [`TokioScheduler`].
#[derive(Default)]
pub struct PaginatorBuilder {
    source: Option<Arc<dyn PageSource>>,
    page_size: Option<u32>,
    interval: Option<Duration>,
    fetch_timeout: Option<Duration>,
    initial_page: Option<u64>,
    on_update: Option<UpdateFn>,
    on_event: Option<EventFn>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl PaginatorBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Take page size, interval, timeout and initial page from a config
    #[must_use]
    pub fn config(mut self, config: PaginatorConfig) -> Self {
        self.page_size = Some(config.page_size);
        self.interval = Some(config.interval);
        self.fetch_timeout = config.fetch_timeout;
        self.initial_page = Some(config.initial_page);
        self
    }

    /// Set the page source
    #[must_use]
    pub fn source(mut self, source: impl PageSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Set a shared page source
    #[must_use]
    pub fn shared_source(mut self, source: Arc<dyn PageSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Use a `Fn(offset, limit) -> Future` as the page source
    #[must_use]
    pub fn fetch_fn<F, Fut>(self, fetch: F) -> Self
    where
        F: Fn(u64, u32) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RecordSet>> + Send + 'static,
    {
        self.source(FnSource::new(fetch))
    }

    /// Records requested per fetch
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Polling period
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Polling period in milliseconds
    #[must_use]
    pub fn interval_ms(self, millis: u64) -> Self {
        self.interval(Duration::from_millis(millis))
    }

    /// Abandon fetches that take longer than this
    #[must_use]
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Page selected before the first fetch
    #[must_use]
    pub fn initial_page(mut self, page: u64) -> Self {
        self.initial_page = Some(page);
        self
    }

    /// Called with the records of every delivered page
    #[must_use]
    pub fn on_update(mut self, on_update: impl Fn(&RecordSet) + Send + Sync + 'static) -> Self {
        self.on_update = Some(Arc::new(on_update));
        self
    }

    /// Called for every dispatch, delivery, discarded result and failure
    #[must_use]
    pub fn on_event(mut self, on_event: impl Fn(&PollEvent) + Send + Sync + 'static) -> Self {
        self.on_event = Some(Arc::new(on_event));
        self
    }

    /// Drive ticks from a custom scheduler
    #[must_use]
    pub fn scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Some(Arc::new(scheduler));
        self
    }

    /// Validate and build the paginator
    pub fn build(self) -> Result<PollingPaginator> {
        let source = self.source.ok_or_else(|| Error::missing_field("source"))?;
        let page_size = self
            .page_size
            .ok_or_else(|| Error::missing_field("page_size"))?;
        let on_update = self
            .on_update
            .ok_or_else(|| Error::missing_field("on_update"))?;

        let mut config = PaginatorConfig::new(page_size);
        if let Some(interval) = self.interval {
            config = config.interval(interval);
        }
        if let Some(timeout) = self.fetch_timeout {
            config = config.fetch_timeout(timeout);
        }
        if let Some(page) = self.initial_page {
            config = config.initial_page(page);
        }
        config.validate()?;

        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(TokioScheduler::new()));

        Ok(PollingPaginator::from_parts(
            config,
            source,
            on_update,
            self.on_event,
            scheduler,
        ))
    }
}

impl std::fmt::Debug for PaginatorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatorBuilder")
            .field("has_source", &self.source.is_some())
            .field("page_size", &self.page_size)
            .field("interval", &self.interval)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("initial_page", &self.initial_page)
            .field("has_on_update", &self.on_update.is_some())
            .finish_non_exhaustive()
    }
}
