//! Polling paginator
//!
//! Keeps one page of records fresh by re-fetching it on a fixed interval.
//!
//! # Overview
//!
//! - `start()` dispatches the first fetch right away, then one per tick
//! - `next_page()` / `prev_page()` / `set_page()` only move the page; the new
//!   offset is used by the next tick
//! - every fetch is tagged with the page it was dispatched for, and a result
//!   is dropped if that page is no longer current when it arrives, if a newer
//!   fetch was already delivered, or if polling stopped in the meantime
//! - a failed or timed-out fetch leaves the current records alone and polling
//!   carries on; failures of fetches that were already superseded are only
//!   logged at debug level

mod builder;
mod types;

pub use builder::PaginatorBuilder;
pub use types::{PaginatorConfig, PollEvent, DEFAULT_INTERVAL, DEFAULT_TIMEOUT_INTERVALS};

use crate::error::{Error, Result};
use crate::pagination::{PageRequest, PageState};
use crate::scheduler::{ScheduleHandle, Scheduler, TickFn};
use crate::source::PageSource;
use crate::types::RecordSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Subscriber for delivered pages
pub type UpdateFn = Arc<dyn Fn(&RecordSet) + Send + Sync>;

/// Subscriber for fetch lifecycle events
pub type EventFn = Arc<dyn Fn(&PollEvent) + Send + Sync>;

/// Polls a [`PageSource`] for the current page
///
/// Dropping the paginator stops it.
pub struct PollingPaginator {
    shared: Arc<Shared>,
    scheduler: Arc<dyn Scheduler>,
}

struct Shared {
    config: PaginatorConfig,
    source: Arc<dyn PageSource>,
    on_update: UpdateFn,
    on_event: Option<EventFn>,
    state: Mutex<PollState>,
    /// Held across the staleness check and `on_update` so deliveries never
    /// interleave
    delivery: Mutex<()>,
}

struct PollState {
    pages: PageState,
    records: RecordSet,
    running: bool,
    epoch: u64,
    next_sequence: u64,
    last_delivered: Option<u64>,
    timer: Option<ScheduleHandle>,
    runtime: Option<Handle>,
}

impl PollingPaginator {
    /// Start configuring a paginator
    pub fn builder() -> PaginatorBuilder {
        PaginatorBuilder::new()
    }

    pub(crate) fn from_parts(
        config: PaginatorConfig,
        source: Arc<dyn PageSource>,
        on_update: UpdateFn,
        on_event: Option<EventFn>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let pages = PageState::with_page(config.page_size, config.initial_page);
        Self {
            shared: Arc::new(Shared {
                config,
                source,
                on_update,
                on_event,
                state: Mutex::new(PollState {
                    pages,
                    records: RecordSet::new(),
                    running: false,
                    epoch: 0,
                    next_sequence: 0,
                    last_delivered: None,
                    timer: None,
                    runtime: None,
                }),
                delivery: Mutex::new(()),
            }),
            scheduler,
        }
    }

    /// Begin polling
    ///
    /// The first fetch is dispatched immediately; after that one per interval.
    /// Calling `start` while already running does nothing. Must be called from
    /// within a tokio runtime, which the fetches are spawned on.
    pub fn start(&self) -> Result<()> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::scheduler(format!("start requires a tokio runtime: {e}")))?;

        let epoch = {
            let mut state = self.shared.lock();
            if state.running {
                debug!("Paginator already running, ignoring start");
                return Ok(());
            }
            state.running = true;
            state.epoch += 1;
            state.runtime = Some(runtime);
            state.epoch
        };

        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let tick: TickFn = Arc::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.dispatch();
            }
        });

        let handle = match self.scheduler.schedule(self.shared.config.interval, tick) {
            Ok(handle) => handle,
            Err(e) => {
                let mut state = self.shared.lock();
                if state.epoch == epoch {
                    state.running = false;
                    state.runtime = None;
                }
                return Err(e);
            }
        };

        {
            let mut state = self.shared.lock();
            if state.epoch != epoch || !state.running {
                // stopped while the timer was being set up
                drop(state);
                drop(handle);
                return Ok(());
            }
            state.timer = Some(handle);
        }

        info!(
            "Polling {} every {:?} (page size {})",
            self.shared.source.describe(),
            self.shared.config.interval,
            self.shared.config.page_size
        );
        self.shared.dispatch();
        Ok(())
    }

    /// Stop polling
    ///
    /// No further fetches are dispatched. Fetches already in flight are left
    /// to finish but their results are discarded. Safe to call repeatedly or
    /// before `start`.
    pub fn stop(&self) {
        let timer = {
            let mut state = self.shared.lock();
            if !state.running {
                return;
            }
            state.running = false;
            state.epoch += 1;
            state.runtime = None;
            state.timer.take()
        };
        if let Some(mut timer) = timer {
            timer.cancel();
        }
        info!("Stopped polling {}", self.shared.source.describe());
    }

    /// Whether the timer is active
    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    /// Move to the next page. Takes effect on the next tick.
    pub fn next_page(&self) {
        let page = {
            let mut state = self.shared.lock();
            state.pages.next_page();
            state.pages.page()
        };
        debug!("Page set to {}", page);
    }

    /// Move to the previous page, never below page 1. Takes effect on the next
    /// tick.
    pub fn prev_page(&self) {
        let page = {
            let mut state = self.shared.lock();
            state.pages.prev_page();
            state.pages.page()
        };
        debug!("Page set to {}", page);
    }

    /// Jump to `page`, clamped to page 1. Takes effect on the next tick.
    pub fn set_page(&self, page: i64) {
        let page = {
            let mut state = self.shared.lock();
            state.pages.set_page(page);
            state.pages.page()
        };
        debug!("Page set to {}", page);
    }

    /// Current page number (1-indexed)
    pub fn page(&self) -> u64 {
        self.shared.lock().pages.page()
    }

    /// Offset the next fetch will use
    pub fn offset(&self) -> u64 {
        self.shared.lock().pages.offset()
    }

    /// Records per page
    pub fn page_size(&self) -> u32 {
        self.shared.config.page_size
    }

    /// The last delivered records
    pub fn records(&self) -> RecordSet {
        self.shared.lock().records.clone()
    }

    /// The configuration in use
    pub fn config(&self) -> &PaginatorConfig {
        &self.shared.config
    }
}

impl Drop for PollingPaginator {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PollingPaginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("PollingPaginator")
            .field("config", &self.shared.config)
            .field("page", &state.pages.page())
            .field("running", &state.running)
            .field("records", &state.records.len())
            .finish_non_exhaustive()
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PollState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: &PollEvent) {
        if let Some(on_event) = &self.on_event {
            on_event(event);
        }
    }

    /// One tick: capture the page and send the fetch
    fn dispatch(self: &Arc<Self>) {
        let (request, runtime) = {
            let mut state = self.lock();
            if !state.running {
                return;
            }
            let Some(runtime) = state.runtime.clone() else {
                return;
            };
            if state.pages.clamp() {
                debug!("Page was out of range, reset to {}", state.pages.page());
            }
            let sequence = state.next_sequence;
            state.next_sequence += 1;
            (state.pages.request(sequence, state.epoch), runtime)
        };

        debug!(
            "Fetching page {} (offset {}, limit {}, seq {})",
            request.page, request.offset, request.limit, request.sequence
        );
        self.emit(&PollEvent::Dispatched(request));

        let shared = Arc::clone(self);
        runtime.spawn(async move {
            let outcome = shared.fetch(request).await;
            shared.complete(request, outcome);
        });
    }

    async fn fetch(&self, request: PageRequest) -> Result<RecordSet> {
        let timeout = self.config.effective_fetch_timeout();
        match tokio::time::timeout(
            timeout,
            self.source.fetch_page(request.offset, request.limit),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::FetchTimeout {
                page: request.page,
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    fn complete(&self, request: PageRequest, outcome: Result<RecordSet>) {
        let _delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        let mut state = self.lock();
        let current_page = state.pages.page();

        if !state.running || !request.is_current(current_page, state.epoch, state.last_delivered)
        {
            drop(state);
            match &outcome {
                Ok(_) => debug!(
                    "Discarding stale result for page {} (seq {}), current page is {}",
                    request.page, request.sequence, current_page
                ),
                Err(error) => debug!(
                    "Ignoring failure of superseded fetch for page {} (seq {}): {}",
                    request.page, request.sequence, error
                ),
            }
            self.emit(&PollEvent::Stale {
                request,
                current_page,
            });
            return;
        }

        let records = match outcome {
            Ok(records) => records,
            Err(error) => {
                drop(state);
                warn!(
                    "Fetch for page {} (offset {}) failed, keeping previous records: {}",
                    request.page, request.offset, error
                );
                self.emit(&PollEvent::Failed { request, error });
                return;
            }
        };
        state.records.clone_from(&records);
        state.last_delivered = Some(request.sequence);
        drop(state);

        (self.on_update)(&records);
        debug!(
            "Delivered {} records for page {}",
            records.len(),
            request.page
        );
        self.emit(&PollEvent::Delivered {
            request,
            records: records.len(),
        });
    }
}
