// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # feedpoll
//!
//! Keeps one page of a remote, read-only record list fresh by polling it on a
//! fixed interval.
//!
//! ## Features
//!
//! - **Polling Paginator**: page/offset tracking, interval lifecycle, stale
//!   result handling
//! - **Injectable Scheduler**: tokio timers in production, hand-driven ticks in
//!   tests
//! - **Contract View Source**: paged feedback views over JSON-RPC
//! - **HTTP Transport**: retries, backoff and optional rate limiting
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use feedpoll::{PollingPaginator, Record, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let paginator = PollingPaginator::builder()
//!         .page_size(3)
//!         .interval_ms(1000)
//!         .fetch_fn(|offset, limit| async move {
//!             Ok(vec![Record::new(offset, format!("first of {limit}"))])
//!         })
//!         .on_update(|records| println!("{} records", records.len()))
//!         .build()?;
//!
//!     paginator.start()?;
//!     paginator.next_page(); // used from the next tick on
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      PollingPaginator                        │
//! │  start() stop() next_page() prev_page() set_page()           │
//! │  tick → clamp page → offset → fetch → stale check → on_update│
//! └──────────────────────────────────────────────────────────────┘
//!          │                   │                     │
//! ┌────────┴───────┐ ┌─────────┴─────────┐ ┌─────────┴──────────┐
//! │   Scheduler    │ │    Pagination     │ │     PageSource     │
//! ├────────────────┤ ├───────────────────┤ ├────────────────────┤
//! │ TokioScheduler │ │ PageState         │ │ FnSource           │
//! │ ManualScheduler│ │ PageRequest tags  │ │ ContractViewSource │
//! └────────────────┘ └───────────────────┘ └─────────┬──────────┘
//!                                                    │
//!                                             HttpClient (retry,
//!                                             backoff, rate limit)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: document error variant fields and drop this allow

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Page and offset arithmetic
pub mod pagination;

/// Timers that drive polling
pub mod scheduler;

/// HTTP client with retry and rate limiting
pub mod http;

/// Paged read sources
pub mod source;

/// The polling paginator
pub mod poller;

/// Feed configuration files
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::FeedConfig;
pub use pagination::{PageRequest, PageState};
pub use poller::{PaginatorBuilder, PaginatorConfig, PollEvent, PollingPaginator};
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
pub use source::{ContractViewSource, FnSource, PageSource, RecordFamily};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
