//! Page source module
//!
//! The paged read API the poller consumes.
//!
//! # Overview
//!
//! - [`PageSource`] - `fetch_page(offset, limit)`, read-only and async
//! - [`FnSource`] - adapts a closure returning a future
//! - [`ContractViewSource`] - contract view calls over JSON-RPC
//! - [`RecordFamily`] - which paged view to call (all, by company, ...)

mod contract;
mod family;
mod types;

pub use contract::{ContractViewSource, Finality};
pub use family::RecordFamily;
pub use types::{FnSource, PageSource};
