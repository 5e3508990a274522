//! Pagination module
//!
//! Page/offset arithmetic for the polling paginator.
//!
//! # Overview
//!
//! `PageState` owns the 1-indexed page number and derives the record offset
//! from it on demand. `PageRequest` is the tag each dispatched fetch carries so
//! a late response can be matched against the page that is current when it
//! arrives.

mod types;

pub use types::{last_page, offset_for, page_index_for, PageRequest, PageState, FIRST_PAGE};
