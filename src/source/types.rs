//! Page source trait and closure adapter

use crate::error::Result;
use crate::types::RecordSet;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;

/// A paged, read-only record endpoint
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch up to `limit` records starting at record `offset`
    ///
    /// Fewer than `limit` records means the end of the list was reached.
    async fn fetch_page(&self, offset: u64, limit: u32) -> Result<RecordSet>;

    /// Short label used in log lines
    fn describe(&self) -> String {
        "page source".to_string()
    }
}

/// Wraps a `Fn(offset, limit) -> Future` as a [`PageSource`]
pub struct FnSource<F> {
    fetch: F,
}

impl<F, Fut> FnSource<F>
where
    F: Fn(u64, u32) -> Fut + Send + Sync,
    Fut: Future<Output = Result<RecordSet>> + Send,
{
    /// Create a source from a fetch function
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl<F, Fut> PageSource for FnSource<F>
where
    F: Fn(u64, u32) -> Fut + Send + Sync,
    Fut: Future<Output = Result<RecordSet>> + Send,
{
    async fn fetch_page(&self, offset: u64, limit: u32) -> Result<RecordSet> {
        (self.fetch)(offset, limit).await
    }

    fn describe(&self) -> String {
        "fn source".to_string()
    }
}

impl<F> fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}
