//! Pagination types
//!
//! Defines the page state and the dispatch tag used by the poller.

/// Lowest valid page number
pub const FIRST_PAGE: u64 = 1;

/// Offset of the first record on `page` for pages of `page_size` records
///
/// Pages below [`FIRST_PAGE`] are treated as the first page. Offsets past
/// `u64::MAX` saturate.
pub fn offset_for(page: u64, page_size: u32) -> u64 {
    (page.max(FIRST_PAGE) - 1).saturating_mul(u64::from(page_size))
}

/// Highest page whose offset still fits in a `u64`
pub fn last_page(page_size: u32) -> u64 {
    match page_size {
        0 => u64::MAX,
        size => (u64::MAX / u64::from(size)).saturating_add(1),
    }
}

/// Zero-based page index for a record offset
///
/// Read APIs that take `{page, size}` and skip `page * size` records need the
/// index, not the offset.
pub fn page_index_for(offset: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    offset / u64::from(page_size)
}

/// Current page selection
///
/// The offset is never stored; it is always derived from `page` so the two
/// cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    page: u64,
    page_size: u32,
}

impl PageState {
    /// Create state positioned on the first page
    pub fn new(page_size: u32) -> Self {
        Self {
            page: FIRST_PAGE,
            page_size,
        }
    }

    /// Create state positioned on `page`, clamped to `1..=last_page`
    pub fn with_page(page_size: u32, page: u64) -> Self {
        Self {
            page: page.clamp(FIRST_PAGE, last_page(page_size)),
            page_size,
        }
    }

    /// Current page number (1-indexed)
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Records per page
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Offset of the current page
    pub fn offset(&self) -> u64 {
        offset_for(self.page, self.page_size)
    }

    /// Highest page this state can move to
    pub fn last_page(&self) -> u64 {
        last_page(self.page_size)
    }

    /// Advance one page, stopping at [`last_page`](Self::last_page)
    pub fn next_page(&mut self) {
        self.page = self.page.saturating_add(1).min(self.last_page());
    }

    /// Go back one page, stopping at the first page
    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(FIRST_PAGE);
    }

    /// Jump to an absolute page; anything below 1 lands on the first page and
    /// anything past the last page lands on the last page
    pub fn set_page(&mut self, page: i64) {
        let page = u64::try_from(page).unwrap_or(FIRST_PAGE);
        self.page = page.clamp(FIRST_PAGE, self.last_page());
    }

    /// Force the page back into range. Returns true if it had to be corrected.
    pub fn clamp(&mut self) -> bool {
        let clamped = self.page.clamp(FIRST_PAGE, self.last_page());
        let changed = clamped != self.page;
        self.page = clamped;
        changed
    }

    /// Build the dispatch tag for the current page
    pub fn request(&self, sequence: u64, epoch: u64) -> PageRequest {
        PageRequest {
            page: self.page,
            offset: self.offset(),
            limit: self.page_size,
            sequence,
            epoch,
        }
    }
}

/// A fetch as it was dispatched
///
/// Carries the page it was captured for so the poller can drop the result if
/// the page has moved on by the time it arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number at dispatch time
    pub page: u64,
    /// Offset derived from `page`
    pub offset: u64,
    /// Records requested
    pub limit: u32,
    /// Monotonic dispatch counter
    pub sequence: u64,
    /// Start/stop generation the fetch belongs to
    pub epoch: u64,
}

impl PageRequest {
    /// Check whether this request is still wanted
    ///
    /// A result is current only if it belongs to the running epoch, targets the
    /// page being shown and is newer than whatever was delivered last.
    pub fn is_current(&self, page: u64, epoch: u64, last_delivered: Option<u64>) -> bool {
        self.epoch == epoch
            && self.page == page
            && last_delivered.map_or(true, |last| self.sequence > last)
    }
}
