//! Accumulated search results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Stop Reason
// ============================================================================

/// Why a paginated search stopped fetching pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The configured page limit was reached.
    #[default]
    PageLimit,
    /// A page came back with an empty items list.
    LastPage,
    /// The client returned its empty sentinel (no items field at all).
    EmptyResponse,
    /// The response had an items field that was not a list.
    MalformedResponse,
}

impl StopReason {
    /// Returns true if the search ended because the data ran out or the
    /// limit was hit, rather than because of a bad response.
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::PageLimit | Self::LastPage)
    }
}

// ============================================================================
// Search Result
// ============================================================================

/// Items accumulated across the pages of one search.
///
/// Items are append-only and kept in page order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Items kept after enrichment, in the order they were received.
    pub items: Vec<Value>,
    /// Total raw items returned by the API, including dropped ones.
    pub raw_count: usize,
    /// Number of page fetches issued.
    pub pages_fetched: u32,
    /// Why pagination stopped.
    pub stop_reason: StopReason,
    /// When the search finished.
    pub fetched_at: DateTime<Utc>,
}

impl SearchResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            raw_count: 0,
            pages_fetched: 0,
            stop_reason: StopReason::PageLimit,
            fetched_at: Utc::now(),
        }
    }

    /// Appends the kept items of one page.
    pub fn append_page(&mut self, raw_count: usize, kept: Vec<Value>) {
        self.raw_count += raw_count;
        self.items.extend(kept);
    }

    /// Marks the result finished.
    #[must_use]
    pub fn finish(mut self, reason: StopReason) -> Self {
        self.stop_reason = reason;
        self.fetched_at = Utc::now();
        self
    }

    /// Returns the number of kept items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no items were kept.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of raw items that were dropped during enrichment.
    pub fn dropped(&self) -> usize {
        self.raw_count.saturating_sub(self.items.len())
    }
}

impl Default for SearchResult {
    fn default() -> Self {
        Self::new()
    }
}
