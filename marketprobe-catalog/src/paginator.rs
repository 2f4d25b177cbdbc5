//! Paginated catalog search.

use marketprobe_core::{Diagnostics, Params, SearchResult, StopReason};
use serde_json::Value;
use tracing::instrument;

use crate::endpoints::{CATALOG_ITEMS, PAGE_PARAM, SEARCH_TEXT_PARAM, item_path};
use crate::parser::{detail_item, enrich_page, page_items};
use crate::source::PageSource;

/// Walks the catalog listing page by page.
#[derive(Debug)]
pub struct SearchPaginator<S> {
    source: S,
    diag: Diagnostics,
}

impl<S: PageSource> SearchPaginator<S> {
    /// Creates a paginator over a page source.
    pub fn new(source: S, diag: Diagnostics) -> Self {
        Self { source, diag }
    }

    /// Returns the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the underlying source mutably.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consumes the paginator and returns the source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Searches for free text.
    pub fn search_text(&mut self, query: &str, page_limit: i64) -> SearchResult {
        let params = Params::new().with(SEARCH_TEXT_PARAM, query);
        self.search(&params, page_limit)
    }

    /// Fetches up to `page_limit` pages of the catalog listing.
    ///
    /// Stops early on the first empty page, on the client's empty
    /// sentinel, or on a response without an `items` list. Whatever was
    /// accumulated until then is returned.
    #[instrument(skip(self, params))]
    pub fn search(&mut self, params: &Params, page_limit: i64) -> SearchResult {
        let mut result = SearchResult::new();
        if page_limit <= 0 {
            self.diag
                .warn(format!("Page limit {page_limit} requests no pages."));
            return result.finish(StopReason::PageLimit);
        }

        let mut params = params.clone();
        let mut page: i64 = 1;

        while page <= page_limit {
            params.set(PAGE_PARAM, page);
            let report = self.source.fetch_page(CATALOG_ITEMS, &params);
            result.pages_fetched += 1;

            if !report.outcome.is_success() {
                self.diag
                    .error(format!("No response for page {page}. Breaking."));
                return self.finish(result, StopReason::EmptyResponse);
            }

            let items = match page_items(&report.body) {
                Ok(items) => items,
                Err(e) => {
                    self.diag.error(format!("{e} on page {page}. Breaking."));
                    return self.finish(result, StopReason::MalformedResponse);
                }
            };

            if items.is_empty() {
                self.diag.debug(format!("Page {page} is empty. Last page reached."));
                return self.finish(result, StopReason::LastPage);
            }

            let enriched = enrich_page(items);
            if let Some(e) = &enriched.truncated {
                self.diag.error(format!(
                    "{e}. Dropping the remaining {} items of page {page}.",
                    items.len() - enriched.items.len()
                ));
            }

            result.append_page(items.len(), enriched.items);
            page += 1;
        }

        self.finish(result, StopReason::PageLimit)
    }

    /// Fetches the detail record of one item.
    ///
    /// `params` are sent as query parameters. Returns `None` if the fetch
    /// failed or the response has no `item`.
    pub fn item(&mut self, item_id: &str, params: Option<&Params>) -> Option<Value> {
        let params = params.cloned().unwrap_or_default();
        let report = self.source.fetch_page(&item_path(item_id), &params);
        if !report.outcome.is_success() {
            self.diag
                .error(format!("No response for item {item_id}."));
            return None;
        }

        match detail_item(&report.body) {
            Ok(item) => Some(item.clone()),
            Err(e) => {
                self.diag.error(format!("{e} for item {item_id}."));
                None
            }
        }
    }

    fn finish(&self, result: SearchResult, reason: StopReason) -> SearchResult {
        self.diag.info(format!(
            "Successfully fetched {} items over {} pages ({reason:?}).",
            result.len(),
            result.pages_fetched
        ));
        result.finish(reason)
    }
}
