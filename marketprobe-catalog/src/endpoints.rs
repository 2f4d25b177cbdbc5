//! Marketplace API endpoints.
//!
//! Paths are relative to the API prefix the request client adds.

/// Paginated catalog listing.
pub const CATALOG_ITEMS: &str = "/catalog/items";

/// Query parameter holding the 1-based page number.
pub const PAGE_PARAM: &str = "page";

/// Query parameter holding free-text search terms.
pub const SEARCH_TEXT_PARAM: &str = "search_text";

/// Suffix turning a seller profile URL into its feedback tab.
pub const FEEDBACK_SUFFIX: &str = "?tab=feedback";

/// Detail endpoint of a single item.
pub fn item_path(item_id: &str) -> String {
    format!("/items/{item_id}")
}
