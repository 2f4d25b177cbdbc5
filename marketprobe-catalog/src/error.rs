//! Catalog shape errors.

use thiserror::Error;

/// A response or item that does not have the expected shape.
///
/// These never escape the paginator; they decide where the current page
/// or search is cut off.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The response is not a JSON object with an `items` field.
    #[error("Response has no items field")]
    MissingItems,

    /// The `items` field is not a list.
    #[error("The items field must be a list, got {0}")]
    ItemsNotArray(&'static str),

    /// An item's seller has no string `profile_url`.
    #[error("Item {index} has a seller without a profile_url")]
    MissingProfileUrl {
        /// Position of the offending item on its page.
        index: usize,
    },

    /// The response has no `item` field.
    #[error("Response has no item field")]
    MissingItem,
}
