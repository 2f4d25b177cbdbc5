// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `MarketProbe` Catalog
//!
//! Marketplace catalog search built on the `marketprobe-fetch` client.
//!
//! - [`SearchPaginator`] - Sequential page fetches with early stopping
//! - [`PageSource`] - What the paginator fetches through
//! - [`parser`] - Response shapes and seller feedback enrichment
//! - [`endpoints`] - API paths and parameter names
//!
//! ## Usage
//!
//! ```ignore
//! use marketprobe_catalog::SearchPaginator;
//! use marketprobe_core::Diagnostics;
//! use marketprobe_fetch::{ClientConfig, RequestClient};
//!
//! let client = RequestClient::builder(ClientConfig::default()).build();
//! let mut paginator = SearchPaginator::new(client, Diagnostics::enabled("search"));
//!
//! let result = paginator.search_text("denim jacket", 3);
//! println!("{} items", result.len());
//! ```

pub mod endpoints;
pub mod error;
pub mod paginator;
pub mod parser;
pub mod source;

pub use error::CatalogError;
pub use paginator::SearchPaginator;
pub use parser::{EnrichedPage, enrich_page};
pub use source::PageSource;
