//! Domain models for `MarketProbe`.
//!
//! ## Submodules
//!
//! - [`credentials`] - Identity, proxy route and session types
//! - [`params`] - Query parameters sent to the marketplace API
//! - [`search`] - Accumulated search results

mod credentials;
mod params;
mod search;

// Re-export everything at the models level
pub use credentials::{Identity, ProxyRoute, Session};
pub use params::Params;
pub use search::{SearchResult, StopReason};
