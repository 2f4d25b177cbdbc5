// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `MarketProbe` Core
//!
//! Core types, models, and traits for the `MarketProbe` workspace.
//!
//! This crate provides the foundational abstractions used across all other
//! `MarketProbe` crates, including:
//!
//! - Credential models (identities, proxy routes, sessions)
//! - Request parameters and accumulated search results
//! - Source traits for loading credential pools
//! - The per-instance [`Diagnostics`] logging capability
//! - Error types
//!
//! ## Key Types
//!
//! ### Credentials
//! - [`Identity`] - Client identity string sent as `User-Agent`
//! - [`ProxyRoute`] - Scheme to proxy URI mapping
//! - [`Session`] - Marketplace-issued session token with its cookie prefix
//!
//! ### Requests & Results
//! - [`Params`] - Ordered query parameters with a measurable payload size
//! - [`SearchResult`] - Items accumulated across pages
//! - [`StopReason`] - Why a paginated search stopped

pub mod diagnostics;
pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::{CoreError, json_kind};

// Re-export all model types
pub use models::{
    // Credentials
    Identity,
    ProxyRoute,
    Session,
    // Requests & results
    Params,
    SearchResult,
    StopReason,
};

pub use diagnostics::Diagnostics;

// Re-export traits
pub use traits::{IdentitySource, ProxySource};
