// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `MarketProbe` Fetch
//!
//! Resilient access layer for the marketplace API.
//!
//! This crate turns a hostile, rate-limited endpoint into a plain
//! request/response interface. It includes:
//!
//! ## Host APIs
//!
//! The [`host`] module wraps the network:
//!
//! - [`host::transport`] - The [`Transport`] seam and its request/response types
//! - [`host::http`] - Blocking `reqwest` transport with per-proxy clients
//! - [`host::headers`] - Browser-like request headers
//! - [`host::scripted`] - Scripted transport for tests and dry runs
//!
//! ## Access Layer
//!
//! - [`guards`] - Host URL, cookie prefix and payload size checks
//! - [`pool::CredentialPool`] - Immutable identity and proxy pools
//! - [`recovery::RecoveryTable`] - Status code to rotation mapping
//! - [`retry::BackoffPolicy`] - Delay between attempts
//! - [`session::SessionNegotiator`] - Session token bootstrap
//! - [`client::RequestClient`] - The retrying API client
//!
//! ## Example
//!
//! ```ignore
//! use marketprobe_core::Params;
//! use marketprobe_fetch::{ClientConfig, RequestClient};
//!
//! let config = ClientConfig::builder().host_url("https://www.vinted.fr").build();
//! let mut client = RequestClient::builder(config).build();
//!
//! let body = client.fetch("/catalog/items", &Params::new().with("search_text", "jacket"));
//! ```

// Core modules
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod guards;
pub mod host;
pub mod pool;
pub mod recovery;
pub mod retry;
pub mod session;
pub mod state;

// Re-export key types at crate root

// Errors
pub use error::{RequestBuildError, TransportError};

// Host APIs
pub use host::{
    http::ReqwestTransport,
    scripted::{Scripted, ScriptedTransport},
    transport::{OutboundRequest, RawResponse, Transport},
};

// Access layer
pub use cache::ResponseCache;
pub use client::{FetchOutcome, FetchReport, RequestClient, RequestClientBuilder, empty_result};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use guards::{PayloadCheck, validate_cookie_prefix, validate_host_url, validate_payload_size};
pub use pool::{CredentialPool, IdentityPool, PoolEntry, ProxyPool, builtin_identities};
pub use recovery::{Recovery, RecoveryTable};
pub use retry::{AttemptBudget, BackoffPolicy};
pub use session::SessionNegotiator;
pub use state::ClientState;
