//! Host APIs for network access.
//!
//! - [`transport`] - The [`Transport`](transport::Transport) trait and its request/response types
//! - [`http`] - Blocking `reqwest` transport with per-proxy clients
//! - [`headers`] - Browser-like request headers
//! - [`scripted`] - In-memory transport replaying canned responses

pub mod headers;
pub mod http;
pub mod scripted;
pub mod transport;
