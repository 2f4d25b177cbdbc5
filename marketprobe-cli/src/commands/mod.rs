//! CLI command implementations.

pub mod config;
pub mod item;
pub mod search;
pub mod session;

use std::fmt;

/// Error for lookups that came back empty.
#[derive(Debug)]
pub struct NotFound(pub String);

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} not found", self.0)
    }
}

impl std::error::Error for NotFound {}
