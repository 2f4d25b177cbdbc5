//! Per-instance logging capability.
//!
//! Components never log through module-level switches. Each one owns a
//! [`Diagnostics`] value that carries its component name and whether
//! logging is enabled for that instance. Events are emitted via `tracing`,
//! so the binary decides where they end up.

use std::fmt::Display;

use tracing::{Level, debug, error, info, warn};

/// Logging handle injected into each component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostics {
    component: &'static str,
    enabled: bool,
}

impl Diagnostics {
    /// Creates a handle for a component.
    pub const fn new(component: &'static str, enabled: bool) -> Self {
        Self { component, enabled }
    }

    /// Creates an enabled handle.
    pub const fn enabled(component: &'static str) -> Self {
        Self::new(component, true)
    }

    /// Creates a handle that drops every message.
    pub const fn disabled(component: &'static str) -> Self {
        Self::new(component, false)
    }

    /// Returns a handle for another component sharing this handle's switch.
    #[must_use]
    pub const fn scoped(&self, component: &'static str) -> Self {
        Self::new(component, self.enabled)
    }

    /// Returns true if messages are emitted.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the component name.
    pub const fn component(&self) -> &'static str {
        self.component
    }

    /// Emits a message at the given level.
    pub fn log(&self, level: Level, message: impl Display) {
        if !self.enabled {
            return;
        }
        let component = self.component;
        match level {
            Level::ERROR => error!(component, "{message}"),
            Level::WARN => warn!(component, "{message}"),
            Level::INFO => info!(component, "{message}"),
            _ => debug!(component, "{message}"),
        }
    }

    /// Emits a debug message.
    pub fn debug(&self, message: impl Display) {
        self.log(Level::DEBUG, message);
    }

    /// Emits an info message.
    pub fn info(&self, message: impl Display) {
        self.log(Level::INFO, message);
    }

    /// Emits a warning.
    pub fn warn(&self, message: impl Display) {
        self.log(Level::WARN, message);
    }

    /// Emits an error.
    pub fn error(&self, message: impl Display) {
        self.log(Level::ERROR, message);
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::disabled("marketprobe")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_keeps_switch() {
        let root = Diagnostics::enabled("client");
        let child = root.scoped("session");
        assert!(child.is_enabled());
        assert_eq!(child.component(), "session");

        let quiet = Diagnostics::disabled("client").scoped("pool");
        assert!(!quiet.is_enabled());
    }

    #[test]
    fn test_disabled_log_is_noop() {
        // Must not panic without a subscriber installed.
        Diagnostics::default().warn("nothing to see");
        Diagnostics::enabled("test").info("emitted without a subscriber");
    }
}
