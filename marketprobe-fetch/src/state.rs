//! Mutable credential state of one client.

use marketprobe_core::{Identity, ProxyRoute, Session};

/// Identity, proxy route and session currently used by a client.
///
/// Each slot is either a usable value or `None`; requests go out without
/// whatever is missing. Only the owning client mutates the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientState {
    pub(crate) identity: Option<Identity>,
    pub(crate) proxy: Option<ProxyRoute>,
    pub(crate) session: Option<Session>,
}

impl ClientState {
    /// Creates a state record.
    pub fn new(
        identity: Option<Identity>,
        proxy: Option<ProxyRoute>,
        session: Option<Session>,
    ) -> Self {
        Self {
            identity,
            proxy,
            session,
        }
    }

    /// Current client identity.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Current proxy route.
    pub fn proxy(&self) -> Option<&ProxyRoute> {
        self.proxy.as_ref()
    }

    /// Current session.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Current session token.
    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    /// Returns true if a session is held.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }
}
