//! Trait definitions for `MarketProbe`.
//!
//! Credential pools are filled from sources implemented outside the core
//! (files, configuration services). A source returns `None` when it has
//! nothing usable; it never fails loudly.

use crate::models::{Identity, ProxyRoute};

/// Supplies the client identities a pool is built from.
pub trait IdentitySource {
    /// Loads all identities, or `None` if the source is unavailable.
    fn load_identities(&self) -> Option<Vec<Identity>>;
}

/// Supplies the proxy routes a pool is built from.
pub trait ProxySource {
    /// Loads all proxy routes, or `None` if the source is unavailable.
    fn load_proxies(&self) -> Option<Vec<ProxyRoute>>;
}

impl IdentitySource for Vec<Identity> {
    fn load_identities(&self) -> Option<Vec<Identity>> {
        Some(self.clone())
    }
}

impl ProxySource for Vec<ProxyRoute> {
    fn load_proxies(&self) -> Option<Vec<ProxyRoute>> {
        Some(self.clone())
    }
}

impl<S: IdentitySource + ?Sized> IdentitySource for &S {
    fn load_identities(&self) -> Option<Vec<Identity>> {
        (**self).load_identities()
    }
}

impl<S: ProxySource + ?Sized> ProxySource for &S {
    fn load_proxies(&self) -> Option<Vec<ProxyRoute>> {
        (**self).load_proxies()
    }
}
