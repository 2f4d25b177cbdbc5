//! Credential pools.
//!
//! A pool is loaded once from a source and never mutated afterwards. An
//! unusable source (missing, empty, or nothing but invalid entries) leaves
//! the pool absent; [`CredentialPool::pick`] then returns `None` and the
//! client carries on without that credential.

use marketprobe_core::{Diagnostics, Identity, IdentitySource, ProxyRoute, ProxySource};
use rand::Rng;
use rand::seq::SliceRandom;

/// Desktop browser identities used when the caller opts into a built-in list.
const BUILTIN_IDENTITIES: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Returns the built-in identity list.
pub fn builtin_identities() -> Vec<Identity> {
    BUILTIN_IDENTITIES.iter().map(|s| Identity::new(*s)).collect()
}

// ============================================================================
// Pool Entry
// ============================================================================

/// A value that can live in a [`CredentialPool`].
pub trait PoolEntry: Clone {
    /// Plural noun used in diagnostics ("identities", "proxies").
    const KIND: &'static str;

    /// Returns true if the entry may be handed out.
    fn is_usable(&self) -> bool;

    /// Log-safe description of the entry.
    fn describe(&self) -> String;
}

impl PoolEntry for Identity {
    const KIND: &'static str = "identities";

    fn is_usable(&self) -> bool {
        self.is_valid()
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl PoolEntry for ProxyRoute {
    const KIND: &'static str = "proxies";

    fn is_usable(&self) -> bool {
        self.is_valid()
    }

    fn describe(&self) -> String {
        self.redacted()
    }
}

// ============================================================================
// Credential Pool
// ============================================================================

/// Immutable set of interchangeable credentials.
#[derive(Debug, Clone)]
pub struct CredentialPool<T> {
    entries: Option<Vec<T>>,
    diag: Diagnostics,
}

/// Pool of client identities.
pub type IdentityPool = CredentialPool<Identity>;

/// Pool of proxy routes.
pub type ProxyPool = CredentialPool<ProxyRoute>;

impl<T: PoolEntry> CredentialPool<T> {
    /// Builds a pool, dropping unusable entries.
    ///
    /// Returns an absent pool when `entries` is `None`, empty, or holds no
    /// usable entry.
    pub fn from_entries(entries: Option<Vec<T>>, diag: Diagnostics) -> Self {
        let Some(entries) = entries else {
            diag.error(format!("No {} source available. Pool is empty.", T::KIND));
            return Self::absent(diag);
        };

        if entries.is_empty() {
            diag.error(format!("Source of {} is empty. Pool is empty.", T::KIND));
            return Self::absent(diag);
        }

        let total = entries.len();
        let valid: Vec<T> = entries.into_iter().filter(PoolEntry::is_usable).collect();

        if valid.is_empty() {
            diag.error(format!(
                "Source of {} contains no valid entries. Pool is empty.",
                T::KIND
            ));
            return Self::absent(diag);
        }

        if valid.len() < total {
            diag.warn(format!(
                "Dropped {} invalid entries from {}",
                total - valid.len(),
                T::KIND
            ));
        }

        diag.debug(format!("Loaded {} {}", valid.len(), T::KIND));
        Self {
            entries: Some(valid),
            diag,
        }
    }

    /// Creates an absent pool.
    pub fn absent(diag: Diagnostics) -> Self {
        Self {
            entries: None,
            diag,
        }
    }

    /// Returns the loaded entries, or `None` when the pool is absent.
    pub fn entries(&self) -> Option<&[T]> {
        self.entries.as_deref()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, Vec::len)
    }

    /// Returns true if there is nothing to pick from.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Picks a uniformly random entry.
    pub fn pick(&self) -> Option<T> {
        self.pick_with(&mut rand::thread_rng())
    }

    /// Picks a uniformly random entry using the given RNG.
    pub fn pick_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<T> {
        let Some(chosen) = self.entries.as_deref().and_then(|e| e.choose(rng)) else {
            self.diag
                .error(format!("No {} available to rotate. Returning None.", T::KIND));
            return None;
        };

        self.diag
            .info(format!("Selected from {}: {}", T::KIND, chosen.describe()));
        Some(chosen.clone())
    }
}

impl IdentityPool {
    /// Loads identities from a source.
    pub fn load(source: &dyn IdentitySource, diag: Diagnostics) -> Self {
        Self::from_entries(source.load_identities(), diag)
    }

    /// Pool backed by the built-in identity list.
    pub fn builtin(diag: Diagnostics) -> Self {
        Self::from_entries(Some(builtin_identities()), diag)
    }
}

impl ProxyPool {
    /// Loads proxy routes from a source.
    pub fn load(source: &dyn ProxySource, diag: Diagnostics) -> Self {
        Self::from_entries(source.load_proxies(), diag)
    }
}

// ============================================================================
// Tests
// ============================================================================
