//! Status code to recovery action mapping.
//!
//! The marketplace signals which credential it dislikes through the status
//! code. The mapping is plain data so it can be inspected, overridden from
//! settings, and tested without any HTTP traffic.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// What to change before the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recovery {
    /// Mint a new session token.
    RefreshSession,
    /// Draw a new client identity.
    RotateIdentity,
    /// Draw a new proxy route.
    RotateProxy,
    /// Retry unchanged.
    Retry,
}

impl Recovery {
    /// Short reason used in diagnostics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::RefreshSession => "session expired",
            Self::RotateIdentity => "identity rejected",
            Self::RotateProxy => "proxy or gateway failure",
            Self::Retry => "unexpected status",
        }
    }
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RefreshSession => "refresh session",
            Self::RotateIdentity => "rotate identity",
            Self::RotateProxy => "rotate proxy",
            Self::Retry => "retry",
        };
        f.write_str(name)
    }
}

/// Standard marketplace rules.
const STANDARD_RULES: &[(u16, Recovery)] = &[
    (400, Recovery::RotateIdentity),
    (401, Recovery::RefreshSession),
    (403, Recovery::RotateIdentity),
    (407, Recovery::RotateProxy),
    (502, Recovery::RotateProxy),
    (504, Recovery::RotateProxy),
];

/// Declarative status → recovery table. Unlisted statuses map to [`Recovery::Retry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecoveryTable(BTreeMap<u16, Recovery>);

impl RecoveryTable {
    /// The standard marketplace table.
    pub fn standard() -> Self {
        Self(STANDARD_RULES.iter().copied().collect())
    }

    /// A table that never rotates anything.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds or replaces a rule.
    #[must_use]
    pub fn with_rule(mut self, status: u16, recovery: Recovery) -> Self {
        self.0.insert(status, recovery);
        self
    }

    /// Merges overrides on top of this table.
    #[must_use]
    pub fn merged(mut self, overrides: &RecoveryTable) -> Self {
        self.0.extend(overrides.0.iter().map(|(k, v)| (*k, *v)));
        self
    }

    /// Looks up the recovery for a status.
    pub fn lookup(&self, status: u16) -> Recovery {
        self.0.get(&status).copied().unwrap_or(Recovery::Retry)
    }

    /// Iterates over the explicit rules in status order.
    pub fn rules(&self) -> impl Iterator<Item = (u16, Recovery)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Returns true if the table has no explicit rules.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for RecoveryTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table() {
        let table = RecoveryTable::standard();
        assert_eq!(table.lookup(401), Recovery::RefreshSession);
        assert_eq!(table.lookup(400), Recovery::RotateIdentity);
        assert_eq!(table.lookup(403), Recovery::RotateIdentity);
        assert_eq!(table.lookup(407), Recovery::RotateProxy);
        assert_eq!(table.lookup(502), Recovery::RotateProxy);
        assert_eq!(table.lookup(504), Recovery::RotateProxy);
    }

    #[test]
    fn test_unlisted_status_retries() {
        let table = RecoveryTable::standard();
        for status in [404, 429, 500, 503, 418] {
            assert_eq!(table.lookup(status), Recovery::Retry, "status {status}");
        }
    }

    #[test]
    fn test_overrides_merge() {
        let overrides = RecoveryTable::empty()
            .with_rule(429, Recovery::RotateProxy)
            .with_rule(403, Recovery::RotateProxy);
        let table = RecoveryTable::standard().merged(&overrides);
        assert_eq!(table.lookup(429), Recovery::RotateProxy);
        assert_eq!(table.lookup(403), Recovery::RotateProxy);
        assert_eq!(table.lookup(400), Recovery::RotateIdentity);
    }

    #[test]
    fn test_table_deserializes_from_json_object() {
        let table: RecoveryTable =
            serde_json::from_str(r#"{"429": "rotate_proxy", "500": "retry"}"#).unwrap();
        assert_eq!(table.lookup(429), Recovery::RotateProxy);
        assert_eq!(table.rules().count(), 2);
    }
}
