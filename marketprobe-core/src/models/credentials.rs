//! Credential types presented to the marketplace.
//!
//! - [`Identity`] - Client identity string (sent as `User-Agent`)
//! - [`ProxyRoute`] - Scheme to proxy URI mapping
//! - [`Session`] - Session token minted by the bootstrap request

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, json_kind};

// ============================================================================
// Identity
// ============================================================================

/// A client identity string presented to resemble a particular browser.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Creates a new identity.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this identity can be used in a request.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl TryFrom<Value> for Identity {
    type Error = CoreError;

    /// Reads an identity from a JSON string.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(Self(s)),
            other => Err(CoreError::UnexpectedType {
                what: "identity",
                expected: "a string",
                found: json_kind(&other),
            }),
        }
    }
}

// ============================================================================
// Proxy Route
// ============================================================================

/// Mapping from URL scheme (`http`, `https`) to a proxy URI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProxyRoute(BTreeMap<String, String>);

impl ProxyRoute {
    /// Creates an empty route.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a proxy URI for a scheme.
    #[must_use]
    pub fn with(mut self, scheme: impl Into<String>, uri: impl Into<String>) -> Self {
        self.0.insert(scheme.into(), uri.into());
        self
    }

    /// Creates a route sending both `http` and `https` traffic through one proxy.
    pub fn uniform(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        Self::new().with("http", uri.clone()).with("https", uri)
    }

    /// Returns the proxy URI for a scheme.
    pub fn get(&self, scheme: &str) -> Option<&str> {
        self.0.get(scheme).map(String::as_str)
    }

    /// Returns the proxy URI for plain HTTP traffic.
    pub fn http(&self) -> Option<&str> {
        self.get("http")
    }

    /// Returns the proxy URI for HTTPS traffic.
    pub fn https(&self) -> Option<&str> {
        self.get("https")
    }

    /// Iterates over `(scheme, uri)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns true if the route has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if this route can be used for requests.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }

    /// Renders the route with any proxy credentials masked.
    pub fn redacted(&self) -> String {
        self.0
            .iter()
            .map(|(scheme, uri)| format!("{scheme}={}", mask_userinfo(uri)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ProxyRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl FromIterator<(String, String)> for ProxyRoute {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl TryFrom<Value> for ProxyRoute {
    type Error = CoreError;

    /// Reads a route from a `{"scheme": "proxy-uri"}` JSON object.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(CoreError::UnexpectedType {
                what: "proxy route",
                expected: "an object",
                found: json_kind(&value),
            });
        };

        map.into_iter()
            .map(|(scheme, uri)| match uri {
                Value::String(uri) => Ok((scheme, uri)),
                other => Err(CoreError::InvalidProxyUri {
                    scheme,
                    found: json_kind(&other),
                }),
            })
            .collect()
    }
}

fn mask_userinfo(uri: &str) -> String {
    let Some(at) = uri.rfind('@') else {
        return uri.to_string();
    };
    let start = uri.find("://").map_or(0, |i| i + 3);
    if start >= at {
        return uri.to_string();
    }
    format!("{}***{}", &uri[..start], &uri[at..])
}

// ============================================================================
// Session
// ============================================================================

/// A marketplace-issued session token and the cookie prefix it travels under.
///
/// Sessions are replaced wholesale when a new token is minted; they are
/// never merged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Raw token value.
    pub token: String,
    /// Cookie prefix in `name=` form.
    pub prefix: String,
}

impl Session {
    /// Creates a new session.
    pub fn new(token: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            prefix: prefix.into(),
        }
    }

    /// Returns the `Cookie` header value carrying this session.
    pub fn cookie_value(&self) -> String {
        format!("{}{}", self.prefix, self.token)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown: String = self.token.chars().take(6).collect();
        f.debug_struct("Session")
            .field("prefix", &self.prefix)
            .field("token", &format!("{shown}…"))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
