//! JSON output formatting.

use anyhow::Result;
use marketprobe_fetch::RequestClient;
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// Credentials a client ended up with, safe to print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOutput {
    pub host: String,
    pub cookie_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl SessionOutput {
    /// Captures the state of a client.
    pub fn from_client(client: &RequestClient) -> Self {
        let state = client.state();
        Self {
            host: client.config().host_url().to_string(),
            cookie_prefix: client.config().cookie_prefix().to_string(),
            identity: state.identity().map(|i| i.as_str().to_string()),
            proxy: state.proxy().map(marketprobe_core::ProxyRoute::redacted),
            token: state.token().map(mask_token),
        }
    }
}

/// Shows only the start of a token.
pub fn mask_token(token: &str) -> String {
    let shown: String = token.chars().take(6).collect();
    if shown.len() == token.len() {
        "*".repeat(token.chars().count())
    } else {
        format!("{shown}…")
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}

// ============================================================================
// Tests
// ============================================================================
