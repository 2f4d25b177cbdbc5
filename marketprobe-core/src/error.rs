//! Core error types for `MarketProbe`.

use serde_json::Value;
use thiserror::Error;

/// Core error type for `MarketProbe` operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A JSON value had the wrong type for what it was read as.
    #[error("Invalid {what}: expected {expected}, found {found}")]
    UnexpectedType {
        /// What was being read.
        what: &'static str,
        /// The JSON type required.
        expected: &'static str,
        /// The JSON type present.
        found: &'static str,
    },

    /// A proxy route maps a scheme to something other than a URI string.
    #[error("Invalid proxy route: URI for scheme {scheme:?} is {found}, not a string")]
    InvalidProxyUri {
        /// Scheme whose URI is malformed.
        scheme: String,
        /// The JSON type present.
        found: &'static str,
    },
}

/// Names the JSON type of a value for error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_messages() {
        let err = CoreError::UnexpectedType {
            what: "identity",
            expected: "a string",
            found: json_kind(&json!(3)),
        };
        assert_eq!(err.to_string(), "Invalid identity: expected a string, found a number");

        let err = CoreError::InvalidProxyUri {
            scheme: "http".to_string(),
            found: json_kind(&json!(null)),
        };
        assert_eq!(
            err.to_string(),
            "Invalid proxy route: URI for scheme \"http\" is null, not a string"
        );
    }
}
