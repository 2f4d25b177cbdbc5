//! Pre-flight validation.
//!
//! Guards never fail. Malformed host URLs and cookie prefixes are replaced
//! with known-good defaults, and oversized payloads are reported so the
//! caller can skip the request entirely.

use std::sync::LazyLock;

use marketprobe_core::{Diagnostics, Params};
use regex::Regex;

/// Host used whenever the configured one is unusable.
pub const DEFAULT_HOST_URL: &str = "https://www.vinted.com";

/// Cookie prefix used whenever the configured one is unusable.
pub const DEFAULT_COOKIE_PREFIX: &str = "access_token_web=";

/// Default outbound payload limit in kilobytes.
pub const DEFAULT_MAX_PAYLOAD_KB: u32 = 4;

/// Absolute host URL: optional scheme, optional `www.`, domain and TLD.
static HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?(www\.)?[\w.-]+\.\w{2,}$").expect("Invalid regex")
});

/// Cookie prefix in `name=` form.
static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w-]+=.*$").expect("Invalid regex"));

// ============================================================================
// Host URL
// ============================================================================

/// Validates a host URL, substituting [`DEFAULT_HOST_URL`] on mismatch.
///
/// Trailing slashes are stripped first. A host given without a scheme is
/// returned with `https://` so requests are always absolute. `max_len`,
/// when set, rejects longer inputs.
pub fn validate_host_url(input: &str, max_len: Option<usize>, diag: &Diagnostics) -> String {
    let trimmed = input.trim().trim_end_matches('/');

    if !HOST_RE.is_match(trimmed) {
        diag.warn(format!(
            "{trimmed:?} is not a valid URL. Defaulting to {DEFAULT_HOST_URL:?}"
        ));
        return DEFAULT_HOST_URL.to_string();
    }

    if let Some(limit) = max_len {
        if trimmed.len() > limit {
            diag.warn(format!(
                "Host URL {trimmed:?} exceeds the maximum length of {limit} characters. \
                 Defaulting to {DEFAULT_HOST_URL:?}"
            ));
            return DEFAULT_HOST_URL.to_string();
        }
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

// ============================================================================
// Cookie Prefix
// ============================================================================

/// Validates a cookie prefix, substituting [`DEFAULT_COOKIE_PREFIX`] on mismatch.
pub fn validate_cookie_prefix(input: &str, diag: &Diagnostics) -> String {
    if PREFIX_RE.is_match(input) {
        return input.to_string();
    }

    diag.warn(format!(
        "{input:?} is not a valid cookie prefix. Defaulting to {DEFAULT_COOKIE_PREFIX:?}"
    ));
    DEFAULT_COOKIE_PREFIX.to_string()
}

// ============================================================================
// Payload Size
// ============================================================================

/// Result of a payload size check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayloadCheck {
    /// False when the payload exceeds the limit.
    pub ok: bool,
    /// Serialized payload size in kilobytes.
    pub size_kb: f64,
}

/// Measures the serialized size of `params` against `max_kb`.
#[allow(clippy::cast_precision_loss)]
pub fn validate_payload_size(params: &Params, max_kb: u32, diag: &Diagnostics) -> PayloadCheck {
    let size_kb = params.serialized_len() as f64 / 1024.0;
    let ok = size_kb <= f64::from(max_kb);

    if !ok {
        diag.warn(format!(
            "Request size ({size_kb:.2} KB) exceeds the maximum allowed ({max_kb} KB)."
        ));
    }

    PayloadCheck { ok, size_kb }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn diag() -> Diagnostics {
        Diagnostics::disabled("guards")
    }

    #[test]
    fn test_invalid_host_falls_back() {
        assert_eq!(validate_host_url("not-a-url", None, &diag()), DEFAULT_HOST_URL);
        assert_eq!(validate_host_url("", None, &diag()), DEFAULT_HOST_URL);
        assert_eq!(
            validate_host_url("ftp://www.vinted.fr", None, &diag()),
            DEFAULT_HOST_URL
        );
    }

    #[test]
    fn test_valid_host_is_kept() {
        assert_eq!(
            validate_host_url("https://www.vinted.fr", None, &diag()),
            "https://www.vinted.fr"
        );
        assert_eq!(
            validate_host_url("http://vinted.de", None, &diag()),
            "http://vinted.de"
        );
    }

    #[test]
    fn test_trailing_slashes_are_stripped() {
        assert_eq!(
            validate_host_url("https://www.vinted.fr///", None, &diag()),
            "https://www.vinted.fr"
        );
    }

    #[test]
    fn test_scheme_less_host_gets_https() {
        assert_eq!(
            validate_host_url("www.vinted.it", None, &diag()),
            "https://www.vinted.it"
        );
    }

    #[test]
    fn test_host_with_path_is_rejected() {
        assert_eq!(
            validate_host_url("https://www.vinted.fr/catalog", None, &diag()),
            DEFAULT_HOST_URL
        );
    }

    #[test]
    fn test_host_length_cap() {
        let long = "https://www.a-very-long-marketplace-domain.com";
        assert_eq!(validate_host_url(long, Some(30), &diag()), DEFAULT_HOST_URL);
        assert_eq!(validate_host_url(long, None, &diag()), long);
    }

    #[test]
    fn test_cookie_prefix_validation() {
        assert_eq!(validate_cookie_prefix("token=", &diag()), "token=");
        assert_eq!(
            validate_cookie_prefix("_vinted_fr_session=", &diag()),
            "_vinted_fr_session="
        );
        assert_eq!(validate_cookie_prefix("token", &diag()), DEFAULT_COOKIE_PREFIX);
        assert_eq!(validate_cookie_prefix("=value", &diag()), DEFAULT_COOKIE_PREFIX);
        assert_eq!(validate_cookie_prefix("", &diag()), DEFAULT_COOKIE_PREFIX);
    }

    #[test]
    fn test_payload_over_limit() {
        let params = Params::new().with("search_text", "x".repeat(5 * 1024));
        let check = validate_payload_size(&params, 4, &diag());
        assert!(!check.ok);
        assert!(check.size_kb > 5.0);
    }

    #[test]
    fn test_payload_within_limit() {
        let params = Params::new().with("search_text", "jacket").with("page", 1);
        let check = validate_payload_size(&params, 4, &diag());
        assert!(check.ok);
        assert!(check.size_kb < 0.1);
    }

    #[test]
    fn test_payload_exactly_at_limit_is_ok() {
        // {"k":"..."} is 8 bytes of framing.
        let params = Params::new().with("k", "x".repeat(1024 - 8));
        assert_eq!(params.serialized_len(), 1024);
        assert!(validate_payload_size(&params, 1, &diag()).ok);
    }
}
