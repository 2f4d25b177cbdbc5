//! Browser-like request headers.

use marketprobe_core::{Identity, Session};
use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, CONNECTION, COOKIE, HeaderMap, HeaderValue, REFERER, USER_AGENT,
};

/// `Accept` header sent with every request.
pub const ACCEPT_VALUE: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// `Accept-Encoding` header sent with every request.
pub const ACCEPT_ENCODING_VALUE: &str = "gzip, deflate, br";

/// Builds the standard header set.
///
/// Absent credentials are simply left out. A credential that is not a
/// legal header value is left out too.
pub fn browser_headers(
    identity: Option<&Identity>,
    referer: &str,
    cookie: Option<&str>,
) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Some(value) = identity.and_then(|id| HeaderValue::from_str(id.as_str()).ok()) {
        headers.insert(USER_AGENT, value);
    }
    if let Some(value) = cookie.and_then(|c| HeaderValue::from_str(c).ok()) {
        headers.insert(COOKIE, value);
    }
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
    if let Ok(value) = HeaderValue::from_str(referer) {
        headers.insert(REFERER, value);
    }
    headers.insert(CONNECTION, HeaderValue::from_static("close"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(ACCEPT_ENCODING_VALUE));

    headers
}

/// Builds the standard header set carrying a session cookie.
pub fn session_headers(
    identity: Option<&Identity>,
    referer: &str,
    session: Option<&Session>,
) -> HeaderMap {
    let cookie = session.map(Session::cookie_value);
    browser_headers(identity, referer, cookie.as_deref())
}
