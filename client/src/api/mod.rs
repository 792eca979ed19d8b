//! One function per backend endpoint.
//!
//! These are thin: they pick the method, path and body, and hand back the
//! raw [`ApiResult`](crate::http::ApiResult). Anything stateful lives in
//! `session`, `search` or `admin`.

pub mod admin;
pub mod auth;
pub mod vehicle;

/// Percent-encode a value for use in a path segment or query string.
pub(crate) fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
