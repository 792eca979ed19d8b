use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Login wire types
// ---------------------------------------------------------------------------

/// Body returned by `GET /dev/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

// ---------------------------------------------------------------------------
// OAuth callback handling
// ---------------------------------------------------------------------------

/// Marker the OAuth success redirect puts at the start of the URL fragment.
const TOKEN_FRAGMENT_PREFIX: &str = "token=";

/// Capture a bearer token delivered in a callback URL fragment
/// (`https://host/path#token=abc&x=y`).
///
/// Returns the token and the URL with its fragment removed, so the token
/// does not linger in anything that records the URL. Returns `None` when
/// the fragment is absent, does not start with `token=`, or is empty.
pub fn capture_fragment_token(url: &str) -> Option<(String, String)> {
    let (base, fragment) = url.split_once('#')?;
    let rest = fragment.strip_prefix(TOKEN_FRAGMENT_PREFIX)?;
    let token = rest.split('&').next().unwrap_or_default();

    if token.is_empty() {
        return None;
    }

    Some((token.to_string(), base.to_string()))
}
