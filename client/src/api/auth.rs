use std::time::Duration;

use http::Method;

use shared::types::{TokenResponse, UserProfile};

use crate::http::{ApiClient, ApiResult, RequestOptions};

/// GET /auth/me
pub async fn me(api: &ApiClient, timeout: Duration) -> ApiResult<UserProfile> {
    api.request("/auth/me", RequestOptions::new(Method::GET).timeout(timeout))
        .await
}

/// GET /dev/login: issues a token without the identity provider.
/// Only enabled on backends running in development mode.
pub async fn dev_login(api: &ApiClient) -> ApiResult<TokenResponse> {
    api.get("/dev/login").await
}

/// Where to send a browser to start the Google sign-in flow. The backend
/// redirects back with `#token=...` on success.
pub fn google_authorization_url(api: &ApiClient) -> String {
    api.url("/oauth2/authorization/google")
}
