use http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use shared::types::ErrorBody;

/// Message used when the response body could not be read at all.
pub const READ_FAILED: &str = "Failed to read server response";

/// Uniform outcome of every API call.
///
/// `status` is the HTTP status, or `0` when no response was received
/// (timeout, unreachable host, cancellation). `data` is only ever populated
/// for 2xx responses, so an error payload is never mistaken for a success
/// payload that happens to share its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult<T> {
    pub data: Option<T>,
    pub status: u16,
    pub error: Option<String>,
    /// Machine-readable error code, when the backend or the transport
    /// layer supplied one.
    pub code: Option<String>,
}

impl<T> ApiResult<T> {
    /// A result with no payload.
    pub fn failure(status: u16, error: impl Into<String>) -> Self {
        Self {
            data: None,
            status,
            error: Some(error.into()),
            code: None,
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED.as_u16()
    }

    /// No HTTP response was received.
    pub fn is_connectivity_failure(&self) -> bool {
        self.status == 0
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        ApiResult {
            data: self.data.map(f),
            status: self.status,
            error: self.error,
            code: self.code,
        }
    }

    /// The error to show for this result, falling back to `fallback` when
    /// the call failed without a message.
    pub fn error_or(&self, fallback: &str) -> String {
        self.error.clone().unwrap_or_else(|| fallback.to_string())
    }
}

/// Synthesised message for a non-2xx status whose body carried no error.
pub fn status_message(status: StatusCode) -> String {
    match status.as_u16() {
        401 => "Unauthorized".to_string(),
        403 => "Forbidden - you do not have permission".to_string(),
        429 => "Too many requests - please slow down".to_string(),
        500 => "Server error - the service is temporarily unavailable".to_string(),
        502..=504 => "Service unavailable - please try again later".to_string(),
        other => format!("Request failed ({})", other),
    }
}

/// Turn a received status and body into an [`ApiResult`].
///
/// `body` is `Err` when reading the body failed. A non-empty body is parsed
/// as JSON; if that fails the raw text becomes the error. Conventional
/// `error` / `errorMessage` / `code` fields are promoted out of JSON
/// objects whatever the status.
pub fn interpret<T: DeserializeOwned>(status: StatusCode, body: Result<String, String>) -> ApiResult<T> {
    let mut data: Option<T> = None;
    let mut error: Option<String> = None;
    let mut code: Option<String> = None;

    match body {
        Err(reason) => {
            debug!("Body read failed: {}", reason);
            error = Some(READ_FAILED.to_string());
        }
        Ok(text) if !text.is_empty() => match serde_json::from_str::<Value>(&text) {
            Ok(value) => {
                let fields = ErrorBody::from_value(&value);
                error = fields.message().map(str::to_string);
                code = fields.code;

                match serde_json::from_value::<T>(value) {
                    Ok(parsed) => data = Some(parsed),
                    Err(e) if status.is_success() => {
                        debug!("Response did not match expected shape: {}", e);
                        error.get_or_insert_with(|| format!("Unexpected response from server: {}", e));
                    }
                    // Error bodies are not expected to match the success type.
                    Err(_) => {}
                }
            }
            Err(_) => {
                let trimmed = text.trim();
                error = Some(if trimmed.is_empty() {
                    "Request failed".to_string()
                } else {
                    trimmed.to_string()
                });
            }
        },
        Ok(_) => {}
    }

    if !status.is_success() {
        if error.is_none() {
            error = Some(status_message(status));
        }
        data = None;
    }

    ApiResult {
        data,
        status: status.as_u16(),
        error,
        code,
    }
}
