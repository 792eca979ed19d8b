use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A vehicle record as returned by the search endpoint.
///
/// The backend forwards whatever the upstream registry returns, so this is
/// an open map rather than a struct: unknown fields must survive parsing.
pub type VehicleRecord = Map<String, Value>;

/// Body for `POST /vehicle/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSearchRequest {
    pub registration_number: String,
}

/// Response of `POST /vehicle/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSearchResponse {
    pub success: bool,
    #[serde(default)]
    pub from_cache: Option<bool>,
    /// Masked form of the searched number, e.g. `MH******34`.
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    pub data: Option<VehicleRecord>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl VehicleSearchResponse {
    /// A failed response built on the client side when the backend gave
    /// no usable body.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_cached(&self) -> bool {
        self.from_cache.unwrap_or(false)
    }
}

/// Body for `POST /vehicle/unmask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmaskRequest {
    pub registration_number: String,
}

/// Response of `POST /vehicle/unmask`: the full, unmasked number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmaskResponse {
    pub registration_number: String,
}

/// Response of `GET /vehicle/rate-limit`.
///
/// The counters are only meaningful when `admin_configured` is true; the
/// backend reports defaults otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfo {
    pub remaining_searches_today: i64,
    pub daily_limit: i64,
    #[serde(default)]
    pub admin_configured: bool,
}
