use shared::types::{
    RateLimitInfo, UnmaskRequest, UnmaskResponse, VehicleSearchRequest, VehicleSearchResponse,
};

use crate::http::{ApiClient, ApiResult};

/// Proof that the user accepted the sensitive-data warning.
///
/// Unmasking is audited by the backend; requiring this value keeps the
/// acknowledgement step from being skipped by accident.
#[derive(Debug, Clone, Copy)]
pub struct Acknowledged(());

impl Acknowledged {
    pub fn confirm() -> Self {
        Self(())
    }
}

/// POST /vehicle/search
pub async fn search(api: &ApiClient, registration_number: &str) -> ApiResult<VehicleSearchResponse> {
    let body = VehicleSearchRequest {
        registration_number: registration_number.to_string(),
    };
    api.post("/vehicle/search", &body).await
}

/// POST /vehicle/unmask: audited reveal of a masked registration number.
pub async fn unmask(
    api: &ApiClient,
    registration_number: &str,
    _ack: Acknowledged,
) -> ApiResult<UnmaskResponse> {
    let body = UnmaskRequest {
        registration_number: registration_number.to_string(),
    };
    api.post("/vehicle/unmask", &body).await
}

/// GET /vehicle/rate-limit
pub async fn rate_limit(api: &ApiClient) -> ApiResult<RateLimitInfo> {
    api.get("/vehicle/rate-limit").await
}
