use http::StatusCode;
use tracing::{info, warn};

use shared::types::VehicleSearchResponse;

use crate::api;
use crate::classify::ErrorCategory;
use crate::http::{ApiClient, ApiResult};
use crate::search::coordinator::SearchCoordinator;
use crate::search::recent::RecentSearches;
use crate::vehicle::{Sections, group_by_section};

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again later.";
pub const SEARCH_FAILED_MESSAGE: &str = "Search failed.";

/// Outcome of one registration-number lookup.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The trimmed number that was submitted.
    pub registration_number: String,
    pub response: VehicleSearchResponse,
    /// HTTP status, `0` when nothing was received.
    pub status: u16,
    /// Structured error code, if one came back.
    pub code: Option<String>,
}

impl SearchResult {
    pub fn is_success(&self) -> bool {
        self.response.success && self.response.data.is_some()
    }

    pub fn error_message(&self) -> Option<&str> {
        if self.is_success() {
            return None;
        }
        Some(
            self.response
                .error_message
                .as_deref()
                .unwrap_or(SEARCH_FAILED_MESSAGE),
        )
    }

    pub fn error_category(&self) -> Option<ErrorCategory> {
        self.error_message()
            .map(|msg| ErrorCategory::classify(self.code.as_deref(), msg))
    }

    /// The record grouped for display; empty when the lookup failed.
    pub fn sections(&self) -> Sections {
        self.response
            .data
            .as_ref()
            .map(group_by_section)
            .unwrap_or_default()
    }
}

/// Message shown when the backend returned no usable search body.
fn failure_message(result: &ApiResult<VehicleSearchResponse>) -> String {
    if let Some(error) = &result.error {
        return error.clone();
    }
    if result.status == StatusCode::TOO_MANY_REQUESTS.as_u16() {
        RATE_LIMITED_MESSAGE.to_string()
    } else {
        SEARCH_FAILED_MESSAGE.to_string()
    }
}

/// Run a lookup end to end.
///
/// Blank input sends nothing and returns `None`. Otherwise the number is
/// stored as the coordinator's text and in recent searches, the coordinator
/// is marked busy while the request is in flight, and the response (real or
/// synthesised) is returned.
pub async fn run_search(
    api: &ApiClient,
    coordinator: &SearchCoordinator,
    recent: &mut RecentSearches,
    registration_number: &str,
) -> Option<SearchResult> {
    let number = registration_number.trim();
    if number.is_empty() {
        return None;
    }

    coordinator.set_text(number);
    if let Err(e) = recent.add(number) {
        warn!("Could not record recent search: {}", e);
    }

    coordinator.set_busy(true);
    let result = api::vehicle::search(api, number).await;
    coordinator.set_busy(false);

    let status = result.status;
    let code = result.code.clone();
    let response = match result.data {
        Some(response) => response,
        None => VehicleSearchResponse::failed(failure_message(&result)),
    };

    if response.success {
        info!(
            "Search for {} succeeded{}",
            number,
            if response.is_cached() { " (cached)" } else { "" }
        );
    } else {
        info!(
            "Search for {} failed: {}",
            number,
            response.error_message.as_deref().unwrap_or("no message")
        );
    }

    Some(SearchResult {
        registration_number: number.to_string(),
        response,
        status,
        code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_message_prefers_client_error() {
        let r: ApiResult<VehicleSearchResponse> = ApiResult::failure(0, "Cannot reach the backend");
        assert_eq!(failure_message(&r), "Cannot reach the backend");
    }

    #[test]
    fn failure_message_falls_back_by_status() {
        let mut r: ApiResult<VehicleSearchResponse> = ApiResult::failure(429, "x");
        r.error = None;
        assert_eq!(failure_message(&r), RATE_LIMITED_MESSAGE);
        r.status = 500;
        assert_eq!(failure_message(&r), SEARCH_FAILED_MESSAGE);
    }

    #[test]
    fn result_exposes_sections_and_category() {
        let ok = SearchResult {
            registration_number: "MH12".into(),
            response: serde_json::from_value(json!({
                "success": true,
                "data": {"owner": "A", "puccUpto": "2027-01-01"}
            }))
            .unwrap(),
            status: 200,
            code: None,
        };
        assert!(ok.is_success());
        assert_eq!(ok.sections().len(), 2);
        assert!(ok.error_category().is_none());

        let failed = SearchResult {
            registration_number: "MH12".into(),
            response: VehicleSearchResponse::failed("No data found for this vehicle"),
            status: 200,
            code: None,
        };
        assert_eq!(failed.error_category(), Some(ErrorCategory::NotFound));
        assert!(failed.sections().is_empty());
    }
}
