//! Display-only categorisation of error messages.
//!
//! The category picks an icon, a title and a remediation hint for a failed
//! call. It never changes what the caller does next.

use std::fmt;

use crate::http::ApiResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    NoResponse,
    ConfigurationMissing,
    ServiceDown,
    Network,
    RateLimited,
    Unknown,
}

/// Substring checks in priority order. First hit wins, so "no response"
/// sits ahead of the broader "not found" family.
const RULES: &[(ErrorCategory, &[&str])] = &[
    (ErrorCategory::NoResponse, &["no response"]),
    (ErrorCategory::NotFound, &["not found", "no data"]),
    (
        ErrorCategory::ConfigurationMissing,
        &["not configured", "api key", "configuration missing", "missing configuration"],
    ),
    (ErrorCategory::RateLimited, &["too many", "rate", "limit"]),
    (
        ErrorCategory::Network,
        &["network", "timeout", "timed out", "connection", "cannot reach", "unreachable"],
    ),
    (ErrorCategory::ServiceDown, &["server", "unavailable", "500"]),
];

impl ErrorCategory {
    /// Classify free text with the ordered substring rules.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        RULES
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
            .map(|(category, _)| *category)
            .unwrap_or(Self::Unknown)
    }

    /// Map a structured backend or transport code, if it is one we know.
    pub fn from_code(code: &str) -> Option<Self> {
        let category = match code.trim().to_ascii_uppercase().as_str() {
            "NOT_FOUND" | "NO_DATA" => Self::NotFound,
            "NO_RESPONSE" => Self::NoResponse,
            "CONFIG_MISSING" | "NOT_CONFIGURED" => Self::ConfigurationMissing,
            "RATE_LIMITED" | "COOLDOWN" | "DAILY_LIMIT_REACHED" | "TOO_MANY_REQUESTS" => Self::RateLimited,
            "SERVICE_UNAVAILABLE" | "INTERNAL_ERROR" | "API_ERROR" => Self::ServiceDown,
            "TIMEOUT" | "UNREACHABLE" | "CONNECTION_ERROR" | "CANCELLED" => Self::Network,
            _ => return None,
        };
        Some(category)
    }

    /// Code first, message text as the fallback.
    pub fn classify(code: Option<&str>, message: &str) -> Self {
        code.and_then(Self::from_code)
            .unwrap_or_else(|| Self::from_message(message))
    }

    pub fn of<T>(result: &ApiResult<T>) -> Self {
        Self::classify(result.code.as_deref(), result.error.as_deref().unwrap_or_default())
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::NotFound => "search_off",
            Self::NoResponse => "hourglass_empty",
            Self::ConfigurationMissing => "settings",
            Self::ServiceDown => "cloud_off",
            Self::Network => "wifi_off",
            Self::RateLimited => "speed",
            Self::Unknown => "error_outline",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::NotFound => "Vehicle Not Found",
            Self::NoResponse => "No Response",
            Self::ConfigurationMissing => "Service Not Configured",
            Self::ServiceDown => "Service Unavailable",
            Self::Network => "Connection Error",
            Self::RateLimited => "Too Many Requests",
            Self::Unknown => "Something Went Wrong",
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            Self::NotFound => "No record exists for this registration number. Check the number and try again.",
            Self::NoResponse => "The registry did not answer this lookup. Try again in a moment.",
            Self::ConfigurationMissing => "The lookup service is missing its provider configuration. Contact an administrator.",
            Self::ServiceDown => "The lookup service is having trouble right now. Try again later.",
            Self::Network => "The backend could not be reached. Check your connection and that the service is running.",
            Self::RateLimited => "You have reached the search limit. Wait a little before searching again.",
            Self::Unknown => "Sorry, something unexpected happened. Refreshing usually helps.",
        }
    }

    /// Whether to offer a refresh next to the retry action.
    pub fn offer_refresh(&self) -> bool {
        matches!(
            self,
            Self::ServiceDown | Self::Network | Self::NoResponse | Self::Unknown
        )
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not-found",
            Self::NoResponse => "no-response",
            Self::ConfigurationMissing => "configuration-missing",
            Self::ServiceDown => "service-down",
            Self::Network => "network",
            Self::RateLimited => "rate-limited",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
