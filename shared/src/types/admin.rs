use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rate-limit / cache configuration
// ---------------------------------------------------------------------------

/// Authoritative service configuration (`GET /admin/config`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub id: Option<String>,
    pub cache_ttl_days: u32,
    pub rate_limit_per_second: u32,
    pub rate_limit_per_day_default: u32,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Only set once an admin has explicitly saved the configuration.
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// Editable subset of [`AppConfig`], sent as the `PUT /admin/config` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfigUpdate {
    pub cache_ttl_days: u32,
    pub rate_limit_per_second: u32,
    pub rate_limit_per_day_default: u32,
}

impl From<&AppConfig> for AppConfigUpdate {
    fn from(config: &AppConfig) -> Self {
        Self {
            cache_ttl_days: config.cache_ttl_days,
            rate_limit_per_second: config.rate_limit_per_second,
            rate_limit_per_day_default: config.rate_limit_per_day_default,
        }
    }
}

// ---------------------------------------------------------------------------
// Search analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSearcher {
    pub email: String,
    pub count: u64,
}

/// Aggregate counters shown on the admin dashboard (`GET /admin/search-stats`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub total_searches: u64,
    pub today_searches: u64,
    pub unique_users: u64,
    pub unique_reg_numbers: u64,
    #[serde(default)]
    pub top_searchers: Vec<TopSearcher>,
}

/// Result classification recorded for each search attempt.
///
/// Values outside the known set are kept verbatim in `Other` so an audit
/// page never fails to render because the backend added an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SearchOutcome {
    Success,
    CacheHit,
    NoData,
    ApiError,
    RateLimited,
    Cooldown,
    DailyLimitReached,
    Other(String),
}

impl SearchOutcome {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "SUCCESS",
            Self::CacheHit => "CACHE_HIT",
            Self::NoData => "NO_DATA",
            Self::ApiError => "API_ERROR",
            Self::RateLimited => "RATE_LIMITED",
            Self::Cooldown => "COOLDOWN",
            Self::DailyLimitReached => "DAILY_LIMIT_REACHED",
            Self::Other(raw) => raw,
        }
    }

    /// Whether the attempt produced vehicle data for the user.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::CacheHit)
    }
}

impl From<String> for SearchOutcome {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "SUCCESS" => Self::Success,
            "CACHE_HIT" => Self::CacheHit,
            "NO_DATA" => Self::NoData,
            "API_ERROR" => Self::ApiError,
            "RATE_LIMITED" => Self::RateLimited,
            "COOLDOWN" => Self::Cooldown,
            "DAILY_LIMIT_REACHED" => Self::DailyLimitReached,
            _ => Self::Other(raw),
        }
    }
}

impl From<SearchOutcome> for String {
    fn from(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit-log row (`GET /admin/search-logs`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLogEntry {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub registration_number: String,
    /// The backend names this field `details`.
    #[serde(rename = "details", alias = "outcome")]
    pub outcome: SearchOutcome,
    #[serde(default)]
    pub from_cache: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

/// Standard page envelope used by paginated admin endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    /// Zero-based index of this page.
    pub number: u32,
    pub size: u32,
    pub last: bool,
}

impl<T> Page<T> {
    pub fn is_first(&self) -> bool {
        self.number == 0
    }
}
