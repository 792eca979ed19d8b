use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Origin plus path prefix every request path is appended to,
    /// e.g. `"https://rc.example.com/api"`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Per-request timeout for the `/auth/me` identity check.
    #[serde(default = "default_identity_timeout_ms")]
    pub identity_timeout_ms: u64,
    /// Upper bound on how long a session may stay in `Checking`.
    /// Must be longer than `identity_timeout_ms`.
    #[serde(default = "default_watchdog_secs")]
    pub watchdog_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_max_recent")]
    pub max_recent: usize,
    /// Where recent searches are persisted. Falls back to the platform data
    /// directory when unset.
    #[serde(default)]
    pub recent_searches_path: Option<PathBuf>,
    #[serde(default = "default_user_search_debounce_ms")]
    pub user_search_debounce_ms: u64,
    #[serde(default = "default_log_page_size")]
    pub log_page_size: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl ApiConfig {
    /// Resolve the API base URL with `RCVIEW_API_URL` taking priority over
    /// the config file field. Trailing slashes are trimmed so request paths
    /// can always start with `/`.
    pub fn resolved_base_url(&self) -> String {
        std::env::var("RCVIEW_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.base_url.clone())
            .trim()
            .trim_end_matches('/')
            .to_string()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl AuthConfig {
    pub fn identity_timeout(&self) -> Duration {
        Duration::from_millis(self.identity_timeout_ms)
    }

    pub fn watchdog(&self) -> Duration {
        Duration::from_secs(self.watchdog_secs)
    }
}

impl SearchConfig {
    pub fn user_search_debounce(&self) -> Duration {
        Duration::from_millis(self.user_search_debounce_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            identity_timeout_ms: default_identity_timeout_ms(),
            watchdog_secs: default_watchdog_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_recent: default_max_recent(),
            recent_searches_path: None,
            user_search_debounce_ms: default_user_search_debounce_ms(),
            log_page_size: default_log_page_size(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

pub fn default_base_url() -> String {
    "http://localhost:8081/api".to_string()
}

pub fn default_timeout_ms() -> u64 {
    15_000
}

pub fn default_identity_timeout_ms() -> u64 {
    8_000
}

pub fn default_watchdog_secs() -> u64 {
    10
}

pub fn default_max_recent() -> usize {
    5
}

pub fn default_user_search_debounce_ms() -> u64 {
    300
}

pub fn default_log_page_size() -> u32 {
    20
}
