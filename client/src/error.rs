use thiserror::Error;

// ---------------------------------------------------------------------------
// Recent-search persistence
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No data directory available on this platform")]
    NoDataDir,
}

// ---------------------------------------------------------------------------
// Admin operations
// ---------------------------------------------------------------------------

/// Admin actions refused locally or by the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error("Email is required")]
    EmailRequired,

    #[error("{0} is a super admin and cannot be modified")]
    ProtectedUser(String),

    #[error("The SUPER_ADMIN role cannot be assigned")]
    ProtectedRole,

    #[error("Configuration has not been loaded")]
    NotLoaded,

    #[error("{0} must be at least 1")]
    InvalidSetting(&'static str),

    #[error("{message}")]
    Api { status: u16, message: String },
}

impl AdminError {
    pub fn from_result<T>(result: &crate::http::ApiResult<T>, fallback: &str) -> Self {
        Self::Api {
            status: result.status,
            message: result.error_or(fallback),
        }
    }
}
