pub mod admin;
pub mod client_config;
pub mod json_error;
pub mod login;
pub mod user;
pub mod vehicle;

pub use self::admin::{
    AppConfig, AppConfigUpdate, Page, SearchLogEntry, SearchOutcome, SearchStats, TopSearcher,
};
pub use self::client_config::{ClientConfig, ConfigError};
pub use self::json_error::ErrorBody;
pub use self::login::{TokenResponse, capture_fragment_token};
pub use self::user::{NewUser, Role, RoleUpdate, UserProfile, UserRow};
pub use self::vehicle::{
    RateLimitInfo, UnmaskRequest, UnmaskResponse, VehicleRecord, VehicleSearchRequest,
    VehicleSearchResponse,
};
