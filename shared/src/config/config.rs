use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

use crate::types::client_config::{ClientConfig, ConfigError};

pub fn load_config(path: impl AsRef<Path>) -> Result<ClientConfig, ConfigError> {
    let path = path.as_ref();
    info!("Loading configuration from: {}", path.display());

    let contents = fs::read_to_string(path)?;
    debug!("Processing file: {}", path.display());

    if contents.trim().is_empty() {
        error!("Configuration file is empty");
        return Err(ConfigError::InvalidConfig("empty file".into()));
    }

    let config: ClientConfig = toml::from_str(&contents)?;

    info!("Configuration loaded successfully");
    debug!("Config: {:?}", config);

    validate_config(&config)?;

    info!("Config validated");

    Ok(config)
}

/// Load `path` when given, otherwise fall back to built-in defaults.
/// Defaults are validated too so an `RCVIEW_API_URL` override is checked.
pub fn load_or_default(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    match path {
        Some(p) => load_config(p),
        None => {
            debug!("No configuration file given, using defaults");
            let config = ClientConfig::default();
            validate_config(&config)?;
            Ok(config)
        }
    }
}

pub fn validate_config(config: &ClientConfig) -> Result<(), ConfigError> {
    let base_url = config.api.resolved_base_url();

    if base_url.is_empty() {
        return Err(ConfigError::InvalidConfig("api.base_url cannot be empty".into()));
    }

    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidConfig(format!(
            "api.base_url must start with http:// or https:// (got {})",
            base_url
        )));
    }

    if config.api.timeout_ms == 0 {
        return Err(ConfigError::InvalidConfig(
            "api.timeout_ms must be greater than 0".into(),
        ));
    }

    if config.auth.identity_timeout_ms == 0 {
        return Err(ConfigError::InvalidConfig(
            "auth.identity_timeout_ms must be greater than 0".into(),
        ));
    }

    // Must outlast the identity request it guards.
    if config.auth.watchdog() <= config.auth.identity_timeout() {
        return Err(ConfigError::InvalidConfig(
            "auth.watchdog_secs must be longer than auth.identity_timeout_ms".into(),
        ));
    }

    if config.search.max_recent == 0 {
        return Err(ConfigError::InvalidConfig(
            "search.max_recent must be greater than 0".into(),
        ));
    }

    if config.search.log_page_size == 0 {
        return Err(ConfigError::InvalidConfig(
            "search.log_page_size must be greater than 0".into(),
        ));
    }

    Ok(())
}
