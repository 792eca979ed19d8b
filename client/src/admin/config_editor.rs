use tracing::{info, warn};

use shared::types::{AppConfig, AppConfigUpdate};

use crate::api;
use crate::error::AdminError;
use crate::http::{ApiClient, ApiResult};

/// Local editing of the service configuration.
///
/// Keeps the last configuration the backend confirmed apart from the
/// draft being edited. The draft only becomes authoritative after a save
/// round-trip succeeds.
#[derive(Debug, Clone)]
pub struct ConfigEditor {
    api: ApiClient,
    authoritative: Option<AppConfig>,
    draft: Option<AppConfigUpdate>,
}

impl ConfigEditor {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            authoritative: None,
            draft: None,
        }
    }

    /// Fetch the configuration and reset the draft to match it.
    pub async fn load(&mut self) -> ApiResult<AppConfig> {
        let result = api::admin::get_config(&self.api).await;
        if let Some(config) = &result.data {
            self.accept(config.clone());
        }
        result
    }

    pub fn authoritative(&self) -> Option<&AppConfig> {
        self.authoritative.as_ref()
    }

    pub fn draft(&self) -> Option<&AppConfigUpdate> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut AppConfigUpdate> {
        self.draft.as_mut()
    }

    /// Whether the draft differs from the last confirmed configuration.
    pub fn is_dirty(&self) -> bool {
        match (&self.authoritative, &self.draft) {
            (Some(config), Some(draft)) => AppConfigUpdate::from(config) != *draft,
            _ => false,
        }
    }

    /// Throw away local edits.
    pub fn reset(&mut self) {
        self.draft = self.authoritative.as_ref().map(AppConfigUpdate::from);
    }

    /// PUT the draft, then reload. On failure the draft is left untouched.
    pub async fn save(&mut self) -> Result<AppConfig, AdminError> {
        let draft = self.draft.ok_or(AdminError::NotLoaded)?;
        validate(&draft)?;

        let saved = api::admin::update_config(&self.api, &draft).await;
        if !saved.is_success() || saved.error.is_some() {
            warn!("Config save failed: {}", saved.error_or("no message"));
            return Err(AdminError::from_result(&saved, "Failed to save configuration."));
        }

        let reloaded = api::admin::get_config(&self.api).await;
        let config = match (reloaded.data, saved.data) {
            (Some(config), _) | (None, Some(config)) => config,
            (None, None) => {
                return Err(AdminError::Api {
                    status: reloaded.status,
                    message: reloaded
                        .error
                        .unwrap_or_else(|| "Failed to reload configuration.".to_string()),
                });
            }
        };

        info!(
            "Config saved: cache {} days, {}/s, {}/day",
            config.cache_ttl_days, config.rate_limit_per_second, config.rate_limit_per_day_default
        );
        self.accept(config.clone());
        Ok(config)
    }

    fn accept(&mut self, config: AppConfig) {
        self.draft = Some(AppConfigUpdate::from(&config));
        self.authoritative = Some(config);
    }
}

/// Every setting must be a positive integer.
pub fn validate(update: &AppConfigUpdate) -> Result<(), AdminError> {
    if update.cache_ttl_days == 0 {
        return Err(AdminError::InvalidSetting("cacheTtlDays"));
    }
    if update.rate_limit_per_second == 0 {
        return Err(AdminError::InvalidSetting("rateLimitPerSecond"));
    }
    if update.rate_limit_per_day_default == 0 {
        return Err(AdminError::InvalidSetting("rateLimitPerDayDefault"));
    }
    Ok(())
}
