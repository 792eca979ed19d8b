use serde_json::Value;

use shared::types::{
    AppConfig, AppConfigUpdate, NewUser, Page, Role, RoleUpdate, SearchLogEntry, SearchStats,
    UserRow,
};

use crate::api::encode;
use crate::http::{ApiClient, ApiResult};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /admin/users[?search=]
pub async fn list_users(api: &ApiClient, search: Option<&str>) -> ApiResult<Vec<UserRow>> {
    let path = match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(term) => format!("/admin/users?search={}", encode(term)),
        None => "/admin/users".to_string(),
    };
    api.get(&path).await
}

/// POST /admin/users: add a user, or re-enable an existing email.
pub async fn add_user(api: &ApiClient, user: &NewUser) -> ApiResult<UserRow> {
    api.post("/admin/users", user).await
}

/// DELETE /admin/users/{id}: the backend answers 204 on success.
pub async fn remove_user(api: &ApiClient, user_id: &str) -> ApiResult<Value> {
    api.delete(&format!("/admin/users/{}", encode(user_id))).await
}

/// PATCH /admin/users/{id}/role
pub async fn set_role(api: &ApiClient, user_id: &str, role: Role) -> ApiResult<Value> {
    api.patch(
        &format!("/admin/users/{}/role", encode(user_id)),
        &RoleUpdate { role },
    )
    .await
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// GET /admin/config
pub async fn get_config(api: &ApiClient) -> ApiResult<AppConfig> {
    api.get("/admin/config").await
}

/// PUT /admin/config
pub async fn update_config(api: &ApiClient, update: &AppConfigUpdate) -> ApiResult<AppConfig> {
    api.put("/admin/config", update).await
}

// ---------------------------------------------------------------------------
// Search analytics
// ---------------------------------------------------------------------------

/// GET /admin/search-stats
pub async fn search_stats(api: &ApiClient) -> ApiResult<SearchStats> {
    api.get("/admin/search-stats").await
}

/// GET /admin/search-logs?page=&size=
pub async fn search_logs(api: &ApiClient, page: u32, size: u32) -> ApiResult<Page<SearchLogEntry>> {
    api.get(&format!("/admin/search-logs?page={}&size={}", page, size))
        .await
}
