use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info};

use shared::types::{NewUser, Role, UserRow};

use crate::api;
use crate::error::AdminError;
use crate::http::{ApiClient, ApiResult};

/// The admin user directory with search-as-you-type.
///
/// Each call to [`UserDirectory::search`] supersedes the previous one: it
/// waits out the debounce, and its result is dropped if a newer search was
/// issued in the meantime, before or after the request went out. Only the
/// latest search updates the cached rows.
#[derive(Clone)]
pub struct UserDirectory {
    api: ApiClient,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    rows: Arc<Mutex<Vec<UserRow>>>,
}

impl UserDirectory {
    pub fn new(api: ApiClient, debounce: Duration) -> Self {
        Self {
            api,
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            rows: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Rows from the most recent search that was allowed to land.
    pub fn rows(&self) -> Vec<UserRow> {
        self.lock_rows().clone()
    }

    /// Debounced search. `None` means a newer search superseded this one.
    pub async fn search(&self, term: &str) -> Option<ApiResult<Vec<UserRow>>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.debounce).await;
        if !self.is_current(generation) {
            debug!("User search {} superseded before sending", generation);
            return None;
        }

        let result = api::admin::list_users(&self.api, Some(term)).await;
        if !self.is_current(generation) {
            debug!("User search {} superseded while in flight", generation);
            return None;
        }

        if let Some(rows) = &result.data {
            *self.lock_rows() = rows.clone();
        }
        Some(result)
    }

    /// Immediate, un-debounced listing. Also supersedes pending searches.
    pub async fn reload(&self, term: Option<&str>) -> ApiResult<Vec<UserRow>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = api::admin::list_users(&self.api, term).await;
        if self.is_current(generation) {
            if let Some(rows) = &result.data {
                *self.lock_rows() = rows.clone();
            }
        }
        result
    }

    /// Add a user or re-enable an existing email.
    pub async fn add(&self, user: NewUser) -> Result<UserRow, AdminError> {
        let email = user.email.trim().to_string();
        if email.is_empty() {
            return Err(AdminError::EmailRequired);
        }
        if user.role == Role::SuperAdmin {
            return Err(AdminError::ProtectedRole);
        }

        let user = NewUser {
            email,
            name: user
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            ..user
        };

        let result = api::admin::add_user(&self.api, &user).await;
        match result.data {
            Some(row) if result.error.is_none() => {
                info!("Added user {} as {}", row.email, row.role);
                Ok(row)
            }
            _ => Err(AdminError::from_result(&result, "Failed to add user.")),
        }
    }

    /// Remove a user. Super admins are refused before any request is sent.
    pub async fn remove(&self, row: &UserRow) -> Result<(), AdminError> {
        guard_row(row)?;

        let result = api::admin::remove_user(&self.api, &row.id).await;
        if !result.is_success() {
            return Err(AdminError::from_result(&result, "Failed to remove."));
        }

        self.lock_rows().retain(|r| r.id != row.id);
        info!("Removed user {}", row.email);
        Ok(())
    }

    /// Change a user's role between USER and ADMIN.
    pub async fn set_role(&self, row: &UserRow, role: Role) -> Result<(), AdminError> {
        guard_row(row)?;
        if role == Role::SuperAdmin {
            return Err(AdminError::ProtectedRole);
        }

        let result = api::admin::set_role(&self.api, &row.id, role).await;
        if !result.is_success() || result.error.is_some() {
            return Err(AdminError::from_result(&result, "Failed to update role."));
        }

        for cached in self.lock_rows().iter_mut().filter(|r| r.id == row.id) {
            cached.role = role;
        }
        info!("Set role of {} to {}", row.email, role);
        Ok(())
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn lock_rows(&self) -> MutexGuard<'_, Vec<UserRow>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn guard_row(row: &UserRow) -> Result<(), AdminError> {
    if row.role == Role::SuperAdmin {
        return Err(AdminError::ProtectedUser(row.email.clone()));
    }
    Ok(())
}

impl std::fmt::Debug for UserDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDirectory")
            .field("debounce", &self.debounce)
            .field("rows", &self.lock_rows().len())
            .finish_non_exhaustive()
    }
}
