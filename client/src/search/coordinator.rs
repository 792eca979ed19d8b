use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::api;
use crate::http::ApiClient;

/// Callback invoked with the trimmed search text on submit.
pub type SearchHandler = Arc<dyn Fn(String) + Send + Sync>;

/// Identifies a registered handler so only its owner can clear it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerId(u64);

/// Remaining-search counters, present only when an admin has configured a
/// daily limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitCounters {
    pub remaining: i64,
    pub daily_limit: i64,
}

#[derive(Default)]
struct CoordinatorState {
    text: String,
    handler: Option<(HandlerId, SearchHandler)>,
    busy: bool,
    rate_limit: Option<RateLimitCounters>,
}

/// Search state shared between whatever collects input and whatever shows
/// results. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct SearchCoordinator {
    state: Arc<Mutex<CoordinatorState>>,
    next_id: Arc<AtomicU64>,
}

impl SearchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.lock().text.clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.lock().text = text.into();
    }

    /// Install the active submit handler, replacing any previous one.
    pub fn register_handler(&self, handler: SearchHandler) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().handler = Some((id, handler));
        debug!("Search handler {:?} registered", id);
        id
    }

    /// Remove the handler, but only if `id` is still the active one.
    pub fn clear_handler(&self, id: HandlerId) -> bool {
        let mut state = self.lock();
        match &state.handler {
            Some((active, _)) if *active == id => {
                state.handler = None;
                true
            }
            _ => false,
        }
    }

    pub fn has_handler(&self) -> bool {
        self.lock().handler.is_some()
    }

    /// Hand the current text to the active handler. Returns false when there
    /// is no handler or the text is blank.
    pub fn submit(&self) -> bool {
        let (handler, text) = {
            let state = self.lock();
            let text = state.text.trim().to_string();
            match &state.handler {
                Some((_, handler)) if !text.is_empty() => (handler.clone(), text),
                _ => return false,
            }
        };

        // Called outside the lock so the handler may use the coordinator.
        handler(text);
        true
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    pub fn set_busy(&self, busy: bool) {
        self.lock().busy = busy;
    }

    pub fn rate_limit(&self) -> Option<RateLimitCounters> {
        self.lock().rate_limit
    }

    /// Fetch the remaining-search counters.
    ///
    /// Counters are shown only when the backend says an admin configured a
    /// limit; otherwise they are hidden. A failed fetch leaves the previous
    /// values in place.
    pub async fn refresh_rate_limit(&self, api: &ApiClient) -> Option<RateLimitCounters> {
        let result = api::vehicle::rate_limit(api).await;

        let mut state = self.lock();
        match result.data {
            Some(info) if info.admin_configured => {
                info!(
                    "Rate limit: {} of {} searches remaining",
                    info.remaining_searches_today, info.daily_limit
                );
                state.rate_limit = Some(RateLimitCounters {
                    remaining: info.remaining_searches_today,
                    daily_limit: info.daily_limit,
                });
            }
            Some(_) => {
                debug!("No admin-configured rate limit");
                state.rate_limit = None;
            }
            None => debug!(
                "Rate limit refresh failed: {}",
                result.error.as_deref().unwrap_or("no data")
            ),
        }
        state.rate_limit
    }

    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SearchCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("SearchCoordinator")
            .field("text", &state.text)
            .field("busy", &state.busy)
            .field("has_handler", &state.handler.is_some())
            .field("rate_limit", &state.rate_limit)
            .finish()
    }
}
