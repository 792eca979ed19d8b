use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use shared::types::UserProfile;
use shared::types::client_config::AuthConfig;

use crate::api;
use crate::http::ApiClient;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Where the session currently stands.
///
/// `Checking` means a token is stored and an identity fetch is in flight.
/// A rejected token never has a state of its own: it is cleared and the
/// session lands back in `Anonymous` with a [`RejectReason`] recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Checking,
    Authenticated(UserProfile),
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Checking)
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Why the last token was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The backend answered 401.
    Unauthorized,
    /// A response arrived but carried no profile.
    NoProfile,
    /// The identity request itself failed (network, 5xx, ...).
    FetchFailed(String),
    /// Nothing settled before the watchdog fired.
    WatchdogExpired,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "session token rejected"),
            Self::NoProfile => write!(f, "identity response carried no profile"),
            Self::FetchFailed(msg) => write!(f, "identity check failed: {}", msg),
            Self::WatchdogExpired => write!(f, "identity check did not finish in time"),
        }
    }
}

/// Flat view of the session: token, profile and loading flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub loading: bool,
}

// ---------------------------------------------------------------------------
// Auth session
// ---------------------------------------------------------------------------

/// Owner of the session credential and the authentication state machine.
///
/// Transitions:
/// - token set            -> `Checking`, identity fetch started
/// - fetch returns profile -> `Authenticated`
/// - 401 / failure / empty -> token cleared, `Anonymous`
/// - watchdog fires first  -> token cleared, `Anonymous`
/// - logout                -> token cleared, `Anonymous`
///
/// Every transition bumps a generation counter; an identity result only
/// applies if the generation it was started under is still current, so a
/// response arriving after logout or after a newer token cannot bring a
/// session back.
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<AuthInner>,
}

struct AuthInner {
    api: ApiClient,
    identity_timeout: Duration,
    watchdog: Duration,
    guarded: Mutex<Guarded>,
    changes: watch::Sender<SessionState>,
}

struct Guarded {
    generation: u64,
    state: SessionState,
    last_rejection: Option<RejectReason>,
}

impl AuthSession {
    /// Starts in `Checking` when a token is already stored, else `Anonymous`.
    /// Call [`AuthSession::start`] to run the initial identity check.
    pub fn new(api: ApiClient, config: &AuthConfig) -> Self {
        let initial = if api.tokens().get().is_some() {
            SessionState::Checking
        } else {
            SessionState::Anonymous
        };

        debug!("Session created in state {:?}", initial);

        let (changes, _) = watch::channel(initial.clone());

        Self {
            inner: Arc::new(AuthInner {
                api,
                identity_timeout: config.identity_timeout(),
                watchdog: config.watchdog(),
                guarded: Mutex::new(Guarded {
                    generation: 0,
                    state: initial,
                    last_rejection: None,
                }),
                changes,
            }),
        }
    }

    /// Run the identity check for a token that was present at construction.
    pub async fn start(&self) -> SessionState {
        let generation = {
            let guarded = self.lock();
            if guarded.state != SessionState::Checking {
                return guarded.state.clone();
            }
            guarded.generation
        };

        self.check(generation).await
    }

    /// Store a new token (or clear it with `None` / an empty string) and,
    /// for a token, wait for the identity check to settle.
    pub async fn set_token(&self, token: Option<&str>) -> SessionState {
        let token = match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => t,
            None => {
                self.logout();
                return SessionState::Anonymous;
            }
        };

        let generation = {
            let mut guarded = self.lock();
            self.inner.api.tokens().set(token);
            guarded.generation += 1;
            guarded.last_rejection = None;
            self.publish(&mut guarded, SessionState::Checking);
            guarded.generation
        };

        info!("Token set, checking identity");
        self.check(generation).await
    }

    /// Re-run the identity check with the stored token.
    pub async fn refresh_user(&self) -> SessionState {
        match self.inner.api.tokens().get() {
            Some(token) => self.set_token(Some(&token)).await,
            None => {
                self.logout();
                SessionState::Anonymous
            }
        }
    }

    /// Discard the token, whatever is in flight.
    pub fn logout(&self) {
        let mut guarded = self.lock();
        self.inner.api.tokens().clear();
        guarded.generation += 1;
        self.publish(&mut guarded, SessionState::Anonymous);
        info!("Logged out");
    }

    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    pub fn session(&self) -> Session {
        let guarded = self.lock();
        Session {
            token: self.inner.api.tokens().get(),
            user: guarded.state.user().cloned(),
            loading: guarded.state.is_loading(),
        }
    }

    pub fn last_rejection(&self) -> Option<RejectReason> {
        self.lock().last_rejection.clone()
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.changes.subscribe()
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    async fn check(&self, generation: u64) -> SessionState {
        let fetch = api::auth::me(&self.inner.api, self.inner.identity_timeout);

        let outcome = match tokio::time::timeout(self.inner.watchdog, fetch).await {
            Err(_) => Err(RejectReason::WatchdogExpired),
            Ok(result) if result.is_unauthorized() => Err(RejectReason::Unauthorized),
            Ok(result) => match result.data {
                Some(profile) => Ok(profile),
                None => match result.error {
                    Some(msg) if !result.is_success() => {
                        Err(RejectReason::FetchFailed(msg))
                    }
                    _ => Err(RejectReason::NoProfile),
                },
            },
        };

        self.apply(generation, outcome)
    }

    fn apply(&self, generation: u64, outcome: Result<UserProfile, RejectReason>) -> SessionState {
        let mut guarded = self.lock();

        if guarded.generation != generation {
            debug!(
                "Discarding identity result from generation {} (current {})",
                generation, guarded.generation
            );
            return guarded.state.clone();
        }

        match outcome {
            Ok(profile) => {
                info!("Authenticated as {} ({})", profile.email, profile.role);
                self.publish(&mut guarded, SessionState::Authenticated(profile));
            }
            Err(reason) => {
                warn!("Discarding session token: {}", reason);
                self.inner.api.tokens().clear();
                guarded.last_rejection = Some(reason);
                self.publish(&mut guarded, SessionState::Anonymous);
            }
        }

        guarded.state.clone()
    }

    fn publish(&self, guarded: &mut Guarded, state: SessionState) {
        guarded.state = state.clone();
        self.inner.changes.send_replace(state);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Guarded> {
        self.inner
            .guarded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
