pub mod auth;
pub mod token_store;

pub use self::auth::{AuthSession, RejectReason, Session, SessionState};
pub use self::token_store::{MemoryTokenStore, TokenStore};
