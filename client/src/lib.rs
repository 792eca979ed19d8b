//! Client library for the vehicle registration lookup service.
//!
//! Everything that touches the network goes through [`http::ApiClient`],
//! which never fails with `Err`: every call resolves to an
//! [`http::ApiResult`] and the caller decides how to present it.
//!
//! Layout:
//! - `http`     : request execution, timeout/cancellation, body interpretation
//! - `api`      : one typed function per backend endpoint
//! - `session`  : bearer-token storage and the authentication state machine
//! - `search`   : shared search state, recent searches, the search flow
//! - `vehicle`  : grouping a raw record into display sections
//! - `classify` : mapping error text onto user-facing categories
//! - `admin`    : user directory, configuration editor, audit-log paging

pub mod admin;
pub mod api;
pub mod classify;
pub mod error;
pub mod http;
pub mod search;
pub mod session;
pub mod vehicle;

pub use crate::classify::ErrorCategory;
pub use crate::error::{AdminError, StoreError};
pub use crate::http::{ApiClient, ApiResult, RequestOptions};
pub use crate::session::{AuthSession, MemoryTokenStore, SessionState, TokenStore};
