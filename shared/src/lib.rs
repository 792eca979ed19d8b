//! Types shared between the vehicle lookup client library and its CLI.
//!
//! `types` mirrors the JSON bodies exchanged with the backend API;
//! `config` loads and validates the client's TOML configuration.

pub mod config;
pub mod types;
