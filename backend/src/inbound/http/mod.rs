//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod auth;
pub mod error;
pub mod health;
pub mod state;

pub use error::{ApiResult, json_config, query_config};
