//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and the schema (`schema.rs`) stay private
//! to this module. Connections come from a `bb8` pool driven by
//! `diesel-async`.
//!
//! # Example
//!
//! ```ignore
//! use forum_backend::outbound::persistence::{DbPool, DieselAccountRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/forum")).await?;
//! let accounts = DieselAccountRepository::new(pool);
//! ```

mod diesel_account_repository;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
