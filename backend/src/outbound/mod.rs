//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL account store using Diesel ORM
//! - **memory**: in-process account store for development and tests
//! - **security**: Argon2 password hashing and JWT session tokens
//!
//! Adapters translate between domain types and infrastructure representations
//! and contain no business logic.

pub mod memory;
pub mod persistence;
pub mod security;
