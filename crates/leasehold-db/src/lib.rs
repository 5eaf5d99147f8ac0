//! Leasehold Database: SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection set-up with config checks and migrations ([`DbManager`],
//!   [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - SurrealDB implementations of the `leasehold-core` repository traits
//!   ([`repository`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
