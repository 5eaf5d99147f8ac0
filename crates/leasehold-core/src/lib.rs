//! Leasehold Core: domain models, errors, and the ports the
//! invitation workflow talks to (persistence and email delivery).

pub mod dispatch;
pub mod error;
pub mod models;
pub mod repository;

pub use error::{LeaseholdError, LeaseholdResult};
