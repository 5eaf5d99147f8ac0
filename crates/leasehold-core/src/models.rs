//! Domain models for Leasehold.
//!
//! Tenants and properties belong to the property-management domain and
//! appear here only with the fields the invitation workflow reads.

pub mod account;
pub mod invitation;
pub mod linking;
pub mod property;
pub mod session;
pub mod tenant;
