//! Leasehold Mail: outbound email for the invitation workflow.
//!
//! Provides the HTTP client for the hosted email function
//! ([`HttpEmailDispatcher`]) and the invitation email template.

pub mod config;
pub mod error;
pub mod http;
pub mod template;

pub use config::MailConfig;
pub use error::DispatchError;
pub use http::HttpEmailDispatcher;
pub use template::{InvitationEmail, signup_link};
