//! Outbound email port.
//!
//! The dispatcher is an opaque collaborator: given a recipient, subject
//! and HTML body it either succeeds or fails. There is no delivery
//! confirmation beyond the call's own result.

use serde::{Deserialize, Serialize};

use crate::error::LeaseholdResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

pub trait EmailDispatcher: Send + Sync {
    /// Send one message. Failures surface as
    /// [`LeaseholdError::EmailDelivery`](crate::error::LeaseholdError::EmailDelivery).
    fn send(&self, message: EmailMessage) -> impl Future<Output = LeaseholdResult<()>> + Send;
}
