//! Tenant domain model.
//!
//! A tenant is a renter managed by a property owner. It is distinct from
//! the account that may later represent the renter in the portal; the two
//! are joined by `tenant_profile_id` once linking has happened.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    /// The property owner's account.
    pub owner_id: Uuid,
    pub name: String,
    /// Contact email. Invitations cannot be issued while this is empty.
    pub email: Option<String>,
    pub phone: Option<String>,
    /// The linked portal account, `None` while unlinked.
    pub tenant_profile_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// The contact email, treating blank strings as missing.
    pub fn contact_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }

    pub fn is_linked(&self) -> bool {
        self.tenant_profile_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub owner_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}
