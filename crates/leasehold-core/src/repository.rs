//! Repository trait definitions for data access abstraction.
//!
//! These traits are the persistence port of the invitation workflow. All
//! operations are async; none of them spans more than one table, so the
//! workflow never relies on multi-row transactions.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::LeaseholdResult;
use crate::models::{
    account::{Account, CreateAccount, UpdateAccount},
    invitation::{CreateInvitation, Invitation, UpdateInvitation},
    property::{CreateProperty, Property},
    session::{CreateSession, Session},
    tenant::{CreateTenant, Tenant},
};

// ---------------------------------------------------------------------------
// Accounts & sessions
// ---------------------------------------------------------------------------

pub trait AccountRepository: Send + Sync {
    /// Create an account. Fails with `AlreadyExists` when the email is
    /// already registered (case-insensitive).
    fn create(&self, input: CreateAccount) -> impl Future<Output = LeaseholdResult<Account>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LeaseholdResult<Account>> + Send;
    /// Case-insensitive lookup by email.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = LeaseholdResult<Option<Account>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateAccount,
    ) -> impl Future<Output = LeaseholdResult<Account>> + Send;
}

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = LeaseholdResult<Session>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LeaseholdResult<Session>> + Send;
    fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = LeaseholdResult<Session>> + Send;
    fn invalidate(&self, id: Uuid) -> impl Future<Output = LeaseholdResult<()>> + Send;
    /// Drop every session belonging to an account (forced sign-out).
    fn invalidate_account_sessions(
        &self,
        account_id: Uuid,
    ) -> impl Future<Output = LeaseholdResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Property-management records
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = LeaseholdResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LeaseholdResult<Tenant>> + Send;
    /// The tenant whose `tenant_profile_id` equals `profile_id`, if any.
    fn find_by_profile_id(
        &self,
        profile_id: Uuid,
    ) -> impl Future<Output = LeaseholdResult<Option<Tenant>>> + Send;
    /// All tenants with this contact email (case-insensitive).
    fn list_by_email(&self, email: &str)
    -> impl Future<Output = LeaseholdResult<Vec<Tenant>>> + Send;
    /// Set `tenant_profile_id` only if it is currently unset.
    ///
    /// Returns `true` when a row was written. Callers must still re-read
    /// the row; a `true` here is not proof the link is visible.
    fn link_profile(
        &self,
        id: Uuid,
        profile_id: Uuid,
    ) -> impl Future<Output = LeaseholdResult<bool>> + Send;
    fn clear_profile(&self, id: Uuid) -> impl Future<Output = LeaseholdResult<()>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = LeaseholdResult<()>> + Send;
}

pub trait PropertyRepository: Send + Sync {
    fn create(
        &self,
        input: CreateProperty,
    ) -> impl Future<Output = LeaseholdResult<Property>> + Send;
    fn count_by_owner(&self, owner_id: Uuid) -> impl Future<Output = LeaseholdResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

pub trait InvitationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateInvitation,
    ) -> impl Future<Output = LeaseholdResult<Invitation>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LeaseholdResult<Invitation>> + Send;
    fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = LeaseholdResult<Option<Invitation>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateInvitation,
    ) -> impl Future<Output = LeaseholdResult<Invitation>> + Send;
    /// Pending invitations for a tenant, newest first.
    fn list_pending_for_tenant(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = LeaseholdResult<Vec<Invitation>>> + Send;
    /// Whether any invitation (any status) for `email` was created at or
    /// after `since`.
    fn exists_created_since(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> impl Future<Output = LeaseholdResult<bool>> + Send;
    /// Whether an invitation for `email` was accepted at or after `since`.
    fn exists_accepted_since(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> impl Future<Output = LeaseholdResult<bool>> + Send;
}
