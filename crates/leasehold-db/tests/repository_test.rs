//! Integration tests for the SurrealDB repositories using in-memory
//! SurrealDB.

use chrono::{Duration, Utc};
use leasehold_core::error::LeaseholdError;
use leasehold_core::models::account::{CreateAccount, UpdateAccount};
use leasehold_core::models::invitation::{CreateInvitation, InvitationStatus, UpdateInvitation};
use leasehold_core::models::property::CreateProperty;
use leasehold_core::models::session::CreateSession;
use leasehold_core::models::tenant::CreateTenant;
use leasehold_core::repository::{
    AccountRepository, InvitationRepository, PropertyRepository, SessionRepository,
    TenantRepository,
};
use leasehold_db::repository::{
    SurrealAccountRepository, SurrealInvitationRepository, SurrealPropertyRepository,
    SurrealSessionRepository, SurrealTenantRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    leasehold_db::run_migrations(&db).await.unwrap();
    db
}

fn new_account(email: &str) -> CreateAccount {
    CreateAccount {
        email: email.into(),
        password: "secret1".into(),
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        is_tenant_user: true,
        metadata: None,
    }
}

fn new_tenant(email: Option<&str>) -> CreateTenant {
    CreateTenant {
        owner_id: Uuid::new_v4(),
        name: "Jane Doe".into(),
        email: email.map(Into::into),
        phone: None,
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_account_hashes_password_and_normalizes_email() {
    let repo = SurrealAccountRepository::new(setup().await);

    let account = repo.create(new_account("Jane@X.com")).await.unwrap();

    assert_eq!(account.email, "jane@x.com");
    assert!(account.is_tenant_user);
    assert!(!account.is_admin);
    assert_ne!(account.password_hash, "secret1");
    assert!(account.password_hash.starts_with("$argon2id$"));

    let fetched = repo.get_by_id(account.id).await.unwrap();
    assert_eq!(fetched.id, account.id);
    assert_eq!(fetched.first_name, "Jane");
}

#[tokio::test]
async fn find_account_by_email_is_case_insensitive() {
    let repo = SurrealAccountRepository::new(setup().await);
    let account = repo.create(new_account("jane@x.com")).await.unwrap();

    let found = repo.find_by_email("JANE@x.COM").await.unwrap();
    assert_eq!(found.map(|a| a.id), Some(account.id));

    assert!(repo.find_by_email("nobody@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_account_email_is_rejected() {
    let repo = SurrealAccountRepository::new(setup().await);
    repo.create(new_account("jane@x.com")).await.unwrap();

    let err = repo.create(new_account("JANE@x.com")).await.unwrap_err();
    assert!(matches!(err, LeaseholdError::AlreadyExists { .. }));
}

#[tokio::test]
async fn update_account_clears_tenant_flag() {
    let repo = SurrealAccountRepository::new(setup().await);
    let account = repo.create(new_account("jane@x.com")).await.unwrap();

    let updated = repo
        .update(
            account.id,
            UpdateAccount {
                is_tenant_user: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(!updated.is_tenant_user);
    assert_eq!(updated.email, "jane@x.com");
}

#[tokio::test]
async fn missing_account_is_not_found() {
    let repo = SurrealAccountRepository::new(setup().await);
    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());
}

// ---------------------------------------------------------------------------
// Tenants
// ---------------------------------------------------------------------------

#[tokio::test]
async fn link_profile_only_writes_unlinked_rows() {
    let repo = SurrealTenantRepository::new(setup().await);
    let tenant = repo.create(new_tenant(Some("jane@x.com"))).await.unwrap();
    assert!(tenant.tenant_profile_id.is_none());

    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    assert!(repo.link_profile(tenant.id, first).await.unwrap());
    assert!(!repo.link_profile(tenant.id, second).await.unwrap());

    let reread = repo.get_by_id(tenant.id).await.unwrap();
    assert_eq!(reread.tenant_profile_id, Some(first));

    let by_profile = repo.find_by_profile_id(first).await.unwrap().unwrap();
    assert_eq!(by_profile.id, tenant.id);
    assert!(repo.find_by_profile_id(second).await.unwrap().is_none());
}

#[tokio::test]
async fn clear_profile_unlinks_the_tenant() {
    let repo = SurrealTenantRepository::new(setup().await);
    let tenant = repo.create(new_tenant(Some("jane@x.com"))).await.unwrap();
    let profile = Uuid::new_v4();
    repo.link_profile(tenant.id, profile).await.unwrap();

    repo.clear_profile(tenant.id).await.unwrap();

    assert!(repo.find_by_profile_id(profile).await.unwrap().is_none());
    assert!(!repo.get_by_id(tenant.id).await.unwrap().is_linked());
}

#[tokio::test]
async fn list_tenants_by_email_ignores_case_and_missing_emails() {
    let repo = SurrealTenantRepository::new(setup().await);
    let tenant = repo.create(new_tenant(Some("Jane@X.com"))).await.unwrap();
    repo.create(new_tenant(None)).await.unwrap();
    repo.create(new_tenant(Some("john@x.com"))).await.unwrap();

    let found = repo.list_by_email("jane@x.com").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, tenant.id);
    assert_eq!(found[0].email.as_deref(), Some("Jane@X.com"));

    assert!(repo.list_by_email("  ").await.unwrap().is_empty());
}

#[tokio::test]
async fn deleted_tenant_is_not_found() {
    let repo = SurrealTenantRepository::new(setup().await);
    let tenant = repo.create(new_tenant(Some("jane@x.com"))).await.unwrap();

    repo.delete(tenant.id).await.unwrap();

    assert!(repo.get_by_id(tenant.id).await.unwrap_err().is_not_found());
    assert!(repo.list_by_email("jane@x.com").await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[tokio::test]
async fn count_properties_by_owner() {
    let repo = SurrealPropertyRepository::new(setup().await);
    let owner = Uuid::new_v4();

    assert_eq!(repo.count_by_owner(owner).await.unwrap(), 0);

    for name in ["Maple Court", "Oak Street"] {
        repo.create(CreateProperty {
            owner_id: owner,
            name: name.into(),
            address: "1 Main St".into(),
        })
        .await
        .unwrap();
    }

    assert_eq!(repo.count_by_owner(owner).await.unwrap(), 2);
    assert_eq!(repo.count_by_owner(Uuid::new_v4()).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

fn new_invitation(tenant_id: Uuid, token_hash: &str) -> CreateInvitation {
    CreateInvitation {
        email: "Jane@X.com".into(),
        tenant_id,
        token_hash: token_hash.into(),
        expires_at: Utc::now() + Duration::days(7),
    }
}

#[tokio::test]
async fn create_invitation_starts_pending() {
    let repo = SurrealInvitationRepository::new(setup().await);
    let tenant_id = Uuid::new_v4();

    let invitation = repo.create(new_invitation(tenant_id, "digest-1")).await.unwrap();

    assert_eq!(invitation.status, InvitationStatus::Pending);
    assert_eq!(invitation.email, "jane@x.com");
    assert_eq!(invitation.tenant_id, tenant_id);
    assert!(invitation.accepted_at.is_none());

    let by_token = repo.find_by_token_hash("digest-1").await.unwrap().unwrap();
    assert_eq!(by_token.id, invitation.id);
    assert!(repo.find_by_token_hash("unknown").await.unwrap().is_none());
}

#[tokio::test]
async fn rotating_token_replaces_the_lookup_key() {
    let repo = SurrealInvitationRepository::new(setup().await);
    let invitation = repo
        .create(new_invitation(Uuid::new_v4(), "old-digest"))
        .await
        .unwrap();

    repo.update(
        invitation.id,
        UpdateInvitation {
            token_hash: Some("new-digest".into()),
            expires_at: Some(Utc::now() + Duration::days(7)),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(repo.find_by_token_hash("old-digest").await.unwrap().is_none());
    assert!(repo.find_by_token_hash("new-digest").await.unwrap().is_some());
}

#[tokio::test]
async fn pending_list_excludes_cancelled_and_sorts_newest_first() {
    let repo = SurrealInvitationRepository::new(setup().await);
    let tenant_id = Uuid::new_v4();

    let first = repo.create(new_invitation(tenant_id, "d1")).await.unwrap();
    let second = repo.create(new_invitation(tenant_id, "d2")).await.unwrap();
    let third = repo.create(new_invitation(tenant_id, "d3")).await.unwrap();
    repo.update(
        second.id,
        UpdateInvitation {
            status: Some(InvitationStatus::Cancelled),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let pending = repo.list_pending_for_tenant(tenant_id).await.unwrap();
    let ids: Vec<_> = pending.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![third.id, first.id]);
}

#[tokio::test]
async fn recent_invitation_queries_respect_the_window() {
    let repo = SurrealInvitationRepository::new(setup().await);
    let invitation = repo
        .create(new_invitation(Uuid::new_v4(), "digest"))
        .await
        .unwrap();
    let now = Utc::now();

    assert!(
        repo.exists_created_since("JANE@x.com", now - Duration::minutes(10))
            .await
            .unwrap()
    );
    assert!(
        !repo
            .exists_created_since("jane@x.com", now + Duration::minutes(1))
            .await
            .unwrap()
    );
    assert!(
        !repo
            .exists_accepted_since("jane@x.com", now - Duration::minutes(30))
            .await
            .unwrap()
    );

    repo.update(
        invitation.id,
        UpdateInvitation {
            status: Some(InvitationStatus::Accepted),
            accepted_at: Some(Utc::now()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(
        repo.exists_accepted_since("jane@x.com", now - Duration::minutes(30))
            .await
            .unwrap()
    );
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalidate_account_sessions_removes_every_session() {
    let repo = SurrealSessionRepository::new(setup().await);
    let account_id = Uuid::new_v4();

    for hash in ["h1", "h2"] {
        repo.create(CreateSession {
            account_id,
            token_hash: hash.into(),
            ip_address: None,
            user_agent: Some("TestAgent".into()),
            expires_at: Utc::now() + Duration::days(1),
        })
        .await
        .unwrap();
    }
    let found = repo.get_by_token_hash("h1").await.unwrap();
    assert_eq!(found.account_id, account_id);

    repo.invalidate_account_sessions(account_id).await.unwrap();

    assert!(repo.get_by_token_hash("h1").await.unwrap_err().is_not_found());
    assert!(repo.get_by_token_hash("h2").await.unwrap_err().is_not_found());
}
