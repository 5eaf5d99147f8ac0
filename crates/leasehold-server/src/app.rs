//! Service wiring and command execution.

use leasehold_auth::{
    AuthService, GuardVerdict, InvitationIssuer, InvitationOutcome, LoginInput, OrphanGuard,
    ProfileLinker, Revocation, SignupHandler, SignupInput,
};
use leasehold_auth::config::GuardConfig;
use leasehold_core::models::linking::LinkWarning;
use leasehold_db::repository::{
    SurrealAccountRepository, SurrealInvitationRepository, SurrealPropertyRepository,
    SurrealSessionRepository, SurrealTenantRepository,
};
use leasehold_db::{DbConfig, DbManager};
use leasehold_mail::{HttpEmailDispatcher, MailConfig};
use surrealdb::Surreal;
use surrealdb::engine::remote::ws::Client;

use crate::cli::{Cli, Command};
use crate::error::AppError;

struct Repositories {
    accounts: SurrealAccountRepository<Client>,
    tenants: SurrealTenantRepository<Client>,
    invitations: SurrealInvitationRepository<Client>,
    properties: SurrealPropertyRepository<Client>,
    sessions: SurrealSessionRepository<Client>,
}

impl Repositories {
    fn new(db: Surreal<Client>, pepper: Option<String>) -> Self {
        let accounts = match pepper {
            Some(pepper) => SurrealAccountRepository::with_pepper(db.clone(), pepper),
            None => SurrealAccountRepository::new(db.clone()),
        };
        Self {
            accounts,
            tenants: SurrealTenantRepository::new(db.clone()),
            invitations: SurrealInvitationRepository::new(db.clone()),
            properties: SurrealPropertyRepository::new(db.clone()),
            sessions: SurrealSessionRepository::new(db),
        }
    }

    fn guard(
        self,
        config: GuardConfig,
    ) -> OrphanGuard<
        SurrealAccountRepository<Client>,
        SurrealTenantRepository<Client>,
        SurrealInvitationRepository<Client>,
        SurrealPropertyRepository<Client>,
        SurrealSessionRepository<Client>,
    > {
        OrphanGuard::new(
            self.accounts,
            self.tenants,
            self.invitations,
            self.properties,
            self.sessions,
            config,
        )
    }
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let auth_config = cli.auth.auth_config()?;
    let invitation_config = cli.invitation.invitation_config();
    let guard_config = cli.invitation.guard_config();
    let mail_config = MailConfig::from(cli.mail);

    let manager = DbManager::connect(&DbConfig::from(cli.db)).await?;

    let repos = Repositories::new(manager.client().clone(), auth_config.pepper.clone());

    match cli.command {
        Command::Migrate => {}
        Command::Invite { tenant_id } => {
            let issuer = InvitationIssuer::new(
                repos.tenants,
                repos.accounts,
                repos.invitations,
                HttpEmailDispatcher::new(&mail_config)?,
                invitation_config,
            );
            match issuer.create_invitation(tenant_id).await? {
                InvitationOutcome::Sent(issued) => {
                    println!("invitation {} sent", issued.invitation.id);
                    println!("expires {}", issued.invitation.expires_at.to_rfc3339());
                }
                InvitationOutcome::LinkedExistingAccount {
                    account_id,
                    warning,
                } => {
                    println!(
                        "linked existing account {account_id}{}",
                        warning_suffix(warning)
                    );
                }
            }
        }
        Command::Resend { invitation_id } => {
            let issuer = InvitationIssuer::new(
                repos.tenants,
                repos.accounts,
                repos.invitations,
                HttpEmailDispatcher::new(&mail_config)?,
                invitation_config,
            );
            let issued = issuer.resend_invitation(invitation_id).await?;
            println!("invitation {} resent", issued.invitation.id);
            println!("expires {}", issued.invitation.expires_at.to_rfc3339());
        }
        Command::Cancel { invitation_id } => {
            let issuer = InvitationIssuer::new(
                repos.tenants,
                repos.accounts,
                repos.invitations,
                HttpEmailDispatcher::new(&mail_config)?,
                invitation_config,
            );
            let invitation = issuer.cancel_invitation(invitation_id).await?;
            println!("invitation {} {}", invitation.id, invitation.status);
        }
        Command::Signup {
            token,
            name,
            email,
            password,
        } => {
            let handler = SignupHandler::new(
                repos.tenants,
                repos.accounts,
                repos.invitations,
                &auth_config,
            );
            let outcome = handler
                .signup(SignupInput {
                    token,
                    password,
                    name,
                    email,
                })
                .await?;
            println!(
                "account {} linked to tenant {}{}",
                outcome.account.id,
                outcome.tenant_id,
                warning_suffix(outcome.warning)
            );
        }
        Command::Link {
            tenant_id,
            account_id,
        } => {
            let linker = ProfileLinker::new(repos.tenants, repos.accounts);
            let result = linker.link(tenant_id, account_id).await;
            if let Some(code) = result.error_code {
                return Err(AppError::Link(code));
            }
            println!("{}{}", result.message, warning_suffix(result.warning));
        }
        Command::Login { email, password } => {
            let auth = AuthService::new(repos.accounts.clone(), repos.sessions.clone(), auth_config);
            let login = auth
                .login(LoginInput {
                    email,
                    password,
                    ip_address: None,
                    user_agent: Some(concat!("leasehold-cli/", env!("CARGO_PKG_VERSION")).into()),
                })
                .await?;
            let guard = repos.guard(guard_config);
            match guard.check(&login.session).await {
                GuardVerdict::Revoked(revocation) => report_revocation(&revocation),
                verdict => {
                    println!("session {}", login.session.session_id);
                    println!("access_token {}", login.access_token);
                    println!("guard: {verdict:?}");
                }
            }
        }
        Command::Guard { access_token } => {
            let auth = AuthService::new(repos.accounts.clone(), repos.sessions.clone(), auth_config);
            let session = auth.session_from_token(&access_token).await?;
            match repos.guard(guard_config).check(&session).await {
                GuardVerdict::Revoked(revocation) => report_revocation(&revocation),
                verdict => println!("kept: {verdict:?}"),
            }
        }
    }

    Ok(())
}

fn report_revocation(revocation: &Revocation) {
    println!("revoked: {}", revocation.message);
    println!("redirect {}", revocation.redirect_to);
}

fn warning_suffix(warning: Option<LinkWarning>) -> &'static str {
    match warning {
        Some(LinkWarning::AlreadyLinked) => " (already linked)",
        None => "",
    }
}
