//! Command-line and environment configuration.
//!
//! Every flag can also be set through a `LEASEHOLD_*` environment
//! variable.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use leasehold_auth::config::{AuthConfig, GuardConfig, InvitationConfig};
use leasehold_db::DbConfig;
use leasehold_mail::MailConfig;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Parser)]
#[command(name = "leasehold", version)]
#[command(about = "Tenant invitation and account-linking service", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub db: DbArgs,

    #[command(flatten)]
    pub mail: MailArgs,

    #[command(flatten)]
    pub invitation: InvitationArgs,

    #[command(flatten)]
    pub auth: AuthArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply pending schema migrations and exit
    Migrate,
    /// Invite a tenant to the portal
    Invite {
        #[arg(long)]
        tenant_id: Uuid,
    },
    /// Rotate an invitation's token and send it again
    Resend {
        #[arg(long)]
        invitation_id: Uuid,
    },
    /// Cancel a pending invitation
    Cancel {
        #[arg(long)]
        invitation_id: Uuid,
    },
    /// Create a tenant account from an invitation token
    Signup {
        #[arg(long)]
        token: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "LEASEHOLD_SIGNUP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Link an existing account to a tenant record
    Link {
        #[arg(long)]
        tenant_id: Uuid,
        #[arg(long)]
        account_id: Uuid,
    },
    /// Sign in and run the orphaned-tenant check on the new session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LEASEHOLD_LOGIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Run the orphaned-tenant check for a signed-in session
    Guard {
        #[arg(long, env = "LEASEHOLD_ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,
    },
}

#[derive(Debug, Args)]
pub struct DbArgs {
    /// SurrealDB WebSocket address
    #[arg(long, env = "LEASEHOLD_DB_URL", default_value = "127.0.0.1:8000")]
    pub db_url: String,
    #[arg(long, env = "LEASEHOLD_DB_NAMESPACE", default_value = "leasehold")]
    pub db_namespace: String,
    #[arg(long, env = "LEASEHOLD_DB_DATABASE", default_value = "main")]
    pub db_database: String,
    #[arg(long, env = "LEASEHOLD_DB_USERNAME", default_value = "root")]
    pub db_username: String,
    #[arg(
        long,
        env = "LEASEHOLD_DB_PASSWORD",
        default_value = "root",
        hide_env_values = true
    )]
    pub db_password: String,
}

impl From<DbArgs> for DbConfig {
    fn from(args: DbArgs) -> Self {
        Self {
            url: args.db_url,
            namespace: args.db_namespace,
            database: args.db_database,
            username: args.db_username,
            password: args.db_password,
        }
    }
}

#[derive(Debug, Args)]
pub struct MailArgs {
    /// URL of the hosted email function
    #[arg(
        long,
        env = "LEASEHOLD_MAIL_FUNCTION_URL",
        default_value = "http://127.0.0.1:54321/functions/v1/send-email"
    )]
    pub mail_function_url: String,
    /// Bearer key for the email function
    #[arg(long, env = "LEASEHOLD_MAIL_API_KEY", hide_env_values = true)]
    pub mail_api_key: Option<String>,
    #[arg(long, env = "LEASEHOLD_MAIL_TIMEOUT_SECS", default_value_t = 10)]
    pub mail_timeout_secs: u64,
}

impl From<MailArgs> for MailConfig {
    fn from(args: MailArgs) -> Self {
        Self {
            function_url: args.mail_function_url,
            api_key: args.mail_api_key,
            timeout_secs: args.mail_timeout_secs,
        }
    }
}

#[derive(Debug, Args)]
pub struct InvitationArgs {
    /// Days before an invitation token expires
    #[arg(long, env = "LEASEHOLD_INVITATION_LIFETIME_DAYS", default_value_t = 7)]
    pub invitation_lifetime_days: i64,
    /// Public base URL of the tenant portal
    #[arg(
        long,
        env = "LEASEHOLD_SIGNUP_BASE_URL",
        default_value = "http://localhost:3000"
    )]
    pub signup_base_url: String,
    #[arg(long, env = "LEASEHOLD_SIGNUP_PATH", default_value = "/tenant-signup")]
    pub signup_path: String,
    #[arg(long, env = "LEASEHOLD_SIGNUP_TOKEN_PARAM", default_value = "token")]
    pub signup_token_param: String,
    #[arg(
        long,
        env = "LEASEHOLD_INVITATION_SUBJECT",
        default_value = "You're invited to the tenant portal"
    )]
    pub invitation_subject: String,
    /// Always send an invitation, even when an account already uses the
    /// tenant's email
    #[arg(long, env = "LEASEHOLD_NO_DIRECT_LINK")]
    pub no_direct_link: bool,
    /// Seconds the guard waits before evaluating a new session
    #[arg(long, env = "LEASEHOLD_GUARD_SETTLE_SECS", default_value_t = 3)]
    pub guard_settle_secs: u64,
}

impl InvitationArgs {
    pub fn invitation_config(&self) -> InvitationConfig {
        InvitationConfig {
            lifetime_days: self.invitation_lifetime_days,
            signup_base_url: self.signup_base_url.clone(),
            signup_path: self.signup_path.clone(),
            token_param: self.signup_token_param.clone(),
            email_subject: self.invitation_subject.clone(),
            link_existing_accounts: !self.no_direct_link,
        }
    }

    pub fn guard_config(&self) -> GuardConfig {
        GuardConfig {
            settle_delay: Duration::from_secs(self.guard_settle_secs),
            ..Default::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct AuthArgs {
    /// PEM file holding the Ed25519 signing key
    #[arg(long, env = "LEASEHOLD_JWT_PRIVATE_KEY_FILE")]
    pub jwt_private_key_file: Option<PathBuf>,
    /// PEM file holding the Ed25519 verification key
    #[arg(long, env = "LEASEHOLD_JWT_PUBLIC_KEY_FILE")]
    pub jwt_public_key_file: Option<PathBuf>,
    #[arg(long, env = "LEASEHOLD_JWT_ISSUER", default_value = "leasehold")]
    pub jwt_issuer: String,
    #[arg(long, env = "LEASEHOLD_PASSWORD_PEPPER", hide_env_values = true)]
    pub password_pepper: Option<String>,
    #[arg(long, env = "LEASEHOLD_MIN_PASSWORD_LENGTH", default_value_t = 6)]
    pub min_password_length: usize,
}

impl AuthArgs {
    /// Build the auth configuration, reading key files when given.
    pub fn auth_config(&self) -> Result<AuthConfig, AppError> {
        Ok(AuthConfig {
            jwt_private_key_pem: read_optional(self.jwt_private_key_file.as_ref())?,
            jwt_public_key_pem: read_optional(self.jwt_public_key_file.as_ref())?,
            jwt_issuer: self.jwt_issuer.clone(),
            pepper: self.password_pepper.clone(),
            min_password_length: self.min_password_length,
            ..Default::default()
        })
    }
}

fn read_optional(path: Option<&PathBuf>) -> Result<String, AppError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| AppError::KeyFile {
            path: path.clone(),
            source,
        }),
        None => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_library_defaults() {
        let cli = Cli::try_parse_from(["leasehold", "migrate"]).unwrap();

        let invitation = cli.invitation.invitation_config();
        let library = InvitationConfig::default();
        assert_eq!(invitation.lifetime_days, library.lifetime_days);
        assert_eq!(invitation.signup_path, library.signup_path);
        assert_eq!(invitation.token_param, library.token_param);
        assert!(invitation.link_existing_accounts);

        let guard = cli.invitation.guard_config();
        assert_eq!(guard.settle_delay, Duration::from_secs(3));

        let db = DbConfig::from(cli.db);
        assert_eq!(db.namespace, "leasehold");
    }

    #[test]
    fn invite_requires_uuid() {
        assert!(Cli::try_parse_from(["leasehold", "invite", "--tenant-id", "t1"]).is_err());

        let id = Uuid::new_v4().to_string();
        let cli = Cli::try_parse_from(["leasehold", "invite", "--tenant-id", &id]).unwrap();
        assert!(matches!(cli.command, Command::Invite { .. }));
    }

    #[test]
    fn login_takes_email_and_password() {
        let cli = Cli::try_parse_from([
            "leasehold",
            "login",
            "--email",
            "jane@x.com",
            "--password",
            "secret1",
        ])
        .unwrap();

        let Command::Login { email, password } = cli.command else {
            panic!("expected login command");
        };
        assert_eq!(email, "jane@x.com");
        assert_eq!(password, "secret1");
    }

    #[test]
    fn no_direct_link_disables_fast_path() {
        let cli = Cli::try_parse_from(["leasehold", "--no-direct-link", "migrate"]).unwrap();

        assert!(!cli.invitation.invitation_config().link_existing_accounts);
    }
}
