//! SurrealDB repository implementations.

mod account;
mod invitation;
mod property;
mod session;
mod tenant;

pub use account::SurrealAccountRepository;
pub use invitation::SurrealInvitationRepository;
pub use property::SurrealPropertyRepository;
pub use session::SurrealSessionRepository;
pub use tenant::SurrealTenantRepository;
