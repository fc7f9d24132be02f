//! Core domain logic for the Centers of Excellence portal.
//! Role permissions, session token persistence, the remote action client and
//! the domain store live here; UI shells only call into this crate.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod store;

pub use api::action::ActionName;
pub use api::client::{ActionClient, RemoteUserRequest};
pub use api::envelope::{ActionReply, ApiError, ApiResult};
pub use api::transport::{ActionTransport, HttpActionTransport, TransportError};
pub use auth::credentials::{CredentialVerifier, FixedPairVerifier, ShapeCheckVerifier};
pub use auth::identity::{FirebaseIdentityProvider, IdentityError, IdentityProvider, SignedIn};
pub use auth::permissions::{check, check_key, permissions_for, Capability, RolePermissions};
pub use auth::session::{logout, LoginError, LoginFlow};
pub use auth::token_cache::{
    MemoryTokenStorage, SessionTokenCache, SqliteTokenStorage, TokenCacheError, TokenSource,
    TokenStorage,
};
pub use config::{ConfigError, PortalConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::user::{Role, User};
pub use store::domain_store::{CollectionKind, DomainStore, StoreOptions, StoreSnapshot};
pub use store::seed::StoreSeed;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
