//! Access control, session token handling and login flow.
//!
//! # Responsibility
//! - Static role capability table consulted by UI collaborators.
//! - Session bearer-token cache with durable local persistence.
//! - Pluggable credential gate and identity-provider sign-in.

pub mod credentials;
pub mod identity;
pub mod password;
pub mod permissions;
pub mod session;
pub mod token_cache;
