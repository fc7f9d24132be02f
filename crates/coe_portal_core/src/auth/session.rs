//! Login/logout flow binding identity sign-in to the token cache and store.
//!
//! # Invariants
//! - Any failed step leaves the token cache and session user unchanged.
//! - The session user is resolved from the store's users by lowercase email.

use crate::api::transport::ActionTransport;
use crate::auth::credentials::{CredentialError, CredentialVerifier};
use crate::auth::identity::{IdentityError, IdentityProvider};
use crate::auth::token_cache::{SessionTokenCache, TokenCacheError, TokenSource, TokenStorage};
use crate::model::user::User;
use crate::store::domain_store::DomainStore;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum LoginError {
    Credentials(CredentialError),
    Identity(IdentityError),
    /// Sign-in succeeded but no portal user has this email.
    UserNotRegistered(String),
    TokenCache(TokenCacheError),
}

impl LoginError {
    /// End-user text; includes the original message where one exists.
    pub fn user_message(&self) -> String {
        match self {
            Self::Credentials(err) => err.to_string(),
            Self::Identity(err) => format!("Authentication failed: {}", err.user_message()),
            Self::UserNotRegistered(_) => {
                "Authentication successful but user not found in system.".to_string()
            }
            Self::TokenCache(err) => format!("Could not store session: {err}"),
        }
    }

    fn code(&self) -> &str {
        match self {
            Self::Credentials(_) => "credentials_rejected",
            Self::Identity(err) => err.kind.code(),
            Self::UserNotRegistered(_) => "user_not_registered",
            Self::TokenCache(_) => "token_cache_failed",
        }
    }
}

impl Display for LoginError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Credentials(err) => write!(f, "{err}"),
            Self::Identity(err) => write!(f, "{err}"),
            Self::UserNotRegistered(email) => write!(f, "no portal user with email `{email}`"),
            Self::TokenCache(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LoginError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Credentials(err) => Some(err),
            Self::Identity(err) => Some(err),
            Self::UserNotRegistered(_) => None,
            Self::TokenCache(err) => Some(err),
        }
    }
}

impl From<CredentialError> for LoginError {
    fn from(value: CredentialError) -> Self {
        Self::Credentials(value)
    }
}

impl From<IdentityError> for LoginError {
    fn from(value: IdentityError) -> Self {
        Self::Identity(value)
    }
}

impl From<TokenCacheError> for LoginError {
    fn from(value: TokenCacheError) -> Self {
        Self::TokenCache(value)
    }
}

/// Credential gate followed by identity-provider sign-in.
pub struct LoginFlow<V: CredentialVerifier, P: IdentityProvider> {
    verifier: V,
    provider: P,
}

impl<V: CredentialVerifier, P: IdentityProvider> LoginFlow<V, P> {
    pub fn new(verifier: V, provider: P) -> Self {
        Self { verifier, provider }
    }

    /// Signs in and makes the matching portal user the store's session user.
    pub fn login<S, T, K>(
        &self,
        email: &str,
        password: &str,
        tokens: &SessionTokenCache<S>,
        store: &DomainStore<T, K>,
    ) -> Result<User, LoginError>
    where
        S: TokenStorage,
        T: ActionTransport,
        K: TokenSource,
    {
        info!("event=login module=auth status=start");
        let result = self.try_login(email, password, tokens, store);
        match &result {
            Ok(user) => info!(
                "event=login module=auth status=ok user_id={} role={}",
                user.id, user.role
            ),
            Err(err) => warn!(
                "event=login module=auth status=error error_code={}",
                err.code()
            ),
        }
        result
    }

    fn try_login<S, T, K>(
        &self,
        email: &str,
        password: &str,
        tokens: &SessionTokenCache<S>,
        store: &DomainStore<T, K>,
    ) -> Result<User, LoginError>
    where
        S: TokenStorage,
        T: ActionTransport,
        K: TokenSource,
    {
        self.verifier.verify(email, password)?;
        let signed_in = self.provider.sign_in(email.trim(), password)?;

        let normalized_email = email.trim().to_lowercase();
        let user = store
            .find_user_by_email(&normalized_email)
            .ok_or_else(|| LoginError::UserNotRegistered(normalized_email.clone()))?;

        tokens.set(signed_in.id_token)?;
        store.set_session_user(Some(user.clone()));
        Ok(user)
    }
}

/// Ends the session: drops the cached token and the session user.
pub fn logout<S, T, K>(
    tokens: &SessionTokenCache<S>,
    store: &DomainStore<T, K>,
) -> Result<(), LoginError>
where
    S: TokenStorage,
    T: ActionTransport,
    K: TokenSource,
{
    tokens.clear()?;
    store.set_session_user(None);
    info!("event=logout module=auth status=ok");
    Ok(())
}
