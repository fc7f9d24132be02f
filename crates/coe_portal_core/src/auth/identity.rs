//! Identity provider seam (email/password sign-in yielding a bearer token).
//!
//! # Responsibility
//! - Exchange credentials for an id token at the external provider.
//! - Translate provider failure codes into stable kinds and user-facing text.
//!
//! # Invariants
//! - Passwords and tokens never reach log lines.

use log::{error, info};
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

/// Successful sign-in result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    /// Bearer token to present to the action endpoint.
    pub id_token: String,
    /// Provider-side account id, when reported.
    pub uid: Option<String>,
}

/// Email/password sign-in against an external identity provider.
pub trait IdentityProvider {
    fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, IdentityError>;
}

impl<P: IdentityProvider + ?Sized> IdentityProvider for &P {
    fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, IdentityError> {
        (**self).sign_in(email, password)
    }
}

/// Classified provider failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityErrorKind {
    UserNotFound,
    WrongPassword,
    InvalidEmail,
    TooManyRequests,
    NetworkUnreachable,
    /// Unrecognized provider code, kept verbatim.
    Other(String),
}

impl IdentityErrorKind {
    /// Stable `auth/...` code.
    pub fn code(&self) -> &str {
        match self {
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::InvalidEmail => "auth/invalid-email",
            Self::TooManyRequests => "auth/too-many-requests",
            Self::NetworkUnreachable => "auth/network-request-failed",
            Self::Other(code) => code,
        }
    }

    fn user_text(&self) -> &'static str {
        match self {
            Self::UserNotFound => "User not found. Please check your email address.",
            Self::WrongPassword => "Invalid password. Please try again.",
            Self::InvalidEmail => "Invalid email format.",
            Self::TooManyRequests => "Too many failed attempts. Please try again later.",
            Self::NetworkUnreachable => "Network error. Please check your connection.",
            Self::Other(_) => "Authentication failed",
        }
    }
}

/// Maps a raw provider error code onto a kind.
///
/// Provider codes may carry a trailing explanation (`CODE : details`).
pub fn classify_provider_code(raw: &str) -> IdentityErrorKind {
    let code = raw.split(':').next().unwrap_or(raw).trim();
    match code {
        "EMAIL_NOT_FOUND" | "auth/user-not-found" => IdentityErrorKind::UserNotFound,
        "INVALID_PASSWORD" | "auth/wrong-password" => IdentityErrorKind::WrongPassword,
        "INVALID_EMAIL" | "auth/invalid-email" => IdentityErrorKind::InvalidEmail,
        "TOO_MANY_ATTEMPTS_TRY_LATER" | "auth/too-many-requests" => {
            IdentityErrorKind::TooManyRequests
        }
        "auth/network-request-failed" => IdentityErrorKind::NetworkUnreachable,
        other => IdentityErrorKind::Other(other.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityError {
    pub kind: IdentityErrorKind,
    /// Original lower-level message.
    pub details: String,
}

impl IdentityError {
    pub fn new(kind: IdentityErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            details: details.into(),
        }
    }

    /// End-user text including the original message.
    pub fn user_message(&self) -> String {
        if self.details.trim().is_empty() {
            return self.kind.user_text().to_string();
        }
        format!("{} ({})", self.kind.user_text(), self.details)
    }
}

impl Display for IdentityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "identity sign-in failed [{}]: {}", self.kind.code(), self.details)
    }
}

impl Error for IdentityError {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

/// Firebase Authentication REST sign-in (`accounts:signInWithPassword`).
#[derive(Debug, Clone)]
pub struct FirebaseIdentityProvider {
    client: Client,
    sign_in_url: String,
    api_key: String,
}

impl FirebaseIdentityProvider {
    pub fn new(
        sign_in_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let client = Client::builder().timeout(timeout).build().map_err(|err| {
            IdentityError::new(IdentityErrorKind::NetworkUnreachable, err.to_string())
        })?;
        Ok(Self {
            client,
            sign_in_url: sign_in_url.into(),
            api_key: api_key.into(),
        })
    }
}

impl IdentityProvider for FirebaseIdentityProvider {
    fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, IdentityError> {
        let started_at = Instant::now();
        info!("event=identity_sign_in module=auth status=start provider=firebase");

        let result = self
            .client
            .post(&self.sign_in_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .and_then(|response| response.text())
            .map_err(|err| {
                IdentityError::new(IdentityErrorKind::NetworkUnreachable, err.to_string())
            })
            .and_then(|body| parse_sign_in_reply(&body));

        match &result {
            Ok(_) => info!(
                "event=identity_sign_in module=auth status=ok provider=firebase duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=identity_sign_in module=auth status=error provider=firebase error_code={} duration_ms={}",
                err.kind.code(),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

/// Parses a provider sign-in reply body.
pub fn parse_sign_in_reply(body: &str) -> Result<SignedIn, IdentityError> {
    let value: Value = serde_json::from_str(body).map_err(|err| {
        IdentityError::new(
            IdentityErrorKind::Other("auth/invalid-response".to_string()),
            err.to_string(),
        )
    })?;

    if let Some(message) = value
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
    {
        return Err(IdentityError::new(classify_provider_code(message), message));
    }

    match value.get("idToken").and_then(Value::as_str) {
        Some(token) if !token.is_empty() => Ok(SignedIn {
            id_token: token.to_string(),
            uid: value
                .get("localId")
                .and_then(Value::as_str)
                .map(str::to_string),
        }),
        _ => Err(IdentityError::new(
            IdentityErrorKind::Other("auth/invalid-response".to_string()),
            "sign-in reply carries no idToken",
        )),
    }
}
