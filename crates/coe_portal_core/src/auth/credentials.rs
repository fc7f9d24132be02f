//! Credential verification strategies run before identity sign-in.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    MalformedEmail,
    EmptyPassword,
    /// The pair does not match the configured credentials.
    Mismatch,
}

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedEmail => write!(f, "Invalid email format."),
            Self::EmptyPassword => write!(f, "Password must not be empty."),
            Self::Mismatch => write!(f, "Invalid credentials."),
        }
    }
}

impl Error for CredentialError {}

/// Gate applied to raw credentials before they reach the identity provider.
pub trait CredentialVerifier {
    fn verify(&self, email: &str, password: &str) -> Result<(), CredentialError>;
}

/// Production verifier: rejects malformed input and leaves the real check to
/// the identity provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeCheckVerifier;

impl CredentialVerifier for ShapeCheckVerifier {
    fn verify(&self, email: &str, password: &str) -> Result<(), CredentialError> {
        if !EMAIL_RE.is_match(email.trim()) {
            return Err(CredentialError::MalformedEmail);
        }
        if password.is_empty() {
            return Err(CredentialError::EmptyPassword);
        }
        Ok(())
    }
}

/// Accepts exactly one configured `(email, password)` pair.
///
/// Email comparison is exact, like the password comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPairVerifier {
    email: String,
    password: String,
}

impl FixedPairVerifier {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl CredentialVerifier for FixedPairVerifier {
    fn verify(&self, email: &str, password: &str) -> Result<(), CredentialError> {
        if email == self.email && password == self.password {
            Ok(())
        } else {
            Err(CredentialError::Mismatch)
        }
    }
}

impl<V: CredentialVerifier + ?Sized> CredentialVerifier for Box<V> {
    fn verify(&self, email: &str, password: &str) -> Result<(), CredentialError> {
        (**self).verify(email, password)
    }
}

#[cfg(test)]
mod tests {
    use super::{CredentialError, CredentialVerifier, FixedPairVerifier, ShapeCheckVerifier};

    #[test]
    fn shape_check_accepts_well_formed_input() {
        assert!(ShapeCheckVerifier
            .verify(" asha@example.edu ", "secret")
            .is_ok());
    }

    #[test]
    fn shape_check_rejects_bad_email_and_empty_password() {
        assert_eq!(
            ShapeCheckVerifier.verify("not-an-email", "secret"),
            Err(CredentialError::MalformedEmail)
        );
        assert_eq!(
            ShapeCheckVerifier.verify("a@b.co", ""),
            Err(CredentialError::EmptyPassword)
        );
    }

    #[test]
    fn fixed_pair_matches_exactly() {
        let verifier = FixedPairVerifier::new("admin@example.edu", "Admin@123");
        assert!(verifier.verify("admin@example.edu", "Admin@123").is_ok());
        assert_eq!(
            verifier.verify("Admin@example.edu", "Admin@123"),
            Err(CredentialError::Mismatch)
        );
        assert_eq!(
            verifier.verify("admin@example.edu", "admin@123"),
            Err(CredentialError::Mismatch)
        );
    }
}
