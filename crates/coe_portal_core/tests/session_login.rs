use coe_portal_core::api::transport::{ActionTransport, TransportError};
use coe_portal_core::auth::identity::IdentityErrorKind;
use coe_portal_core::{
    logout, ActionClient, CredentialVerifier, DomainStore, FixedPairVerifier, IdentityError,
    IdentityProvider, LoginError, LoginFlow, MemoryTokenStorage, Role, SessionTokenCache,
    ShapeCheckVerifier, SignedIn, StoreOptions, StoreSeed, User,
};
use std::cell::Cell;
use std::sync::Arc;

type Tokens = Arc<SessionTokenCache<MemoryTokenStorage>>;

struct OfflineTransport;

impl ActionTransport for OfflineTransport {
    fn post(&self, _body: &str) -> Result<String, TransportError> {
        Err(TransportError::new("offline", None))
    }
}

/// Accepts one password for every email and counts sign-in attempts.
struct FakeProvider {
    password: &'static str,
    calls: Cell<usize>,
}

impl FakeProvider {
    fn new(password: &'static str) -> Self {
        Self {
            password,
            calls: Cell::new(0),
        }
    }
}

impl IdentityProvider for FakeProvider {
    fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, IdentityError> {
        self.calls.set(self.calls.get() + 1);
        if password == self.password {
            Ok(SignedIn {
                id_token: format!("token-for-{email}"),
                uid: Some("fb-uid".to_string()),
            })
        } else {
            Err(IdentityError::new(
                IdentityErrorKind::WrongPassword,
                "INVALID_PASSWORD",
            ))
        }
    }
}

fn fixture() -> (DomainStore<OfflineTransport, Tokens>, Tokens) {
    let tokens: Tokens =
        Arc::new(SessionTokenCache::load(MemoryTokenStorage::new()).expect("token cache"));
    let seed = StoreSeed {
        users: vec![User {
            id: "user-1".to_string(),
            name: "Asha".to_string(),
            email: "asha@example.edu".to_string(),
            role: Role::Admin,
            avatar_url: None,
            department: None,
            coe_id: None,
            description: None,
            last_role_change_at: None,
            created_by_uid: None,
            is_active: true,
            force_password_reset: false,
        }],
        ..StoreSeed::default()
    };
    let store = DomainStore::new(
        seed,
        ActionClient::new(OfflineTransport),
        Arc::clone(&tokens),
        StoreOptions::default(),
    );
    (store, tokens)
}

#[test]
fn login_sets_token_and_session_user() {
    let (store, tokens) = fixture();
    let provider = FakeProvider::new("s3cret");
    let flow = LoginFlow::new(ShapeCheckVerifier, &provider);

    let user = flow
        .login(" Asha@Example.edu ", "s3cret", &*tokens, &store)
        .expect("login succeeds");

    assert_eq!(user.id, "user-1");
    assert_eq!(
        store.session_user().map(|user| user.id.clone()).as_deref(),
        Some("user-1")
    );
    assert_eq!(
        tokens.get().as_deref(),
        Some("token-for-Asha@Example.edu")
    );
}

#[test]
fn logout_clears_token_and_session_user() {
    let (store, tokens) = fixture();
    let provider = FakeProvider::new("s3cret");
    let flow = LoginFlow::new(ShapeCheckVerifier, &provider);
    flow.login("asha@example.edu", "s3cret", &*tokens, &store)
        .expect("login succeeds");

    logout(&*tokens, &store).expect("logout");

    assert!(store.session_user().is_none());
    assert_eq!(tokens.get(), None);
}

#[test]
fn unregistered_user_leaves_state_unchanged() {
    let (store, tokens) = fixture();
    let provider = FakeProvider::new("s3cret");
    let flow = LoginFlow::new(ShapeCheckVerifier, &provider);

    let err = flow
        .login("stranger@example.edu", "s3cret", &*tokens, &store)
        .expect_err("unknown portal user");

    assert!(matches!(
        err,
        LoginError::UserNotRegistered(ref email) if email == "stranger@example.edu"
    ));
    assert_eq!(
        err.user_message(),
        "Authentication successful but user not found in system."
    );
    assert!(store.session_user().is_none());
    assert_eq!(tokens.get(), None);
}

#[test]
fn provider_failure_is_translated_for_users() {
    let (store, tokens) = fixture();
    let provider = FakeProvider::new("s3cret");
    let flow = LoginFlow::new(ShapeCheckVerifier, &provider);

    let err = flow
        .login("asha@example.edu", "wrong", &*tokens, &store)
        .expect_err("wrong password");

    assert!(matches!(err, LoginError::Identity(_)));
    let message = err.user_message();
    assert!(message.starts_with("Authentication failed: Invalid password."));
    assert!(message.contains("INVALID_PASSWORD"));
    assert_eq!(tokens.get(), None);
}

#[test]
fn fixed_pair_gate_rejects_before_reaching_provider() {
    let (store, tokens) = fixture();
    let provider = FakeProvider::new("Admin@123");
    let flow = LoginFlow::new(
        FixedPairVerifier::new("asha@example.edu", "Admin@123"),
        &provider,
    );

    let err = flow
        .login("asha@example.edu", "guess", &*tokens, &store)
        .expect_err("gate rejects");
    assert!(matches!(err, LoginError::Credentials(_)));
    assert_eq!(provider.calls.get(), 0);

    flow.login("asha@example.edu", "Admin@123", &*tokens, &store)
        .expect("gate accepts configured pair");
    assert_eq!(provider.calls.get(), 1);
}

#[test]
fn boxed_verifier_is_usable_as_a_gate() {
    let verifier: Box<dyn CredentialVerifier> = Box::new(ShapeCheckVerifier);
    assert!(verifier.verify("asha@example.edu", "x").is_ok());
    assert!(verifier.verify("asha", "x").is_err());
}
