//! Action client over a pluggable transport.

use crate::api::action::{new_request_id, ActionName};
use crate::api::envelope::{
    parse_reply, ActionReply, ActionRequest, ApiError, ApiResult, DEFAULT_FAILURE_CODE,
};
use crate::api::transport::ActionTransport;
use crate::auth::password::generate_initial_password;
use crate::logging::sanitize_message;
use crate::model::user::{NewUser, Role};
use crate::model::UnitId;
use log::{error, info};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;

const MAX_LOGGED_ERROR_CHARS: usize = 200;

/// Payload of the `createUser` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUserRequest {
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub coe_id: UnitId,
    /// Initial sign-in password; the account is flagged for reset.
    pub initial_password: String,
    pub force_password_reset: bool,
}

impl RemoteUserRequest {
    /// Builds a creation request with a freshly generated initial password.
    pub fn from_new_user(user: &NewUser, coe_id: impl Into<UnitId>) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.trim().to_ascii_lowercase(),
            role: user.role,
            department: user.department.clone(),
            coe_id: coe_id.into(),
            initial_password: generate_initial_password(),
            force_password_reset: true,
        }
    }
}

/// Sends tagged action requests to the remote endpoint.
pub struct ActionClient<T: ActionTransport> {
    transport: T,
}

impl<T: ActionTransport> ActionClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Performs one remote action.
    ///
    /// # Contract
    /// - Exactly one outbound request with a fresh request id.
    /// - Transport failure -> `ApiError::Network` (code defaults to 500).
    /// - Unparseable body -> `ApiError::MalformedResponse` with raw text.
    /// - `success` not true -> `ApiError::Remote`.
    pub fn call<P>(&self, action: ActionName, payload: &P, token: &str) -> ApiResult<ActionReply>
    where
        P: Serialize + ?Sized,
    {
        let started_at = Instant::now();
        let request_id = new_request_id();
        info!(
            "event=action_call module=api status=start action={} request_id={}",
            action, request_id
        );

        let result = self.dispatch(action, payload, token, request_id.clone());
        match &result {
            Ok(reply) => info!(
                "event=action_call module=api status=ok action={} request_id={} code={} duration_ms={}",
                action,
                request_id,
                reply.code,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=action_call module=api status=error action={} request_id={} error_code={} code={} duration_ms={} error={}",
                action,
                request_id,
                err.kind(),
                err.code(),
                started_at.elapsed().as_millis(),
                sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
            ),
        }
        result
    }

    /// Performs one remote action and folds any failure into the uniform
    /// `{success: false, code, error}` envelope.
    pub fn call_envelope<P>(&self, action: ActionName, payload: &P, token: &str) -> ActionReply
    where
        P: Serialize + ?Sized,
    {
        self.call(action, payload, token)
            .unwrap_or_else(ApiError::into_reply)
    }

    /// Connectivity probe with an empty payload.
    pub fn test_connection(&self, token: &str) -> ApiResult<ActionReply> {
        self.call(ActionName::TestConnection, &json!({}), token)
    }

    /// Fetches one user profile by identity-provider uid.
    pub fn get_user(&self, token: &str, uid: &str) -> ApiResult<ActionReply> {
        self.call(ActionName::GetUser, &json!({ "uid": uid }), token)
    }

    /// Creates one remote account.
    pub fn create_user(&self, token: &str, request: &RemoteUserRequest) -> ApiResult<ActionReply> {
        self.call(ActionName::CreateUser, request, token)
    }

    fn dispatch<P>(
        &self,
        action: ActionName,
        payload: &P,
        token: &str,
        request_id: String,
    ) -> ApiResult<ActionReply>
    where
        P: Serialize + ?Sized,
    {
        let payload = serde_json::to_value(payload).map_err(|err| ApiError::Network {
            message: format!("failed to encode request payload: {err}"),
            code: DEFAULT_FAILURE_CODE,
        })?;
        let request = ActionRequest {
            action: action.as_str(),
            token,
            request_id,
            payload: &payload,
        };
        let body = serde_json::to_string(&request).map_err(|err| ApiError::Network {
            message: format!("failed to encode request: {err}"),
            code: DEFAULT_FAILURE_CODE,
        })?;

        let raw = self
            .transport
            .post(&body)
            .map_err(|err| ApiError::Network {
                code: err.status.map_or(DEFAULT_FAILURE_CODE, i64::from),
                message: err.message,
            })?;

        parse_reply(&raw)
    }
}

/// Reads the `payload` object of a reply, if present.
pub fn reply_payload(reply: &ActionReply) -> Option<&Value> {
    reply.field("payload")
}

#[cfg(test)]
mod tests {
    use super::{ActionClient, RemoteUserRequest};
    use crate::api::action::ActionName;
    use crate::api::envelope::ApiError;
    use crate::api::transport::{ActionTransport, TransportError};
    use crate::model::user::{NewUser, Role};
    use serde_json::{json, Value};
    use std::cell::RefCell;

    struct CannedTransport {
        reply: Result<String, TransportError>,
        sent: RefCell<Vec<Value>>,
    }

    impl CannedTransport {
        fn ok(body: &str) -> Self {
            Self {
                reply: Ok(body.to_string()),
                sent: RefCell::new(Vec::new()),
            }
        }

        fn failing(error: TransportError) -> Self {
            Self {
                reply: Err(error),
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl ActionTransport for CannedTransport {
        fn post(&self, body: &str) -> Result<String, TransportError> {
            self.sent
                .borrow_mut()
                .push(serde_json::from_str(body).expect("client sends json"));
            self.reply.clone()
        }
    }

    #[test]
    fn call_sends_full_envelope() {
        let client = ActionClient::new(CannedTransport::ok(r#"{"success":true,"code":200}"#));
        client
            .call(ActionName::ApproveProject, &json!({"projectId": "p-1"}), "tok")
            .expect("call succeeds");

        let sent = client.transport().sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["action"], "approveProject");
        assert_eq!(sent[0]["token"], "tok");
        assert_eq!(sent[0]["payload"]["projectId"], "p-1");
        assert!(sent[0]["requestId"]
            .as_str()
            .expect("request id")
            .starts_with("REQ-"));
    }

    #[test]
    fn transport_failure_without_status_defaults_to_500() {
        let client = ActionClient::new(CannedTransport::failing(TransportError::new(
            "connection refused",
            None,
        )));
        let err = client
            .test_connection("tok")
            .expect_err("transport failure must surface");
        assert_eq!(
            err,
            ApiError::Network {
                message: "connection refused".to_string(),
                code: 500,
            }
        );
    }

    #[test]
    fn transport_failure_keeps_http_status() {
        let client = ActionClient::new(CannedTransport::failing(TransportError::new(
            "bad gateway",
            Some(502),
        )));
        let reply = client.call_envelope(ActionName::TestConnection, &json!({}), "tok");
        assert!(!reply.success);
        assert_eq!(reply.code, 502);
        assert_eq!(reply.error.as_deref(), Some("bad gateway"));
    }

    #[test]
    fn create_user_sends_generated_password_and_lowercase_email() {
        let client = ActionClient::new(CannedTransport::ok(
            r#"{"success":true,"code":201,"uid":"u-77"}"#,
        ));
        let request = RemoteUserRequest::from_new_user(
            &NewUser::new("Ravi", "Ravi@Example.EDU", Role::Student),
            "coe-iot",
        );
        let reply = client.create_user("tok", &request).expect("create user");
        assert_eq!(reply.str_field("uid").as_deref(), Some("u-77"));

        let sent = client.transport().sent.borrow();
        assert_eq!(sent[0]["action"], "createUser");
        assert_eq!(sent[0]["payload"]["email"], "ravi@example.edu");
        assert_eq!(sent[0]["payload"]["role"], "STUDENT");
        assert_eq!(
            sent[0]["payload"]["initialPassword"]
                .as_str()
                .expect("password")
                .chars()
                .count(),
            12
        );
    }

    #[test]
    fn get_user_passes_uid_payload() {
        let client = ActionClient::new(CannedTransport::ok(
            r#"{"success":true,"code":200,"payload":{"role":"ADMIN"}}"#,
        ));
        let reply = client.get_user("tok", "fb-uid-1").expect("get user");
        assert_eq!(super::reply_payload(&reply), Some(&json!({"role": "ADMIN"})));
        assert_eq!(client.transport().sent.borrow()[0]["payload"]["uid"], "fb-uid-1");
    }
}
