//! Request/reply envelopes and the client error taxonomy.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Code reported when the failure did not come with one of its own.
pub const DEFAULT_FAILURE_CODE: i64 = 500;

pub type ApiResult<T> = Result<T, ApiError>;

/// Outbound request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest<'a> {
    pub action: &'a str,
    pub token: &'a str,
    pub request_id: String,
    pub payload: &'a Value,
}

/// Parsed remote reply.
///
/// Action-specific fields (for example `projectId`) are kept in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionReply {
    #[serde(default, deserialize_with = "lenient_success")]
    pub success: bool,
    #[serde(default, deserialize_with = "lenient_code")]
    pub code: i64,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ActionReply {
    /// Uniform failure envelope `{success: false, code, error}`.
    pub fn failure(code: i64, error: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            error: Some(error.into()),
            message: None,
            fields: Map::new(),
        }
    }

    /// Returns one action-specific field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns one action-specific field as a non-empty string.
    ///
    /// Numeric ids are rendered in decimal form.
    pub fn str_field(&self, name: &str) -> Option<String> {
        match self.field(name)? {
            Value::String(value) if !value.trim().is_empty() => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            _ => None,
        }
    }
}

/// Action client failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The endpoint could not be reached or its body could not be read.
    Network { message: String, code: i64 },
    /// A body arrived but is not a reply envelope.
    MalformedResponse { raw: String, reason: String },
    /// A well-formed reply reported `success: false` (or omitted it).
    Remote { code: i64, message: String },
}

impl ApiError {
    pub fn code(&self) -> i64 {
        match self {
            Self::Network { code, .. } | Self::Remote { code, .. } => *code,
            Self::MalformedResponse { .. } => DEFAULT_FAILURE_CODE,
        }
    }

    /// Message placed into the failure envelope and shown to end users.
    pub fn message(&self) -> &str {
        match self {
            Self::Network { message, .. } | Self::Remote { message, .. } => message,
            Self::MalformedResponse { .. } => "Invalid JSON response from server",
        }
    }

    /// Stable taxonomy tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network_error",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::Remote { .. } => "remote_error",
        }
    }

    /// Converts this error into the uniform failure envelope.
    pub fn into_reply(self) -> ActionReply {
        ActionReply::failure(self.code(), self.message())
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network { message, code } => write!(f, "network error ({code}): {message}"),
            Self::MalformedResponse { reason, .. } => {
                write!(f, "malformed response: {reason}")
            }
            Self::Remote { code, message } => write!(f, "remote error ({code}): {message}"),
        }
    }
}

impl Error for ApiError {}

/// Parses raw reply text into a successful reply or a typed failure.
///
/// # Contract
/// - Text that is not a JSON object fails with `MalformedResponse`.
/// - A reply whose `success` is not `true` fails with `Remote`; the message
///   is the reply `error`, falling back to one built from `code`.
/// - Non-string `error`/`message` values never fail the parse.
pub fn parse_reply(raw: &str) -> ApiResult<ActionReply> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| ApiError::MalformedResponse {
            raw: raw.to_string(),
            reason: err.to_string(),
        })?;
    if !value.is_object() {
        return Err(ApiError::MalformedResponse {
            raw: raw.to_string(),
            reason: "reply is not a JSON object".to_string(),
        });
    }

    let reply: ActionReply =
        serde_json::from_value(value).map_err(|err| ApiError::MalformedResponse {
            raw: raw.to_string(),
            reason: err.to_string(),
        })?;

    if !reply.success {
        let message = reply
            .error
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Server returned error {}", reply.code));
        return Err(ApiError::Remote {
            code: reply.code,
            message,
        });
    }

    Ok(reply)
}

fn lenient_success<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    // Only a literal `true` counts; null or any other value is failure.
    let value = Value::deserialize(deserializer)?;
    Ok(value == Value::Bool(true))
}

fn lenient_code<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64))
            .unwrap_or(DEFAULT_FAILURE_CODE),
        Value::String(text) => text.trim().parse().unwrap_or(DEFAULT_FAILURE_CODE),
        _ => 0,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    // Only strings carry text; objects, arrays and scalars read as absent.
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => Some(text),
        _ => None,
    })
}
