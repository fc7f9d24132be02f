//! Outbound transport seam for the action client.

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Transport-level failure before a reply body could be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub message: String,
    /// HTTP status when the server answered at all.
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "transport failure (status {status}): {}", self.message),
            None => write!(f, "transport failure: {}", self.message),
        }
    }
}

impl Error for TransportError {}

/// Sends one serialized request body and returns the full reply body text.
pub trait ActionTransport {
    fn post(&self, body: &str) -> Result<String, TransportError>;
}

impl<T: ActionTransport + ?Sized> ActionTransport for &T {
    fn post(&self, body: &str) -> Result<String, TransportError> {
        (**self).post(body)
    }
}

impl<T: ActionTransport + ?Sized> ActionTransport for std::sync::Arc<T> {
    fn post(&self, body: &str) -> Result<String, TransportError> {
        (**self).post(body)
    }
}

/// Blocking HTTP transport posting JSON to one fixed endpoint.
///
/// Redirects are followed (the hosted script endpoint answers through one).
/// Non-2xx replies with a readable body are handed back for envelope
/// parsing; only unreadable bodies become transport errors.
#[derive(Debug, Clone)]
pub struct HttpActionTransport {
    client: Client,
    endpoint_url: String,
}

impl HttpActionTransport {
    pub fn new(endpoint_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::new(err.to_string(), None))?;
        Ok(Self {
            client,
            endpoint_url: endpoint_url.into(),
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

impl ActionTransport for HttpActionTransport {
    fn post(&self, body: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .post(&self.endpoint_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .map_err(|err| {
                TransportError::new(err.to_string(), err.status().map(|status| status.as_u16()))
            })?;

        let status = response.status();
        let text = response.text().map_err(|err| {
            TransportError::new(
                format!("Unable to read response from server: {err}"),
                Some(status.as_u16()),
            )
        })?;

        if !status.is_success() && text.trim().is_empty() {
            return Err(TransportError::new(
                format!("HTTP {}: empty response body", status.as_u16()),
                Some(status.as_u16()),
            ));
        }

        Ok(text)
    }
}
