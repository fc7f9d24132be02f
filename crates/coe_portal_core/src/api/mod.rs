//! Remote action API client.
//!
//! # Responsibility
//! - Wrap every remote call in the `{action, token, requestId, payload}`
//!   envelope and post it to the single configured endpoint.
//! - Normalize replies into `ApiResult<ActionReply>` or the uniform failure
//!   envelope.
//!
//! # Invariants
//! - One outbound request per call; no retries.
//! - A reply without `success: true` is never treated as success.
//! - Every call carries a fresh request id.

pub mod action;
pub mod client;
pub mod envelope;
pub mod transport;
