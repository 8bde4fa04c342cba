//! Error payload shared by every adapter.
//!
//! Transport agnostic: the HTTP adapter maps [`ErrorCode`] onto status codes
//! and serialises the payload as JSON.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TraceId;

/// Failure category. Serialised in snake_case and stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed input or a failed form rule.
    InvalidRequest,
    /// Credentials were rejected or a sign-in is required.
    Unauthorized,
    /// No view or resource exists at the requested location.
    NotFound,
    /// Collides with existing state: a duplicate email, a half created
    /// account, a superseded sign-in.
    Conflict,
    /// An external collaborator is unreachable.
    ServiceUnavailable,
    InternalError,
}

impl ErrorCode {
    /// Message used when a caller supplies a blank one.
    pub fn default_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Request is invalid",
            Self::Unauthorized => "Sign in required",
            Self::NotFound => "Not found",
            Self::Conflict => "Request conflicts with current state",
            Self::ServiceUnavailable => "Service temporarily unavailable",
            Self::InternalError => "Internal server error",
        }
    }
}

/// Error payload returned by adapters.
///
/// `message` is never blank: an empty message is replaced by
/// [`ErrorCode::default_message`]. The trace id in scope when the error is
/// built is captured automatically.
///
/// # Examples
/// ```
/// use marketplace_shell::domain::{Error, ErrorCode};
///
/// let err = Error::unauthorized("Invalid email or password");
/// assert_eq!(err.code(), ErrorCode::Unauthorized);
/// assert_eq!(Error::conflict("  ").message(), "Request conflicts with current state");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trace_id: Option<TraceId>,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            code.default_message().clone_into(&mut message);
        }
        Self {
            code,
            message,
            details: None,
            trace_id: TraceId::current(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Correlation id captured when the error was built.
    pub fn trace_id(&self) -> Option<TraceId> {
        self.trace_id
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Replace the captured correlation id.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}
