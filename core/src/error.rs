use std::fmt;

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// The error type for arcade operations
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: Option<StatusCode>,
    body: Option<Value>,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The client or session was used before configuration was set.
    NotConfigured,

    /// Configuration error (missing fields, invalid values, configured twice)
    ConfigInvalid,

    /// The underlying http transport failed (connection refused, DNS, ...)
    Transport,

    /// The remote API answered with a non-success status.
    Api,

    /// Caller supplied input is malformed, detected before any network call.
    Validation,

    /// Unexpected errors (response decoding, internal invariants, ...)
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            body: None,
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the http status of an [`ErrorKind::Api`] error.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Get the payload of an [`ErrorKind::Api`] error.
    ///
    /// This is the JSON error body returned by the remote API, or
    /// `{"status": <code>}` if the body could not be parsed.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Check if this error was reported by the remote API.
    pub fn is_api_error(&self) -> bool {
        self.kind == ErrorKind::Api
    }
}

// Convenience constructors
impl Error {
    /// Create a not configured error
    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotConfigured, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Create an api error carrying the status and the error payload.
    pub fn api(status: StatusCode, body: Value) -> Self {
        let mut err = Self::new(
            ErrorKind::Api,
            format!("remote api responded with {status}"),
        );
        err.status = Some(status);
        err.body = Some(body);
        err
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotConfigured => write!(f, "not configured"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::Transport => write!(f, "transport error"),
            ErrorKind::Api => write!(f, "api error"),
            ErrorKind::Validation => write!(f, "invalid input"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::validation(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::validation(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
