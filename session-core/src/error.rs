//! Error taxonomy for the session layer

use crate::task::TaskState;
use thiserror::Error;

/// Result type for session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Underlying cause of a transport failure
pub type TransportCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Session errors.
///
/// HTTP 404 never appears here: single-resource lookups report it as an
/// absence (`Ok(None)`), list endpoints as an empty list.
#[derive(Error, Debug)]
pub enum Error {
    /// An invalid request: HTTP 400 carrying the server's machine code and
    /// human message verbatim, or a request rejected locally before
    /// transmission (code `missing_field`)
    #[error("{message} ({code})")]
    BadRequest {
        /// Machine readable error code
        code: String,
        /// Human readable message
        message: String,
    },

    /// HTTP 401; the response body is never consulted
    #[error("Access Denied (access_denied)")]
    AccessDenied,

    /// Any other non-2xx status; the response body is never consulted
    #[error("We are very sorry, but something went wrong (internal_server_error)")]
    ServerError,

    /// Network, TLS, timeout, or JSON decode failure before a classified
    /// status outcome was obtainable
    #[error("Transport failure: {0}")]
    Transport(#[source] TransportCause),

    /// Operation attempted on a task outside the states that allow it
    #[error("task in state {from:?} does not accept {operation}")]
    InvalidTaskState {
        /// State the task was in
        from: TaskState,
        /// Operation that was rejected
        operation: &'static str,
    },
}

impl Error {
    /// Machine readable code of this error
    pub fn code(&self) -> &str {
        match self {
            Error::BadRequest { code, .. } => code,
            Error::AccessDenied => "access_denied",
            Error::ServerError => "internal_server_error",
            Error::Transport(_) => "transport_failure",
            Error::InvalidTaskState { .. } => "invalid_task_state",
        }
    }

    /// Server-supplied or canonical message, where one exists
    pub fn message(&self) -> Option<&str> {
        match self {
            Error::BadRequest { message, .. } => Some(message),
            Error::AccessDenied => Some("Access Denied"),
            Error::ServerError => Some("We are very sorry, but something went wrong"),
            _ => None,
        }
    }

    /// Whether retrying the same call unchanged can plausibly succeed.
    ///
    /// `BadRequest` and `AccessDenied` are not retryable without changing
    /// the request or the credential.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::ServerError)
    }

    pub(crate) fn transport(cause: impl Into<TransportCause>) -> Self {
        Error::Transport(cause.into())
    }

    pub(crate) fn missing_field(message: impl Into<String>) -> Self {
        Error::BadRequest {
            code: "missing_field".to_string(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(cause: reqwest::Error) -> Self {
        Error::Transport(Box::new(cause))
    }
}

impl From<serde_json::Error> for Error {
    fn from(cause: serde_json::Error) -> Self {
        Error::Transport(Box::new(cause))
    }
}
