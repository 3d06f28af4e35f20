use thiserror::Error;

/// Failure inside a single capability retrieval. Always absorbed by the
/// capability registry; it never reaches the HTTP caller.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DataError {
    #[error("store query failed: {0}")]
    Store(String),
    #[error("store query timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("session lookup failed: {0}")]
    Lookup(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AssistantError {
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("upstream model call failed: {message}")]
    Upstream { status: Option<u16>, message: String },
    #[error("internal failure: {0}")]
    Internal(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("unauthorized: {message}")]
    Unauthorized { message: String, correlation_id: String },
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

pub const MISSING_CREDENTIAL_MESSAGE: &str = "assistant model credential is not configured";

impl InterfaceError {
    pub fn unauthorized(message: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into(), correlation_id: correlation_id.into() }
    }

    pub fn bad_request(message: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into(), correlation_id: correlation_id.into() }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized { .. } => 401,
            Self::BadRequest { .. } => 400,
            Self::Internal { .. } => 500,
        }
    }

    /// Text placed in the `{ "error": ... }` body.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Unauthorized { message, .. }
            | Self::BadRequest { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::Unauthorized { correlation_id, .. }
            | Self::BadRequest { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl AuthError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let message = match self {
            Self::MissingToken => "missing authorization token",
            Self::InvalidToken | Self::Lookup(_) => "invalid or expired token",
        };
        InterfaceError::unauthorized(message, correlation_id)
    }
}

impl AssistantError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let message = match self {
            Self::Configuration(_) => MISSING_CREDENTIAL_MESSAGE.to_owned(),
            Self::Upstream { message, .. } => format!("assistant provider error: {message}"),
            Self::Internal(_) => "an unexpected internal error occurred".to_owned(),
        };
        InterfaceError::Internal { message, correlation_id }
    }
}
