//! Error types for remote session establishment
//!
//! Every failure the establishment pipeline can hit is surfaced as a single
//! [`SessionError`]. Each variant maps onto a stable [`ErrorTag`] so callers can
//! branch on the kind of failure without matching on message text.
//!
//! # Error Categories
//!
//! - **Authentication** - the identity service could not provide a token or user info
//! - **Signaling** - the signaling channel failed before reaching `Connected`
//! - **Endpoint** - the client endpoint failed to load or reported a bad version
//! - **Cancellation** - the caller aborted the pipeline
//! - **Configuration** - the factory was assembled with missing or invalid settings
//!
//! # Handling Errors
//!
//! ```rust,no_run
//! # use remoting_core::{SessionFactory, SessionError, ErrorTag};
//! # use remoting_core::events::NoopEventHandler;
//! # use std::sync::Arc;
//! # async fn example(factory: SessionFactory) {
//! match factory.create_session(Arc::new(NoopEventHandler), false).await {
//!     Ok(session) => println!("session {} ready", session.id()),
//!     Err(e) if e.is_auth_error() => eprintln!("sign in again: {}", e),
//!     Err(e) => match e.tag() {
//!         ErrorTag::MissingEndpoint => eprintln!("client endpoint is not installed"),
//!         ErrorTag::UnsupportedVersion => eprintln!("client endpoint must be updated"),
//!         tag => eprintln!("session failed ({}): {}", tag, e),
//!     },
//! }
//! # }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::factory::Stage;
use crate::signaling::SignalingError;

/// Result type alias for session establishment operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors surfaced by the session establishment pipeline
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    /// Token or user info retrieval failed
    #[error("Authentication failed: {reason}")]
    AuthFailed { reason: String },

    /// The signaling strategy failed before reaching `Connected`
    #[error("Signaling failed: {0}")]
    SignalingFailed(#[source] SignalingError),

    /// The client endpoint reported that it was not loaded
    #[error("Client endpoint is missing or failed to load")]
    MissingEndpoint,

    /// The client endpoint loaded but its version is not supported
    #[error("Client endpoint version is not supported")]
    UnsupportedVersion,

    /// The caller cancelled the pipeline
    #[error("Session establishment cancelled")]
    Cancelled,

    #[error("Invalid configuration: {field} - {reason}")]
    Configuration { field: String, reason: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Stable identifier for the kind of a [`SessionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorTag {
    AuthFailed,
    SignalingFailed,
    MissingEndpoint,
    UnsupportedVersion,
    Cancelled,
    InvalidConfiguration,
    Internal,
}

impl ErrorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTag::AuthFailed => "AUTH_FAILED",
            ErrorTag::SignalingFailed => "SIGNALING_FAILED",
            ErrorTag::MissingEndpoint => "MISSING_ENDPOINT",
            ErrorTag::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorTag::Cancelled => "CANCELLED",
            ErrorTag::InvalidConfiguration => "INVALID_CONFIGURATION",
            ErrorTag::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SessionError {
    /// Create an authentication failed error
    pub fn auth_failed(reason: impl Into<String>) -> Self {
        Self::AuthFailed { reason: reason.into() }
    }

    /// Create a configuration error for the given field
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Stable tag for this error
    pub fn tag(&self) -> ErrorTag {
        match self {
            SessionError::AuthFailed { .. } => ErrorTag::AuthFailed,
            SessionError::SignalingFailed(_) => ErrorTag::SignalingFailed,
            SessionError::MissingEndpoint => ErrorTag::MissingEndpoint,
            SessionError::UnsupportedVersion => ErrorTag::UnsupportedVersion,
            SessionError::Cancelled => ErrorTag::Cancelled,
            SessionError::Configuration { .. } => ErrorTag::InvalidConfiguration,
            SessionError::Internal { .. } => ErrorTag::Internal,
        }
    }

    /// Pipeline stage that produces this kind of error, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SessionError::AuthFailed { .. } => Some(Stage::Identity),
            SessionError::SignalingFailed(_) => Some(Stage::Signaling),
            SessionError::MissingEndpoint | SessionError::UnsupportedVersion => {
                Some(Stage::EndpointInitialization)
            }
            _ => None,
        }
    }

    /// The underlying signaling error, when signaling failed
    pub fn signaling_error(&self) -> Option<&SignalingError> {
        match self {
            SessionError::SignalingFailed(e) => Some(e),
            _ => None,
        }
    }

    /// Check if error indicates an authentication issue
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            SessionError::AuthFailed { .. }
                | SessionError::SignalingFailed(SignalingError::AuthenticationRejected { .. })
        )
    }

    /// Check if error is caused by the client endpoint
    pub fn is_endpoint_error(&self) -> bool {
        matches!(
            self,
            SessionError::MissingEndpoint | SessionError::UnsupportedVersion
        )
    }

    /// Get error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            SessionError::AuthFailed { .. } => "identity",
            SessionError::SignalingFailed(_) => "signaling",
            SessionError::MissingEndpoint | SessionError::UnsupportedVersion => "endpoint",
            SessionError::Cancelled => "cancellation",
            SessionError::Configuration { .. } => "configuration",
            SessionError::Internal { .. } => "internal",
        }
    }
}

impl From<SignalingError> for SessionError {
    fn from(error: SignalingError) -> Self {
        SessionError::SignalingFailed(error)
    }
}
