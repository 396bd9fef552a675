//! Error types for the DDNS system
//!
//! Every failure an update can produce is one variant of [`Error`]. The
//! variants are the classification the scheduler works with: it decides
//! retry cadence and alerting from [`Error::kind`] and
//! [`Error::is_retryable`], never from message text.

use crate::classify::Rejection;
use crate::types::ProviderId;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a request never produced a readable response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    /// The caller cancelled the update
    Cancelled,
    /// The client timeout elapsed
    Timeout,
    /// Connection, DNS resolution or TLS failure
    Network,
    /// The response body could not be read
    Body,
}

impl std::fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Cancelled => "request cancelled",
            Self::Timeout => "request timed out",
            Self::Network => "request failed",
            Self::Body => "reading response body failed",
        };
        f.write_str(text)
    }
}

/// Flat classification of an [`Error`], for scheduling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Validation,
    UnknownProvider,
    DuplicateProvider,
    Cancelled,
    Transport,
    BadHttpStatus,
    Authentication,
    RateLimited,
    Rejected,
    UnknownResponse,
    MalformedResponse,
}

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// A top-level settings entry is malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// A provider rejected its configuration at construction time
    #[error("{provider}: invalid field {field}: {reason}")]
    Validation {
        provider: ProviderId,
        /// Name of the offending option
        field: &'static str,
        reason: String,
    },

    /// No constructor is registered under this provider token
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// A provider was registered twice
    #[error("provider {0} is already registered")]
    DuplicateProvider(ProviderId),

    /// The request could not be sent or its response could not be read
    #[error("{provider}: {kind}: {message}")]
    Transport {
        provider: ProviderId,
        kind: TransportFailure,
        message: String,
    },

    /// Non-success status and no recognized marker in the body
    #[error("{provider}: bad HTTP status {status}: {body}")]
    BadHttpStatus {
        provider: ProviderId,
        status: u16,
        body: String,
    },

    /// Credentials were refused
    #[error("{provider}: authentication failed: {body}")]
    Authentication { provider: ProviderId, body: String },

    /// The provider throttled or flagged the client for abuse
    #[error("{provider}: rate limited: {body}")]
    RateLimited { provider: ProviderId, body: String },

    /// The provider understood the request and refused it
    #[error("{provider}: {rejection}: {body}")]
    Rejected {
        provider: ProviderId,
        rejection: Rejection,
        body: String,
    },

    /// Success status with a body matching no known marker
    #[error("{provider}: unknown response: {body}")]
    UnknownResponse { provider: ProviderId, body: String },

    /// A structured (JSON/XML) body could not be decoded
    #[error("{provider}: malformed response: {message}")]
    MalformedResponse { provider: ProviderId, message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error for one option of a provider
    pub fn validation(provider: ProviderId, field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            provider,
            field,
            reason: reason.into(),
        }
    }

    /// Create an unknown provider error
    pub fn unknown_provider(token: impl Into<String>) -> Self {
        Self::UnknownProvider(token.into())
    }

    /// Create a transport error
    pub fn transport(provider: ProviderId, kind: TransportFailure, msg: impl Into<String>) -> Self {
        Self::Transport {
            provider,
            kind,
            message: msg.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(provider: ProviderId) -> Self {
        Self::transport(provider, TransportFailure::Cancelled, "context cancelled")
    }

    /// Create a malformed response error
    pub fn malformed(provider: ProviderId, msg: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider,
            message: msg.into(),
        }
    }

    /// Create a rejection error
    pub fn rejected(provider: ProviderId, rejection: Rejection, body: impl Into<String>) -> Self {
        Self::Rejected {
            provider,
            rejection,
            body: body.into(),
        }
    }

    /// The classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::UnknownProvider(_) => ErrorKind::UnknownProvider,
            Self::DuplicateProvider(_) => ErrorKind::DuplicateProvider,
            Self::Transport {
                kind: TransportFailure::Cancelled,
                ..
            } => ErrorKind::Cancelled,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::BadHttpStatus { .. } => ErrorKind::BadHttpStatus,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Rejected { .. } => ErrorKind::Rejected,
            Self::UnknownResponse { .. } => ErrorKind::UnknownResponse,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
        }
    }

    /// Whether the scheduler may retry at its normal cadence
    ///
    /// Rate limiting is retryable but calls for an extended backoff; a
    /// rejected or unrecognized response needs an operator to look at it.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Transport
                | ErrorKind::Cancelled
                | ErrorKind::BadHttpStatus
                | ErrorKind::RateLimited
        ) || matches!(
            self,
            Self::Rejected {
                rejection: Rejection::ServerSide,
                ..
            }
        )
    }

    /// The provider this error concerns, if any
    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            Self::Config(_) | Self::UnknownProvider(_) => None,
            Self::DuplicateProvider(provider)
            | Self::Validation { provider, .. }
            | Self::Transport { provider, .. }
            | Self::BadHttpStatus { provider, .. }
            | Self::Authentication { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::Rejected { provider, .. }
            | Self::UnknownResponse { provider, .. }
            | Self::MalformedResponse { provider, .. } => Some(*provider),
        }
    }
}
