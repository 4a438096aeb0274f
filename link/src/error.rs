//! Error types for condo-link.
//!
//! Two families: [`AuthError`] for anything the identity provider reports and
//! [`CondoLinkError`] for the data-access path (which also wraps auth errors).

use thiserror::Error;

/// Result type for condo-link operations.
pub type Result<T> = std::result::Result<T, CondoLinkError>;

/// Failures reported by the identity provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The provider rejected the email/password pair.
    #[error("Invalid login credentials: {0}")]
    InvalidCredentials(String),

    /// The provider could not be reached (DNS, TCP, TLS, timeout).
    #[error("Identity provider unreachable: {0}")]
    Unreachable(String),

    /// The access token was refused as expired or revoked.
    #[error("Session expired or revoked")]
    SessionExpired,

    /// Sign-in succeeded but the user behind the new token could not be loaded.
    #[error("Signed in, but the user could not be loaded; try again")]
    IdentityUnavailable,

    /// Any other non-success answer from the provider.
    #[error("Identity provider error ({status_code}): {message}")]
    Rejected { status_code: u16, message: String },
}

impl AuthError {
    /// `true` when the failure means the cached session is no longer usable.
    pub fn invalidates_session(&self) -> bool {
        matches!(
            self,
            AuthError::SessionExpired | AuthError::InvalidCredentials(_)
        )
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AuthError::Rejected {
                status_code: err.status().map(|s| s.as_u16()).unwrap_or(0),
                message: format!("Malformed response: {}", err),
            }
        } else {
            AuthError::Unreachable(err.to_string())
        }
    }
}

/// Errors that can occur while talking to the condominium backend.
#[derive(Debug, Error)]
pub enum CondoLinkError {
    /// Authentication-side failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The relational API answered with an error (constraint violation,
    /// permission denial, unknown table, ...).
    #[error("Data access failed ({status_code}): {message}")]
    DataAccess {
        status_code: u16,
        code: Option<String>,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },

    /// Transport failure before any HTTP status was received.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request exceeded its configured timeout.
    #[error("Request timed out: {0}")]
    TimeoutError(String),

    /// Payload could not be encoded or a response could not be decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Missing or invalid client configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Session store could not be read or written.
    #[error("Session storage error: {0}")]
    StorageError(String),
}

impl CondoLinkError {
    /// Full diagnostic text (details and hint) for display under the message.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            CondoLinkError::DataAccess {
                code,
                details,
                hint,
                ..
            } => {
                let mut parts = Vec::new();
                if let Some(code) = code {
                    parts.push(format!("code: {}", code));
                }
                if let Some(details) = details {
                    parts.push(format!("details: {}", details));
                }
                if let Some(hint) = hint {
                    parts.push(format!("hint: {}", hint));
                }
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("\n"))
                }
            },
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CondoLinkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CondoLinkError::TimeoutError(err.to_string())
        } else if err.is_decode() {
            CondoLinkError::SerializationError(err.to_string())
        } else {
            CondoLinkError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CondoLinkError {
    fn from(err: serde_json::Error) -> Self {
        CondoLinkError::SerializationError(err.to_string())
    }
}
