//! Error types for condo-cli
//!
//! Provides user-friendly error messages for the failures a page can hit:
//! missing configuration, no session, backend rejections and bad input.

use condo_link::{AuthError, CondoLinkError, SignInRequired};
use std::fmt;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CLIError>;

/// Errors that can occur in the CLI
#[derive(Debug)]
pub enum CLIError {
    /// Error from condo-link
    LinkError(CondoLinkError),

    /// The page halted because there is no usable session
    SignInRequired(SignInRequired),

    /// Configuration file or environment error
    ConfigurationError(String),

    /// File I/O error
    FileError(String),

    /// Required field missing or malformed input
    ValidationError(String),

    /// User cancelled operation
    Cancelled,

    /// Output formatting error
    FormatError(String),
}

impl CLIError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CLIError::ValidationError(msg.into())
    }

    fn format_link_error(err: &CondoLinkError) -> String {
        match err {
            CondoLinkError::Auth(auth) => Self::format_auth_error(auth),
            CondoLinkError::DataAccess {
                status_code,
                message,
                ..
            } => match err.diagnostic() {
                Some(diagnostic) => {
                    format!("Request rejected ({}): {}\n{}", status_code, message, diagnostic)
                },
                None => format!("Request rejected ({}): {}", status_code, message),
            },
            CondoLinkError::NetworkError(msg) => Self::clean_nested_message(msg),
            CondoLinkError::TimeoutError(msg) => msg.clone(),
            CondoLinkError::SerializationError(msg) => msg.clone(),
            CondoLinkError::ConfigurationError(msg) => msg.clone(),
            CondoLinkError::StorageError(msg) => msg.clone(),
        }
    }

    fn format_auth_error(err: &AuthError) -> String {
        match err {
            AuthError::InvalidCredentials(detail) if detail.trim().is_empty() => {
                "Invalid email or password".to_string()
            },
            AuthError::InvalidCredentials(detail) => {
                format!("Invalid email or password\n  {}", detail.trim())
            },
            AuthError::Unreachable(msg) => {
                format!("Identity provider unreachable: {}", Self::clean_nested_message(msg))
            },
            other => other.to_string(),
        }
    }

    fn clean_nested_message(message: &str) -> String {
        let mut cleaned = message.trim();
        let prefixes = ["Network error:", "network error:", "error sending request:"];

        loop {
            let mut stripped = false;
            for prefix in &prefixes {
                if let Some(rest) = cleaned.strip_prefix(prefix) {
                    cleaned = rest.trim_start();
                    stripped = true;
                    break;
                }
            }

            if !stripped {
                break;
            }
        }

        cleaned.to_string()
    }
}

impl fmt::Display for CLIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CLIError::LinkError(e) => write!(f, "{}", Self::format_link_error(e)),
            CLIError::SignInRequired(halt) => write!(
                f,
                "Not signed in ({}). Run `condo {}` first.",
                halt.reason, halt.redirect_to
            ),
            CLIError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            CLIError::FileError(msg) => write!(f, "File error: {}", msg),
            CLIError::ValidationError(msg) => write!(f, "{}", msg),
            CLIError::Cancelled => write!(f, "Operation cancelled"),
            CLIError::FormatError(msg) => write!(f, "Format error: {}", msg),
        }
    }
}

impl std::error::Error for CLIError {}

impl From<CondoLinkError> for CLIError {
    fn from(err: CondoLinkError) -> Self {
        CLIError::LinkError(err)
    }
}

impl From<AuthError> for CLIError {
    fn from(err: AuthError) -> Self {
        CLIError::LinkError(CondoLinkError::Auth(err))
    }
}

impl From<SignInRequired> for CLIError {
    fn from(halt: SignInRequired) -> Self {
        CLIError::SignInRequired(halt)
    }
}

impl From<std::io::Error> for CLIError {
    fn from(err: std::io::Error) -> Self {
        CLIError::FileError(err.to_string())
    }
}

impl From<toml::de::Error> for CLIError {
    fn from(err: toml::de::Error) -> Self {
        CLIError::ConfigurationError(format!("TOML parse error: {}", err))
    }
}

impl From<serde_json::Error> for CLIError {
    fn from(err: serde_json::Error) -> Self {
        CLIError::FormatError(err.to_string())
    }
}
