use serde::{Deserialize, Serialize};

/// Error body returned by the relational API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// SQLSTATE or API error code (e.g. "23505", "PGRST205")
    #[serde(default)]
    pub code: Option<String>,

    /// Human-readable error message
    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Error body returned by the identity provider.
///
/// Different provider versions fill different fields, so all are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthErrorBody {
    /// Best available message, most specific first.
    pub fn best_message(&self) -> Option<String> {
        self.error_description
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.message.clone())
            .or_else(|| self.error.clone())
    }
}
