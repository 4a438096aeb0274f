use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use super::identity::Identity;

/// Seconds before the hard expiry at which a token is already treated as stale.
pub const EXPIRY_LEEWAY_SECS: i64 = 30;

/// Session issued by the identity provider.
///
/// Matches the token endpoint response; `expires_at` is filled in locally from
/// `expires_in` or the token's `exp` claim when the provider omits it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Bearer token for subsequent API calls
    pub access_token: String,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Lifetime in seconds at issue time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// Expiry as unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,

    /// Longer-lived token used to obtain a new access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    pub user: Identity,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Fill `expires_at` when absent, using `expires_in` relative to `now`
    /// or falling back to the JWT `exp` claim.
    pub fn with_resolved_expiry(mut self, now: i64) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = self
                .expires_in
                .map(|secs| now + secs)
                .or_else(|| jwt_expiry(&self.access_token));
        }
        self
    }

    /// `true` when the access token is expired (or about to be) at `now`.
    ///
    /// Sessions with unknown expiry are never considered expired locally;
    /// the provider will reject them if they are.
    pub fn is_expired_at(&self, now: i64) -> bool {
        match self.expires_at {
            Some(exp) => now + EXPIRY_LEEWAY_SECS >= exp,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp())
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }
}

/// Read the `exp` claim from a JWT without verifying it.
pub fn jwt_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_i64()
}
