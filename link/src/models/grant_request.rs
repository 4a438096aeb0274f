use serde::{Deserialize, Serialize};

/// Body for `POST /auth/v1/token?grant_type=password`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordGrant {
    pub email: String,
    pub password: String,
}

/// Body for `POST /auth/v1/token?grant_type=refresh_token`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshGrant {
    pub refresh_token: String,
}
