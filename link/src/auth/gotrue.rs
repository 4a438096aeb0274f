//! HTTP client for a GoTrue-compatible identity provider.

use crate::{
    auth::IdentityApi,
    error::AuthError,
    models::{AuthErrorBody, Identity, PasswordGrant, RefreshGrant, Session},
};
use log::{debug, warn};
use std::time::Instant;

/// Talks to `{base_url}/auth/v1`.
#[derive(Clone)]
pub struct GoTrueClient {
    base_url: String,
    anon_key: String,
    http_client: reqwest::Client,
}

impl GoTrueClient {
    pub(crate) fn new(base_url: String, anon_key: String, http_client: reqwest::Client) -> Self {
        Self {
            base_url,
            anon_key,
            http_client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn token_grant<B: serde::Serialize + ?Sized>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<reqwest::Response, AuthError> {
        let url = self.endpoint("token");
        Ok(self
            .http_client
            .post(&url)
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .json(body)
            .send()
            .await?)
    }
}

/// Read status and the provider's message from a failed response.
async fn failure_of(response: reqwest::Response) -> (u16, String) {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = serde_json::from_str::<AuthErrorBody>(&text)
        .ok()
        .and_then(|body| body.best_message())
        .unwrap_or(text);
    (status, message)
}

#[async_trait::async_trait]
impl IdentityApi for GoTrueClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        debug!("[AUTH] Password sign-in for '{}'", email);
        let start = Instant::now();
        let grant = PasswordGrant {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.token_grant("password", &grant).await?;
        let status = response.status();
        debug!("[AUTH] Sign-in response status={} in {:?}", status, start.elapsed());

        if !status.is_success() {
            let (status_code, message) = failure_of(response).await;
            return Err(match status_code {
                400 | 401 | 422 => AuthError::InvalidCredentials(message),
                _ => AuthError::Rejected {
                    status_code,
                    message,
                },
            });
        }

        let session = response.json::<Session>().await?;
        Ok(session.with_resolved_expiry(chrono::Utc::now().timestamp()))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        debug!("[AUTH] Refreshing session");
        let grant = RefreshGrant {
            refresh_token: refresh_token.to_string(),
        };
        let response = self.token_grant("refresh_token", &grant).await?;
        let status = response.status();

        if !status.is_success() {
            let (status_code, message) = failure_of(response).await;
            debug!("[AUTH] Refresh failed ({}): {}", status_code, message);
            return Err(match status_code {
                400 | 401 | 403 => AuthError::SessionExpired,
                _ => AuthError::Rejected {
                    status_code,
                    message,
                },
            });
        }

        let session = response.json::<Session>().await?;
        Ok(session.with_resolved_expiry(chrono::Utc::now().timestamp()))
    }

    async fn get_user(&self, access_token: &str) -> Result<Identity, AuthError> {
        let url = self.endpoint("user");
        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = response.status();
        debug!("[AUTH] Get user response status={}", status);

        if !status.is_success() {
            let (status_code, message) = failure_of(response).await;
            return Err(match status_code {
                401 | 403 => AuthError::SessionExpired,
                _ => AuthError::Rejected {
                    status_code,
                    message,
                },
            });
        }

        Ok(response.json::<Identity>().await?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let url = self.endpoint("logout");
        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            debug!("[AUTH] Remote session revoked");
            return Ok(());
        }

        let (status_code, message) = failure_of(response).await;
        match status_code {
            // Already gone on the provider side
            401 | 403 | 404 => {
                debug!("[AUTH] Sign-out on an already invalid session ({})", status_code);
                Ok(())
            },
            _ => {
                warn!("[AUTH] Sign-out rejected ({}): {}", status_code, message);
                Err(AuthError::Rejected {
                    status_code,
                    message,
                })
            },
        }
    }
}
