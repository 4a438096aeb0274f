//! Identity provider access.
//!
//! [`IdentityApi`] is the seam between the session gateway and the remote
//! identity provider. [`GoTrueClient`] is the HTTP implementation; tests plug
//! in an in-memory provider.

pub mod gotrue;
pub mod provider;

pub use gotrue::GoTrueClient;
pub use provider::Credential;

use crate::error::AuthError;
use crate::models::{Identity, Session};
use std::sync::Arc;

/// Operations the session gateway needs from the identity provider.
///
/// Implementations must not retry; each call is one round trip.
#[async_trait::async_trait]
pub trait IdentityApi: Send + Sync + 'static {
    /// Exchange email and password for a new session.
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<Session, AuthError>;

    /// Exchange a refresh token for a new session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError>;

    /// Resolve the user behind an access token.
    async fn get_user(&self, access_token: &str) -> Result<Identity, AuthError>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

/// A shared, reference-counted [`IdentityApi`].
pub type ArcIdentityApi = Arc<dyn IdentityApi>;
