//! Sign-in, sign-out and "who am I".
//!
//! These are the only pages that run without the session check; they drive
//! the [`SessionContext`] lifecycle directly.

use condo_link::{Identity, SessionContext, SignInOutcome};
use serde::Serialize;

use super::required;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhoAmI {
    pub id: String,
    pub email: String,
    pub instance: String,
}

impl WhoAmI {
    fn new(identity: Identity, instance: &str) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
            instance: instance.to_string(),
        }
    }

    pub fn lines(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Email", self.email.clone()),
            ("User ID", self.id.clone()),
            ("Instance", self.instance.clone()),
        ]
    }
}

/// Sign in unless the stored session is still valid.
pub async fn login(ctx: &mut SessionContext, email: &str, password: &str) -> Result<SignInOutcome> {
    let email = required(email, "Informe o email.")?;
    if password.is_empty() {
        return Err(crate::error::CLIError::validation("Informe a senha."));
    }
    Ok(ctx.sign_in(&email, password).await?)
}

/// Whether the context already holds a usable session. Used to skip the
/// password prompt.
pub async fn already_signed_in(ctx: &mut SessionContext) -> Option<Identity> {
    if ctx.refresh_credential().await.unwrap_or(false) {
        ctx.current_user().await
    } else {
        None
    }
}

pub async fn logout(ctx: &mut SessionContext) {
    ctx.sign_out().await;
}

/// Identity behind the current session; halts when there is none.
pub async fn whoami(ctx: &mut SessionContext) -> Result<WhoAmI> {
    let instance = ctx.instance().to_string();
    let page = ctx.require_session().await?;
    Ok(WhoAmI::new(page.identity().clone(), &instance))
}
