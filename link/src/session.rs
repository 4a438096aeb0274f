//! Session gateway.
//!
//! A [`SessionContext`] is the single source of truth for "who is the caller,
//! and which credential goes out with their requests" within one execution
//! context (one page render, one CLI invocation). It owns the propagated
//! [`Credential`] and keeps it equal to the current session's access token,
//! or [`Credential::None`] when there is no session.
//!
//! Propagation happens at fixed points:
//! - on every page entry ([`SessionContext::require_session`]),
//! - immediately after [`SessionContext::sign_in`],
//! - immediately after [`SessionContext::sign_out`].
//!
//! Table access is only reachable through the [`Authenticated`] guard that
//! `require_session` returns, so no query can run before the session check.

pub mod store;

pub use store::{MemorySessionStore, SessionStore};

use crate::{
    auth::Credential,
    client::CondoClient,
    error::{AuthError, CondoLinkError, Result},
    models::{Identity, Session},
    query::TableQuery,
};
use log::{debug, warn};
use thiserror::Error;

/// Where page code should send the user when no session exists.
pub const SIGN_IN_ENTRY_POINT: &str = "login";

/// Instance name used when none is configured.
pub const DEFAULT_INSTANCE: &str = "default";

/// Observable authentication state of a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(Identity),
}

/// Result of a sign-in attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// A new session was issued and propagated.
    SignedIn(Session),
    /// The context already had a valid session; nothing was sent.
    AlreadyAuthenticated(Identity),
}

impl SignInOutcome {
    pub fn identity(&self) -> &Identity {
        match self {
            SignInOutcome::SignedIn(session) => &session.user,
            SignInOutcome::AlreadyAuthenticated(identity) => identity,
        }
    }
}

/// Page execution must stop here and continue at the sign-in entry point.
///
/// This is a control-flow halt, not a failure of the backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Sign-in required: {reason} (continue at '{redirect_to}')")]
pub struct SignInRequired {
    pub redirect_to: &'static str,
    pub reason: String,
}

impl SignInRequired {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            redirect_to: SIGN_IN_ENTRY_POINT,
            reason: reason.into(),
        }
    }
}

/// Per-context session gateway.
pub struct SessionContext {
    client: CondoClient,
    store: Box<dyn SessionStore>,
    instance: String,
    session: Option<Session>,
    credential: Credential,
}

impl SessionContext {
    /// Create an anonymous context. Nothing is loaded until the first
    /// propagation.
    pub fn new(
        client: CondoClient,
        store: Box<dyn SessionStore>,
        instance: impl Into<String>,
    ) -> Self {
        Self {
            client,
            store,
            instance: instance.into(),
            session: None,
            credential: Credential::None,
        }
    }

    pub fn client(&self) -> &CondoClient {
        &self.client
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Credential that the next table request will carry.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Session currently held by this context.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn state(&self) -> SessionState {
        match &self.session {
            Some(session) => SessionState::Authenticated(session.user.clone()),
            None => SessionState::Anonymous,
        }
    }

    // ── Propagation ────────────────────────────────────────────────────────

    /// Re-derive the session from the store and propagate its token.
    ///
    /// Refreshes the token first when it is expired and a refresh token is
    /// available. Returns `Ok(true)` when a token was applied and `Ok(false)`
    /// when the credential was cleared because no usable session exists. On
    /// `Err` the credential has been cleared as well.
    pub async fn refresh_credential(&mut self) -> Result<bool> {
        let stored = match self.store.load(&self.instance) {
            Ok(stored) => stored,
            Err(e) => {
                self.discard_local();
                return Err(e);
            },
        };

        let Some(session) = stored else {
            self.discard_local();
            return Ok(false);
        };

        let session = if session.is_expired() {
            match self.renew(&session).await {
                Ok(Some(renewed)) => renewed,
                Ok(None) => {
                    debug!("[SESSION] Stored session expired without refresh token");
                    self.forget_stored();
                    self.discard_local();
                    return Ok(false);
                },
                Err(e) => {
                    self.discard_local();
                    return Err(e);
                },
            }
        } else {
            session
        };

        self.session = Some(session);
        self.apply_session();
        Ok(true)
    }

    /// Exchange the refresh token of an expired session and persist the new one.
    async fn renew(&mut self, expired: &Session) -> Result<Option<Session>> {
        if !expired.can_refresh() {
            return Ok(None);
        }
        let refresh_token = expired.refresh_token.as_deref().unwrap_or_default();

        match self.client.identity().refresh_session(refresh_token).await {
            Ok(renewed) => {
                debug!("[SESSION] Token refreshed for user id={}", renewed.user.id);
                self.store.save(&self.instance, &renewed)?;
                Ok(Some(renewed))
            },
            Err(e) => {
                if e.invalidates_session() {
                    self.forget_stored();
                }
                Err(CondoLinkError::Auth(e))
            },
        }
    }

    /// Propagation as used at the fixed trigger points: failures are logged
    /// and leave the credential cleared, never escalated.
    async fn propagate(&mut self) -> bool {
        match self.refresh_credential().await {
            Ok(applied) => {
                debug!("[SESSION] Credential propagated (authenticated={})", applied);
                applied
            },
            Err(e) => {
                warn!("[SESSION] Credential propagation failed, continuing anonymous: {}", e);
                false
            },
        }
    }

    /// Set the credential from the in-memory session.
    fn apply_session(&mut self) {
        self.credential = match &self.session {
            Some(session) => Credential::bearer(session.access_token.clone()),
            None => Credential::None,
        };
    }

    fn discard_local(&mut self) {
        self.session = None;
        self.credential = Credential::None;
    }

    fn forget_stored(&mut self) {
        if let Err(e) = self.store.clear(&self.instance) {
            warn!("[SESSION] Failed to clear stored session: {}", e);
        }
    }

    // ── Identity ───────────────────────────────────────────────────────────

    async fn fetch_identity(&self) -> Option<std::result::Result<Identity, AuthError>> {
        let session = self.session.as_ref()?;
        Some(self.client.identity().get_user(&session.access_token).await)
    }

    /// User bound to this context's session, or `None`.
    ///
    /// Never fails: a missing session, a rejected token and an unreachable
    /// provider all read as anonymous.
    pub async fn current_user(&self) -> Option<Identity> {
        match self.fetch_identity().await? {
            Ok(identity) => Some(identity),
            Err(e) => {
                debug!("[SESSION] No current user: {}", e);
                None
            },
        }
    }

    // ── Lifecycle ──────────────────────────────────────────────────────────

    /// Sign in with email and password.
    ///
    /// A context that already holds a valid session is left untouched and
    /// reports [`SignInOutcome::AlreadyAuthenticated`].
    pub async fn sign_in(
        &mut self,
        email: &str,
        password: &str,
    ) -> std::result::Result<SignInOutcome, AuthError> {
        if self.propagate().await {
            if let Some(identity) = self.current_user().await {
                debug!("[SESSION] Sign-in skipped, already authenticated as id={}", identity.id);
                return Ok(SignInOutcome::AlreadyAuthenticated(identity));
            }
        }
        self.discard_local();

        let session = match self.client.identity().sign_in_with_password(email, password).await {
            Ok(session) => session,
            Err(e) => {
                warn!("[SESSION] Sign-in failed for '{}': {}", email, e);
                return Err(e);
            },
        };

        if let Err(e) = self.store.save(&self.instance, &session) {
            warn!("[SESSION] Signed in but the session could not be persisted: {}", e);
        }
        self.session = Some(session.clone());
        self.apply_session();

        if self.current_user().await.is_none() {
            warn!("[SESSION] Signed in but the user could not be loaded");
            self.forget_stored();
            self.discard_local();
            return Err(AuthError::IdentityUnavailable);
        }

        // Second application after the identity check
        self.apply_session();
        debug!("[SESSION] Signed in as id={}", session.user.id);
        Ok(SignInOutcome::SignedIn(session))
    }

    /// Sign out.
    ///
    /// The local credential and stored session are cleared unconditionally;
    /// remote revocation is best-effort and only logged when it fails.
    pub async fn sign_out(&mut self) {
        let token = self
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
            .or_else(|| {
                self.store
                    .load(&self.instance)
                    .ok()
                    .flatten()
                    .map(|s| s.access_token)
            });

        self.discard_local();
        self.forget_stored();

        if let Some(token) = token {
            if let Err(e) = self.client.identity().sign_out(&token).await {
                warn!("[SESSION] Remote sign-out failed, local session cleared anyway: {}", e);
            }
        }

        // Propagation after sign-out: the session is gone, so this clears
        self.apply_session();
        debug!("[SESSION] Signed out");
    }

    /// Page entry check.
    ///
    /// Propagates the credential, confirms the identity with the provider and
    /// returns the guard that grants table access. Without a usable session
    /// the credential is cleared and the page must halt.
    pub async fn require_session(
        &mut self,
    ) -> std::result::Result<Authenticated<'_>, SignInRequired> {
        self.propagate().await;

        let identity = match self.fetch_identity().await {
            Some(Ok(identity)) => identity,
            Some(Err(e)) => {
                if e.invalidates_session() {
                    self.forget_stored();
                }
                self.discard_local();
                return Err(SignInRequired::new(e.to_string()));
            },
            None => {
                self.discard_local();
                return Err(SignInRequired::new("no active session"));
            },
        };

        self.apply_session();
        Ok(Authenticated {
            identity,
            context: &*self,
        })
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("instance", &self.instance)
            .field("state", &self.state())
            .field("credential", &self.credential)
            .finish()
    }
}

/// Proof that the session check passed for this render.
///
/// Borrowing the context keeps sign-in and sign-out (which need `&mut`) from
/// running while accessors built from it are alive.
pub struct Authenticated<'a> {
    identity: Identity,
    context: &'a SessionContext,
}

impl<'a> Authenticated<'a> {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Query builder bound to the configured schema and `table`, carrying the
    /// context's current credential.
    ///
    /// The table name is not validated here; an unknown table surfaces as a
    /// data-access error when the query runs.
    pub fn accessor(&self, table: &str) -> TableQuery {
        TableQuery::new(
            self.context.client.transport().clone(),
            self.context.client.schema(),
            table,
            self.context.credential.clone(),
        )
    }
}

impl std::fmt::Debug for Authenticated<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticated")
            .field("identity", &self.identity)
            .finish()
    }
}
