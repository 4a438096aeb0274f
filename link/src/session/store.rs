//! Session persistence between execution contexts.
//!
//! The identity provider owns the session; a [`SessionStore`] only keeps the
//! last issued token pair so the next page render (or CLI invocation) can
//! re-derive it. Stores are keyed by instance name so one machine can hold
//! sessions for several projects.

use crate::error::Result;
use crate::models::Session;
use std::collections::HashMap;

/// Trait for session storage backends.
///
/// # Security Note
///
/// Implementations hold live bearer tokens:
/// - Files should use restrictive permissions (0600 on Unix)
/// - Tokens should never be logged
pub trait SessionStore: Send + Sync {
    /// Load the stored session for `instance`, `Ok(None)` when there is none.
    fn load(&self, instance: &str) -> Result<Option<Session>>;

    /// Store (or overwrite) the session for `instance`.
    fn save(&mut self, instance: &str, session: &Session) -> Result<()>;

    /// Forget the session for `instance`. Succeeds when nothing was stored.
    fn clear(&mut self, instance: &str) -> Result<()>;
}

/// In-memory session store for tests and single-process embedding.
///
/// ```rust
/// use condo_link::{Identity, MemorySessionStore, Session, SessionStore};
///
/// let mut store = MemorySessionStore::new();
/// let session = Session {
///     access_token: "tok".into(),
///     token_type: "bearer".into(),
///     expires_in: None,
///     expires_at: None,
///     refresh_token: None,
///     user: Identity::new("u-1", "a@x.com"),
/// };
/// store.save("default", &session).unwrap();
/// assert_eq!(store.load("default").unwrap(), Some(session));
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemorySessionStore {
    sessions: HashMap<String, Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, instance: &str) -> Result<Option<Session>> {
        Ok(self.sessions.get(instance).cloned())
    }

    fn save(&mut self, instance: &str, session: &Session) -> Result<()> {
        self.sessions.insert(instance.to_string(), session.clone());
        Ok(())
    }

    fn clear(&mut self, instance: &str) -> Result<()> {
        self.sessions.remove(instance);
        Ok(())
    }
}
