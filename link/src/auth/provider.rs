//! Credential attached to outgoing requests.
//!
//! Every request carries the project's anon key in the `apikey` header. The
//! `Authorization` header is present only while a session token is
//! propagated; a cleared credential sends no bearer at all, so the backend
//! treats the call as anonymous instead of as a previous user.

/// The credential currently propagated to the data-access layer.
///
/// # Examples
///
/// ```rust
/// use condo_link::Credential;
///
/// let cred = Credential::bearer("eyJhbGc...");
/// assert!(cred.is_authenticated());
/// assert_eq!(cred.token(), Some("eyJhbGc..."));
///
/// let none = Credential::none();
/// assert!(!none.is_authenticated());
/// ```
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Credential {
    /// Access token of the current session
    Bearer(String),

    /// No session: requests go out with the anon key only
    #[default]
    None,
}

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    pub fn none() -> Self {
        Self::None
    }

    /// Attach `apikey` and, when present, `Authorization: Bearer <token>`.
    pub fn apply_to_request(
        &self,
        request: reqwest::RequestBuilder,
        anon_key: &str,
    ) -> reqwest::RequestBuilder {
        let request = request.header("apikey", anon_key);
        match self {
            Self::Bearer(token) => request.bearer_auth(token),
            Self::None => request,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Bearer(token) => Some(token.as_str()),
            Self::None => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(token) => {
                let shown: String = token.chars().take(8).collect();
                write!(f, "Credential::Bearer({}…)", shown)
            },
            Self::None => write!(f, "Credential::None"),
        }
    }
}
