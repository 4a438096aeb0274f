//! Shared client with builder pattern.
//!
//! [`CondoClient`] holds the pieces that are safe to share across execution
//! contexts: the pooled HTTP client, the identity provider, the table
//! transport and the fixed schema. It holds **no** credential; the credential
//! lives in each [`crate::SessionContext`].

use crate::{
    auth::{ArcIdentityApi, GoTrueClient},
    error::{CondoLinkError, Result},
    timeouts::CondoLinkTimeouts,
    transport::{ArcRestTransport, HttpTransport},
};
use std::sync::Arc;
use std::time::Duration;

/// Schema every table accessor binds to unless configured otherwise.
pub const DEFAULT_SCHEMA: &str = "vila_da_serra";

/// Environment variable holding the project URL.
pub const ENV_URL: &str = "SUPABASE_URL";
/// Environment variable holding the anon (publishable) key.
pub const ENV_KEY: &str = "SUPABASE_KEY";
/// Environment variable overriding the schema.
pub const ENV_SCHEMA: &str = "CONDO_SCHEMA";

/// Shared backend client.
///
/// Use [`CondoClientBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust,no_run
/// use condo_link::CondoClient;
///
/// # fn example() -> condo_link::Result<()> {
/// let client = CondoClient::builder()
///     .base_url("https://abc.supabase.co")
///     .anon_key("public-anon-key")
///     .schema("vila_da_serra")
///     .timeout(std::time::Duration::from_secs(30))
///     .build()?;
/// assert_eq!(client.schema(), "vila_da_serra");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CondoClient {
    base_url: String,
    schema: String,
    identity: ArcIdentityApi,
    transport: ArcRestTransport,
    timeouts: CondoLinkTimeouts,
}

impl CondoClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> CondoClientBuilder {
        CondoClientBuilder::new()
    }

    /// Build a client from `SUPABASE_URL`, `SUPABASE_KEY` and the optional
    /// `CONDO_SCHEMA`.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();
        if let Ok(url) = std::env::var(ENV_URL) {
            builder = builder.base_url(url);
        }
        if let Ok(key) = std::env::var(ENV_KEY) {
            builder = builder.anon_key(key);
        }
        if let Ok(schema) = std::env::var(ENV_SCHEMA) {
            builder = builder.schema(schema);
        }
        builder.build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Schema every accessor from this client binds to
    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn timeouts(&self) -> &CondoLinkTimeouts {
        &self.timeouts
    }

    pub(crate) fn identity(&self) -> &ArcIdentityApi {
        &self.identity
    }

    pub(crate) fn transport(&self) -> &ArcRestTransport {
        &self.transport
    }
}

impl std::fmt::Debug for CondoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CondoClient")
            .field("base_url", &self.base_url)
            .field("schema", &self.schema)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

/// Builder for configuring [`CondoClient`] instances.
pub struct CondoClientBuilder {
    base_url: Option<String>,
    anon_key: Option<String>,
    schema: String,
    timeouts: CondoLinkTimeouts,
    identity: Option<ArcIdentityApi>,
    transport: Option<ArcRestTransport>,
}

impl CondoClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            anon_key: None,
            schema: DEFAULT_SCHEMA.to_string(),
            timeouts: CondoLinkTimeouts::default(),
            identity: None,
            transport: None,
        }
    }

    /// Project URL, e.g. `https://abc.supabase.co`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Anon key sent as `apikey` on every request
    pub fn anon_key(mut self, key: impl Into<String>) -> Self {
        self.anon_key = Some(key.into());
        self
    }

    /// Schema all table accessors bind to
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.receive_timeout = timeout;
        self
    }

    /// Set full timeout configuration
    pub fn timeouts(mut self, timeouts: CondoLinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Use a custom identity provider instead of the HTTP one
    pub fn identity_api(mut self, identity: ArcIdentityApi) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Use a custom table transport instead of the HTTP one
    pub fn transport(mut self, transport: ArcRestTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<CondoClient> {
        let injected = self.identity.is_some() && self.transport.is_some();

        let base_url = match self.base_url {
            Some(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
            _ if injected => String::new(),
            _ => {
                return Err(CondoLinkError::ConfigurationError(format!(
                    "base_url is required (set {})",
                    ENV_URL
                )))
            },
        };
        let anon_key = match self.anon_key {
            Some(key) if !key.trim().is_empty() => key.trim().to_string(),
            _ if injected => String::new(),
            _ => {
                return Err(CondoLinkError::ConfigurationError(format!(
                    "anon_key is required (set {})",
                    ENV_KEY
                )))
            },
        };
        if self.schema.trim().is_empty() {
            return Err(CondoLinkError::ConfigurationError(
                "schema must not be empty".into(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(self.timeouts.receive_timeout)
            .connect_timeout(self.timeouts.connection_timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| CondoLinkError::ConfigurationError(e.to_string()))?;

        let identity = self.identity.unwrap_or_else(|| {
            Arc::new(GoTrueClient::new(
                base_url.clone(),
                anon_key.clone(),
                http_client.clone(),
            ))
        });
        let transport = self.transport.unwrap_or_else(|| {
            Arc::new(HttpTransport::new(
                base_url.clone(),
                anon_key.clone(),
                http_client.clone(),
            ))
        });

        Ok(CondoClient {
            base_url,
            schema: self.schema,
            identity,
            transport,
            timeouts: self.timeouts,
        })
    }
}
