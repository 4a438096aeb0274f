//! # condo-link: session and table access for the condominium backend
//!
//! Client library used by every page of the Vila da Serra dashboard.
//!
//! ## Features
//!
//! - **Session gateway**: sign-in, sign-out, current-user lookup and
//!   propagation of the session's bearer token to data requests
//! - **Scoped table access**: query builders pre-bound to one schema, with
//!   filters, ordering, pagination, exact counts and the four mutations
//! - **Pluggable backends**: identity provider and table transport sit behind
//!   traits; HTTP implementations speak the GoTrue and PostgREST dialects
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use condo_link::{CondoClient, Direction, MemorySessionStore, SessionContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CondoClient::from_env()?;
//!     let mut ctx = SessionContext::new(client, Box::new(MemorySessionStore::new()), "default");
//!
//!     ctx.sign_in("sindico@vila.com", "secret").await?;
//!
//!     let page = ctx.require_session().await?;
//!     let rows = page
//!         .accessor("moradores")
//!         .select("id,nome,predio,apto")
//!         .order("nome", Direction::Ascending)
//!         .execute()
//!         .await?;
//!     println!("{} residents", rows.rows.len());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod query;
pub mod session;
pub mod timeouts;
pub mod transport;

// Re-export main types for convenience
pub use auth::{ArcIdentityApi, Credential, GoTrueClient, IdentityApi};
pub use client::{CondoClient, CondoClientBuilder, DEFAULT_SCHEMA, ENV_KEY, ENV_SCHEMA, ENV_URL};
pub use error::{AuthError, CondoLinkError, Result};
pub use models::{ErrorDetail, Identity, QueryResponse, Session};
pub use query::TableQuery;
pub use session::{
    Authenticated, MemorySessionStore, SessionContext, SessionState, SessionStore,
    SignInOutcome, SignInRequired, DEFAULT_INSTANCE, SIGN_IN_ENTRY_POINT,
};
pub use timeouts::{CondoLinkTimeouts, CondoLinkTimeoutsBuilder};
pub use transport::{
    ArcRestTransport, CountMode, Direction, Filter, FilterOp, HttpTransport, Operation, Order,
    RestRequest, RestTransport,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
