//! Data models for condo-link.
//!
//! Wire structures for the identity provider and the relational API, plus the
//! session/identity values the gateway hands to page code.

pub mod error_detail;
pub mod grant_request;
pub mod identity;
pub mod query_response;
pub mod session;

pub use error_detail::{AuthErrorBody, ErrorDetail};
pub use grant_request::{PasswordGrant, RefreshGrant};
pub use identity::Identity;
pub use query_response::QueryResponse;
pub use session::Session;
