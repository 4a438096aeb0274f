//! Library entry point for condo-cli components.
//!
//! Exposes the reusable pieces (configuration, session file, formatter and
//! dashboard pages) so integration tests can drive pages without going
//! through the binary entry point.

pub mod config;
pub mod error;
pub mod formatter;
pub mod logging;
pub mod pages;
pub mod store;

pub use config::{CLIConfiguration, Overrides, ResolvedProject};
pub use error::{CLIError, Result};
pub use formatter::{OutputFormat, OutputFormatter, TableRow};
pub use store::FileSessionStore;
