//! Dashboard pages.
//!
//! Every page function takes the [`condo_link::Authenticated`] guard, so it
//! can only run after the session check of the current invocation passed.
//! Pages validate required fields, build queries through the scoped accessor
//! and decode rows into typed structs; printing is left to the caller.

pub mod agenda;
pub mod cashflow;
pub mod incidents;
pub mod metrics;
pub mod residents;
pub mod session;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::error::{CLIError, Result};

/// Trimmed value, or a validation error with `message` when blank.
pub(crate) fn required(value: &str, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CLIError::validation(message))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Trimmed value; blank becomes `None`.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        CLIError::validation(format!("Invalid date '{}': use YYYY-MM-DD", value.trim()))
    })
}

/// Columns that may come back as `null` on older rows.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Date part of an ISO date or timestamp, for client-side sorting.
pub(crate) fn date_key(value: Option<&str>) -> String {
    value
        .and_then(|v| v.split('T').next())
        .unwrap_or_default()
        .to_string()
}
