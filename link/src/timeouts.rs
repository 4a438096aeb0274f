//! Timeout configuration for backend calls.
//!
//! Both the identity provider and the relational API share one pooled HTTP
//! client, so one pair of timeouts covers every round trip.

use std::time::Duration;

/// Timeout configuration for condo-link HTTP calls.
///
/// # Examples
///
/// ```rust
/// use condo_link::CondoLinkTimeouts;
/// use std::time::Duration;
///
/// let timeouts = CondoLinkTimeouts::default();
/// assert_eq!(timeouts.receive_timeout, Duration::from_secs(30));
///
/// let timeouts = CondoLinkTimeouts::builder()
///     .connection_timeout_secs(60)
///     .receive_timeout_secs(120)
///     .build();
/// assert_eq!(timeouts.connection_timeout, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CondoLinkTimeouts {
    /// Timeout for establishing connections (TCP + TLS handshake).
    /// Default: 10 seconds
    pub connection_timeout: Duration,

    /// Timeout for a whole request, from send to the end of the body.
    /// Default: 30 seconds
    pub receive_timeout: Duration,
}

impl Default for CondoLinkTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            receive_timeout: Duration::from_secs(30),
        }
    }
}

impl CondoLinkTimeouts {
    pub fn builder() -> CondoLinkTimeoutsBuilder {
        CondoLinkTimeoutsBuilder::new()
    }
}

/// Builder for [`CondoLinkTimeouts`].
#[derive(Debug, Clone)]
pub struct CondoLinkTimeoutsBuilder {
    timeouts: CondoLinkTimeouts,
}

impl CondoLinkTimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: CondoLinkTimeouts::default(),
        }
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection_timeout = timeout;
        self
    }

    pub fn connection_timeout_secs(self, secs: u64) -> Self {
        self.connection_timeout(Duration::from_secs(secs))
    }

    pub fn receive_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.receive_timeout = timeout;
        self
    }

    pub fn receive_timeout_secs(self, secs: u64) -> Self {
        self.receive_timeout(Duration::from_secs(secs))
    }

    pub fn build(self) -> CondoLinkTimeouts {
        self.timeouts
    }
}
