//! Session configuration

use std::time::Duration;

use crate::model::{CipherSuite, DEFAULT_VALIDITY_DAYS};

/// Configuration for a smartcard session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Delay between two presence queries
    pub poll_interval: Duration,
    /// Lifetime of newly generated keys, in days
    pub validity_days: i64,
    /// Cipher suite for newly generated keys
    pub cipher_suite: CipherSuite,
}

impl SessionConfig {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            validity_days: DEFAULT_VALIDITY_DAYS,
            cipher_suite: CipherSuite::Cv25519,
        }
    }
}
