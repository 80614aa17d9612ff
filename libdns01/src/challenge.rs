use std::time::Duration;

use async_trait::async_trait;

/// How long the orchestrator should wait for a challenge to be satisfied,
/// and how often to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for Timeout {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(180),
            interval: Duration::from_secs(5),
        }
    }
}

/// A provider able to publish and withdraw DNS-01 challenge records
#[async_trait]
pub trait ChallengeProvider: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Publishes the TXT record for `domain`. `token` is unused by DNS
    /// providers but kept so every challenge type shares a signature.
    async fn present(&self, domain: &str, token: &str, key_auth: &str)
        -> Result<(), Self::Error>;

    /// Removes every TXT record previously published for `domain`.
    async fn clean_up(&self, domain: &str, token: &str, key_auth: &str)
        -> Result<(), Self::Error>;

    fn timeout(&self) -> Timeout {
        Timeout::default()
    }
}
