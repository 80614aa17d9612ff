use std::path::PathBuf;

use async_trait::async_trait;
use gcloud_sdk::{GoogleAuthTokenGenerator, TokenSourceType};

use crate::error::{Error, Result};

/// OAuth scope granting read-write access to Cloud DNS
pub const DNS_READWRITE_SCOPE: &str = "https://www.googleapis.com/auth/ndev.clouddns.readwrite";

/// Produces the `Authorization` header value for API calls
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn authorization(&self) -> Result<String>;
}

/// Credentials found the way the gcloud tooling finds them: the
/// `GOOGLE_APPLICATION_CREDENTIALS` file, the gcloud user config or the
/// metadata server.
pub struct AmbientCredentials {
    generator: GoogleAuthTokenGenerator,
}

impl AmbientCredentials {
    pub async fn discover() -> Result<Self> {
        Self::from_source(TokenSourceType::Default).await
    }

    /// Uses a service account JSON key instead of discovery.
    pub async fn from_file(path: PathBuf) -> Result<Self> {
        Self::from_source(TokenSourceType::File(path)).await
    }

    async fn from_source(source: TokenSourceType) -> Result<Self> {
        let generator =
            GoogleAuthTokenGenerator::new(source, vec![DNS_READWRITE_SCOPE.to_string()])
                .await
                .map_err(|e| Error::Credentials(e.to_string()))?;
        Ok(Self { generator })
    }
}

#[async_trait]
impl TokenSource for AmbientCredentials {
    async fn authorization(&self) -> Result<String> {
        let token = self
            .generator
            .create_token()
            .await
            .map_err(|e| Error::Credentials(e.to_string()))?;
        Ok(token.header_value())
    }
}

/// A fixed bearer token, for short-lived tokens minted elsewhere
pub struct StaticToken(String);

impl StaticToken {
    pub fn new<S: AsRef<str>>(token: S) -> Self {
        Self(token.as_ref().to_string())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn authorization(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_is_bearer() {
        let source = StaticToken::new("abc");
        assert_eq!("Bearer abc", source.authorization().await.unwrap());
    }
}
