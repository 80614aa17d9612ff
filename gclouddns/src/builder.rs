use std::{net::IpAddr, path::PathBuf, sync::Arc, time::Duration};

use libdns01::PropagationChecker;
use reqwest::Client;

use crate::{
    api::{CloudDns, DEFAULT_API_BASE},
    credentials::{AmbientCredentials, TokenSource},
    error::{Error, Result},
    provider::{DnsProvider, PropagationSettings, Settings},
};

/// Environment variable consulted when no project is given
pub const PROJECT_ENV: &str = "GCE_PROJECT";

const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Assembles a [`DnsProvider`]. Zero values fall back to the defaults.
#[derive(Default)]
pub struct Builder {
    project: String,
    api_base: String,
    token_source: Option<Arc<dyn TokenSource>>,
    service_account_file: Option<PathBuf>,
    ttl: u32,
    polling_interval: Duration,
    change_timeout: Duration,
    skip_propagation_check: bool,
    propagation_attempts: u32,
    propagation_interval: Duration,
    nameservers: Vec<IpAddr>,
    api_timeout: Duration,
}

impl Builder {
    pub fn project<T: AsRef<str>>(mut self, project: T) -> Self {
        self.project = project.as_ref().to_string();
        self
    }

    pub fn api_base<T: AsRef<str>>(mut self, base: T) -> Self {
        self.api_base = base.as_ref().to_string();
        self
    }

    /// Skips credential discovery and signs requests with `source`.
    pub fn token_source(mut self, source: Arc<dyn TokenSource>) -> Self {
        self.token_source = Some(source);
        self
    }

    pub fn service_account_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.service_account_file = Some(path.into());
        self
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    pub fn change_timeout(mut self, timeout: Duration) -> Self {
        self.change_timeout = timeout;
        self
    }

    pub fn propagation_check(mut self, enabled: bool) -> Self {
        self.skip_propagation_check = !enabled;
        self
    }

    pub fn propagation_attempts(mut self, attempts: u32) -> Self {
        self.propagation_attempts = attempts;
        self
    }

    pub fn propagation_interval(mut self, interval: Duration) -> Self {
        self.propagation_interval = interval;
        self
    }

    pub fn nameservers(mut self, nameservers: Vec<IpAddr>) -> Self {
        self.nameservers = nameservers;
        self
    }

    pub fn api_timeout(mut self, timeout: Duration) -> Self {
        self.api_timeout = timeout;
        self
    }

    fn resolved_project(&self) -> Result<String> {
        let project = if self.project.is_empty() {
            std::env::var(PROJECT_ENV).unwrap_or_default()
        } else {
            self.project.clone()
        };
        if project.is_empty() {
            return Err(Error::ProjectMissing);
        }
        Ok(project)
    }

    fn settings(&self) -> Settings {
        let defaults = Settings::default();
        let propagation = if self.skip_propagation_check {
            None
        } else {
            let defaults = PropagationSettings::default();
            Some(PropagationSettings {
                attempts: if self.propagation_attempts > 0 {
                    self.propagation_attempts
                } else {
                    defaults.attempts
                },
                interval: if self.propagation_interval.is_zero() {
                    defaults.interval
                } else {
                    self.propagation_interval
                },
            })
        };
        Settings {
            ttl: (self.ttl > 0).then_some(self.ttl),
            polling_interval: if self.polling_interval.is_zero() {
                defaults.polling_interval
            } else {
                self.polling_interval
            },
            change_timeout: if self.change_timeout.is_zero() {
                defaults.change_timeout
            } else {
                self.change_timeout
            },
            propagation,
        }
    }

    pub async fn build(self) -> Result<DnsProvider> {
        let project = self.resolved_project()?;

        let tokens: Arc<dyn TokenSource> = match (&self.token_source, &self.service_account_file) {
            (Some(source), _) => source.clone(),
            (None, Some(path)) => Arc::new(AmbientCredentials::from_file(path.clone()).await?),
            (None, None) => Arc::new(AmbientCredentials::discover().await?),
        };

        let api_timeout = if self.api_timeout.is_zero() {
            Duration::from_secs(DEFAULT_API_TIMEOUT_SECS)
        } else {
            self.api_timeout
        };
        let client = Client::builder()
            .timeout(api_timeout)
            .build()
            .map_err(Error::Client)?;
        let base = if self.api_base.is_empty() {
            DEFAULT_API_BASE
        } else {
            self.api_base.as_str()
        };
        let api = CloudDns::new(client, base, &project, tokens);

        let settings = self.settings();
        let checker = settings
            .propagation
            .as_ref()
            .map(|_| PropagationChecker::with_nameservers(&self.nameservers));

        tracing::debug!(project = %project, base, propagation = checker.is_some(), "Google Cloud DNS provider ready");
        Ok(DnsProvider::from_parts(api, settings, checker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values_use_defaults() {
        let settings = Builder::default().settings();
        let defaults = Settings::default();
        assert_eq!(None, settings.ttl);
        assert_eq!(defaults.polling_interval, settings.polling_interval);
        assert_eq!(defaults.change_timeout, settings.change_timeout);
        assert_eq!(120, settings.propagation.unwrap().attempts);
    }

    #[test]
    fn overrides_are_kept() {
        let settings = Builder::default()
            .ttl(300)
            .polling_interval(Duration::from_millis(10))
            .change_timeout(Duration::from_secs(5))
            .propagation_attempts(3)
            .settings();
        assert_eq!(Some(300), settings.ttl);
        assert_eq!(Duration::from_millis(10), settings.polling_interval);
        assert_eq!(Duration::from_secs(5), settings.change_timeout);
        assert_eq!(3, settings.propagation.unwrap().attempts);
    }

    #[test]
    fn propagation_check_can_be_disabled() {
        let settings = Builder::default().propagation_check(false).settings();
        assert!(settings.propagation.is_none());
    }

    #[test]
    fn explicit_project_wins() {
        let project = Builder::default().project("my-project").resolved_project();
        assert_eq!("my-project", project.unwrap());
    }
}
