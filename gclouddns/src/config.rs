use std::{net::IpAddr, str::FromStr, time::Duration};

use envconfig::Envconfig;

use crate::{builder::Builder, error::Result, provider::DnsProvider};

#[derive(Debug, Default)]
pub struct IpList(Vec<IpAddr>);

impl FromStr for IpList {
    type Err = std::net::AddrParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let ips = s
            .trim()
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(IpAddr::from_str)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(IpList(ips))
    }
}

#[derive(Debug, Envconfig)]
pub struct Config {
    /// Project owning the managed zones
    #[envconfig(from = "GCE_PROJECT", default = "")]
    pub project: String,
    /// Service account key. Empty uses ambient credential discovery
    #[envconfig(from = "GCE_SERVICE_ACCOUNT_FILE", default = "")]
    pub service_account_file: String,
    #[envconfig(from = "GCE_DNS_API_BASE", default = "https://dns.googleapis.com/dns/v1")]
    pub api_base: String,
    /// TTL for challenge records, 0 keeps the derived one
    #[envconfig(from = "GCE_TTL", default = "0")]
    pub ttl: u32,
    #[envconfig(from = "GCE_POLLING_INTERVAL_MS", default = "1000")]
    pub polling_interval_ms: u64,
    /// How long a change may stay pending
    #[envconfig(from = "GCE_CHANGE_TIMEOUT_SECS", default = "180")]
    pub change_timeout_secs: u64,
    /// Whether Present waits until public resolvers see the record
    #[envconfig(from = "GCE_PROPAGATION_CHECK", default = "true")]
    pub propagation_check: bool,
    #[envconfig(from = "GCE_PROPAGATION_ATTEMPTS", default = "120")]
    pub propagation_attempts: u32,
    #[envconfig(from = "GCE_PROPAGATION_INTERVAL_SECS", default = "2")]
    pub propagation_interval_secs: u64,
    /// Comma separated resolvers for the propagation check
    #[envconfig(from = "GCE_PROPAGATION_NAMESERVERS", default = "")]
    pub propagation_nameservers: IpList,
    #[envconfig(from = "GCE_API_TIMEOUT_SECS", default = "30")]
    pub api_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let hashmap = std::collections::HashMap::new();
        Config::init_from_hashmap(&hashmap).unwrap()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config::init_from_env()?)
    }

    pub fn builder(self) -> Builder {
        let mut builder = Builder::default()
            .project(&self.project)
            .api_base(&self.api_base)
            .ttl(self.ttl)
            .polling_interval(Duration::from_millis(self.polling_interval_ms))
            .change_timeout(Duration::from_secs(self.change_timeout_secs))
            .propagation_check(self.propagation_check)
            .propagation_attempts(self.propagation_attempts)
            .propagation_interval(Duration::from_secs(self.propagation_interval_secs))
            .nameservers(self.propagation_nameservers.0)
            .api_timeout(Duration::from_secs(self.api_timeout_secs));
        if !self.service_account_file.is_empty() {
            builder = builder.service_account_file(self.service_account_file);
        }
        builder
    }

    pub async fn provider(self) -> Result<DnsProvider> {
        self.builder().build().await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::api::DEFAULT_API_BASE;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!("", config.project);
        assert_eq!(DEFAULT_API_BASE, config.api_base);
        assert_eq!(0, config.ttl);
        assert_eq!(1000, config.polling_interval_ms);
        assert_eq!(180, config.change_timeout_secs);
        assert!(config.propagation_check);
        assert_eq!(120, config.propagation_attempts);
        assert_eq!(2, config.propagation_interval_secs);
        assert!(config.propagation_nameservers.0.is_empty());
    }

    #[test]
    fn overrides() {
        let hashmap = HashMap::from([
            ("GCE_PROJECT".to_string(), "my-project".to_string()),
            ("GCE_TTL".to_string(), "300".to_string()),
            ("GCE_PROPAGATION_CHECK".to_string(), "false".to_string()),
            (
                "GCE_PROPAGATION_NAMESERVERS".to_string(),
                "8.8.8.8, 1.1.1.1".to_string(),
            ),
        ]);
        let config = Config::init_from_hashmap(&hashmap).unwrap();
        assert_eq!("my-project", config.project);
        assert_eq!(300, config.ttl);
        assert!(!config.propagation_check);
        assert_eq!(
            vec![
                "8.8.8.8".parse::<IpAddr>().unwrap(),
                "1.1.1.1".parse::<IpAddr>().unwrap()
            ],
            config.propagation_nameservers.0
        );
    }

    #[test]
    fn invalid_nameserver_is_rejected() {
        let hashmap = HashMap::from([(
            "GCE_PROPAGATION_NAMESERVERS".to_string(),
            "not-an-ip".to_string(),
        )]);
        assert!(Config::init_from_hashmap(&hashmap).is_err());
    }
}
