use std::time::Duration;

use async_trait::async_trait;
use libdns01::{to_fqdn, wait_for, ChallengeProvider, Dns01Record, PropagationChecker, Timeout};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::{
    api::CloudDns,
    error::{Error, Result},
    types::{Change, ManagedZone, ResourceRecordSet},
};

/// How Present waits for its change to land
#[derive(Debug, Clone)]
pub struct Settings {
    /// Replaces the derived TTL when set
    pub ttl: Option<u32>,
    pub polling_interval: Duration,
    /// Upper bound for a change to leave the pending state
    pub change_timeout: Duration,
    /// Public DNS verification after the change is done. None disables it.
    pub propagation: Option<PropagationSettings>,
}

#[derive(Debug, Clone)]
pub struct PropagationSettings {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for PropagationSettings {
    fn default() -> Self {
        Self {
            attempts: 120,
            interval: Duration::from_secs(2),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ttl: None,
            polling_interval: Duration::from_secs(1),
            change_timeout: Duration::from_secs(180),
            propagation: Some(PropagationSettings::default()),
        }
    }
}

/// DNS-01 challenge provider backed by Google Cloud DNS
pub struct DnsProvider {
    api: CloudDns,
    settings: Settings,
    checker: Option<PropagationChecker>,
}

impl DnsProvider {
    /// Creates a provider for `project`, falling back to `GCE_PROJECT` when
    /// empty. The remaining settings are read from the environment, see
    /// [`crate::Config`].
    pub async fn new(project: &str) -> Result<Self> {
        let mut config = crate::Config::from_env()?;
        if !project.is_empty() {
            config.project = project.to_string();
        }
        config.provider().await
    }

    pub(crate) fn from_parts(
        api: CloudDns,
        settings: Settings,
        checker: Option<PropagationChecker>,
    ) -> Self {
        Self {
            api,
            settings,
            checker,
        }
    }

    pub fn project(&self) -> &str {
        self.api.project()
    }

    fn record(&self, domain: &str, key_auth: &str) -> Dns01Record {
        let record = Dns01Record::new(domain, key_auth);
        match self.settings.ttl {
            Some(ttl) => record.with_ttl(ttl),
            None => record,
        }
    }

    /// Returns the API name of the managed zone serving `domain`.
    pub async fn hosted_zone(&self, domain: &str) -> Result<String> {
        let zones = self.api.managed_zones().await?;
        let zone = find_zone(domain, &zones).ok_or_else(|| Error::ZoneNotFound(domain.to_string()))?;
        debug!(domain, zone = %zone.name, dns_name = %zone.dns_name, "zone resolved");
        Ok(zone.name.clone())
    }

    async fn find_txt_records(&self, zone: &str, fqdn: &str) -> Result<Vec<ResourceRecordSet>> {
        let records = self.api.record_sets(zone).await?;
        Ok(records
            .into_iter()
            .filter(|r| r.is_txt() && r.name == fqdn)
            .collect())
    }

    /// Polls `change` until it is no longer pending.
    async fn wait_for_change(&self, zone: &str, mut change: Change) -> Result<Change> {
        let started = Instant::now();
        while change.is_pending() {
            if started.elapsed() >= self.settings.change_timeout {
                return Err(Error::ChangeTimeout {
                    change_id: change.id,
                    secs: self.settings.change_timeout.as_secs(),
                });
            }
            sleep(self.settings.polling_interval).await;
            change = self.api.change(zone, &change.id).await?;
            debug!(change_id = %change.id, status = ?change.status, "change status");
        }
        Ok(change)
    }
}

/// Picks the zone whose suffix matches `domain`, preferring the longest one.
///
/// Matching is label aligned: `badexample.com` is not served by `example.com.`.
/// Among equally long suffixes the first listed zone wins.
pub fn find_zone<'a>(domain: &str, zones: &'a [ManagedZone]) -> Option<&'a ManagedZone> {
    let name = to_fqdn(domain);
    zones
        .iter()
        .filter(|zone| {
            let suffix = to_fqdn(&zone.dns_name);
            name == suffix || name.ends_with(&format!(".{suffix}"))
        })
        .fold(None, |best: Option<&ManagedZone>, zone| match best {
            Some(best) if best.dns_name.len() >= zone.dns_name.len() => Some(best),
            _ => Some(zone),
        })
}

#[async_trait]
impl ChallengeProvider for DnsProvider {
    type Error = Error;

    async fn present(&self, domain: &str, _token: &str, key_auth: &str) -> Result {
        let record = self.record(domain, key_auth);
        let zone = self.hosted_zone(domain).await?;

        let rrset = ResourceRecordSet::txt(&record.fqdn, &record.value, record.ttl);
        let change = self.api.create_change(&zone, &Change::addition(rrset)).await?;
        debug!(fqdn = %record.fqdn, change_id = %change.id, status = ?change.status, "TXT record submitted");

        let change = self.wait_for_change(&zone, change).await?;
        debug!(fqdn = %record.fqdn, change_id = %change.id, "change done");

        if let (Some(propagation), Some(checker)) = (&self.settings.propagation, &self.checker) {
            wait_for(propagation.attempts, propagation.interval, || {
                checker.pre_check_dns(&record.fqdn, &record.value)
            })
            .await?;
            debug!(fqdn = %record.fqdn, "TXT record propagated");
        }

        info!(domain, fqdn = %record.fqdn, "challenge record present");
        Ok(())
    }

    async fn clean_up(&self, domain: &str, _token: &str, key_auth: &str) -> Result {
        let record = self.record(domain, key_auth);
        let zone = self.hosted_zone(domain).await?;

        let records = self.find_txt_records(&zone, &record.fqdn).await?;
        let total = records.len();
        for (deleted, rrset) in records.into_iter().enumerate() {
            if let Err(error) = self.api.create_change(&zone, &Change::deletion(rrset)).await {
                debug!(fqdn = %record.fqdn, deleted, total, "aborting clean up");
                return Err(error);
            }
        }

        info!(domain, fqdn = %record.fqdn, deleted = total, "challenge records removed");
        Ok(())
    }

    fn timeout(&self) -> Timeout {
        Timeout::default()
    }
}
