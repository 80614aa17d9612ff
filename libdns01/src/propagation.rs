use std::{future::Future, net::IpAddr, time::Duration};

use tokio::time::{sleep, Instant};
use tracing::{debug, trace, warn};
use trust_dns_resolver::{
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    error::ResolveErrorKind,
    proto::rr::rdata::TXT,
    TokioAsyncResolver,
};

use crate::error::{Error, Result};

/// Checks public resolvers for a published challenge record
pub struct PropagationChecker {
    resolver: TokioAsyncResolver,
}

impl Default for PropagationChecker {
    fn default() -> Self {
        Self::with_config(ResolverConfig::google())
    }
}

impl PropagationChecker {
    /// Queries the given nameservers instead of the public Google resolvers.
    /// An empty list falls back to the default.
    pub fn with_nameservers(nameservers: &[IpAddr]) -> Self {
        if nameservers.is_empty() {
            return Self::default();
        }
        let group = NameServerConfigGroup::from_ips_clear(nameservers, 53, true);
        Self::with_config(ResolverConfig::from_parts(None, vec![], group))
    }

    fn with_config(config: ResolverConfig) -> Self {
        let mut opts = ResolverOpts::default();
        // Every attempt has to hit the network
        opts.cache_size = 0;
        opts.use_hosts_file = false;
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }

    /// Returns true once a TXT record at `fqdn` carries `value`.
    pub async fn pre_check_dns(&self, fqdn: &str, value: &str) -> Result<bool> {
        let lookup = match self.resolver.txt_lookup(fqdn).await {
            Ok(lookup) => lookup,
            Err(error) => {
                if let ResolveErrorKind::NoRecordsFound { .. } = error.kind() {
                    trace!(fqdn, "no TXT records yet");
                    return Ok(false);
                }
                return Err(error.into());
            }
        };
        let found = lookup.iter().any(|txt| {
            let data = txt_string(txt);
            trace!(fqdn, found = %data, expected = value, "TXT record");
            data == value
        });
        Ok(found)
    }
}

/// Joins the character-strings of a TXT record, dropping wrapping quotes.
fn txt_string(txt: &TXT) -> String {
    let joined: String = txt
        .txt_data()
        .iter()
        .map(|data| String::from_utf8_lossy(data))
        .collect();
    joined.trim_matches('"').to_string()
}

/// Runs `check` up to `attempts` times, sleeping `interval` between runs,
/// until it reports success.
///
/// Errors from `check` don't stop the loop, the last one is reported if the
/// attempts run out.
pub async fn wait_for<F, Fut>(attempts: u32, interval: Duration, mut check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let started = Instant::now();
    let mut last_error = None;
    for attempt in 1..=attempts {
        match check().await {
            Ok(true) => {
                debug!(attempt, elapsed = ?started.elapsed(), "check passed");
                return Ok(());
            }
            Ok(false) => {}
            Err(error) => {
                warn!(error = ?error, attempt, "check failed");
                last_error = Some(error.to_string());
            }
        }
        if attempt < attempts {
            sleep(interval).await;
        }
    }
    Err(Error::PropagationTimeout {
        attempts,
        last_error,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use tracing_test::traced_test;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn wait_for_stops_on_success() {
        let calls = &AtomicU32::new(0);
        let result = wait_for(5, Duration::from_secs(2), move || async move {
            Ok(calls.fetch_add(1, Ordering::SeqCst) == 2)
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(3, calls.load(Ordering::SeqCst));
    }

    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn wait_for_reports_last_error() {
        let calls = &AtomicU32::new(0);
        let result = wait_for(3, Duration::from_secs(2), move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::PropagationTimeout {
                    attempts: 0,
                    last_error: Some("lookup refused".to_string()),
                })
            } else {
                Ok(false)
            }
        })
        .await;
        assert_eq!(3, calls.load(Ordering::SeqCst));
        match result {
            Err(Error::PropagationTimeout {
                attempts,
                last_error,
            }) => {
                assert_eq!(3, attempts);
                assert!(last_error.unwrap().contains("lookup refused"));
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert!(logs_contain("check failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_for_sleeps_between_attempts() {
        let started = Instant::now();
        let result = wait_for(4, Duration::from_secs(2), || async { Ok(false) }).await;
        assert!(result.is_err());
        assert_eq!(Duration::from_secs(6), started.elapsed());
    }

    #[test]
    fn txt_string_joins_and_unquotes() {
        let txt = TXT::new(vec!["\"abc".to_string(), "def\"".to_string()]);
        assert_eq!("abcdef", txt_string(&txt));
        let txt = TXT::new(vec!["plain".to_string()]);
        assert_eq!("plain", txt_string(&txt));
    }

    #[tokio::test]
    async fn test_pre_check_dns_live() {
        let fqdn = std::env::var("DNS01_CHECK_FQDN").unwrap_or_default();
        let value = std::env::var("DNS01_CHECK_VALUE").unwrap_or_default();
        if fqdn.is_empty() || value.is_empty() {
            println!("missing data for DNS propagation test, skipping");
            return;
        }
        let checker = PropagationChecker::default();
        assert!(checker.pre_check_dns(&fqdn, &value).await.unwrap());
    }
}
