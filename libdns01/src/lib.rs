pub mod challenge;
pub mod error;
pub mod propagation;

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};

pub use challenge::{ChallengeProvider, Timeout};
pub use error::{Error, Result};
pub use propagation::{wait_for, PropagationChecker};

/// Label prepended to the domain to form the challenge record name
pub const ACME_CHALLENGE_LABEL: &str = "_acme-challenge";

/// TTL used for challenge records unless a provider overrides it
pub const DEFAULT_TTL: u32 = 120;

/// Returns the domain with a trailing dot, adding it if missing.
pub fn to_fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// The TXT record that satisfies a DNS-01 challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dns01Record {
    /// Fully qualified record name, always ending in a dot
    pub fqdn: String,
    /// base64url (unpadded) SHA-256 digest of the key authorization
    pub value: String,
    pub ttl: u32,
}

impl Dns01Record {
    /// Derives the challenge record for `domain` from the key authorization.
    ///
    /// Wildcard domains share the record of their base domain, so
    /// `*.example.com` and `example.com` yield the same name.
    pub fn new(domain: &str, key_auth: &str) -> Self {
        let domain = domain.strip_prefix("*.").unwrap_or(domain);
        let fqdn = to_fqdn(&format!("{ACME_CHALLENGE_LABEL}.{domain}"));
        let digest = Sha256::digest(key_auth.as_bytes());
        Self {
            fqdn,
            value: URL_SAFE_NO_PAD.encode(digest),
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }
}

impl fmt::Display for Dns01Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} IN TXT \"{}\"", self.fqdn, self.ttl, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_for_domain() {
        let record = Dns01Record::new("example.com", "keyAuthValue");
        assert_eq!("_acme-challenge.example.com.", record.fqdn);
        assert_eq!("O5Jl645Vz7NEse9S8fl9rL7hZCYTZcRzB7vB8Nkygkw", record.value);
        assert_eq!(DEFAULT_TTL, record.ttl);
    }

    #[test]
    fn test_record_value_has_no_padding() {
        let record = Dns01Record::new("example.com", "123d==");
        assert_eq!("ADw2sEd82DUgXcQ9hNBZThJs7zVJkR5v9JeSbAb9mZY", record.value);
        assert!(!record.value.contains('='));
    }

    #[test]
    fn test_record_for_wildcard() {
        let wildcard = Dns01Record::new("*.sub.example.com", "token.thumbprint");
        let plain = Dns01Record::new("sub.example.com", "token.thumbprint");
        assert_eq!("_acme-challenge.sub.example.com.", wildcard.fqdn);
        assert_eq!(plain, wildcard);
        assert_eq!("61rBZ_4knHblO0MNoxFsXZ_eTFUHum0B6IVRbhvUn5I", wildcard.value);
    }

    #[test]
    fn test_record_for_rooted_domain() {
        let record = Dns01Record::new("example.com.", "keyAuthValue");
        assert_eq!("_acme-challenge.example.com.", record.fqdn);
    }

    #[test]
    fn test_record_with_ttl() {
        let record = Dns01Record::new("example.com", "keyAuthValue").with_ttl(300);
        assert_eq!(300, record.ttl);
        assert_eq!(
            "_acme-challenge.example.com. 300 IN TXT \"O5Jl645Vz7NEse9S8fl9rL7hZCYTZcRzB7vB8Nkygkw\"",
            record.to_string()
        );
    }

    #[test]
    fn test_to_fqdn() {
        assert_eq!("example.com.", to_fqdn("example.com"));
        assert_eq!("example.com.", to_fqdn("example.com."));
    }
}
