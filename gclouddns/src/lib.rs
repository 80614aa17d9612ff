//! Google Cloud DNS provider for ACME DNS-01 challenges
//!
//! Publishes `_acme-challenge` TXT records in a Cloud DNS managed zone,
//! waits for the change to be applied and, unless disabled, for public
//! resolvers to serve the record.

pub mod api;
pub mod builder;
pub mod config;
pub mod credentials;
pub mod error;
pub mod provider;
pub mod types;

pub use builder::Builder;
pub use config::Config;
pub use error::{Error, Result};
pub use libdns01::{ChallengeProvider, Dns01Record, Timeout};
pub use provider::DnsProvider;
