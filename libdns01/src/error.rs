use thiserror;
use trust_dns_resolver::error::ResolveError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("DNS lookup: {0}")]
    Lookup(#[from] ResolveError),
    #[error("record not propagated after {attempts} attempts, last error: {}", .last_error.as_deref().unwrap_or("none"))]
    PropagationTimeout {
        attempts: u32,
        last_error: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
