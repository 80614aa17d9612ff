use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Google Cloud project name missing")]
    ProjectMissing,
    #[error("unable to get Google Cloud client: {0}")]
    Credentials(String),
    #[error("unable to create Google Cloud DNS service: {0}")]
    Client(reqwest::Error),
    #[error("no matching Google Cloud DNS zone found for domain {0}")]
    ZoneNotFound(String),
    #[error("Google Cloud API call failed: HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("http client error {0}")]
    Http(#[from] reqwest::Error),
    #[error("change {change_id} still pending after {secs}s")]
    ChangeTimeout { change_id: String, secs: u64 },
    #[error("DNS propagation: {0}")]
    Propagation(#[from] libdns01::Error),
    #[error("configuration: {0}")]
    Config(#[from] envconfig::Error),
}

pub type Result<T = ()> = std::result::Result<T, Error>;
