use clap::Parser;
use dotenvy::dotenv;
use gclouddns::{ChallengeProvider, Config, Dns01Record, DnsProvider};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(clap::Parser)]
struct Arguments {
    /// Overrides GCE_PROJECT
    #[arg(long, short = 'p')]
    project: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Publish the challenge record and wait until it is served
    Present {
        domain: String,
        key_auth: String,
        #[arg(long, default_value = "")]
        token: String,
    },
    /// Remove every challenge record for the domain
    Cleanup {
        domain: String,
        key_auth: String,
        #[arg(long, default_value = "")]
        token: String,
    },
    /// Print the record a key authorization maps to
    Record { domain: String, key_auth: String },
    /// Print how long an ACME server should be given to validate
    Timeout,
}

async fn provider(project: Option<String>) -> anyhow::Result<DnsProvider> {
    let mut config = Config::from_env()?;
    if let Some(project) = project {
        config.project = project;
    }
    Ok(config.provider().await?)
}

async fn run(args: Arguments) -> anyhow::Result<()> {
    match args.command {
        Command::Present {
            domain,
            key_auth,
            token,
        } => {
            let provider = provider(args.project).await?;
            provider.present(&domain, &token, &key_auth).await?;
        }
        Command::Cleanup {
            domain,
            key_auth,
            token,
        } => {
            let provider = provider(args.project).await?;
            provider.clean_up(&domain, &token, &key_auth).await?;
        }
        Command::Record { domain, key_auth } => {
            println!("{}", Dns01Record::new(&domain, &key_auth));
        }
        Command::Timeout => {
            let timeout = gclouddns::Timeout::default();
            println!(
                "timeout={}s interval={}s",
                timeout.timeout.as_secs(),
                timeout.interval.as_secs()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Arguments::parse();
    if let Err(error) = run(args).await {
        tracing::error!(error = ?error, "challenge command failed");
        std::process::exit(1);
    }
}
