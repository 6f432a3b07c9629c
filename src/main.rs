//! # Cloud Resource Gateway
//!
//! Runs one tier of the gateway per process:
//!
//! - `cloud-resource-gateway connector` serves `/aws/...` from S3 and Parameter Store
//! - `cloud-resource-gateway gateway` forwards `<API_PREFIX>/...` to the connector
//!
//! Configuration comes from environment variables (see `config`); the flags
//! below only override the listen port and the log filter.

use anyhow::Result;
use clap::{Parser, Subcommand};
use cloud_resource_gateway::config::{ConnectorConfig, GatewayConfig};
use cloud_resource_gateway::server;
use tracing::warn;

/// Default `RUST_LOG` filter when the variable is unset
const DEFAULT_LOG_FILTER: &str = "cloud_resource_gateway=info,tower_http=info";

#[derive(Parser)]
#[command(name = "cloud-resource-gateway")]
#[command(
    about = "Read-only HTTP gateway for cloud resources",
    long_about = None,
    after_help = "\
Examples:
  cloud-resource-gateway connector
  cloud-resource-gateway gateway --port 9000
"
)]
struct Cli {
    #[command(subcommand)]
    tier: Tier,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true)]
    log_filter: Option<String>,
}

#[derive(Subcommand)]
enum Tier {
    /// Front tier forwarding to the connector
    Gateway {
        /// Listen port (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Backend tier talking to AWS
    Connector {
        /// Listen port (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Must happen before any TLS client is built
    let provider_installed = rustls::crypto::ring::default_provider()
        .install_default()
        .is_ok();

    let default_filter = cli.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    if !provider_installed {
        warn!("rustls crypto provider was already installed, keeping the existing one");
    }

    match cli.tier {
        Tier::Gateway { port } => {
            let mut config = GatewayConfig::from_env();
            if let Some(port) = port {
                config.port = port;
            }
            server::gateway::run(config).await
        }
        Tier::Connector { port } => {
            let mut config = ConnectorConfig::from_env();
            if let Some(port) = port {
                config.port = port;
            }
            server::connector::run(config).await
        }
    }
}
