//! Redfish Exporter binary
//!
//! Serves hardware metrics collected from Redfish management controllers.

use anyhow::Context;
use clap::{Parser, Subcommand};
use redfish_exporter::{
    start_web_server, AppState, CollectorRegistry, ExporterConfig, RedfishBinder, WebConfig,
    DEFAULT_CONFIG_PATH,
};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "redfish_exporter")]
#[command(about = "Metrics exporter for Redfish management controllers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Override the configured bind address
    #[arg(long)]
    host: Option<String>,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the exporter (default)
    Serve,

    /// Load and validate the configuration, print it and exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ExporterConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config))?;

    match cli.command {
        Some(Commands::CheckConfig) => check_config(&config),
        Some(Commands::Serve) | None => {
            init_logging(cli.verbose || config.verbose)?;
            serve(&cli, config).await
        }
    }
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = log_filter(verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok());

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// `RUST_LOG` directives when given and valid, else DEBUG or INFO by verbosity.
fn log_filter(verbose: bool, directives: Option<String>) -> EnvFilter {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level.as_str().to_lowercase()))
}

fn check_config(config: &ExporterConfig) -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(&config.redacted())?;
    println!("{}", yaml);
    Ok(())
}

async fn serve(cli: &Cli, config: ExporterConfig) -> anyhow::Result<()> {
    info!(
        "Build information: version={} revision={}",
        env!("CARGO_PKG_VERSION"),
        option_env!("GIT_REVISION").unwrap_or("unknown")
    );
    if let Some(host) = config.single_host() {
        info!("Single-host mode: only answering for {}", host);
    }

    let mut web_config = WebConfig::from_config(&config);
    if let Some(host) = &cli.host {
        web_config = web_config.with_host(host);
    }
    if let Some(port) = cli.port {
        web_config = web_config.with_port(port);
    }

    let config = Arc::new(config);
    let binder = Arc::new(RedfishBinder::new(config.clone())?);
    let registry = Arc::new(CollectorRegistry::new(config, binder));

    start_web_server(web_config, AppState::new(registry)).await?;

    Ok(())
}
