use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use routegate::{RouteGateConfig, telemetry, web};

/// Route-calculation gateway for the Google Routes API
#[derive(Debug, Parser)]
#[command(name = "routegate", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "ROUTEGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the configuration
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RouteGateConfig::load_from_path(cli.config)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let _telemetry = telemetry::init(&config.logging, &config.telemetry)?;
    tracing::info!(
        version = routegate::VERSION,
        routes_api = %config.maps.routes_api_url,
        static_dir = %config.server.static_dir.display(),
        "Starting routegate"
    );

    web::run(config).await
}
