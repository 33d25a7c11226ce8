use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use ofwalld::bootstrap::{event_channel, Server};
use ofwalld::config::Config;
use ofwalld::telemetry::{init_tracing, TracingConfig};
use ofwalld::transport::MockFabric;

#[derive(Parser, Debug)]
#[command(name = "ofwalld")]
#[command(author, version, about = "OpenFlow MAC access-control controller")]
struct Args {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Validate config and exit
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first (to get log settings)
    let config = Config::load(&args.config)?;

    init_tracing(&TracingConfig {
        log_level: config.telemetry.log_level.clone(),
        json_logs: config.telemetry.json_logs,
    })?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        "starting ofwalld"
    );

    // Validate only mode
    if args.validate {
        info!("configuration is valid");
        return Ok(());
    }

    // Standalone runs use the in-memory fabric; a protocol transport
    // frontend integrates through the library and feeds the event channel
    // from its switch connections instead.
    let fabric = Arc::new(MockFabric::new());
    let (_events_tx, events_rx) = event_channel(config.settings.event_queue);

    let server = Server::new(config, fabric);
    server.run(events_rx).await?;

    Ok(())
}
