//! Device listener binary: loads configuration, the device directory, and
//! runs the accept loop plus the periodic statistics reporter.

use clap::Parser;
use device_listener::config::ListenerConfig;
use device_listener::service::reporter::{self, ConsoleReporter};
use device_listener::utils::logging;
use device_listener::{CounterRegistry, DeviceDirectory, DeviceServer, Metrics};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// TCP listener that counts framed messages per field device.
#[derive(Parser, Debug)]
#[command(name = "device-listener", version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the file with device descriptions
    #[arg(short = 'f', long)]
    devices_file: Option<String>,

    /// Address to listen on, e.g. 0.0.0.0:5555
    #[arg(short, long)]
    address: Option<String>,

    /// Interval (in seconds) between statistics prints
    #[arg(short, long)]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() -> device_listener::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ListenerConfig::from_file(path)?,
        None => ListenerConfig::from_env(),
    };
    if let Some(file) = args.devices_file {
        config.devices.file = file;
    }
    if let Some(address) = args.address {
        config.server.address = address;
    }
    if let Some(secs) = args.interval {
        config.report.interval = Duration::from_secs(secs);
    }
    config.validate_strict()?;

    logging::init(&config.logging.level);
    info!(pid = std::process::id(), "Started device listener");

    let directory = Arc::new(match DeviceDirectory::from_file(&config.devices.file) {
        Ok(directory) => {
            info!(
                devices = directory.len(),
                file = %config.devices.file,
                "Loaded device directory"
            );
            directory
        }
        Err(e) => {
            warn!(error = %e, "Continuing with an empty device directory");
            DeviceDirectory::new()
        }
    });

    let registry = Arc::new(CounterRegistry::new());
    let metrics = Arc::new(Metrics::new());

    tokio::spawn(reporter::run(
        Arc::clone(&registry),
        Arc::clone(&directory),
        ConsoleReporter,
        config.report.interval,
    ));

    let server = DeviceServer::bind(
        &config.server.address,
        Arc::clone(&registry),
        Arc::clone(&metrics),
    )
    .await?
    .with_max_connections(config.server.max_connections);

    server.serve().await?;

    metrics.log_summary();
    Ok(())
}
