#![deny(missing_docs)]
//! The otpnet daemon: encodes or decodes one request per connection.

use clap::Parser;
use log::{error, info};
use otpnet_daemon::config::ConfigError;
use otpnet_daemon::{DaemonConfig, Dispatcher, Role};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "EXAMPLES:\n  \n# Run an encode daemon on port 57171\notpnet-daemon 57171\n\n# Run a decode daemon with three workers\notpnet-daemon 57172 --role decode --max-workers 3\n\n# Start from a config file and override the port\notpnet-daemon 57173 --config ./otpnet.json"
)]
struct Cli {
    /// Port to listen on.
    #[arg(env = "OTPNET_PORT")]
    port: Option<u16>,

    /// Address to bind.
    #[arg(long, env = "OTPNET_HOST")]
    host: Option<String>,

    /// Direction served by this daemon.
    #[arg(long, value_enum, env = "OTPNET_ROLE")]
    role: Option<Role>,

    /// Maximum number of connections handled at once.
    #[arg(long, env = "OTPNET_MAX_WORKERS")]
    max_workers: Option<usize>,

    /// Largest text plus key size accepted, in bytes.
    #[arg(long, env = "OTPNET_MAX_PAYLOAD")]
    max_payload: Option<u64>,

    /// Abort an exchange that takes longer than this many seconds.
    #[arg(long, value_name = "SECS", env = "OTPNET_TIMEOUT")]
    timeout: Option<u64>,

    /// JSON file with base settings. Flags override it.
    #[arg(long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,
}

fn build_config(cli: Cli) -> Result<DaemonConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => DaemonConfig::load(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(port) = cli.port {
        config.port = port;
    } else if cli.config.is_none() {
        return Err(ConfigError::Invalid(
            "a PORT is required when no --config is given".to_string(),
        ));
    }
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(role) = cli.role {
        config.role = role;
    }
    if let Some(max_workers) = cli.max_workers {
        config.max_workers = max_workers;
    }
    if let Some(max_payload) = cli.max_payload {
        config.max_payload = max_payload;
    }
    if let Some(timeout) = cli.timeout {
        config.io_timeout_secs = Some(timeout);
    }
    config.validate()?;
    Ok(config)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C"),
        Err(e) => {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = build_config(cli).unwrap_or_else(|e| {
        error!("{e}");
        std::process::exit(1);
    });

    let dispatcher = match Dispatcher::bind(config.clone()).await {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            error!("Failed to bind {}:{}: {e}", config.host, config.port);
            std::process::exit(1);
        }
    };
    println!("{}", dispatcher.local_addr());

    dispatcher.run_until(shutdown_signal()).await;
}
