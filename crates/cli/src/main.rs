mod args;
mod output;
mod runner;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use args::{Cli, Commands};
use runner::{run_discovery, run_port_scan};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Discover {
            network,
            liveness_port,
            tuning,
        } => run_discovery(network, liveness_port, tuning).await?,
        Commands::Ports {
            address,
            ports,
            tuning,
        } => run_port_scan(address, ports, tuning).await?,
    }

    Ok(())
}

/// Logs go to stderr so stdout carries only the report.
fn init_logging(verbose: u8, json: bool) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
