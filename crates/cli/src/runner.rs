// runner.rs
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

use netsweep_common::{PortRange, ScanOptions};
use netsweep_orchestrator::{ScanCoordinator, ScanRequest};

use crate::args::Tuning;
use crate::output::print_report;

pub async fn run_discovery(network: String, liveness_port: u16, tuning: Tuning) -> Result<()> {
    let options = scan_options(&tuning)?;
    let request = ScanRequest::parse_discovery(&network)
        .with_context(|| format!("Cannot discover devices in '{network}'"))?
        .with_liveness_port(liveness_port)
        .with_options(options);

    info!("Discovering devices...");
    execute(request, &tuning.output_format).await
}

pub async fn run_port_scan(address: String, ports: String, tuning: Tuning) -> Result<()> {
    let options = scan_options(&tuning)?;
    let ports: PortRange = ports.parse()?;
    let request = ScanRequest::parse_port_scan(&address)
        .with_context(|| format!("Cannot scan '{address}'"))?
        .with_ports(ports)
        .with_options(options);

    info!("Scanning IP: {}", address);
    execute(request, &tuning.output_format).await
}

async fn execute(request: ScanRequest, output_format: &str) -> Result<()> {
    let report = ScanCoordinator::tcp()
        .execute(request)
        .await
        .context("Scan aborted")?;
    print_report(&report, output_format)
}

/// Preset values, then any explicit flag on top.
fn scan_options(tuning: &Tuning) -> Result<ScanOptions> {
    let mut options = ScanOptions::preset(&tuning.preset)?;
    if let Some(ms) = tuning.timeout {
        options = options.with_timeout(Duration::from_millis(ms));
    }
    if let Some(concurrency) = tuning.concurrency {
        options = options.with_concurrency(concurrency);
    }
    if let Some(ms) = tuning.deadline {
        options = options.with_deadline(Duration::from_millis(ms));
    }
    if let Some(rate) = tuning.rate_limit {
        options = options.with_rate_limit(rate);
    }
    if let Some(attempts) = tuning.exhaustion_threshold {
        options = options.with_exhaustion_threshold(attempts);
    }
    options.validate()?;

    info!(
        "Timeout: {:?}, concurrency: {}, deadline: {:?}, rate limit: {:?}/s",
        options.timeout, options.max_concurrency, options.deadline, options.rate_limit
    );
    Ok(options)
}
