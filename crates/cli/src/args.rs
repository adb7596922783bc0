use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "netsweep")]
#[command(version)]
#[command(about = "TCP connect host discovery and port scanner", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover live devices in a network range
    Discover {
        /// Network in CIDR notation. Example: 192.168.1.0/24
        network: String,

        /// Port probed to decide whether a host is up
        #[arg(short = 'l', long, default_value_t = netsweep_common::DEFAULT_LIVENESS_PORT)]
        liveness_port: u16,

        #[command(flatten)]
        tuning: Tuning,
    },
    /// Scan a device for open TCP ports
    Ports {
        /// IPv4 address of the device. Example: 192.168.1.10
        address: String,

        /// Inclusive port range. Examples: 1-1024 or 443
        #[arg(short, long, default_value = "1-1024")]
        ports: String,

        #[command(flatten)]
        tuning: Tuning,
    },
}

#[derive(Args, Debug, Clone)]
pub struct Tuning {
    /// Preset: fast, balanced, accurate, stealth
    #[arg(long, default_value = "balanced", value_parser = ["fast", "balanced", "accurate", "stealth"])]
    pub preset: String,

    /// Per-probe timeout in milliseconds (overrides preset)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Max concurrent probes (overrides preset)
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Overall deadline in milliseconds; partial results are printed when it expires
    #[arg(long)]
    pub deadline: Option<u64>,

    /// Rate limit in probes per second (overrides preset)
    #[arg(short = 'r', long)]
    pub rate_limit: Option<u32>,

    /// Consecutive socket allocation failures tolerated before aborting
    #[arg(long)]
    pub exhaustion_threshold: Option<usize>,

    /// Output format: text, json, csv
    #[arg(short, long, default_value = "text")]
    pub output_format: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_discover_with_defaults() {
        let cli = Cli::try_parse_from(["netsweep", "discover", "192.168.1.0/24"]).unwrap();
        match cli.command {
            Commands::Discover {
                network,
                liveness_port,
                tuning,
            } => {
                assert_eq!(network, "192.168.1.0/24");
                assert_eq!(liveness_port, 135);
                assert_eq!(tuning.preset, "balanced");
                assert!(tuning.timeout.is_none());
            }
            _ => panic!("expected discover"),
        }
    }

    #[test]
    fn parses_ports_with_overrides() {
        let cli = Cli::try_parse_from([
            "netsweep", "-v", "ports", "10.0.0.5", "-p", "20-25", "--timeout", "250", "-c", "64",
            "--deadline", "5000", "-o", "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Ports {
                address,
                ports,
                tuning,
            } => {
                assert_eq!(address, "10.0.0.5");
                assert_eq!(ports, "20-25");
                assert_eq!(tuning.timeout, Some(250));
                assert_eq!(tuning.concurrency, Some(64));
                assert_eq!(tuning.deadline, Some(5000));
                assert_eq!(tuning.output_format, "json");
            }
            _ => panic!("expected ports"),
        }
    }

    #[test]
    fn rejects_unknown_preset() {
        assert!(Cli::try_parse_from(["netsweep", "ports", "10.0.0.5", "--preset", "loud"]).is_err());
    }
}
