//! Scan reports, ordered deterministically for presentation

use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

use netsweep_common::{PortRange, ScanStats};
use netsweep_target_resolver::NetworkRange;

/// Final, sorted result of one request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScanReport {
    Discovery {
        network: NetworkRange,
        liveness_port: u16,
        live_hosts: Vec<Ipv4Addr>,
        complete: bool,
        stats: ScanStats,
    },
    PortScan {
        address: Ipv4Addr,
        ports: PortRange,
        open_ports: Vec<u16>,
        complete: bool,
        stats: ScanStats,
    },
}

impl ScanReport {
    /// False when the overall deadline expired before every probe ran, or
    /// when a target was skipped because no socket could be allocated.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match self {
            ScanReport::Discovery { complete, .. } | ScanReport::PortScan { complete, .. } => {
                *complete
            }
        }
    }

    #[must_use]
    pub fn stats(&self) -> &ScanStats {
        match self {
            ScanReport::Discovery { stats, .. } | ScanReport::PortScan { stats, .. } => stats,
        }
    }

    /// Nothing live / nothing open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            ScanReport::Discovery { live_hosts, .. } => live_hosts.is_empty(),
            ScanReport::PortScan { open_ports, .. } => open_ports.is_empty(),
        }
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanReport::Discovery { live_hosts, .. } if live_hosts.is_empty() => {
                f.write_str("No devices found on the network.")
            }
            ScanReport::Discovery { live_hosts, .. } => {
                f.write_str("Devices found on the network:")?;
                for ip in live_hosts {
                    write!(f, "\n{ip}")?;
                }
                Ok(())
            }
            ScanReport::PortScan {
                address,
                open_ports,
                ..
            } if open_ports.is_empty() => write!(f, "No open ports found on {address}"),
            ScanReport::PortScan {
                address,
                open_ports,
                ..
            } => write!(f, "Open ports on {address}: {open_ports:?}"),
        }
    }
}
