//! Single-host port scan over an inclusive port range

use std::net::{Ipv4Addr, SocketAddrV4};
use tracing::debug;

use netsweep_common::{PortRange, ScanError};
use netsweep_scanner_tcp::ConnectProbe;

use crate::pool::{Findings, WorkerPool};

pub struct PortScanner {
    probe: ConnectProbe,
}

impl PortScanner {
    pub fn new(probe: ConnectProbe) -> Self {
        Self { probe }
    }

    /// Open ports of `address` within `ports`, ascending. No open port is an
    /// empty result, not an error.
    pub async fn scan(
        &self,
        pool: &WorkerPool,
        address: Ipv4Addr,
        ports: PortRange,
    ) -> Result<Findings<u16>, ScanError> {
        debug!("Scanning {} port(s) {} on {}", ports.len(), ports, address);
        let work = ports
            .iter()
            .map(move |port| SocketAddrV4::new(address, port));

        let findings = pool.run(&self.probe, work).await?.open_by(|addr| addr.port());
        for port in &findings.found {
            debug!(%address, port, "Port is open");
        }
        Ok(findings)
    }
}
