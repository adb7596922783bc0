//! Host discovery: one liveness-port probe per address of a block

use std::net::{Ipv4Addr, SocketAddrV4};
use tracing::debug;

use netsweep_common::ScanError;
use netsweep_scanner_tcp::ConnectProbe;
use netsweep_target_resolver::NetworkRange;

use crate::pool::{Findings, WorkerPool};

pub struct DiscoveryScanner {
    probe: ConnectProbe,
}

impl DiscoveryScanner {
    pub fn new(probe: ConnectProbe) -> Self {
        Self { probe }
    }

    /// Addresses in `range` with `liveness_port` open, ascending.
    ///
    /// Discovery is binary: closed, unreachable and silent hosts are all
    /// simply absent from the result.
    pub async fn discover(
        &self,
        pool: &WorkerPool,
        range: &NetworkRange,
        liveness_port: u16,
    ) -> Result<Findings<Ipv4Addr>, ScanError> {
        debug!(
            "Discovering hosts in {} ({} addresses) on port {}",
            range,
            range.address_count(),
            liveness_port
        );
        let work = range
            .addresses()
            .map(move |ip| SocketAddrV4::new(ip, liveness_port));

        let findings = pool.run(&self.probe, work).await?.open_by(|addr| *addr.ip());
        for ip in &findings.found {
            debug!(%ip, "Host is up");
        }
        Ok(findings)
    }
}
