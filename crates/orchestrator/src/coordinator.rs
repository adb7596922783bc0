// crates/orchestrator/src/coordinator.rs
//! Scan coordinator - validates a request, sizes the worker pool and turns
//! scanner findings into a report.

use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use netsweep_common::{PortRange, ScanError, ScanOptions, Transport, DEFAULT_LIVENESS_PORT};
use netsweep_scanner_tcp::ConnectProbe;
use netsweep_target_resolver::{parse_address, NetworkRange};

use crate::discovery::DiscoveryScanner;
use crate::pool::WorkerPool;
use crate::port_scan::PortScanner;
use crate::report::ScanReport;

/// What a request scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanMode {
    Discovery {
        range: NetworkRange,
        liveness_port: u16,
    },
    PortScan {
        address: Ipv4Addr,
        ports: PortRange,
    },
}

/// One invocation's worth of work. Consumed by [`ScanCoordinator::execute`].
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub id: Uuid,
    pub mode: ScanMode,
    pub options: ScanOptions,
}

impl ScanRequest {
    fn with_mode(mode: ScanMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode,
            options: ScanOptions::default(),
        }
    }

    pub fn discovery(range: NetworkRange) -> Self {
        Self::with_mode(ScanMode::Discovery {
            range,
            liveness_port: DEFAULT_LIVENESS_PORT,
        })
    }

    pub fn port_scan(address: Ipv4Addr) -> Self {
        Self::with_mode(ScanMode::PortScan {
            address,
            ports: PortRange::default(),
        })
    }

    /// Discovery request from CIDR text such as `192.168.1.0/24`.
    pub fn parse_discovery(cidr: &str) -> Result<Self, ScanError> {
        Ok(Self::discovery(cidr.parse()?))
    }

    /// Port-scan request from a single IPv4 address string.
    pub fn parse_port_scan(address: &str) -> Result<Self, ScanError> {
        Ok(Self::port_scan(parse_address(address)?))
    }

    #[must_use]
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the liveness port. No effect on port scans.
    #[must_use]
    pub fn with_liveness_port(mut self, port: u16) -> Self {
        if let ScanMode::Discovery { liveness_port, .. } = &mut self.mode {
            *liveness_port = port;
        }
        self
    }

    /// Override the port range. No effect on discovery.
    #[must_use]
    pub fn with_ports(mut self, range: PortRange) -> Self {
        if let ScanMode::PortScan { ports, .. } = &mut self.mode {
            *ports = range;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        self.options.validate()?;
        if let ScanMode::Discovery { liveness_port: 0, .. } = self.mode {
            return Err(ScanError::Config("liveness port must be non-zero".into()));
        }
        Ok(())
    }
}

/// Runs requests to completion (or to their deadline) over one transport.
pub struct ScanCoordinator {
    probe: ConnectProbe,
}

impl ScanCoordinator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            probe: ConnectProbe::new(transport),
        }
    }

    /// Coordinator over real TCP sockets.
    pub fn tcp() -> Self {
        Self {
            probe: ConnectProbe::tcp(),
        }
    }

    #[instrument(skip(self, request), fields(id = %request.id))]
    pub async fn execute(&self, request: ScanRequest) -> Result<ScanReport, ScanError> {
        request.validate()?;
        let pool = WorkerPool::new(&request.options)?;

        let report = match request.mode {
            ScanMode::Discovery {
                range,
                liveness_port,
            } => {
                info!(
                    "Discovering devices in {} via port {} (concurrency {})",
                    range,
                    liveness_port,
                    pool.concurrency()
                );
                let findings = DiscoveryScanner::new(self.probe.clone())
                    .discover(&pool, &range, liveness_port)
                    .await?;
                ScanReport::Discovery {
                    network: range,
                    liveness_port,
                    live_hosts: findings.found,
                    complete: findings.complete,
                    stats: findings.stats,
                }
            }
            ScanMode::PortScan { address, ports } => {
                info!(
                    "Scanning {} for open ports {} (concurrency {})",
                    address,
                    ports,
                    pool.concurrency()
                );
                let findings = PortScanner::new(self.probe.clone())
                    .scan(&pool, address, ports)
                    .await?;
                ScanReport::PortScan {
                    address,
                    ports,
                    open_ports: findings.found,
                    complete: findings.complete,
                    stats: findings.stats,
                }
            }
        };

        Ok(report)
    }
}

impl Default for ScanCoordinator {
    fn default() -> Self {
        Self::tcp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Answer, ScriptedTransport};
    use std::net::SocketAddrV4;
    use std::time::{Duration, Instant};

    fn coordinator(transport: ScriptedTransport) -> ScanCoordinator {
        ScanCoordinator::new(Arc::new(transport))
    }

    fn scripted_host() -> ScriptedTransport {
        let host = Ipv4Addr::new(10, 9, 8, 7);
        ScriptedTransport::new(Answer::Refused)
            .answer(SocketAddrV4::new(host, 443), Answer::OpenAfter(Duration::from_millis(5)))
            .answer(SocketAddrV4::new(host, 22), Answer::OpenAfter(Duration::from_millis(25)))
            .answer(SocketAddrV4::new(host, 80), Answer::Open)
            .answer(SocketAddrV4::new(host, 25), Answer::Silent)
    }

    #[tokio::test]
    async fn malformed_input_fails_before_probing() {
        assert!(matches!(
            ScanRequest::parse_discovery("10.0.0.0/40"),
            Err(ScanError::InvalidRange(_))
        ));
        assert!(matches!(
            ScanRequest::parse_port_scan("10.0.0"),
            Err(ScanError::InvalidAddress(_))
        ));

        let transport = ScriptedTransport::new(Answer::Open);
        let calls = transport.calls();
        let request = ScanRequest::parse_discovery("10.0.0.0/30")
            .unwrap()
            .with_options(ScanOptions::default().with_concurrency(0));
        let err = coordinator(transport).execute(request).await.unwrap_err();
        assert!(err.is_input_error());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn discovery_report() {
        let live = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 135);
        let transport = ScriptedTransport::new(Answer::Refused).answer(live, Answer::Open);
        let request = ScanRequest::parse_discovery("10.0.0.2/30").unwrap();

        let report = coordinator(transport).execute(request).await.unwrap();
        assert_eq!(report.to_string(), "Devices found on the network:\n10.0.0.1");
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn ordering_independent_of_concurrency() {
        let mut rendered = Vec::new();
        for concurrency in [1, 50] {
            let request = ScanRequest::parse_port_scan("10.9.8.7")
                .unwrap()
                .with_ports(PortRange::new(1, 500).unwrap())
                .with_options(
                    ScanOptions::default()
                        .with_concurrency(concurrency)
                        .with_timeout(Duration::from_millis(30)),
                );
            let report = coordinator(scripted_host()).execute(request).await.unwrap();
            rendered.push(report.to_string());
        }
        assert_eq!(rendered[0], "Open ports on 10.9.8.7: [22, 80, 443]");
        assert_eq!(rendered[0], rendered[1]);
    }

    #[tokio::test]
    async fn deadline_yields_empty_partial_result() {
        let request = ScanRequest::parse_discovery("192.0.2.0/24")
            .unwrap()
            .with_options(
                ScanOptions::default()
                    .with_concurrency(32)
                    .with_timeout(Duration::from_secs(10))
                    .with_deadline(Duration::from_millis(100)),
            );

        let start = Instant::now();
        let report = coordinator(ScriptedTransport::new(Answer::Silent))
            .execute(request)
            .await
            .unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(1000), "took {elapsed:?}");
        assert!(report.is_empty());
        assert!(!report.is_complete());
        assert_eq!(report.to_string(), "No devices found on the network.");
    }

    #[tokio::test]
    async fn exhaustion_aborts_instead_of_empty_success() {
        let request = ScanRequest::parse_port_scan("127.0.0.1")
            .unwrap()
            .with_options(ScanOptions::default().with_exhaustion_threshold(16));

        let err = coordinator(ScriptedTransport::new(Answer::Exhausted))
            .execute(request)
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::ResourceExhausted { .. }));
    }

    #[tokio::test]
    async fn skipped_target_marks_report_incomplete() {
        let host = Ipv4Addr::new(10, 9, 8, 7);
        let transport = ScriptedTransport::new(Answer::Refused)
            .answer(SocketAddrV4::new(host, 80), Answer::Open)
            .answer(SocketAddrV4::new(host, 22), Answer::Exhausted);
        let request = ScanRequest::parse_port_scan("10.9.8.7")
            .unwrap()
            .with_ports(PortRange::new(1, 100).unwrap());

        let report = coordinator(transport).execute(request).await.unwrap();
        assert_eq!(report.to_string(), "Open ports on 10.9.8.7: [80]");
        assert!(!report.is_complete());
        assert_eq!(report.stats().allocation_failures, 1);
        assert_eq!(report.stats().scanned, 99);
    }

    #[tokio::test]
    async fn exhaustion_on_tiny_block_still_aborts() {
        // Fewer targets than the threshold, but not one socket was obtained.
        let request = ScanRequest::parse_discovery("10.0.0.0/30").unwrap();
        let err = coordinator(ScriptedTransport::new(Answer::Exhausted))
            .execute(request)
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::ResourceExhausted { attempts: 4 }));
    }

    #[test]
    fn request_builders() {
        let request = ScanRequest::parse_discovery("10.0.0.0/24")
            .unwrap()
            .with_liveness_port(445)
            .with_ports(PortRange::new(1, 2).unwrap());
        assert_eq!(
            request.mode,
            ScanMode::Discovery {
                range: "10.0.0.0/24".parse().unwrap(),
                liveness_port: 445,
            }
        );
        assert!(request
            .clone()
            .with_liveness_port(0)
            .validate()
            .is_err());

        let scan = ScanRequest::parse_port_scan("10.0.0.5").unwrap();
        assert_eq!(
            scan.mode,
            ScanMode::PortScan {
                address: Ipv4Addr::new(10, 0, 0, 5),
                ports: PortRange::default(),
            }
        );
        assert_ne!(scan.id, request.id);
    }
}
