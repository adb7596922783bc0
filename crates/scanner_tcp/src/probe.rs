// crates/scanner_tcp/src/probe.rs
//! TCP connect probe: one bounded handshake attempt, classified

use std::io::{self, ErrorKind};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::trace;

use netsweep_common::{ProbeOutcome, ScanError, Transport};

use crate::transport::TcpTransport;

/// Performs single connect attempts over a [`Transport`].
///
/// Cheap to clone; workers share one probe.
#[derive(Clone)]
pub struct ConnectProbe {
    transport: Arc<dyn Transport>,
}

impl ConnectProbe {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Probe backed by real tokio sockets.
    pub fn tcp() -> Self {
        Self::new(Arc::new(TcpTransport::new()))
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Attempt a handshake with `address:port`, giving up after `limit`.
    ///
    /// Refusals, unreachable hosts and timeouts come back as outcomes. The
    /// only error is [`ScanError::SocketAllocation`], raised when no local
    /// socket could be obtained for the attempt.
    pub async fn probe(
        &self,
        address: Ipv4Addr,
        port: u16,
        limit: Duration,
    ) -> Result<ProbeOutcome, ScanError> {
        let addr = SocketAddrV4::new(address, port);
        let outcome = match timeout(limit, self.transport.connect(addr)).await {
            Ok(Ok(())) => ProbeOutcome::Open,
            Ok(Err(e)) => classify(e)?,
            // Dropping the connect future closes the half-open socket.
            Err(_) => ProbeOutcome::TimedOut,
        };
        trace!(%addr, %outcome, "probe finished");
        Ok(outcome)
    }
}

/// Map a connect error onto an outcome, or surface an allocation failure.
pub fn classify(err: io::Error) -> Result<ProbeOutcome, ScanError> {
    if is_allocation_failure(&err) {
        return Err(ScanError::SocketAllocation(err));
    }
    Ok(match err.kind() {
        ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset => ProbeOutcome::Closed,
        ErrorKind::TimedOut => ProbeOutcome::TimedOut,
        _ => ProbeOutcome::Unreachable,
    })
}

/// Whether the local stack failed to hand out a socket or ephemeral port.
pub fn is_allocation_failure(err: &io::Error) -> bool {
    if err.kind() == ErrorKind::OutOfMemory {
        return true;
    }
    #[cfg(unix)]
    {
        if let Some(code) = err.raw_os_error() {
            return code == libc::EMFILE
                || code == libc::ENFILE
                || code == libc::ENOBUFS
                || code == libc::ENOMEM
                || code == libc::EADDRNOTAVAIL;
        }
    }
    false
}
