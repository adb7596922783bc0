//! TCP connect probing
//!
//! [`ConnectProbe`] is the unit of work every scan is built from: one
//! timeout-bounded handshake attempt, classified into a
//! [`ProbeOutcome`](netsweep_common::ProbeOutcome). [`TcpTransport`] is the
//! production socket layer behind it.

mod probe;
mod transport;

pub use probe::{classify, is_allocation_failure, ConnectProbe};
pub use transport::TcpTransport;
