//! Core traits for netsweep components

use async_trait::async_trait;
use std::io;
use std::net::SocketAddrV4;

/// Connection primitive underneath every probe.
///
/// Implementations perform one TCP handshake attempt and release the socket
/// before returning. They apply no timeout of their own; the caller bounds
/// the attempt and drops the future when the timer fires, so the socket must
/// also be released on drop.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Attempt a handshake with `addr`. `Ok(())` means it completed.
    async fn connect(&self, addr: SocketAddrV4) -> io::Result<()>;

    /// Transport name/identifier
    fn name(&self) -> &str;
}
