//! Tokio-backed TCP transport

use async_trait::async_trait;
use std::io;
use std::net::{SocketAddr, SocketAddrV4};
use tokio::net::TcpStream;

use netsweep_common::Transport;

/// Full TCP connect over the OS socket API. No payload is exchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpTransport;

impl TcpTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&self, addr: SocketAddrV4) -> io::Result<()> {
        let stream = TcpStream::connect(SocketAddr::V4(addr)).await?;
        // Close straight away; the handshake is all we wanted.
        drop(stream);
        Ok(())
    }

    fn name(&self) -> &str {
        "TCP Connect"
    }
}
