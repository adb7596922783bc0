//! Scripted transport for exercising the pool and scanners without a network.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::net::SocketAddrV4;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use netsweep_common::Transport;
use netsweep_scanner_tcp::ConnectProbe;

#[derive(Debug, Clone, Copy)]
pub enum Answer {
    Open,
    /// Handshake completes after a delay, to reorder completions.
    OpenAfter(Duration),
    Refused,
    Unreachable,
    /// Never answers; the probe timeout or the run deadline ends it.
    Silent,
    /// No local socket available.
    Exhausted,
}

pub struct ScriptedTransport {
    answers: HashMap<SocketAddrV4, Answer>,
    fallback: Answer,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new(fallback: Answer) -> Self {
        Self {
            answers: HashMap::new(),
            fallback,
            calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn answer(mut self, addr: SocketAddrV4, answer: Answer) -> Self {
        self.answers.insert(addr, answer);
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    pub fn peak_in_flight(&self) -> Arc<AtomicUsize> {
        self.peak.clone()
    }

    pub fn into_probe(self) -> ConnectProbe {
        ConnectProbe::new(Arc::new(self))
    }
}

/// Decrements the in-flight gauge however the connect future ends.
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn exhausted() -> io::Error {
    #[cfg(unix)]
    {
        io::Error::from_raw_os_error(libc::EMFILE)
    }
    #[cfg(not(unix))]
    {
        io::ErrorKind::OutOfMemory.into()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(&self, addr: SocketAddrV4) -> io::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(self.in_flight.clone());

        match self.answers.get(&addr).copied().unwrap_or(self.fallback) {
            Answer::Open => Ok(()),
            Answer::OpenAfter(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Answer::Refused => Err(io::ErrorKind::ConnectionRefused.into()),
            Answer::Unreachable => Err(io::ErrorKind::Other.into()),
            Answer::Silent => std::future::pending().await,
            Answer::Exhausted => Err(exhausted()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
