//! Error types for netsweep
//!
//! Per-probe conditions (refused, unreachable, timed out) are not errors;
//! they are reported as [`ProbeOutcome`](crate::ProbeOutcome) values. Only
//! malformed input and systemic socket exhaustion end up here.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid network range: {0}")]
    InvalidRange(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid port range: {0}")]
    InvalidPortRange(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A single connect attempt could not obtain a local socket.
    #[error("Socket allocation failed: {0}")]
    SocketAllocation(#[source] io::Error),

    #[error("Resource exhausted: no socket could be allocated for {attempts} consecutive attempts")]
    ResourceExhausted { attempts: usize },

    #[error("Worker failure: {0}")]
    Worker(String),
}

impl ScanError {
    /// True for errors raised while validating input, before any probe ran.
    #[inline]
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            ScanError::InvalidRange(_)
                | ScanError::InvalidAddress(_)
                | ScanError::InvalidPortRange(_)
                | ScanError::Config(_)
        )
    }
}
