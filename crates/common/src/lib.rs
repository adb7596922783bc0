//! Netsweep Common - Shared types and traits
//!
//! This crate provides the data model, error taxonomy and the transport
//! seam used across the netsweep scanner crates.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::ScanError;
pub use traits::Transport;
pub use types::{PortRange, ProbeOutcome, ScanOptions, ScanStats};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default TCP port probed to decide whether a host is alive.
pub const DEFAULT_LIVENESS_PORT: u16 = 135;
