//! Orchestrator - bounded probe dispatch, scanners and the scan coordinator

mod coordinator;
mod discovery;
mod pool;
mod port_scan;
mod progress;
mod rate_limiter;
mod report;

#[cfg(test)]
mod testing;

pub use coordinator::{ScanCoordinator, ScanMode, ScanRequest};
pub use discovery::DiscoveryScanner;
pub use pool::{Findings, Sweep, WorkerPool};
pub use port_scan::PortScanner;
pub use progress::ProgressTracker;
pub use rate_limiter::RateLimiter;
pub use report::ScanReport;
