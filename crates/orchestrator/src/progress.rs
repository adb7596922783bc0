//! Progress tracking

use std::time::Instant;
use tokio::sync::Mutex;
use tracing::info;

use netsweep_common::{ProbeOutcome, ScanStats};

pub struct ProgressTracker {
    stats: Mutex<ScanStats>,
    started: Instant,
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        Self {
            stats: Mutex::new(ScanStats::new(total)),
            started: Instant::now(),
        }
    }

    pub async fn record(&self, outcome: ProbeOutcome) {
        self.stats.lock().await.record(outcome);
    }

    pub async fn record_allocation_failure(&self) {
        self.stats.lock().await.record_allocation_failure();
    }

    /// Current tally with elapsed time filled in.
    pub async fn snapshot(&self) -> ScanStats {
        let mut stats = self.stats.lock().await.clone();
        stats.elapsed = self.started.elapsed();
        stats
    }

    pub async fn log_summary(&self) {
        let stats = self.snapshot().await;

        info!("Scan Summary:");
        info!("  Total targets: {}", stats.total_targets);
        info!("  Probed: {} ({:.1}%)", stats.scanned, stats.progress());
        info!("  Open: {}", stats.open);
        info!("  Closed: {}", stats.closed);
        info!("  Unreachable: {}", stats.unreachable);
        info!("  Timed out: {}", stats.timed_out);
        if stats.allocation_failures > 0 {
            info!("  Socket allocation failures: {}", stats.allocation_failures);
        }
        info!("  Rate: {:.1} probes/s", stats.rate());
    }
}
