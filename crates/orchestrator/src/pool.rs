// crates/orchestrator/src/pool.rs
//! Bounded worker pool - pulls probe targets from a shared source, runs them
//! through a [`ConnectProbe`], and gathers the outcomes.

use std::net::SocketAddrV4;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{info, warn};

use netsweep_common::{ProbeOutcome, ScanError, ScanOptions, ScanStats};
use netsweep_scanner_tcp::ConnectProbe;

use crate::progress::ProgressTracker;
use crate::rate_limiter::RateLimiter;

/// Outcomes of one pool run, in completion order.
#[derive(Debug, Clone)]
pub struct Sweep {
    pub outcomes: Vec<(SocketAddrV4, ProbeOutcome)>,
    pub stats: ScanStats,
    /// False when the deadline cut the run short or a target was skipped
    /// for lack of a socket.
    pub complete: bool,
}

impl Sweep {
    /// Keys of every open target, sorted ascending and deduplicated.
    pub fn open_by<T, F>(self, key: F) -> Findings<T>
    where
        T: Ord,
        F: Fn(&SocketAddrV4) -> T,
    {
        let mut found: Vec<T> = self
            .outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_open())
            .map(|(addr, _)| key(addr))
            .collect();
        found.sort_unstable();
        found.dedup();

        Findings {
            found,
            stats: self.stats,
            complete: self.complete,
        }
    }
}

/// Sorted open subset of a sweep.
#[derive(Debug, Clone)]
pub struct Findings<T> {
    pub found: Vec<T>,
    pub stats: ScanStats,
    pub complete: bool,
}

/// Fixed-size pool of probe workers configured from one request's options.
pub struct WorkerPool {
    concurrency: usize,
    probe_timeout: Duration,
    deadline: Option<Duration>,
    exhaustion_threshold: usize,
    rate_limiter: Option<Arc<RateLimiter>>,
}

impl WorkerPool {
    pub fn new(options: &ScanOptions) -> Result<Self, ScanError> {
        options.validate()?;
        let rate_limiter = options
            .rate_limit
            .and_then(NonZeroU32::new)
            .map(|rate| Arc::new(RateLimiter::new(rate)));

        Ok(Self {
            concurrency: options.max_concurrency,
            probe_timeout: options.timeout,
            deadline: options.deadline,
            exhaustion_threshold: options.exhaustion_threshold,
            rate_limiter,
        })
    }

    #[inline]
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Probe every target produced by `work`.
    ///
    /// Targets are pulled lazily, one at a time, by at most `concurrency`
    /// workers. When the deadline fires, in-flight and pending probes are
    /// cancelled and whatever completed is returned. A target that could not
    /// get a socket is skipped and the sweep is marked incomplete; running out
    /// of sockets repeatedly aborts the run and discards the partial outcomes.
    pub async fn run<I>(&self, probe: &ConnectProbe, work: I) -> Result<Sweep, ScanError>
    where
        I: Iterator<Item = SocketAddrV4> + Send + 'static,
    {
        let (lower, upper) = work.size_hint();
        let total = upper.unwrap_or(lower) as u64;
        let workers = self.concurrency.min(upper.unwrap_or(usize::MAX));

        info!(
            "Dispatching {} probe(s) over {} worker(s) via {}",
            total,
            workers,
            probe.transport_name()
        );

        let queue = Arc::new(Mutex::new(work));
        let results = Arc::new(Mutex::new(Vec::new()));
        let progress = Arc::new(ProgressTracker::new(total));
        let streak = Arc::new(AtomicUsize::new(0));

        let mut tasks = JoinSet::new();
        for _ in 0..workers {
            let worker = Worker {
                queue: queue.clone(),
                probe: probe.clone(),
                probe_timeout: self.probe_timeout,
                results: results.clone(),
                progress: progress.clone(),
                streak: streak.clone(),
                exhaustion_threshold: self.exhaustion_threshold,
                rate_limiter: self.rate_limiter.clone(),
            };
            tasks.spawn(worker.run());
        }

        let drain = async {
            while let Some(joined) = tasks.join_next().await {
                joined.map_err(|e| ScanError::Worker(e.to_string()))??;
            }
            Ok::<(), ScanError>(())
        };

        let in_time = match self.deadline {
            Some(limit) => match timeout(limit, drain).await {
                Ok(finished) => {
                    finished?;
                    true
                }
                Err(_) => {
                    warn!("Scan deadline of {:?} reached; returning partial results", limit);
                    false
                }
            },
            None => {
                drain.await?;
                true
            }
        };
        // Cancels whatever is still in flight or waiting for a target.
        tasks.shutdown().await;

        let stats = progress.snapshot().await;
        progress.log_summary().await;

        // Every attempt failed to get a socket and none ever succeeded.
        let failures = streak.load(Ordering::Relaxed);
        if stats.scanned == 0 && failures > 0 {
            return Err(ScanError::ResourceExhausted { attempts: failures });
        }

        if stats.allocation_failures > 0 {
            warn!(
                "{} target(s) skipped: no socket could be allocated",
                stats.allocation_failures
            );
        }
        let complete = in_time && stats.allocation_failures == 0;

        let outcomes = std::mem::take(&mut *results.lock().await);
        Ok(Sweep {
            outcomes,
            stats,
            complete,
        })
    }
}

struct Worker<I> {
    queue: Arc<Mutex<I>>,
    probe: ConnectProbe,
    probe_timeout: Duration,
    results: Arc<Mutex<Vec<(SocketAddrV4, ProbeOutcome)>>>,
    progress: Arc<ProgressTracker>,
    streak: Arc<AtomicUsize>,
    exhaustion_threshold: usize,
    rate_limiter: Option<Arc<RateLimiter>>,
}

impl<I> Worker<I>
where
    I: Iterator<Item = SocketAddrV4> + Send,
{
    async fn run(self) -> Result<(), ScanError> {
        loop {
            let next = { self.queue.lock().await.next() };
            let Some(target) = next else {
                return Ok(());
            };

            if let Some(limiter) = &self.rate_limiter {
                limiter.acquire().await;
            }

            match self
                .probe
                .probe(*target.ip(), target.port(), self.probe_timeout)
                .await
            {
                Ok(outcome) => {
                    self.streak.store(0, Ordering::Relaxed);
                    self.progress.record(outcome).await;
                    self.results.lock().await.push((target, outcome));
                }
                Err(ScanError::SocketAllocation(e)) => {
                    self.progress.record_allocation_failure().await;
                    let streak = self.streak.fetch_add(1, Ordering::Relaxed) + 1;
                    warn!(%target, error = %e, streak, "Socket allocation failed");
                    if streak >= self.exhaustion_threshold {
                        return Err(ScanError::ResourceExhausted { attempts: streak });
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}
