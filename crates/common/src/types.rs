//! Core data types shared by the netsweep crates
//!
//! Small `Copy` values with `#[inline]` helpers, builder-style option
//! methods that consume `self`, and serde derives so reports can be
//! emitted as JSON by the front-end.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ScanError;

/// Classification of a single TCP connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeOutcome {
    /// The handshake completed.
    Open,
    /// The peer actively refused the connection.
    Closed,
    /// The network stack reported the host or network unreachable.
    Unreachable,
    /// Nothing answered before the per-probe timeout.
    TimedOut,
}

impl ProbeOutcome {
    #[inline]
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, ProbeOutcome::Open)
    }

    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProbeOutcome::Open => "open",
            ProbeOutcome::Closed => "closed",
            ProbeOutcome::Unreachable => "unreachable",
            ProbeOutcome::TimedOut => "timed-out",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive TCP port bounds, `1 <= lo <= hi <= 65535`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    lo: u16,
    hi: u16,
}

impl PortRange {
    pub fn new(lo: u16, hi: u16) -> Result<Self, ScanError> {
        if lo == 0 {
            return Err(ScanError::InvalidPortRange(format!(
                "{lo}-{hi}: ports start at 1"
            )));
        }
        if lo > hi {
            return Err(ScanError::InvalidPortRange(format!(
                "{lo}-{hi}: start > end"
            )));
        }
        Ok(Self { lo, hi })
    }

    #[inline]
    #[must_use]
    pub const fn lo(&self) -> u16 {
        self.lo
    }

    #[inline]
    #[must_use]
    pub const fn hi(&self) -> u16 {
        self.hi
    }

    /// Number of ports covered.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        (self.hi - self.lo) as usize + 1
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, port: u16) -> bool {
        (self.lo..=self.hi).contains(&port)
    }

    #[inline]
    #[must_use]
    pub fn iter(&self) -> RangeInclusive<u16> {
        self.lo..=self.hi
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self { lo: 1, hi: 1024 }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lo == self.hi {
            write!(f, "{}", self.lo)
        } else {
            write!(f, "{}-{}", self.lo, self.hi)
        }
    }
}

impl FromStr for PortRange {
    type Err = ScanError;

    /// Parses `"80"` or `"1-1024"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parse = |p: &str| {
            p.trim()
                .parse::<u16>()
                .map_err(|_| ScanError::InvalidPortRange(format!("invalid port: {p:?}")))
        };

        match s.split_once('-') {
            Some((lo, hi)) => PortRange::new(parse(lo)?, parse(hi)?),
            None => {
                let port = parse(s)?;
                PortRange::new(port, port)
            }
        }
    }
}

/// Per-request scan tuning. Passed explicitly with every request; nothing
/// here is read from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Upper bound on a single connect attempt.
    pub timeout: Duration,
    /// Maximum number of probes in flight.
    pub max_concurrency: usize,
    /// Overall run deadline; outstanding probes are cancelled when it fires.
    pub deadline: Option<Duration>,
    /// Consecutive socket allocation failures tolerated before aborting.
    pub exhaustion_threshold: usize,
    /// Probes per second across all workers.
    pub rate_limit: Option<u32>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(500),
            max_concurrency: 500,
            deadline: None,
            exhaustion_threshold: 32,
            rate_limit: None,
        }
    }
}

impl ScanOptions {
    /// Fast preset: short timeout, very high concurrency.
    #[inline]
    #[must_use]
    pub fn fast() -> Self {
        Self {
            timeout: Duration::from_millis(250),
            max_concurrency: 2_000,
            ..Self::default()
        }
    }

    /// Accurate preset: long timeout for slow or lossy links.
    #[inline]
    #[must_use]
    pub fn accurate() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            max_concurrency: 200,
            ..Self::default()
        }
    }

    /// Stealth preset: low concurrency and an explicit rate limit.
    #[inline]
    #[must_use]
    pub fn stealth() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            max_concurrency: 16,
            rate_limit: Some(50),
            ..Self::default()
        }
    }

    /// Resolve a preset by name; `balanced` is the default profile.
    pub fn preset(name: &str) -> Result<Self, ScanError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::fast()),
            "balanced" | "" => Ok(Self::default()),
            "accurate" => Ok(Self::accurate()),
            "stealth" => Ok(Self::stealth()),
            other => Err(ScanError::Config(format!("unknown preset '{other}'"))),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_exhaustion_threshold(mut self, attempts: usize) -> Self {
        self.exhaustion_threshold = attempts;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_rate_limit(mut self, per_second: u32) -> Self {
        self.rate_limit = Some(per_second);
        self
    }

    /// Reject option combinations that cannot run.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.timeout.is_zero() {
            return Err(ScanError::Config("probe timeout must be non-zero".into()));
        }
        if self.max_concurrency == 0 {
            return Err(ScanError::Config("concurrency must be at least 1".into()));
        }
        if self.exhaustion_threshold == 0 {
            return Err(ScanError::Config(
                "exhaustion threshold must be at least 1".into(),
            ));
        }
        if self.rate_limit == Some(0) {
            return Err(ScanError::Config("rate limit must be non-zero".into()));
        }
        Ok(())
    }
}

/// Diagnostic tally of probe outcomes for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub total_targets: u64,
    pub scanned: u64,
    pub open: u64,
    pub closed: u64,
    pub unreachable: u64,
    pub timed_out: u64,
    pub allocation_failures: u64,
    pub elapsed: Duration,
}

impl ScanStats {
    #[inline]
    #[must_use]
    pub fn new(total_targets: u64) -> Self {
        Self {
            total_targets,
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: ProbeOutcome) {
        self.scanned = self.scanned.saturating_add(1);
        let slot = match outcome {
            ProbeOutcome::Open => &mut self.open,
            ProbeOutcome::Closed => &mut self.closed,
            ProbeOutcome::Unreachable => &mut self.unreachable,
            ProbeOutcome::TimedOut => &mut self.timed_out,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn record_allocation_failure(&mut self) {
        self.allocation_failures = self.allocation_failures.saturating_add(1);
    }

    /// Progress percentage in [0.0, 100.0].
    #[inline]
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.total_targets == 0 {
            0.0
        } else {
            (self.scanned as f32 / self.total_targets as f32) * 100.0
        }
    }

    /// Probes completed per second.
    #[inline]
    #[must_use]
    pub fn rate(&self) -> f32 {
        if self.elapsed.as_secs_f32() == 0.0 {
            0.0
        } else {
            self.scanned as f32 / self.elapsed.as_secs_f32()
        }
    }
}
