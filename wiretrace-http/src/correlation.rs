//! Per-request correlation state.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// State stamped onto a request so its response line can be matched to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationToken {
    /// Sequence number, unique per counter, starting at 1.
    pub operation_id: u64,
    /// Canonical URI captured when the request was issued.
    pub uri: String,
    /// Epoch milliseconds at issue time; `None` when timing is disabled.
    pub started_at: Option<i64>,
}

impl CorrelationToken {
    /// Milliseconds elapsed since the request was issued.
    pub fn elapsed_millis(&self, now_millis: i64) -> Option<i64> {
        self.started_at.map(|started| now_millis - started)
    }
}

/// Identity of one correlating logger.
///
/// Tokens are keyed by this id on the request, so several loggers can stamp
/// the same request without reading each other's tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TracerId(u64);

impl TracerId {
    /// Allocate an id distinct from every other one in the process.
    pub fn unique() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Monotonic operation id source.
///
/// Each logger owns one unless it is given a shared counter explicitly.
#[derive(Debug, Default)]
pub struct OperationCounter {
    last: AtomicU64,
}

impl OperationCounter {
    /// Create a counter whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id.
    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The most recently allocated id, or 0 if none.
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

/// Wall-clock source in epoch milliseconds.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock reading `now_millis`.
    pub fn new(now_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(now_millis),
        }
    }

    /// Set the current reading.
    pub fn set(&self, now_millis: i64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }

    /// Move the clock forward.
    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
