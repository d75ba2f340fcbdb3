//! Wall-clock abstraction for testability
//!
//! Access-token expiry is compared against epoch seconds, so the session
//! coordinator reads time through [`Clock`] rather than calling `Utc::now()`
//! directly. Production code uses [`SystemClock`]; tests pin time with
//! [`MockClock`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

/// Source of the current wall-clock time
pub trait Clock: Send + Sync + 'static {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;

    /// Seconds since the UNIX epoch, truncated
    fn unix_seconds(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Implement Clock for Arc<T> where T: Clock for convenient sharing
impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Mock clock for deterministic testing
///
/// Clones share the same instant, so a test can keep a handle and move time
/// forward after handing the clock to a coordinator.
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Create a mock clock frozen at the current system time
    #[must_use]
    pub fn new() -> Self {
        Self { now: Arc::new(Mutex::new(Utc::now())) }
    }

    /// Create a mock clock frozen at the given epoch second
    ///
    /// Out-of-range values clamp to the epoch.
    #[must_use]
    pub fn at_unix(seconds: i64) -> Self {
        let now = DateTime::from_timestamp(seconds, 0).unwrap_or_default();
        Self { now: Arc::new(Mutex::new(now)) }
    }

    /// Move the clock forward
    pub fn advance(&self, duration: Duration) {
        if let Ok(delta) = TimeDelta::from_std(duration) {
            let mut now = self.now.lock();
            *now += delta;
        }
    }

    /// Jump to a specific epoch second
    pub fn set_unix(&self, seconds: i64) {
        *self.now.lock() = DateTime::from_timestamp(seconds, 0).unwrap_or_default();
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
