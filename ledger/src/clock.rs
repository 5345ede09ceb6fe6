//! Time source abstraction.
//!
//! The cooldown gate compares and advances per-account timestamps, so the
//! ledger never reads the wall clock directly — it asks an injected
//! [`Clock`]. Production uses [`SystemClock`]; tests drive a
//! [`ManualClock`] to exact instants.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};

/// Supplies the current instant to the ledger.
pub trait Clock: Send + Sync {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time via `Utc::now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for deterministic tests. Stores the instant as Unix
/// seconds; sub-second precision is not needed by the cooldown window.
#[derive(Debug, Default)]
pub struct ManualClock {
    unix_secs: AtomicI64,
}

impl ManualClock {
    /// Creates a clock pinned to the given Unix timestamp, in seconds.
    pub fn starting_at(unix_secs: i64) -> Self {
        Self {
            unix_secs: AtomicI64::new(unix_secs),
        }
    }

    /// Moves the clock to the given Unix timestamp, in seconds.
    pub fn set(&self, unix_secs: i64) {
        self.unix_secs.store(unix_secs, Ordering::Release);
    }

    /// Advances the clock by the given number of seconds.
    pub fn advance(&self, secs: i64) {
        self.unix_secs.fetch_add(secs, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.unix_secs.load(Ordering::Acquire), 0)
            .unwrap()
    }
}
