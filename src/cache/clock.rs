//! Injectable time source for staleness decisions.
//!
//! The coordinator never reads the wall clock directly; it asks a [`Clock`]
//! so tests can pin and advance time deterministically.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Source of "now" for cache staleness checks.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// A clock that only moves when told to. Used in tests.
pub struct ManualClock {
  now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
  pub fn new(start: DateTime<Utc>) -> Self {
    Self {
      now: Mutex::new(start),
    }
  }

  /// Move the clock forward.
  pub fn advance(&self, by: Duration) {
    let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
    *now = *now + by;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.lock().unwrap_or_else(|e| e.into_inner())
  }
}
