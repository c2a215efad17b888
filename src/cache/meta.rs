//! Per-unit fetch metadata.
//!
//! Every cacheable unit (a selected entity, a list entry, the default
//! object) carries the same four fields: an in-flight flag, an invalidation
//! flag, the time of the last successful or failed fetch, and the last
//! error message. The derived [`CacheState`] makes the lifecycle explicit:
//!
//! `Empty → Fetching → Ready`, `Ready → Invalidated → Fetching`, and
//! `Fetching → Error`. An errored unit still counts as cached: it will not
//! re-fetch until the staleness window lapses or it is invalidated, so a
//! failing endpoint is not hammered with retries. No state is terminal.

use chrono::{DateTime, Duration, Utc};

/// Fetch bookkeeping for one cacheable unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchMeta {
  pub is_fetching: bool,
  pub did_invalidate: bool,
  /// When the last fetch settled (success or error). `None` until then.
  pub last_updated: Option<DateTime<Utc>>,
  /// Message from the last failed fetch, cleared on success.
  pub error: Option<String>,
}

/// Lifecycle state derived from [`FetchMeta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
  Empty,
  Fetching,
  Ready,
  Invalidated,
  Error,
}

impl FetchMeta {
  pub fn state(&self) -> CacheState {
    if self.is_fetching {
      CacheState::Fetching
    } else if self.error.is_some() {
      CacheState::Error
    } else if self.did_invalidate {
      CacheState::Invalidated
    } else if self.last_updated.is_none() {
      CacheState::Empty
    } else {
      CacheState::Ready
    }
  }

  /// True once the last settle is older than the staleness window.
  /// A unit that never fetched is always stale.
  pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
    match self.last_updated {
      Some(at) => now - at > window,
      None => true,
    }
  }

  /// Mark a fetch as initiated.
  pub fn begin_fetch(&mut self) {
    self.is_fetching = true;
  }

  /// Settle the in-flight fetch. A success clears the invalidation flag and
  /// any previous error; a failure records the message.
  pub fn finish_fetch(&mut self, now: DateTime<Utc>, error: Option<String>) {
    self.is_fetching = false;
    self.did_invalidate = false;
    self.last_updated = Some(now);
    self.error = error;
  }

  /// Flag the unit for refresh without evicting its data.
  pub fn invalidate(&mut self) {
    self.did_invalidate = true;
  }
}
