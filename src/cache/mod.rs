//! Generic resource cache.
//!
//! One [`ResourceCache`] per resource type coordinates all reads and writes:
//! - a normalized id → entity map plus a flat list index keyed by [`ListKey`]
//! - fetch-if-needed decisions against an injectable [`Clock`]
//! - a mutation relay applying create/update/delete results back into the store
//! - uniform outcomes whether a read was served from cache or network

mod clock;
mod coordinator;
mod key;
mod meta;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::{DeleteOutcome, FetchSource, ListOutcome, ResourceCache, SingleOutcome};
pub use key::{ListArg, ListKey};
pub use meta::{CacheState, FetchMeta};
pub use store::{ListEntry, ResourceStore, Selected};
