//! Domain resources served by the tracking API.
//!
//! Every resource follows the same shape: a unique `_id`, a
//! `created`/`updated` timestamp pair, and resource-specific fields. The
//! [`Resource`] trait carries the wire names so one generic client and one
//! generic cache serve all four types.

use serde::{de::DeserializeOwned, Serialize};

mod flow;
mod note;
mod task;
mod user;

pub use flow::Flow;
pub use note::Note;
pub use task::Task;
pub use user::User;

/// Trait for entities managed by the resource cache.
pub trait Resource:
  Clone + std::fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
  /// URL collection segment (e.g. "flows" in `/api/flows`).
  const COLLECTION: &'static str;

  /// Wire field holding a single entity (e.g. `{"flow": {...}}`).
  const ITEM_FIELD: &'static str;

  /// Wire field holding a list of entities (e.g. `{"flows": [...]}`).
  const LIST_FIELD: &'static str;

  /// Unique identifier for this entity.
  fn id(&self) -> &str;
}
