//! Normalized in-memory store for one resource type.
//!
//! Holds the id → entity map, the flat list index keyed by canonical
//! [`ListKey`] strings, the selected pointer, and the per-id in-flight set.
//! All methods are synchronous and side-effect free beyond the store itself;
//! the coordinator owns the locking and the network.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};

use crate::api::{ListResponse, Pagination, SingleResponse};
use crate::resources::Resource;

use super::key::ListKey;
use super::meta::FetchMeta;

/// The at-most-one entity currently marked selected, with its fetch state.
#[derive(Debug, Clone, Default)]
pub struct Selected {
  pub id: Option<String>,
  pub meta: FetchMeta,
}

/// One named subset of the collection: ordered ids plus fetch state.
#[derive(Debug, Clone, Default)]
pub struct ListEntry {
  /// Entity ids in server response order.
  pub ids: Vec<String>,
  pub meta: FetchMeta,
  /// Client-side list UI state; stored verbatim, never interpreted here.
  pub filter: Option<String>,
  pub pagination: Option<Pagination>,
}

/// Normalized store for one resource type.
#[derive(Debug)]
pub struct ResourceStore<T> {
  by_id: HashMap<String, T>,
  lists: HashMap<String, ListEntry>,
  selected: Selected,
  /// Single fetches currently in flight, keyed by target id. A second
  /// request for an id already here must not start another network call.
  fetching_ids: HashSet<String>,
  /// Ids deleted this session. Hydration filters these; a direct fetch may
  /// still resurrect the id if the server has it again.
  tombstones: HashSet<String>,
  default_item: Option<T>,
  default_meta: FetchMeta,
}

impl<T> Default for ResourceStore<T> {
  fn default() -> Self {
    Self {
      by_id: HashMap::new(),
      lists: HashMap::new(),
      selected: Selected::default(),
      fetching_ids: HashSet::new(),
      tombstones: HashSet::new(),
      default_item: None,
      default_meta: FetchMeta::default(),
    }
  }
}

impl<T: Resource> ResourceStore<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, id: &str) -> Option<&T> {
    self.by_id.get(id)
  }

  pub fn selected(&self) -> &Selected {
    &self.selected
  }

  pub fn list_entry(&self, key: &ListKey) -> Option<&ListEntry> {
    self.lists.get(&key.canonical())
  }

  pub fn default_item(&self) -> Option<&T> {
    self.default_item.as_ref()
  }

  pub fn default_meta(&self) -> &FetchMeta {
    &self.default_meta
  }

  pub fn is_tombstoned(&self, id: &str) -> bool {
    self.tombstones.contains(id)
  }

  /// Resolve a list's ids against the normalized map, in order. Ids with no
  /// entity (evicted or tombstoned) are filtered rather than surfaced as
  /// holes.
  pub fn hydrate(&self, key: &ListKey) -> Vec<T> {
    match self.list_entry(key) {
      Some(entry) => entry
        .ids
        .iter()
        .filter(|id| !self.tombstones.contains(*id))
        .filter_map(|id| self.by_id.get(id).cloned())
        .collect(),
      None => Vec::new(),
    }
  }

  // ==========================================================================
  // Fetch decisions
  // ==========================================================================

  /// Whether a single read must go to the network. First match wins:
  /// an in-flight fetch for this exact id short-circuits, a selection
  /// change fetches, an unknown id with no cached error fetches, staleness
  /// fetches, otherwise the invalidation flag decides.
  pub fn should_fetch_single(&self, id: &str, now: DateTime<Utc>, window: Duration) -> bool {
    if self.fetching_ids.contains(id) {
      return false;
    }
    if self.selected.id.as_deref() != Some(id) {
      return true;
    }
    if self.selected.meta.is_fetching {
      return false;
    }
    if !self.by_id.contains_key(id) && self.selected.meta.error.is_none() {
      // Not in the map and no cached error. The error guard matters: a
      // failed id never lands in the map, so re-fetching on every call
      // would loop against a failing endpoint.
      return true;
    }
    if self.selected.meta.is_stale(now, window) {
      return true;
    }
    self.selected.meta.did_invalidate
  }

  /// Whether a list read must go to the network. An unknown key fetches,
  /// an in-flight entry short-circuits, staleness fetches, otherwise the
  /// invalidation flag decides.
  pub fn should_fetch_list(&self, key: &ListKey, now: DateTime<Utc>, window: Duration) -> bool {
    match self.list_entry(key) {
      None => true,
      Some(entry) => {
        if entry.meta.is_fetching {
          false
        } else if entry.meta.is_stale(now, window) {
          true
        } else {
          entry.meta.did_invalidate
        }
      }
    }
  }

  pub fn should_fetch_default(&self, now: DateTime<Utc>, window: Duration) -> bool {
    if self.default_meta.is_fetching {
      return false;
    }
    if self.default_item.is_none() && self.default_meta.error.is_none() {
      return true;
    }
    if self.default_meta.is_stale(now, window) {
      return true;
    }
    self.default_meta.did_invalidate
  }

  // ==========================================================================
  // Fetch lifecycle
  // ==========================================================================

  /// Record an initiated single fetch: the id becomes selected and in-flight.
  pub fn request_single(&mut self, id: &str) {
    self.selected.id = Some(id.to_string());
    self.selected.meta.begin_fetch();
    self.fetching_ids.insert(id.to_string());
  }

  /// Apply a settled single fetch. The entity (if any) lands in the map
  /// regardless of what is selected now; selected metadata only updates if
  /// this id is still the selected one, so a fetch that lost a navigation
  /// race cannot clobber the newer selection's state.
  pub fn receive_single(&mut self, id: &str, response: &SingleResponse<T>, now: DateTime<Utc>) {
    self.fetching_ids.remove(id);
    if response.success {
      if let Some(item) = &response.item {
        self.tombstones.remove(item.id());
        self.by_id.insert(item.id().to_string(), item.clone());
      }
    }
    if self.selected.id.as_deref() == Some(id) {
      let error = if response.success {
        None
      } else {
        Some(describe_error(response.message.as_deref()))
      };
      self.selected.meta.finish_fetch(now, error);
    }
  }

  pub fn request_list(&mut self, key: &ListKey) {
    self.lists.entry(key.canonical()).or_default().meta.begin_fetch();
  }

  /// Apply a settled list fetch: entities merge into the map and the entry's
  /// id sequence is replaced with the response order. A failure keeps the
  /// previous ids visible and records the error.
  pub fn receive_list(&mut self, key: &ListKey, response: &ListResponse<T>, now: DateTime<Utc>) {
    let entry = self.lists.entry(key.canonical()).or_default();
    if response.success {
      entry.ids = response.items.iter().map(|item| item.id().to_string()).collect();
      entry.pagination = response.pagination.or(entry.pagination);
      entry.meta.finish_fetch(now, None);
      for item in &response.items {
        self.tombstones.remove(item.id());
        self.by_id.insert(item.id().to_string(), item.clone());
      }
    } else {
      entry
        .meta
        .finish_fetch(now, Some(describe_error(response.message.as_deref())));
    }
  }

  pub fn request_default(&mut self) {
    self.default_meta.begin_fetch();
  }

  pub fn receive_default(&mut self, response: &SingleResponse<T>, now: DateTime<Utc>) {
    if response.success {
      self.default_item = response.item.clone();
      self.default_meta.finish_fetch(now, None);
    } else {
      self
        .default_meta
        .finish_fetch(now, Some(describe_error(response.message.as_deref())));
    }
  }

  // ==========================================================================
  // Mutation relay
  // ==========================================================================

  /// A successful create inserts the returned entity into the map. No list
  /// gains the id automatically; callers invalidate the lists the entity
  /// might belong to and let the next read re-fetch.
  pub fn receive_created(&mut self, response: &SingleResponse<T>) {
    if response.success {
      if let Some(item) = &response.item {
        self.tombstones.remove(item.id());
        self.by_id.insert(item.id().to_string(), item.clone());
      }
    }
  }

  /// A successful update replaces the entity in place. List membership and
  /// the selected pointer keep referring to the same id.
  pub fn receive_updated(&mut self, response: &SingleResponse<T>) {
    if response.success {
      if let Some(item) = &response.item {
        self.by_id.insert(item.id().to_string(), item.clone());
      }
    }
  }

  /// A successful delete tombstones the id: the entity leaves the map, the
  /// id is excluded from hydration, and every list currently containing it
  /// is invalidated so the next read re-fetches membership.
  pub fn receive_deleted(&mut self, id: &str, success: bool) {
    if !success {
      return;
    }
    self.by_id.remove(id);
    self.tombstones.insert(id.to_string());
    for entry in self.lists.values_mut() {
      if entry.ids.iter().any(|listed| listed == id) {
        entry.meta.invalidate();
      }
    }
    if self.selected.id.as_deref() == Some(id) {
      self.selected = Selected::default();
    }
  }

  // ==========================================================================
  // Invalidation and explicit list edits
  // ==========================================================================

  pub fn invalidate_selected(&mut self) {
    self.selected.meta.invalidate();
  }

  /// Flag a list for refresh without evicting its data. Unknown keys get an
  /// empty flagged entry, which the next read treats as a mandatory fetch.
  pub fn invalidate_list(&mut self, key: &ListKey) {
    self.lists.entry(key.canonical()).or_default().meta.invalidate();
  }

  /// Append an id to a list if not already present.
  pub fn add_to_list(&mut self, id: &str, key: &ListKey) {
    let entry = self.lists.entry(key.canonical()).or_default();
    if !entry.ids.iter().any(|listed| listed == id) {
      entry.ids.push(id.to_string());
    }
  }

  /// Drop an id from a list. The entity itself stays in the map.
  pub fn remove_from_list(&mut self, id: &str, key: &ListKey) {
    if let Some(entry) = self.lists.get_mut(&key.canonical()) {
      entry.ids.retain(|listed| listed != id);
    }
  }

  pub fn set_filter(&mut self, key: &ListKey, filter: Option<String>) {
    self.lists.entry(key.canonical()).or_default().filter = filter;
  }

  pub fn set_pagination(&mut self, key: &ListKey, pagination: Option<Pagination>) {
    self.lists.entry(key.canonical()).or_default().pagination = pagination;
  }
}

fn describe_error(message: Option<&str>) -> String {
  message.unwrap_or("Request failed").to_string()
}
