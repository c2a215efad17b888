//! Fetch coordination for one resource type.
//!
//! [`ResourceCache`] sits between callers and the network client. Every read
//! first consults the [`ResourceStore`]'s decision logic; a cache hit
//! resolves immediately with the cached data, a miss marks the unit
//! in-flight, performs the round trip, and relays the result back into the
//! store. Both paths return the same outcome type, so callers never branch
//! on where the data came from.
//!
//! Reads resolve, they do not fail: transport errors and `success: false`
//! bodies both become outcomes with `success: false` and the message cached
//! in the unit's metadata. An errored unit will not re-fetch until the
//! staleness window lapses or it is invalidated.

use chrono::Duration;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use crate::api::{DeleteResponse, ListResponse, Pagination, ResourceClient, SingleResponse, Transport};
use crate::resources::Resource;

use super::clock::Clock;
use super::key::ListKey;
use super::meta::CacheState;
use super::store::ResourceStore;

/// Where an outcome's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
  /// Fresh data from a network round trip.
  Network,
  /// Served from the store without a network call.
  Cache,
}

/// Result of a single-entity read or write.
#[derive(Debug, Clone)]
pub struct SingleOutcome<T> {
  pub success: bool,
  pub item: Option<T>,
  pub error: Option<String>,
  pub source: FetchSource,
}

/// Result of a list read: hydrated entities in server order.
#[derive(Debug, Clone)]
pub struct ListOutcome<T> {
  pub success: bool,
  pub list: Vec<T>,
  pub error: Option<String>,
  pub source: FetchSource,
}

/// Result of a delete.
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
  pub success: bool,
  pub error: Option<String>,
}

/// Cache coordinator for one resource type over one transport.
pub struct ResourceCache<T: Resource, C: Transport> {
  client: ResourceClient<T, C>,
  store: Mutex<ResourceStore<T>>,
  clock: Arc<dyn Clock>,
  stale_after: Duration,
}

impl<T: Resource, C: Transport> ResourceCache<T, C> {
  /// Create a coordinator with the default 5-minute staleness window.
  pub fn new(transport: Arc<C>, clock: Arc<dyn Clock>) -> Self {
    Self {
      client: ResourceClient::new(transport),
      store: Mutex::new(ResourceStore::new()),
      clock,
      stale_after: Duration::minutes(5),
    }
  }

  /// Override the staleness window.
  pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
    self.stale_after = stale_after;
    self
  }

  fn store(&self) -> std::sync::MutexGuard<'_, ResourceStore<T>> {
    self.store.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Snapshot of a cached entity, if present.
  pub fn cached(&self, id: &str) -> Option<T> {
    self.store().get(id).cloned()
  }

  /// Lifecycle state of a list entry, if the key is known.
  pub fn list_state(&self, key: &ListKey) -> Option<CacheState> {
    self.store().list_entry(key).map(|entry| entry.meta.state())
  }

  // ==========================================================================
  // Reads
  // ==========================================================================

  /// Read one entity, fetching only if the cache cannot serve it.
  ///
  /// See [`ResourceStore::should_fetch_single`] for the decision order. A
  /// concurrent fetch for the same id is not duplicated; the caller gets the
  /// current cached snapshot instead.
  pub async fn fetch_single_if_needed(&self, id: &str) -> SingleOutcome<T> {
    {
      let mut store = self.store();
      let now = self.clock.now();
      if !store.should_fetch_single(id, now, self.stale_after) {
        debug!(resource = T::ITEM_FIELD, id, "serving single from cache");
        let item = store.get(id).cloned();
        let error = store.selected().meta.error.clone();
        return SingleOutcome {
          success: error.is_none(),
          item,
          error,
          source: FetchSource::Cache,
        };
      }
      store.request_single(id);
    }

    debug!(resource = T::ITEM_FIELD, id, "fetching single");
    let response = match self.client.get_single(id).await {
      Ok(response) => response,
      Err(e) => {
        warn!(resource = T::ITEM_FIELD, id, error = %e, "single fetch failed");
        SingleResponse::failure(e.to_string())
      }
    };

    let mut store = self.store();
    store.receive_single(id, &response, self.clock.now());
    SingleOutcome {
      success: response.success,
      item: response.item,
      error: if response.success { None } else { response.message },
      source: FetchSource::Network,
    }
  }

  /// Read a list, fetching only if the cache cannot serve the key.
  ///
  /// The outcome's entities are hydrated against the normalized store in
  /// server response order.
  pub async fn fetch_list_if_needed(&self, key: &ListKey) -> ListOutcome<T> {
    {
      let mut store = self.store();
      let now = self.clock.now();
      if !store.should_fetch_list(key, now, self.stale_after) {
        debug!(resource = T::ITEM_FIELD, key = %key, "serving list from cache");
        let error = store
          .list_entry(key)
          .and_then(|entry| entry.meta.error.clone());
        return ListOutcome {
          success: error.is_none(),
          list: store.hydrate(key),
          error,
          source: FetchSource::Cache,
        };
      }
      store.request_list(key);
    }

    debug!(resource = T::ITEM_FIELD, key = %key, "fetching list");
    let response = match self.client.get_list(key).await {
      Ok(response) => response,
      Err(e) => {
        warn!(resource = T::ITEM_FIELD, key = %key, error = %e, "list fetch failed");
        ListResponse::failure(e.to_string())
      }
    };

    let mut store = self.store();
    store.receive_list(key, &response, self.clock.now());
    ListOutcome {
      success: response.success,
      list: store.hydrate(key),
      error: if response.success { None } else { response.message },
      source: FetchSource::Network,
    }
  }

  /// Read the server's template for a new entity, cached like any other unit.
  pub async fn fetch_default_if_needed(&self) -> SingleOutcome<T> {
    {
      let mut store = self.store();
      let now = self.clock.now();
      if !store.should_fetch_default(now, self.stale_after) {
        let error = store.default_meta().error.clone();
        return SingleOutcome {
          success: error.is_none(),
          item: store.default_item().cloned(),
          error,
          source: FetchSource::Cache,
        };
      }
      store.request_default();
    }

    let response = match self.client.get_default().await {
      Ok(response) => response,
      Err(e) => {
        warn!(resource = T::ITEM_FIELD, error = %e, "default fetch failed");
        SingleResponse::failure(e.to_string())
      }
    };

    let mut store = self.store();
    store.receive_default(&response, self.clock.now());
    SingleOutcome {
      success: response.success,
      item: response.item,
      error: if response.success { None } else { response.message },
      source: FetchSource::Network,
    }
  }

  // ==========================================================================
  // Writes
  // ==========================================================================

  /// Create an entity. The body may be partial (no id); the server fills in
  /// defaults. On success the returned entity lands in the store, but no
  /// list gains it automatically; invalidate the lists it may belong to.
  pub async fn create(&self, body: &serde_json::Value) -> SingleOutcome<T> {
    let response = match self.client.create(body).await {
      Ok(response) => response,
      Err(e) => {
        warn!(resource = T::ITEM_FIELD, error = %e, "create failed");
        SingleResponse::failure(e.to_string())
      }
    };
    self.store().receive_created(&response);
    SingleOutcome {
      success: response.success,
      item: response.item,
      error: if response.success { None } else { response.message },
      source: FetchSource::Network,
    }
  }

  /// Update an entity by id. On success the stored entity is replaced; list
  /// membership and the selected pointer are untouched.
  pub async fn update(&self, item: &T) -> SingleOutcome<T> {
    let response = match self.client.update(item).await {
      Ok(response) => response,
      Err(e) => {
        warn!(resource = T::ITEM_FIELD, id = item.id(), error = %e, "update failed");
        SingleResponse::failure(e.to_string())
      }
    };
    self.store().receive_updated(&response);
    SingleOutcome {
      success: response.success,
      item: response.item,
      error: if response.success { None } else { response.message },
      source: FetchSource::Network,
    }
  }

  /// Delete an entity by id. On success the id is tombstoned and every list
  /// containing it is invalidated.
  pub async fn delete(&self, id: &str) -> DeleteOutcome {
    let response = match self.client.delete(id).await {
      Ok(response) => response,
      Err(e) => {
        warn!(resource = T::ITEM_FIELD, id, error = %e, "delete failed");
        DeleteResponse::failure(e.to_string())
      }
    };
    self.store().receive_deleted(id, response.success);
    DeleteOutcome {
      success: response.success,
      error: if response.success { None } else { response.message },
    }
  }

  // ==========================================================================
  // Invalidation and list edits
  // ==========================================================================

  /// Flag the selected entity for refresh on its next read.
  pub fn invalidate_selected(&self) {
    self.store().invalidate_selected();
  }

  /// Flag a list for refresh on its next read. Data stays visible until the
  /// replacement fetch succeeds.
  pub fn invalidate_list(&self, key: &ListKey) {
    debug!(resource = T::ITEM_FIELD, key = %key, "invalidating list");
    self.store().invalidate_list(key);
  }

  pub fn add_to_list(&self, id: &str, key: &ListKey) {
    self.store().add_to_list(id, key);
  }

  pub fn remove_from_list(&self, id: &str, key: &ListKey) {
    self.store().remove_from_list(id, key);
  }

  pub fn set_filter(&self, key: &ListKey, filter: Option<String>) {
    self.store().set_filter(key, filter);
  }

  pub fn set_pagination(&self, key: &ListKey, pagination: Option<Pagination>) {
    self.store().set_pagination(key, pagination);
  }
}
