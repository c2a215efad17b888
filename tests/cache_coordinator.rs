//! Coordinator behavior against a scripted transport and a manual clock.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use color_eyre::{eyre::eyre, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use flowtrack::api::Transport;
use flowtrack::cache::{Clock, FetchSource, ListKey, ManualClock, ResourceCache};
use flowtrack::resources::{Flow, Note};

/// Transport double: responses are scripted per "METHOD path", every call is
/// recorded, and an optional gate parks the next request until released.
#[derive(Default)]
struct ScriptedTransport {
  calls: Mutex<Vec<String>>,
  responses: Mutex<HashMap<String, Value>>,
  gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedTransport {
  fn respond(&self, method: &str, path: &str, body: Value) {
    self
      .responses
      .lock()
      .unwrap()
      .insert(format!("{} {}", method, path), body);
  }

  /// Park the next matching request until the returned handle is notified.
  fn hold_next(&self) -> Arc<Notify> {
    let gate = Arc::new(Notify::new());
    *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
    gate
  }

  fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  async fn dispatch(&self, method: &str, path: &str) -> Result<Value> {
    let key = format!("{} {}", method, path);
    self.calls.lock().unwrap().push(key.clone());

    let gate = self.gate.lock().unwrap().take();
    if let Some(gate) = gate {
      gate.notified().await;
    }

    let response = self.responses.lock().unwrap().get(&key).cloned();
    response.ok_or_else(|| eyre!("no scripted response for {}", key))
  }
}

#[async_trait]
impl Transport for ScriptedTransport {
  async fn get(&self, path: &str) -> Result<Value> {
    self.dispatch("GET", path).await
  }

  async fn post(&self, path: &str, _body: Value) -> Result<Value> {
    self.dispatch("POST", path).await
  }

  async fn put(&self, path: &str, _body: Value) -> Result<Value> {
    self.dispatch("PUT", path).await
  }

  async fn delete(&self, path: &str) -> Result<Value> {
    self.dispatch("DELETE", path).await
  }
}

fn flow_json(id: &str, name: &str) -> Value {
  json!({
    "_id": id,
    "created": "2026-08-01T12:00:00Z",
    "updated": "2026-08-01T12:00:00Z",
    "name": name
  })
}

fn setup() -> (Arc<ScriptedTransport>, Arc<ManualClock>, ResourceCache<Flow, ScriptedTransport>) {
  let transport = Arc::new(ScriptedTransport::default());
  let start = Utc.with_ymd_and_hms(2026, 8, 29, 9, 0, 0).unwrap();
  let clock = Arc::new(ManualClock::new(start));
  let cache = ResourceCache::new(Arc::clone(&transport), Arc::clone(&clock) as Arc<dyn Clock>);
  (transport, clock, cache)
}

#[tokio::test]
async fn unknown_id_fetches_exactly_once_then_serves_cache() {
  let (transport, _clock, cache) = setup();
  transport.respond(
    "GET",
    "/api/flows/f1",
    json!({ "success": true, "flow": flow_json("f1", "Launch") }),
  );

  let first = cache.fetch_single_if_needed("f1").await;
  assert!(first.success);
  assert_eq!(first.source, FetchSource::Network);
  assert_eq!(first.item.as_ref().unwrap().name, "Launch");

  // fresh, not invalidated: zero additional network reads
  let second = cache.fetch_single_if_needed("f1").await;
  assert!(second.success);
  assert_eq!(second.source, FetchSource::Cache);
  assert_eq!(second.item.unwrap().name, "Launch");
  assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn stale_entity_refetches_and_resets_window() {
  let (transport, clock, cache) = setup();
  transport.respond(
    "GET",
    "/api/flows/f1",
    json!({ "success": true, "flow": flow_json("f1", "X") }),
  );

  cache.fetch_single_if_needed("f1").await;
  clock.advance(Duration::minutes(10));

  transport.respond(
    "GET",
    "/api/flows/f1",
    json!({ "success": true, "flow": flow_json("f1", "X refreshed") }),
  );
  let refreshed = cache.fetch_single_if_needed("f1").await;
  assert_eq!(refreshed.source, FetchSource::Network);
  assert_eq!(refreshed.item.unwrap().name, "X refreshed");
  assert_eq!(transport.calls().len(), 2);

  // window restarts at the refresh
  let cached = cache.fetch_single_if_needed("f1").await;
  assert_eq!(cached.source, FetchSource::Cache);
  assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn errors_are_cached_and_do_not_retry_inside_window() {
  let (transport, clock, cache) = setup();
  transport.respond(
    "GET",
    "/api/flows/missing",
    json!({ "success": false, "flow": null, "message": "Flow not found." }),
  );

  let first = cache.fetch_single_if_needed("missing").await;
  assert!(!first.success);
  assert_eq!(first.error.as_deref(), Some("Flow not found."));

  let second = cache.fetch_single_if_needed("missing").await;
  assert!(!second.success);
  assert_eq!(second.source, FetchSource::Cache);
  assert_eq!(transport.calls().len(), 1, "no retry storm inside the window");

  // the staleness window still lapses
  clock.advance(Duration::minutes(6));
  cache.fetch_single_if_needed("missing").await;
  assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn list_routes_are_deterministic() {
  let transport = Arc::new(ScriptedTransport::default());
  let clock = Arc::new(ManualClock::new(Utc::now()));
  let notes: ResourceCache<Note, ScriptedTransport> =
    ResourceCache::new(Arc::clone(&transport), clock as Arc<dyn Clock>);

  let empty = json!({ "success": true, "notes": [] });
  transport.respond("GET", "/api/notes", empty.clone());
  transport.respond("GET", "/api/notes/by-author/12345", empty.clone());
  transport.respond("GET", "/api/notes/by-tag-list?tag=a&tag=b&", empty);

  notes.fetch_list_if_needed(&ListKey::all()).await;
  notes.fetch_list_if_needed(&ListKey::by("author", "12345")).await;
  notes
    .fetch_list_if_needed(&ListKey::by_values("tag", ["a", "b"]))
    .await;

  assert_eq!(
    transport.calls(),
    vec![
      "GET /api/notes",
      "GET /api/notes/by-author/12345",
      "GET /api/notes/by-tag-list?tag=a&tag=b&",
    ]
  );
}

#[tokio::test]
async fn invalidated_list_refetches_regardless_of_age() {
  let (transport, _clock, cache) = setup();
  let key = ListKey::by("_team", "t1");
  transport.respond(
    "GET",
    "/api/flows/by-_team/t1",
    json!({ "success": true, "flows": [flow_json("a", "A")] }),
  );

  cache.fetch_list_if_needed(&key).await;
  let cached = cache.fetch_list_if_needed(&key).await;
  assert_eq!(cached.source, FetchSource::Cache);
  assert_eq!(transport.calls().len(), 1);

  cache.invalidate_list(&key);
  let refetched = cache.fetch_list_if_needed(&key).await;
  assert_eq!(refetched.source, FetchSource::Network);
  assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn in_flight_list_fetch_is_not_duplicated() {
  let (transport, _clock, cache) = setup();
  let cache = Arc::new(cache);
  let key = ListKey::by("_flow", "f1");
  transport.respond(
    "GET",
    "/api/flows/by-_flow/f1",
    json!({ "success": true, "flows": [flow_json("a", "A")] }),
  );

  let gate = transport.hold_next();
  let first = {
    let cache = Arc::clone(&cache);
    let key = key.clone();
    tokio::spawn(async move { cache.fetch_list_if_needed(&key).await })
  };
  // let the spawned fetch reach the transport and park there
  tokio::time::sleep(std::time::Duration::from_millis(10)).await;

  let second = cache.fetch_list_if_needed(&key).await;
  assert_eq!(second.source, FetchSource::Cache);
  assert_eq!(transport.calls().len(), 1, "second caller must not issue a request");

  gate.notify_one();
  let first = first.await.expect("fetch task panicked");
  assert!(first.success);
  assert_eq!(first.list.len(), 1);
  assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn create_roundtrip_reads_back_identical_entity() {
  let (transport, _clock, cache) = setup();
  let created = flow_json("new1", "Fresh flow");
  transport.respond(
    "POST",
    "/api/flows",
    json!({ "success": true, "flow": created.clone() }),
  );
  transport.respond(
    "GET",
    "/api/flows/new1",
    json!({ "success": true, "flow": created }),
  );

  let outcome = cache.create(&json!({ "name": "Fresh flow" })).await;
  assert!(outcome.success);
  let server_entity = outcome.item.unwrap();

  cache.invalidate_list(&ListKey::all());
  let read_back = cache.fetch_single_if_needed("new1").await;
  assert_eq!(read_back.item.unwrap(), server_entity);
}

#[tokio::test]
async fn create_does_not_appear_in_lists_until_refetch() {
  let (transport, _clock, cache) = setup();
  let key = ListKey::all();
  transport.respond(
    "GET",
    "/api/flows",
    json!({ "success": true, "flows": [flow_json("a", "A")] }),
  );
  cache.fetch_list_if_needed(&key).await;

  transport.respond(
    "POST",
    "/api/flows",
    json!({ "success": true, "flow": flow_json("b", "B") }),
  );
  cache.create(&json!({ "name": "B" })).await;

  // still the old membership from cache
  let cached = cache.fetch_list_if_needed(&key).await;
  assert_eq!(cached.list.len(), 1);

  // the extra round trip after invalidation picks it up
  cache.invalidate_list(&key);
  transport.respond(
    "GET",
    "/api/flows",
    json!({ "success": true, "flows": [flow_json("a", "A"), flow_json("b", "B")] }),
  );
  let refreshed = cache.fetch_list_if_needed(&key).await;
  assert_eq!(refreshed.list.len(), 2);
}

#[tokio::test]
async fn delete_excludes_entity_from_cached_lists() {
  let (transport, _clock, cache) = setup();
  let key = ListKey::all();
  transport.respond(
    "GET",
    "/api/flows",
    json!({ "success": true, "flows": [flow_json("a", "A"), flow_json("b", "B")] }),
  );
  cache.fetch_list_if_needed(&key).await;

  transport.respond("DELETE", "/api/flows/a", json!({ "success": true }));
  let outcome = cache.delete("a").await;
  assert!(outcome.success);
  assert!(cache.cached("a").is_none());

  // the containing list was invalidated, so the next read re-fetches
  transport.respond(
    "GET",
    "/api/flows",
    json!({ "success": true, "flows": [flow_json("b", "B")] }),
  );
  let refreshed = cache.fetch_list_if_needed(&key).await;
  assert_eq!(refreshed.source, FetchSource::Network);
  assert_eq!(refreshed.list.len(), 1);
  assert_eq!(refreshed.list[0].id, "b");
}

#[tokio::test]
async fn update_replaces_entity_without_touching_membership() {
  let (transport, _clock, cache) = setup();
  let key = ListKey::all();
  transport.respond(
    "GET",
    "/api/flows",
    json!({ "success": true, "flows": [flow_json("a", "Old name")] }),
  );
  cache.fetch_list_if_needed(&key).await;

  transport.respond(
    "PUT",
    "/api/flows/a",
    json!({ "success": true, "flow": flow_json("a", "New name") }),
  );
  let mut item = cache.cached("a").unwrap();
  item.name = "New name".to_string();
  let outcome = cache.update(&item).await;
  assert!(outcome.success);

  let cached = cache.fetch_list_if_needed(&key).await;
  assert_eq!(cached.source, FetchSource::Cache);
  assert_eq!(cached.list.len(), 1);
  assert_eq!(cached.list[0].name, "New name");
}

#[tokio::test]
async fn transport_failures_resolve_rather_than_throw() {
  let (transport, _clock, cache) = setup();
  // no scripted response: the transport errors
  let outcome = cache.fetch_single_if_needed("f1").await;
  assert!(!outcome.success);
  assert!(outcome.error.unwrap().contains("no scripted response"));
  assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn invalidating_selected_refetches_same_id() {
  let (transport, _clock, cache) = setup();
  transport.respond(
    "GET",
    "/api/flows/f1",
    json!({ "success": true, "flow": flow_json("f1", "X") }),
  );

  cache.fetch_single_if_needed("f1").await;
  cache.invalidate_selected();
  let refetched = cache.fetch_single_if_needed("f1").await;
  assert_eq!(refetched.source, FetchSource::Network);
  assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn default_template_is_cached() {
  let (transport, _clock, cache) = setup();
  transport.respond(
    "GET",
    "/api/flows/default",
    json!({ "success": true, "defaultObj": flow_json("", "") }),
  );

  let first = cache.fetch_default_if_needed().await;
  assert!(first.success);
  assert_eq!(first.source, FetchSource::Network);

  let second = cache.fetch_default_if_needed().await;
  assert_eq!(second.source, FetchSource::Cache);
  assert_eq!(transport.calls().len(), 1);
}
