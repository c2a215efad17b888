//! CLI subcommands executed against the cached resource clients.

use clap::Subcommand;
use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;

use crate::api::{HttpTransport, Transport};
use crate::cache::{Clock, ListKey, ResourceCache, SystemClock};
use crate::config::Config;
use crate::resources::{Flow, Note, Resource, Task, User};

/// Operations available on every resource collection.
#[derive(Debug, Clone, Subcommand)]
pub enum ResourceCommand {
  /// List entities; parts select a subset, e.g. `_flow f1` or `_id a,b`
  List { parts: Vec<String> },
  /// Fetch one entity by id
  Get { id: String },
  /// Fetch the server's template for a new entity
  Default,
  /// Create an entity from a JSON body
  Create {
    /// JSON object; fields the server doesn't know are rejected there
    #[arg(long)]
    json: String,
  },
  /// Update an entity from a full JSON body (must include _id)
  Update {
    #[arg(long)]
    json: String,
  },
  /// Delete an entity by id
  Delete { id: String },
  /// Flag a cached list for refresh without evicting it
  Invalidate { parts: Vec<String> },
}

/// One cached client per resource type, all sharing a transport and clock.
pub struct Clients {
  pub flows: ResourceCache<Flow, HttpTransport>,
  pub tasks: ResourceCache<Task, HttpTransport>,
  pub notes: ResourceCache<Note, HttpTransport>,
  pub users: ResourceCache<User, HttpTransport>,
}

impl Clients {
  pub fn new(config: &Config) -> Result<Self> {
    let transport = Arc::new(HttpTransport::new(&config.server.url, Config::api_token())?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    Ok(Self {
      flows: ResourceCache::new(Arc::clone(&transport), Arc::clone(&clock)),
      tasks: ResourceCache::new(Arc::clone(&transport), Arc::clone(&clock)),
      notes: ResourceCache::new(Arc::clone(&transport), Arc::clone(&clock)),
      users: ResourceCache::new(transport, clock),
    })
  }
}

/// Run one resource command and print the result as JSON on stdout.
pub async fn run<T: Resource, C: Transport>(
  cache: &ResourceCache<T, C>,
  command: ResourceCommand,
) -> Result<()> {
  match command {
    ResourceCommand::List { parts } => {
      let key = ListKey::parse(&parts);
      let outcome = cache.fetch_list_if_needed(&key).await;
      if !outcome.success {
        return Err(eyre!(
          "Failed to list {}: {}",
          T::COLLECTION,
          outcome.error.unwrap_or_default()
        ));
      }
      print_json(&outcome.list)
    }
    ResourceCommand::Get { id } => {
      let outcome = cache.fetch_single_if_needed(&id).await;
      match (outcome.success, outcome.item) {
        (true, Some(item)) => print_json(&item),
        (true, None) => Err(eyre!("{} {} not found", T::ITEM_FIELD, id)),
        _ => Err(eyre!(
          "Failed to get {} {}: {}",
          T::ITEM_FIELD,
          id,
          outcome.error.unwrap_or_default()
        )),
      }
    }
    ResourceCommand::Default => {
      let outcome = cache.fetch_default_if_needed().await;
      match (outcome.success, outcome.item) {
        (true, Some(item)) => print_json(&item),
        _ => Err(eyre!(
          "Failed to get default {}: {}",
          T::ITEM_FIELD,
          outcome.error.unwrap_or_default()
        )),
      }
    }
    ResourceCommand::Create { json } => {
      let body: serde_json::Value =
        serde_json::from_str(&json).map_err(|e| eyre!("Invalid JSON body: {}", e))?;
      let outcome = cache.create(&body).await;
      match (outcome.success, outcome.item) {
        (true, Some(item)) => {
          // the new entity belongs to lists we can't guess; refresh "all"
          cache.invalidate_list(&ListKey::all());
          print_json(&item)
        }
        _ => Err(eyre!(
          "Failed to create {}: {}",
          T::ITEM_FIELD,
          outcome.error.unwrap_or_default()
        )),
      }
    }
    ResourceCommand::Update { json } => {
      let item: T = serde_json::from_str(&json)
        .map_err(|e| eyre!("Invalid {} body: {}", T::ITEM_FIELD, e))?;
      let outcome = cache.update(&item).await;
      match (outcome.success, outcome.item) {
        (true, Some(item)) => print_json(&item),
        _ => Err(eyre!(
          "Failed to update {}: {}",
          T::ITEM_FIELD,
          outcome.error.unwrap_or_default()
        )),
      }
    }
    ResourceCommand::Delete { id } => {
      let outcome = cache.delete(&id).await;
      if !outcome.success {
        return Err(eyre!(
          "Failed to delete {} {}: {}",
          T::ITEM_FIELD,
          id,
          outcome.error.unwrap_or_default()
        ));
      }
      println!("deleted {} {}", T::ITEM_FIELD, id);
      Ok(())
    }
    ResourceCommand::Invalidate { parts } => {
      cache.invalidate_list(&ListKey::parse(&parts));
      Ok(())
    }
  }
}

fn print_json<S: serde::Serialize>(value: &S) -> Result<()> {
  let rendered =
    serde_json::to_string_pretty(value).map_err(|e| eyre!("Failed to render output: {}", e))?;
  println!("{}", rendered);
  Ok(())
}
