use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Resource;

/// A single unit of work inside a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
  #[serde(rename = "_id")]
  pub id: String,
  pub created: DateTime<Utc>,
  pub updated: DateTime<Utc>,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  /// Parent flow id.
  #[serde(rename = "_flow", default, skip_serializing_if = "Option::is_none")]
  pub flow: Option<String>,
  #[serde(default)]
  pub complete: bool,
  /// Workflow status: "open", "awaiting_approval" or "approved".
  #[serde(default = "default_status")]
  pub status: String,
}

fn default_status() -> String {
  "open".to_string()
}

impl Resource for Task {
  const COLLECTION: &'static str = "tasks";
  const ITEM_FIELD: &'static str = "task";
  const LIST_FIELD: &'static str = "tasks";

  fn id(&self) -> &str {
    &self.id
  }
}
