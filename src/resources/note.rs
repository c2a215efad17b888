use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Resource;

/// A comment attached to a task or flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
  #[serde(rename = "_id")]
  pub id: String,
  pub created: DateTime<Utc>,
  pub updated: DateTime<Utc>,
  pub content: String,
  #[serde(rename = "_flow", default, skip_serializing_if = "Option::is_none")]
  pub flow: Option<String>,
  #[serde(rename = "_task", default, skip_serializing_if = "Option::is_none")]
  pub task: Option<String>,
  /// Author of the note.
  #[serde(rename = "_user")]
  pub user: String,
}

impl Resource for Note {
  const COLLECTION: &'static str = "notes";
  const ITEM_FIELD: &'static str = "note";
  const LIST_FIELD: &'static str = "notes";

  fn id(&self) -> &str {
    &self.id
  }
}
