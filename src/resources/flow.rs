use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Resource;

/// A flow groups related tasks into a single pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
  #[serde(rename = "_id")]
  pub id: String,
  pub created: DateTime<Utc>,
  pub updated: DateTime<Utc>,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

impl Resource for Flow {
  const COLLECTION: &'static str = "flows";
  const ITEM_FIELD: &'static str = "flow";
  const LIST_FIELD: &'static str = "flows";

  fn id(&self) -> &str {
    &self.id
  }
}
