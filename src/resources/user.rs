use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Resource;

/// An account on the tracking server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  #[serde(rename = "_id")]
  pub id: String,
  pub created: DateTime<Utc>,
  pub updated: DateTime<Utc>,
  pub username: String,
  #[serde(rename = "firstName", default)]
  pub first_name: String,
  #[serde(rename = "lastName", default)]
  pub last_name: String,
  #[serde(default)]
  pub roles: Vec<String>,
}

impl Resource for User {
  const COLLECTION: &'static str = "users";
  const ITEM_FIELD: &'static str = "user";
  const LIST_FIELD: &'static str = "users";

  fn id(&self) -> &str {
    &self.id
  }
}
