//! Wire response envelopes.
//!
//! Every server response carries `success: bool` plus either the resource
//! payload under a resource-named field (`flow`, `flows`, `defaultObj`, ...)
//! or a `message` string. The payload field name varies per resource, so
//! envelopes are decoded from raw JSON using the [`Resource`] wire names
//! rather than derived wholesale.

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resources::Resource;

/// Server-side pagination echo on list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
  pub page: u32,
  pub per: u32,
}

/// Envelope for single-entity reads and writes.
#[derive(Debug, Clone)]
pub struct SingleResponse<T> {
  pub success: bool,
  pub item: Option<T>,
  pub message: Option<String>,
}

/// Envelope for list reads.
#[derive(Debug, Clone)]
pub struct ListResponse<T> {
  pub success: bool,
  pub items: Vec<T>,
  pub message: Option<String>,
  pub pagination: Option<Pagination>,
}

/// Envelope for deletes, which return no payload.
#[derive(Debug, Clone)]
pub struct DeleteResponse {
  pub success: bool,
  pub message: Option<String>,
}

fn success_flag(value: &Value) -> bool {
  value.get("success").and_then(Value::as_bool).unwrap_or(false)
}

/// The server sometimes forwards raw database errors as objects; render
/// anything non-string through JSON so the message survives.
fn message_field(value: &Value) -> Option<String> {
  match value.get("message") {
    None | Some(Value::Null) => None,
    Some(Value::String(s)) => Some(s.clone()),
    Some(other) => Some(other.to_string()),
  }
}

impl<T: Resource> SingleResponse<T> {
  /// Decode a `{success, {resource}, message?}` body.
  pub fn from_wire(value: Value) -> Result<Self> {
    Self::from_field(value, T::ITEM_FIELD)
  }

  /// Decode a `{success, defaultObj}` body (the "new entity" template).
  pub fn from_default_wire(value: Value) -> Result<Self> {
    Self::from_field(value, "defaultObj")
  }

  fn from_field(value: Value, field: &str) -> Result<Self> {
    let success = success_flag(&value);
    let message = message_field(&value);
    let item = match value.get(field) {
      None | Some(Value::Null) => None,
      Some(raw) => Some(
        serde_json::from_value(raw.clone())
          .map_err(|e| eyre!("Failed to decode {} payload: {}", field, e))?,
      ),
    };
    Ok(Self {
      success,
      item,
      message,
    })
  }

  /// A failure that never reached the server (transport error).
  pub fn failure(message: impl Into<String>) -> Self {
    Self {
      success: false,
      item: None,
      message: Some(message.into()),
    }
  }
}

impl<T: Resource> ListResponse<T> {
  /// Decode a `{success, {resource}s, message?, pagination?}` body.
  pub fn from_wire(value: Value) -> Result<Self> {
    let success = success_flag(&value);
    let message = message_field(&value);
    let items = match value.get(T::LIST_FIELD) {
      None | Some(Value::Null) => Vec::new(),
      Some(raw) => serde_json::from_value(raw.clone())
        .map_err(|e| eyre!("Failed to decode {} payload: {}", T::LIST_FIELD, e))?,
    };
    let pagination = value
      .get("pagination")
      .and_then(|p| serde_json::from_value(p.clone()).ok());
    Ok(Self {
      success,
      items,
      message,
      pagination,
    })
  }

  pub fn failure(message: impl Into<String>) -> Self {
    Self {
      success: false,
      items: Vec::new(),
      message: Some(message.into()),
      pagination: None,
    }
  }
}

impl DeleteResponse {
  pub fn from_wire(value: Value) -> Self {
    Self {
      success: success_flag(&value),
      message: message_field(&value),
    }
  }

  pub fn failure(message: impl Into<String>) -> Self {
    Self {
      success: false,
      message: Some(message.into()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::resources::Flow;
  use serde_json::json;

  #[test]
  fn decodes_single_envelope() {
    let body = json!({
      "success": true,
      "flow": {
        "_id": "f1",
        "created": "2026-08-01T00:00:00Z",
        "updated": "2026-08-01T00:00:00Z",
        "name": "Launch checklist"
      }
    });
    let resp = SingleResponse::<Flow>::from_wire(body).unwrap();
    assert!(resp.success);
    assert_eq!(resp.item.unwrap().name, "Launch checklist");
    assert_eq!(resp.message, None);
  }

  #[test]
  fn decodes_not_found_envelope() {
    let body = json!({ "success": false, "flow": null, "message": "Flow not found." });
    let resp = SingleResponse::<Flow>::from_wire(body).unwrap();
    assert!(!resp.success);
    assert!(resp.item.is_none());
    assert_eq!(resp.message.as_deref(), Some("Flow not found."));
  }

  #[test]
  fn renders_object_messages() {
    let body = json!({ "success": false, "message": { "errors": { "name": "required" } } });
    let resp = DeleteResponse::from_wire(body);
    assert!(resp.message.unwrap().contains("required"));
  }

  #[test]
  fn decodes_list_with_pagination() {
    let body = json!({
      "success": true,
      "flows": [],
      "pagination": { "page": 2, "per": 20 }
    });
    let resp = ListResponse::<Flow>::from_wire(body).unwrap();
    assert!(resp.success);
    assert_eq!(resp.pagination, Some(Pagination { page: 2, per: 20 }));
  }
}
