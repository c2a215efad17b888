//! Typed REST client for one resource collection.

use color_eyre::{eyre::eyre, Result};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::cache::ListKey;
use crate::resources::Resource;

use super::transport::Transport;
use super::types::{DeleteResponse, ListResponse, SingleResponse};

/// Thin client mapping resource operations onto the server's CRUD routes.
///
/// Generic over the resource type; the wire names come from [`Resource`],
/// so `ResourceClient<Flow, _>` hits `/api/flows` and unwraps `flow`/`flows`
/// payload fields.
pub struct ResourceClient<T: Resource, C: Transport> {
  transport: Arc<C>,
  _marker: PhantomData<fn() -> T>,
}

impl<T: Resource, C: Transport> Clone for ResourceClient<T, C> {
  fn clone(&self) -> Self {
    Self {
      transport: Arc::clone(&self.transport),
      _marker: PhantomData,
    }
  }
}

impl<T: Resource, C: Transport> ResourceClient<T, C> {
  pub fn new(transport: Arc<C>) -> Self {
    Self {
      transport,
      _marker: PhantomData,
    }
  }

  fn collection() -> String {
    format!("/api/{}", T::COLLECTION)
  }

  /// `GET /api/{collection}/{id}`
  pub async fn get_single(&self, id: &str) -> Result<SingleResponse<T>> {
    let body = self
      .transport
      .get(&format!("{}/{}", Self::collection(), id))
      .await?;
    SingleResponse::from_wire(body)
  }

  /// `GET` the route derived from the list key (see [`ListKey::route`]).
  pub async fn get_list(&self, key: &ListKey) -> Result<ListResponse<T>> {
    let body = self.transport.get(&key.route(T::COLLECTION)).await?;
    ListResponse::from_wire(body)
  }

  /// `GET /api/{collection}/default`, the template for a new entity.
  pub async fn get_default(&self) -> Result<SingleResponse<T>> {
    let body = self
      .transport
      .get(&format!("{}/default", Self::collection()))
      .await?;
    SingleResponse::from_default_wire(body)
  }

  /// `POST /api/{collection}`
  pub async fn create(&self, item: &serde_json::Value) -> Result<SingleResponse<T>> {
    let body = self.transport.post(&Self::collection(), item.clone()).await?;
    SingleResponse::from_wire(body)
  }

  /// `PUT /api/{collection}/{id}`
  pub async fn update(&self, item: &T) -> Result<SingleResponse<T>> {
    let payload =
      serde_json::to_value(item).map_err(|e| eyre!("Failed to encode {}: {}", T::ITEM_FIELD, e))?;
    let body = self
      .transport
      .put(&format!("{}/{}", Self::collection(), item.id()), payload)
      .await?;
    SingleResponse::from_wire(body)
  }

  /// `DELETE /api/{collection}/{id}`
  pub async fn delete(&self, id: &str) -> Result<DeleteResponse> {
    let body = self
      .transport
      .delete(&format!("{}/{}", Self::collection(), id))
      .await?;
    Ok(DeleteResponse::from_wire(body))
  }
}
