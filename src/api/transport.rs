//! HTTP transport seam.
//!
//! The coordinator talks to the server through the [`Transport`] trait so
//! tests can script responses without a socket. [`HttpTransport`] is the
//! real implementation over reqwest.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::{Client, Method};
use serde_json::Value;
use url::Url;

/// JSON-over-HTTP methods used by the resource clients.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn get(&self, path: &str) -> Result<Value>;
  async fn post(&self, path: &str, body: Value) -> Result<Value>;
  async fn put(&self, path: &str, body: Value) -> Result<Value>;
  async fn delete(&self, path: &str) -> Result<Value>;
}

/// Transport backed by a reqwest client.
#[derive(Clone)]
pub struct HttpTransport {
  client: Client,
  base_url: String,
  token: Option<String>,
}

impl HttpTransport {
  /// Create a transport pointing at the given server base URL.
  pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
    Self::with_client(Client::new(), base_url, token)
  }

  /// Create a transport with a custom reqwest client.
  pub fn with_client(client: Client, base_url: &str, token: Option<String>) -> Result<Self> {
    // Validate early so a bad config fails at startup, not mid-request.
    Url::parse(base_url).map_err(|e| eyre!("Invalid server url {}: {}", base_url, e))?;
    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
      token,
    })
  }

  async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
    let url = format!("{}{}", self.base_url, path);
    let mut request = self.client.request(method.clone(), &url);
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }
    if let Some(body) = body {
      request = request.json(&body);
    }

    let response = request
      .send()
      .await
      .map_err(|e| eyre!("{} {} failed: {}", method, url, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(eyre!("{} {} returned {}", method, url, status));
    }

    response
      .json()
      .await
      .map_err(|e| eyre!("{} {} returned invalid JSON: {}", method, url, e))
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn get(&self, path: &str) -> Result<Value> {
    self.request(Method::GET, path, None).await
  }

  async fn post(&self, path: &str, body: Value) -> Result<Value> {
    self.request(Method::POST, path, Some(body)).await
  }

  async fn put(&self, path: &str, body: Value) -> Result<Value> {
    self.request(Method::PUT, path, Some(body)).await
  }

  async fn delete(&self, path: &str) -> Result<Value> {
    self.request(Method::DELETE, path, None).await
  }
}
