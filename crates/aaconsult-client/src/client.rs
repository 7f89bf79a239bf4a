//! Async HTTP client wrapping the catalog and contact-request endpoints.

use std::{future::Future, time::Duration};

use aaconsult_core::{
  product::Product,
  transport::{Completion, Transport},
};
use reqwest::{Client, header};
use tracing::debug;

use crate::{Error, Result};

/// Production server.
pub const DEFAULT_BASE_URL: &str = "https://server.aaconsl.com";

/// Connection settings for the server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Whole-request timeout applied by the HTTP client.
  pub timeout:  Duration,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
      timeout:  Duration::from_secs(30),
    }
  }
}

/// Async HTTP client for the catalog server.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(Error::Build)?;
    Ok(Self { client, config })
  }

  pub fn base_url(&self) -> &str { &self.config.base_url }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  // ── Catalog ───────────────────────────────────────────────────────────────

  /// `GET /excel/` — the whole catalog, in server order.
  pub async fn list_products(&self) -> Result<Vec<Product>> {
    self.get_json("/excel/".to_string(), "products").await
  }

  /// `GET /excel/{id}`
  pub async fn get_product(&self, id: i64) -> Result<Product> {
    self.get_json(format!("/excel/{id}"), "product").await
  }

  async fn get_json<T: serde::de::DeserializeOwned>(
    &self,
    path: String,
    what: &'static str,
  ) -> Result<T> {
    debug!(%path, "GET");
    let resp = self
      .client
      .get(self.url(&path))
      .send()
      .await
      .map_err(|source| Error::Http {
        method: "GET",
        path: path.clone(),
        source,
      })?;

    if !resp.status().is_success() {
      return Err(Error::Status {
        method: "GET",
        path,
        status: resp.status(),
      });
    }
    resp
      .json()
      .await
      .map_err(|source| Error::Decode { what, source })
  }
}

// ── Contact requests ──────────────────────────────────────────────────────────

impl Transport for ApiClient {
  type Error = Error;

  /// Posts `body` and reports the status without reading the response.
  fn post_json<'a>(
    &'a self,
    path: &'a str,
    body: String,
  ) -> impl Future<Output = Result<Completion>> + Send + 'a {
    async move {
      debug!(%path, bytes = body.len(), "POST");
      let resp = self
        .client
        .post(self.url(path))
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
        .map_err(|source| Error::Http {
          method: "POST",
          path: path.to_string(),
          source,
        })?;
      Ok(Completion {
        status: resp.status().as_u16(),
      })
    }
  }
}
