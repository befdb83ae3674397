use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

pub const FEED_URL: &str = "https://www.gju.edu.jo/rss.xml";

/// One entry of the feed. Rebuilt from scratch on every fetch.
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedItem {
  pub title: String,
  pub link: String,
  pub description: Option<String>,
}

/// Plain GET returning the response body as text.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn get_text(&self, url: &str) -> Result<String, FeedError>;
}

pub struct HttpTransport {
  client: Client,
}

impl HttpTransport {
  pub fn new() -> Self {
    Self { client: Client::new() }
  }
}

impl Default for HttpTransport {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn get_text(&self, url: &str) -> Result<String, FeedError> {
    tracing::debug!(url, "GET");
    let response = self.client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;
    tracing::debug!(url, bytes = body.len(), "response received");
    Ok(body)
  }
}

pub struct FeedFetcher {
  transport: Arc<dyn Transport>,
  url: String,
}

impl FeedFetcher {
  pub fn new(transport: Arc<dyn Transport>, url: impl Into<String>) -> Self {
    Self { transport, url: url.into() }
  }

  pub fn url(&self) -> &str {
    &self.url
  }

  pub async fn fetch(&self) -> Result<String, FeedError> {
    self.transport.get_text(&self.url).await
  }
}
