use std::sync::Arc;

use crate::{error::FeedError, feed::Transport};

pub const SEARCH_BASE: &str = "https://www.gju.edu.jo/search/node";

pub struct SearchRequester {
  transport: Arc<dyn Transport>,
  base: String,
}

impl SearchRequester {
  pub fn new(transport: Arc<dyn Transport>, base: impl Into<String>) -> Self {
    Self { transport, base: base.into() }
  }

  /// The term becomes a single percent-encoded path segment.
  pub fn url_for(&self, term: &str) -> String {
    format!("{}/{}", self.base.trim_end_matches('/'), urlencoding::encode(term))
  }

  /// Returns the result page untouched; it is shown as-is, never parsed.
  pub async fn search(&self, term: &str) -> Result<String, FeedError> {
    let url = self.url_for(term);
    log::info!("Searching: {url}");
    self.transport.get_text(&url).await
  }
}
