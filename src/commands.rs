//! The four user-invocable feed commands.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  config::FeedConfig,
  decoder,
  error::FeedError,
  feed::{FeedFetcher, FeedItem, Transport},
  host::{DocumentPresenter, InputPrompt, Notifier},
  list::ListAdapter,
  render::{self, Document},
  search::SearchRequester,
};

pub const SEARCH_LABEL: &str = "Search GJU";
pub const SEARCH_PLACEHOLDER: &str = "Enter a search term";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum CommandId {
  FetchAndDisplay,
  FetchAndList,
  PromptAndSearch,
  OpenItem,
}

/// Entry points invoked by the host. The only state shared between them is
/// the list adapter.
pub struct CommandSurface {
  fetcher: FeedFetcher,
  search: SearchRequester,
  list: Arc<ListAdapter>,
  presenter: Arc<dyn DocumentPresenter>,
  notifier: Arc<dyn Notifier>,
}

impl CommandSurface {
  pub fn new(
    config: &FeedConfig,
    transport: Arc<dyn Transport>,
    presenter: Arc<dyn DocumentPresenter>,
    notifier: Arc<dyn Notifier>,
  ) -> Self {
    Self {
      fetcher: FeedFetcher::new(transport.clone(), config.url.clone()),
      search: SearchRequester::new(transport, config.search_base.clone()),
      list: Arc::new(ListAdapter::new(presenter.clone())),
      presenter,
      notifier,
    }
  }

  pub fn list(&self) -> Arc<ListAdapter> {
    self.list.clone()
  }

  pub async fn fetch_and_display(&self) -> Result<(), FeedError> {
    match self.load_items().await {
      Ok(items) => {
        self.presenter.show(render::render(Document::Table(&items)));
        Ok(())
      },
      Err(e) => Err(self.fetch_failed(e)),
    }
  }

  /// Leaves the current list untouched when the fetch fails.
  pub async fn fetch_and_list(&self) -> Result<(), FeedError> {
    match self.load_items().await {
      Ok(items) => {
        self.list.set_items(items);
        Ok(())
      },
      Err(e) => Err(self.fetch_failed(e)),
    }
  }

  /// An empty or dismissed prompt does nothing at all.
  pub async fn prompt_and_search(&self, prompt: &dyn InputPrompt) -> Result<(), FeedError> {
    let term = match prompt.ask(SEARCH_LABEL, SEARCH_PLACEHOLDER).await {
      Some(term) if !term.trim().is_empty() => term,
      _ => {
        log::debug!("Search prompt cancelled");
        return Ok(());
      },
    };

    match self.search.search(term.trim()).await {
      Ok(page) => {
        self.presenter.show(render::render(Document::Raw(&page)));
        Ok(())
      },
      Err(e) => {
        log::debug!("Search failed: {e}");
        self.notifier.error(format!("Failed to search GJU: {e}"));
        Err(e)
      },
    }
  }

  pub fn open_item(&self, item: &FeedItem) {
    self.list.open_item(item);
  }

  async fn load_items(&self) -> Result<Vec<FeedItem>, FeedError> {
    let body = self.fetcher.fetch().await?;
    let decoded = decoder::decode(&body)?;
    for issue in &decoded.issues {
      log::warn!("{}: {issue:?}", self.fetcher.url());
    }
    Ok(decoded.items)
  }

  fn fetch_failed(&self, e: FeedError) -> FeedError {
    log::debug!("Fetch from {} failed: {e}", self.fetcher.url());
    self.notifier.error(format!("Failed to fetch RSS feed: {e}"));
    e
  }
}
