//! Capabilities the feed commands need from whatever is hosting them.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::{action::Action, list::ListAdapter};

pub trait DocumentPresenter: Send + Sync {
  fn show(&self, html: String);
}

pub trait Notifier: Send + Sync {
  fn error(&self, message: String);
}

/// A view that draws its entries from a [`ListAdapter`] on every redraw.
pub trait ListView {
  fn bind(&mut self, provider: Arc<ListAdapter>);
}

#[async_trait]
pub trait InputPrompt: Send + Sync {
  /// `None` when the user dismissed the prompt.
  async fn ask(&self, label: &str, placeholder: &str) -> Option<String>;
}

/// Presenter and notifier for the terminal app: both simply queue actions.
#[derive(Clone)]
pub struct ActionBridge {
  tx: UnboundedSender<Action>,
}

impl ActionBridge {
  pub fn new(tx: UnboundedSender<Action>) -> Self {
    Self { tx }
  }
}

impl DocumentPresenter for ActionBridge {
  fn show(&self, html: String) {
    if self.tx.send(Action::ShowDocument(html)).is_err() {
      log::warn!("Dropped document: action channel closed");
    }
  }
}

impl Notifier for ActionBridge {
  fn error(&self, message: String) {
    if let Err(e) = self.tx.send(Action::Error(message)) {
      log::warn!("Dropped notification: {e}");
    }
  }
}
