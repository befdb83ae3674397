use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::{
  action::Action,
  feed::FeedItem,
  host::DocumentPresenter,
  render::{self, Document},
};

pub const EMPTY_LABEL: &str = "No items available";

/// One row of the sidebar list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayEntry {
  pub label: String,
  pub tooltip: Option<String>,
  pub subtitle: Option<String>,
  /// What activating the row does; the placeholder row has none.
  pub action: Option<Action>,
}

impl DisplayEntry {
  fn for_item(item: &FeedItem) -> Self {
    Self {
      label: item.title.clone(),
      tooltip: Some(item.title.clone()),
      subtitle: Some(item.link.clone()),
      action: Some(Action::OpenItem(item.clone())),
    }
  }

  fn placeholder() -> Self {
    Self { label: EMPTY_LABEL.to_string(), tooltip: None, subtitle: None, action: None }
  }
}

/// Owns the list state. Items are only ever swapped wholesale, so a view
/// never observes half of one fetch and half of another.
pub struct ListAdapter {
  state: watch::Sender<Arc<Vec<FeedItem>>>,
  presenter: Arc<dyn DocumentPresenter>,
}

impl ListAdapter {
  pub fn new(presenter: Arc<dyn DocumentPresenter>) -> Self {
    let (state, _) = watch::channel(Arc::new(Vec::new()));
    Self { state, presenter }
  }

  pub fn set_items(&self, items: Vec<FeedItem>) {
    log::info!("List now holds {} items", items.len());
    self.state.send_replace(Arc::new(items));
  }

  pub fn items(&self) -> Arc<Vec<FeedItem>> {
    self.state.borrow().clone()
  }

  /// Fires whenever `set_items` replaces the state.
  pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<FeedItem>>> {
    self.state.subscribe()
  }

  pub fn display_entries(&self) -> DisplayEntries {
    DisplayEntries { items: self.items(), next: 0 }
  }

  pub fn open_item(&self, item: &FeedItem) {
    self.presenter.show(render::render(Document::Raw(&render::item_fragment(item))));
  }
}

/// Lazily maps a snapshot of the list state to display entries.
pub struct DisplayEntries {
  items: Arc<Vec<FeedItem>>,
  next: usize,
}

impl Iterator for DisplayEntries {
  type Item = DisplayEntry;

  fn next(&mut self) -> Option<DisplayEntry> {
    if self.items.is_empty() {
      if self.next > 0 {
        return None;
      }
      self.next = 1;
      return Some(DisplayEntry::placeholder());
    }
    let entry = self.items.get(self.next).map(DisplayEntry::for_item);
    self.next += 1;
    entry
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use pretty_assertions::assert_eq;

  use super::*;

  #[derive(Default)]
  struct Shown(Mutex<Vec<String>>);

  impl DocumentPresenter for Shown {
    fn show(&self, html: String) {
      self.0.lock().unwrap().push(html);
    }
  }

  fn item(n: usize) -> FeedItem {
    FeedItem { title: format!("News {n}"), link: format!("https://www.gju.edu.jo/news/{n}"), description: None }
  }

  #[test]
  fn empty_state_yields_single_placeholder() {
    let list = ListAdapter::new(Arc::new(Shown::default()));
    let entries: Vec<DisplayEntry> = list.display_entries().collect();
    assert_eq!(entries, vec![DisplayEntry {
      label: "No items available".to_string(),
      tooltip: None,
      subtitle: None,
      action: None
    }]);
  }

  #[test]
  fn one_entry_per_item_in_order() {
    let list = ListAdapter::new(Arc::new(Shown::default()));
    list.set_items(vec![item(1), item(2), item(3)]);

    let entries: Vec<DisplayEntry> = list.display_entries().collect();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1], DisplayEntry {
      label: "News 2".to_string(),
      tooltip: Some("News 2".to_string()),
      subtitle: Some("https://www.gju.edu.jo/news/2".to_string()),
      action: Some(Action::OpenItem(item(2))),
    });
    let labels: Vec<String> = entries.into_iter().map(|entry| entry.label).collect();
    assert_eq!(labels, vec!["News 1", "News 2", "News 3"]);
  }

  #[test]
  fn set_items_replaces_instead_of_appending() {
    let list = ListAdapter::new(Arc::new(Shown::default()));
    list.set_items(vec![item(1), item(2)]);
    list.set_items(vec![item(9)]);
    assert_eq!(*list.items(), vec![item(9)]);
    list.set_items(Vec::new());
    assert_eq!(list.display_entries().count(), 1);
  }

  #[test]
  fn set_items_notifies_subscribers() {
    let list = ListAdapter::new(Arc::new(Shown::default()));
    let mut changes = list.subscribe();
    assert!(!changes.has_changed().unwrap());

    list.set_items(vec![item(1)]);
    assert!(changes.has_changed().unwrap());
    assert_eq!(changes.borrow_and_update().len(), 1);
    assert!(!changes.has_changed().unwrap());
  }

  #[test]
  fn snapshot_is_unaffected_by_later_updates() {
    let list = ListAdapter::new(Arc::new(Shown::default()));
    list.set_items(vec![item(1), item(2)]);
    let entries = list.display_entries();
    list.set_items(Vec::new());
    assert_eq!(entries.count(), 2);
  }

  #[test]
  fn open_item_shows_detail_page() {
    let shown = Arc::new(Shown::default());
    let list = ListAdapter::new(shown.clone());
    let mut detailed = item(4);
    detailed.description = Some("<p>Graduation ceremony</p>".to_string());

    list.open_item(&detailed);

    let pages = shown.0.lock().unwrap();
    assert_eq!(pages.len(), 1);
    assert!(pages[0].contains("<h1>News 4</h1>"));
    assert!(pages[0].contains("<p>Graduation ceremony</p>"));
    assert!(pages[0].contains("href=\"https://www.gju.edu.jo/news/4\""));
  }
}
