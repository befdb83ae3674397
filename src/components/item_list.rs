use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::{
  layout::{Margin, Rect},
  prelude::{Color, Line, Modifier, Style, Text},
  widgets::{Block, Borders, List, ListItem, ListState, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use tokio::sync::{mpsc::UnboundedSender, watch};

use super::Component;
use crate::{
  action::Action,
  feed::FeedItem,
  host::ListView,
  list::{DisplayEntry, ListAdapter},
  tui::Frame,
};

/// Sidebar list of feed entries, redrawn from its bound [`ListAdapter`].
pub struct ItemList {
  command_tx: Option<UnboundedSender<Action>>,
  provider: Option<Arc<ListAdapter>>,
  changes: Option<watch::Receiver<Arc<Vec<FeedItem>>>>,
  entries: Vec<DisplayEntry>,
  state: ListState,
  scrollbar_state: ScrollbarState,
  active: bool,
}

impl ItemList {
  pub fn new() -> Self {
    Self {
      command_tx: None,
      provider: None,
      changes: None,
      entries: Vec::new(),
      state: ListState::default().with_selected(Some(0)),
      scrollbar_state: ScrollbarState::default(),
      active: true,
    }
  }

  /// Pulls fresh entries when the adapter reported a replacement.
  pub fn refresh(&mut self) {
    let Some(changes) = self.changes.as_mut() else {
      return;
    };
    if changes.has_changed().unwrap_or(false) {
      changes.borrow_and_update();
      if let Some(provider) = &self.provider {
        self.entries = provider.display_entries().collect();
        self.state.select(Some(0));
      }
    }
  }

  fn select_next(&mut self) {
    if self.entries.is_empty() {
      return;
    }
    let selected_idx = self.state.selected().unwrap_or(0);
    self.state.select(Some((selected_idx + 1) % self.entries.len()));
  }

  fn select_previous(&mut self) {
    if self.entries.is_empty() {
      return;
    }
    let selected_idx = self.state.selected().unwrap_or(0);
    if selected_idx == 0 {
      self.state.select(Some(self.entries.len() - 1));
    } else {
      self.state.select(Some(selected_idx - 1));
    }
  }

  fn open_selected(&self) -> Result<()> {
    let Some(tx) = &self.command_tx else {
      return Ok(());
    };
    let action = self.state.selected().and_then(|idx| self.entries.get(idx)).and_then(|entry| entry.action.clone());
    if let Some(action) = action {
      tx.send(action)?;
      tx.send(Action::ActivateReader)?;
    }
    Ok(())
  }
}

impl Default for ItemList {
  fn default() -> Self {
    Self::new()
  }
}

impl ListView for ItemList {
  fn bind(&mut self, provider: Arc<ListAdapter>) {
    self.changes = Some(provider.subscribe());
    self.entries = provider.display_entries().collect();
    self.provider = Some(provider);
    self.state.select(Some(0));
  }
}

impl Component for ItemList {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.command_tx = Some(tx);
    Ok(())
  }

  fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
    if self.active {
      match key.code {
        KeyCode::Char('j') | KeyCode::Down => self.select_next(),
        KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
        KeyCode::Char('l') | KeyCode::Enter => self.open_selected()?,
        _ => {},
      }
    }
    Ok(None)
  }

  fn handle_mouse_events(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
    if self.active {
      match mouse.kind {
        MouseEventKind::ScrollDown => self.select_next(),
        MouseEventKind::ScrollUp => self.select_previous(),
        _ => {},
      }
    }
    Ok(None)
  }

  fn update(&mut self, action: Action) -> Result<Option<Action>> {
    match action {
      Action::Render => self.refresh(),
      Action::ActivateFeedList => {
        self.active = true;
      },
      Action::ActivateReader => {
        self.active = false;
      },
      _ => {},
    }
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    let name_style = Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD);
    let link_style = Style::default().fg(Color::Gray);
    let selected_name_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let placeholder_style = Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC);

    let items: Vec<ListItem> = self
      .entries
      .iter()
      .enumerate()
      .map(|(i, entry)| {
        let label_style = if entry.action.is_none() {
          placeholder_style
        } else if self.active && self.state.selected() == Some(i) {
          selected_name_style
        } else {
          name_style
        };
        let mut lines = vec![Line::styled(entry.label.as_str(), label_style)];
        if let Some(subtitle) = &entry.subtitle {
          lines.push(Line::styled(subtitle.as_str(), link_style));
        }
        ListItem::new(Text::from(lines))
      })
      .collect();

    let border_style = if self.active { Style::default().fg(Color::Cyan) } else { Style::default() };
    let list = List::new(items)
      .block(Block::default().borders(Borders::ALL).border_style(border_style).title("GJU RSS"))
      .highlight_symbol("┃")
      .repeat_highlight_symbol(true)
      .scroll_padding(1);

    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
      .begin_symbol(None)
      .end_symbol(None)
      .track_symbol(None)
      .thumb_symbol("▌");

    self.scrollbar_state = ScrollbarState::new(self.entries.len()).position(self.state.selected().unwrap_or(0));

    f.render_stateful_widget(list, area, &mut self.state);
    f.render_stateful_widget(scrollbar, area.inner(&Margin { vertical: 1, horizontal: 0 }), &mut self.scrollbar_state);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use crossterm::event::KeyModifiers;
  use pretty_assertions::assert_eq;
  use tokio::sync::mpsc;

  use super::*;
  use crate::host::DocumentPresenter;

  struct Discard;

  impl DocumentPresenter for Discard {
    fn show(&self, _html: String) {}
  }

  fn item(n: usize) -> FeedItem {
    FeedItem { title: format!("Item {n}"), link: format!("http://x/{n}"), description: None }
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn bound_list_starts_with_placeholder() {
    let mut list = ItemList::new();
    list.bind(Arc::new(ListAdapter::new(Arc::new(Discard))));
    assert_eq!(list.entries.len(), 1);
    assert_eq!(list.entries[0].label, crate::list::EMPTY_LABEL);
  }

  #[test]
  fn render_picks_up_replaced_items() {
    let adapter = Arc::new(ListAdapter::new(Arc::new(Discard)));
    let mut list = ItemList::new();
    list.bind(adapter.clone());

    adapter.set_items(vec![item(1), item(2)]);
    list.update(Action::Render).unwrap();

    let labels: Vec<&str> = list.entries.iter().map(|entry| entry.label.as_str()).collect();
    assert_eq!(labels, vec!["Item 1", "Item 2"]);
  }

  #[test]
  fn navigation_wraps_around() {
    let adapter = Arc::new(ListAdapter::new(Arc::new(Discard)));
    adapter.set_items(vec![item(1), item(2), item(3)]);
    let mut list = ItemList::new();
    list.bind(adapter);

    list.handle_key_events(key(KeyCode::Up)).unwrap();
    assert_eq!(list.state.selected(), Some(2));
    list.handle_key_events(key(KeyCode::Char('j'))).unwrap();
    assert_eq!(list.state.selected(), Some(0));
  }

  #[test]
  fn enter_sends_the_entry_action() {
    let adapter = Arc::new(ListAdapter::new(Arc::new(Discard)));
    adapter.set_items(vec![item(1), item(2)]);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut list = ItemList::new();
    list.register_action_handler(tx).unwrap();
    list.bind(adapter);

    list.handle_key_events(key(KeyCode::Down)).unwrap();
    list.handle_key_events(key(KeyCode::Enter)).unwrap();

    assert_eq!(rx.try_recv().unwrap(), Action::OpenItem(item(2)));
    assert_eq!(rx.try_recv().unwrap(), Action::ActivateReader);
  }

  #[test]
  fn placeholder_cannot_be_opened() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut list = ItemList::new();
    list.register_action_handler(tx).unwrap();
    list.bind(Arc::new(ListAdapter::new(Arc::new(Discard))));

    list.handle_key_events(key(KeyCode::Enter)).unwrap();

    assert!(rx.try_recv().is_err());
  }
}
