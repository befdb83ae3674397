use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use tokio::sync::mpsc::UnboundedSender;

use super::{document_panel::DocumentPanel, item_list::ItemList, Component};
use crate::{
  action::Action,
  config::Config,
  tui::{Event, Frame},
};

/// The item list beside the document panel; `Tab` moves focus between them.
pub struct FeedView {
  item_list: ItemList,
  document_panel: DocumentPanel,
  reader_focused: bool,
}

impl FeedView {
  pub fn new(item_list: ItemList, document_panel: DocumentPanel) -> Self {
    Self { item_list, document_panel, reader_focused: false }
  }
}

impl Component for FeedView {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.item_list.register_action_handler(tx.clone())?;
    self.document_panel.register_action_handler(tx)?;
    Ok(())
  }

  fn register_config_handler(&mut self, config: Config) -> Result<()> {
    self.item_list.register_config_handler(config.clone())?;
    self.document_panel.register_config_handler(config)?;
    Ok(())
  }

  fn init(&mut self, area: Rect) -> Result<()> {
    self.item_list.init(area)?;
    self.document_panel.init(area)?;
    Ok(())
  }

  fn handle_events(&mut self, event: Option<Event>) -> Result<Option<Action>> {
    if let Some(event) = event {
      self.item_list.handle_events(Some(event.clone()))?;
      self.document_panel.handle_events(Some(event.clone()))?;
      if let Event::Key(key) = event {
        return self.handle_key_events(key);
      }
    }
    Ok(None)
  }

  fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
    if key.code == KeyCode::Tab {
      let next = if self.reader_focused { Action::ActivateFeedList } else { Action::ActivateReader };
      return Ok(Some(next));
    }
    Ok(None)
  }

  fn handle_mouse_events(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
    self.item_list.handle_mouse_events(mouse)?;
    self.document_panel.handle_mouse_events(mouse)?;
    Ok(None)
  }

  fn update(&mut self, action: Action) -> Result<Option<Action>> {
    match action {
      Action::ActivateReader => self.reader_focused = true,
      Action::ActivateFeedList => self.reader_focused = false,
      _ => {},
    }
    self.item_list.update(action.clone())?;
    self.document_panel.update(action)?;
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    let chunks = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(30), Constraint::Percentage(70)].as_ref())
      .split(area);

    self.item_list.draw(f, chunks[0])?;
    self.document_panel.draw(f, chunks[1])?;
    Ok(())
  }
}
