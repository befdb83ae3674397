use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
  layout::Rect,
  prelude::{Modifier, Style},
  style::Color,
  text::{Line, Text},
  widgets::{Block, BorderType, Clear, Paragraph, Wrap},
};

use crate::{
  action::Action,
  components::{centered_rect, Component},
  config::Config,
  tui::Frame,
};

#[derive(Default)]
pub struct QuitPopup {
  config: Config,
  show: bool,
}

impl QuitPopup {
  pub fn new() -> Self {
    Self::default()
  }
}

impl Component for QuitPopup {
  fn register_config_handler(&mut self, config: Config) -> color_eyre::Result<()> {
    self.config = config;
    Ok(())
  }

  fn handle_key_events(&mut self, key: KeyEvent) -> color_eyre::Result<Option<Action>> {
    if !self.show {
      return Ok(None);
    }
    match key.code {
      KeyCode::Char('y') | KeyCode::Char('q') => Ok(Some(Action::Quit)),
      KeyCode::Char('n') | KeyCode::Esc => {
        self.show = false;
        Ok(Some(Action::CancelQuit))
      },
      _ => Ok(None),
    }
  }

  fn update(&mut self, action: Action) -> color_eyre::Result<Option<Action>> {
    if action == Action::ConfirmQuit && self.config.confirm_quit {
      self.show = true;
    }
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> color_eyre::Result<()> {
    if self.show {
      let popup_area = centered_rect(40, 20, area);

      let text = Text::from(vec![
        Line::styled("Quit the GJU feed browser?", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Line::styled("[y]es      [n]o", Style::default().fg(Color::Gray)),
      ])
      .centered();

      let paragraph =
        Paragraph::new(text).centered().wrap(Wrap { trim: true }).block(Block::bordered().border_type(BorderType::Rounded));
      f.render_widget(Clear, popup_area);
      f.render_widget(paragraph, popup_area);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use crossterm::event::KeyModifiers;
  use pretty_assertions::assert_eq;

  use super::*;

  fn confirming() -> QuitPopup {
    let mut popup = QuitPopup::new();
    popup.register_config_handler(Config { confirm_quit: true, ..Config::default() }).unwrap();
    popup
  }

  #[test]
  fn yes_quits() {
    let mut popup = confirming();
    popup.update(Action::ConfirmQuit).unwrap();
    let action = popup.handle_key_events(KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE)).unwrap();
    assert_eq!(action, Some(Action::Quit));
  }

  #[test]
  fn no_cancels() {
    let mut popup = confirming();
    popup.update(Action::ConfirmQuit).unwrap();
    let action = popup.handle_key_events(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE)).unwrap();
    assert_eq!(action, Some(Action::CancelQuit));
    let ignored = popup.handle_key_events(KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE)).unwrap();
    assert_eq!(ignored, None);
  }
}
