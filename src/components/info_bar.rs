use clap::crate_version;
use color_eyre::eyre::Result;
use ratatui::{
  layout::{Constraint, Direction, Layout, Rect},
  prelude::{Color, Style},
  widgets::Paragraph,
};

use crate::{action::Action, components::Component, config::Config, tui::Frame};

/// Bottom line: the latest error, or the key hints when there is none.
#[derive(Default)]
pub struct InfoBar {
  config: Config,
  message: Option<String>,
}

impl InfoBar {
  pub fn new() -> Self {
    Self::default()
  }

  fn hints(&self) -> String {
    let mut bindings: Vec<String> =
      self.config.keybindings.iter().map(|(key, command)| format!("{key}: {command}")).collect();
    bindings.sort();
    bindings.push("q: quit".to_string());
    bindings.join("  ")
  }
}

impl Component for InfoBar {
  fn register_config_handler(&mut self, config: Config) -> Result<()> {
    self.config = config;
    Ok(())
  }

  fn update(&mut self, action: Action) -> Result<Option<Action>> {
    match action {
      Action::Error(message) => {
        self.message = Some(format!("{} {message}", chrono::Local::now().format("%H:%M:%S")));
      },
      Action::ShowDocument(_) => self.message = None,
      _ => {},
    }
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    let version = format!("gju-feed {}", crate_version!());
    let layout = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Fill(1), Constraint::Length(version.len() as u16 + 1)])
      .split(area);

    let status = match &self.message {
      Some(message) => Paragraph::new(message.as_str()).style(Style::default().fg(Color::Red)),
      None => Paragraph::new(self.hints()).style(Style::default().fg(Color::DarkGray)),
    };
    f.render_widget(status, layout[0]);
    f.render_widget(Paragraph::new(version), layout[1]);
    Ok(())
  }
}
