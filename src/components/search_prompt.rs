use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
  layout::Rect,
  prelude::{Color, Style},
  text::{Line, Span},
  widgets::{Block, BorderType, Clear, Paragraph},
};
use tokio::sync::{mpsc::UnboundedSender, oneshot};

use super::{centered_rect, Component};
use crate::{action::Action, host::InputPrompt, tui::Frame};

type PendingAnswer = Arc<Mutex<Option<oneshot::Sender<Option<String>>>>>;

/// The [`InputPrompt`] handed to commands. Asking opens the popup through the
/// action channel and waits until the popup answers or is dismissed.
#[derive(Clone)]
pub struct PromptHandle {
  tx: UnboundedSender<Action>,
  pending: PendingAnswer,
}

impl PromptHandle {
  pub fn new(tx: UnboundedSender<Action>) -> Self {
    Self { tx, pending: PendingAnswer::default() }
  }
}

#[async_trait]
impl InputPrompt for PromptHandle {
  async fn ask(&self, label: &str, placeholder: &str) -> Option<String> {
    let (answer_tx, answer_rx) = oneshot::channel();
    match self.pending.lock() {
      // One prompt at a time; a second request while it is open is dropped.
      Ok(pending) if pending.as_ref().is_some_and(|waiting| !waiting.is_closed()) => {
        log::debug!("Prompt already open, ignoring \"{label}\"");
        return None;
      },
      Ok(mut pending) => *pending = Some(answer_tx),
      Err(e) => {
        log::error!("Prompt state poisoned: {e}");
        return None;
      },
    }
    let prompt = Action::Prompt { label: label.to_string(), placeholder: placeholder.to_string() };
    if self.tx.send(prompt).is_err() {
      return None;
    }
    answer_rx.await.ok().flatten()
  }
}

/// Single line text input shown over the whole screen while a command waits
/// on a [`PromptHandle`].
pub struct SearchPrompt {
  command_tx: Option<UnboundedSender<Action>>,
  pending: PendingAnswer,
  label: String,
  placeholder: String,
  input: String,
  show: bool,
}

impl SearchPrompt {
  pub fn new(handle: &PromptHandle) -> Self {
    Self {
      command_tx: None,
      pending: handle.pending.clone(),
      label: String::new(),
      placeholder: String::new(),
      input: String::new(),
      show: false,
    }
  }

  fn close(&mut self, answer: Option<String>) -> Result<()> {
    self.show = false;
    self.input.clear();
    let sender = self.pending.lock().ok().and_then(|mut pending| pending.take());
    if let Some(sender) = sender {
      // The asking command may have been dropped in the meantime.
      let _ = sender.send(answer);
    }
    if let Some(tx) = &self.command_tx {
      tx.send(Action::PromptClosed)?;
    }
    Ok(())
  }
}

impl Component for SearchPrompt {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.command_tx = Some(tx);
    Ok(())
  }

  fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
    if !self.show {
      return Ok(None);
    }
    match key.code {
      KeyCode::Enter => {
        let input = self.input.clone();
        self.close(Some(input))?;
      },
      KeyCode::Esc => self.close(None)?,
      KeyCode::Backspace => {
        self.input.pop();
      },
      KeyCode::Char(c) => self.input.push(c),
      _ => {},
    }
    Ok(None)
  }

  fn update(&mut self, action: Action) -> Result<Option<Action>> {
    if let Action::Prompt { label, placeholder } = action {
      self.label = label;
      self.placeholder = placeholder;
      self.input.clear();
      self.show = true;
    }
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    if !self.show {
      return Ok(());
    }
    let mut popup_area = centered_rect(50, 20, area);
    popup_area.height = area.height.min(3);

    let line = if self.input.is_empty() {
      Line::from(Span::styled(self.placeholder.as_str(), Style::default().fg(Color::Gray)))
    } else {
      Line::from(vec![Span::raw(self.input.as_str()), Span::styled("▏", Style::default().fg(Color::Cyan))])
    };
    let paragraph = Paragraph::new(line).block(
      Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(Color::Cyan)).title(self.label.as_str()),
    );
    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
    Ok(())
  }
}
