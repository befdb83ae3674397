use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use html5ever::{parse_document, tendril::TendrilSink};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use ratatui::{
  layout::Rect,
  prelude::{Color, Style},
  widgets::{Block, Borders, Paragraph, Wrap},
};
use tokio::sync::mpsc::UnboundedSender;

use super::Component;
use crate::{action::Action, render::PAGE_TITLE, tui::Frame};

const BLOCK_TAGS: &[&str] = &[
  "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "li", "ol", "ul", "table", "section", "article", "header",
  "footer", "pre", "blockquote",
];
const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Shows the most recent document, flattened from HTML to wrapped text.
#[derive(Default)]
pub struct DocumentPanel {
  command_tx: Option<UnboundedSender<Action>>,
  content: Option<String>,
  scroll_position: (u16, u16),
  active: bool,
}

impl DocumentPanel {
  pub fn new() -> Self {
    Self::default()
  }

  fn scroll_up(&mut self) {
    self.scroll_position.0 = self.scroll_position.0.saturating_sub(1);
  }

  fn scroll_down(&mut self) {
    self.scroll_position.0 = self.scroll_position.0.saturating_add(1);
  }
}

impl Component for DocumentPanel {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.command_tx = Some(tx);
    Ok(())
  }

  fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
    if !self.active {
      return Ok(None);
    }
    match key.code {
      KeyCode::Char('k') | KeyCode::Up => self.scroll_up(),
      KeyCode::Char('j') | KeyCode::Down => self.scroll_down(),
      KeyCode::PageUp => self.scroll_position.0 = self.scroll_position.0.saturating_sub(10),
      KeyCode::PageDown => self.scroll_position.0 = self.scroll_position.0.saturating_add(10),
      KeyCode::Char('g') => self.scroll_position.0 = 0,
      KeyCode::Char('h') | KeyCode::Esc => {
        if let Some(tx) = &self.command_tx {
          tx.send(Action::ActivateFeedList)?;
        }
      },
      _ => {},
    }
    Ok(None)
  }

  fn handle_mouse_events(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
    if self.active {
      match mouse.kind {
        MouseEventKind::ScrollUp => self.scroll_up(),
        MouseEventKind::ScrollDown => self.scroll_down(),
        _ => {},
      }
    }
    Ok(None)
  }

  fn update(&mut self, action: Action) -> Result<Option<Action>> {
    match action {
      Action::ShowDocument(html) => {
        self.content = Some(html_to_text(&html));
        self.scroll_position = (0, 0);
      },
      Action::ActivateReader => self.active = true,
      Action::ActivateFeedList => self.active = false,
      _ => {},
    }
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    let border_style = if self.active { Style::default().fg(Color::Cyan) } else { Style::default() };
    let block = Block::default().borders(Borders::ALL).border_style(border_style).title(PAGE_TITLE);
    let text = self.content.clone().unwrap_or_else(|| "Press d to show the feed, f to list it, / to search.".to_string());
    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true }).scroll(self.scroll_position);
    f.render_widget(paragraph, area);
    Ok(())
  }
}

/// Flattens an HTML page into readable lines. Block elements are separated by
/// a blank line, table rows and list items by a line break, and the cells of a
/// row are joined with ` | `.
pub fn html_to_text(html: &str) -> String {
  let dom = parse_document(RcDom::default(), Default::default()).one(html);
  let mut out = String::new();
  walk(&dom.document, &mut out);

  let mut text = String::new();
  let mut blank = true;
  for line in out.lines().map(str::trim) {
    if line.is_empty() {
      if !blank {
        text.push('\n');
      }
      blank = true;
    } else {
      text.push_str(line);
      text.push('\n');
      blank = false;
    }
  }
  text.trim_end().to_string()
}

fn walk(handle: &Handle, out: &mut String) {
  match &handle.data {
    NodeData::Text { contents } => {
      let contents = contents.borrow();
      let words: Vec<&str> = contents.split_whitespace().collect();
      if words.is_empty() {
        return;
      }
      if !out.is_empty() && !out.ends_with(|c: char| c == '\n' || c == ' ') && contents.starts_with(char::is_whitespace)
      {
        out.push(' ');
      }
      out.push_str(&words.join(" "));
      if contents.ends_with(char::is_whitespace) {
        out.push(' ');
      }
    },
    NodeData::Element { name, .. } => {
      let tag = &*name.local;
      if SKIPPED_TAGS.contains(&tag) {
        return;
      }
      if tag == "br" {
        out.push('\n');
        return;
      }
      if matches!(tag, "td" | "th") && !out.is_empty() && !out.ends_with('\n') {
        let trimmed = out.trim_end_matches(' ').len();
        out.truncate(trimmed);
        out.push_str(" | ");
      }
      let is_block = BLOCK_TAGS.contains(&tag);
      if is_block && !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
      }
      for child in handle.children.borrow().iter() {
        walk(child, out);
      }
      if is_block {
        out.push_str(if matches!(tag, "tr" | "li") { "\n" } else { "\n\n" });
      }
    },
    _ => {
      for child in handle.children.borrow().iter() {
        walk(child, out);
      }
    },
  }
}
