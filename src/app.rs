use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
  layout::{Constraint, Direction, Layout},
  prelude::Rect,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
  action::Action,
  commands::{CommandId, CommandSurface},
  components::{
    document_panel::DocumentPanel,
    feed_view::FeedView,
    info_bar::InfoBar,
    item_list::ItemList,
    quit_popup::QuitPopup,
    search_prompt::{PromptHandle, SearchPrompt},
    Component,
  },
  config::Config,
  feed::HttpTransport,
  host::{ActionBridge, ListView},
  mode::Mode,
  tui,
};

pub struct App {
  pub config: Config,
  pub tick_rate: f64,
  pub frame_rate: f64,
  pub should_quit: bool,
  pub should_suspend: bool,
  pub mode: Mode,
  feed_view: FeedView,
  info_bar: InfoBar,
  search_prompt: SearchPrompt,
  quit_popup: QuitPopup,
  surface: Arc<CommandSurface>,
  prompt: Arc<PromptHandle>,
  action_tx: UnboundedSender<Action>,
  action_rx: UnboundedReceiver<Action>,
}

impl App {
  pub fn new(tick_rate: f64, frame_rate: f64) -> Result<Self> {
    let config = Config::new()?;
    let (action_tx, action_rx) = mpsc::unbounded_channel();

    let bridge = Arc::new(ActionBridge::new(action_tx.clone()));
    let surface = Arc::new(CommandSurface::new(&config.feed, Arc::new(HttpTransport::new()), bridge.clone(), bridge));
    let prompt = Arc::new(PromptHandle::new(action_tx.clone()));

    let mut item_list = ItemList::new();
    item_list.bind(surface.list());

    Ok(Self {
      config,
      tick_rate,
      frame_rate,
      should_quit: false,
      should_suspend: false,
      mode: Mode::default(),
      feed_view: FeedView::new(item_list, DocumentPanel::new()),
      info_bar: InfoBar::new(),
      search_prompt: SearchPrompt::new(&prompt),
      quit_popup: QuitPopup::new(),
      surface,
      prompt,
      action_tx,
      action_rx,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    let mut tui = tui::Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate).mouse(true);
    tui.enter()?;

    let action_tx = self.action_tx.clone();
    let config = self.config.clone();
    let size = tui.size()?;
    for component in self.components() {
      component.register_action_handler(action_tx.clone())?;
      component.register_config_handler(config.clone())?;
      component.init(size)?;
    }

    if self.config.fetch_on_start {
      action_tx.send(Action::Run(CommandId::FetchAndList))?;
    }

    loop {
      if let Some(e) = tui.next().await {
        match e {
          tui::Event::Tick => action_tx.send(Action::Tick)?,
          tui::Event::Render => action_tx.send(Action::Render)?,
          tui::Event::Resize(x, y) => action_tx.send(Action::Resize(x, y))?,
          tui::Event::Key(key) => {
            if let Some(action) = self.handle_key(key) {
              action_tx.send(action)?;
            }
          },
          _ => {},
        }
        for component in self.focused_components() {
          if let Some(action) = component.handle_events(Some(e.clone()))? {
            action_tx.send(action)?;
          }
        }
      }

      while let Ok(action) = self.action_rx.try_recv() {
        if action != Action::Tick && action != Action::Render {
          log::debug!("{action:?}");
        }
        match action {
          Action::Quit => self.should_quit = true,
          Action::Suspend => self.should_suspend = true,
          Action::Resume => self.should_suspend = false,
          Action::ConfirmQuit => {
            if self.config.confirm_quit {
              self.mode = Mode::ConfirmQuit;
            } else {
              self.should_quit = true;
            }
          },
          Action::CancelQuit | Action::PromptClosed => self.mode = Mode::Browse,
          Action::Prompt { .. } => self.mode = Mode::Searching,
          Action::Run(command) => self.run_command(command),
          Action::OpenItem(ref item) => self.surface.open_item(item),
          Action::Resize(w, h) => tui.resize(Rect::new(0, 0, w, h))?,
          _ => {},
        }
        let redraw = matches!(action, Action::Render | Action::Resize(..));
        for component in self.components() {
          if let Some(action) = component.update(action.clone())? {
            action_tx.send(action)?
          };
        }
        if redraw {
          self.draw(&mut tui)?;
        }
      }
      if self.should_suspend {
        tui.suspend()?;
        action_tx.send(Action::Resume)?;
        tui = tui::Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate).mouse(true);
        tui.enter()?;
      } else if self.should_quit {
        tui.stop()?;
        break;
      }
    }
    tui.exit()?;
    Ok(())
  }

  /// Keys handled above the components: quitting, suspending and the
  /// configured command bindings. Bindings only apply while browsing so that
  /// typing a search term never triggers a command.
  fn handle_key(&self, key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
      return match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') => Some(Action::Quit),
        KeyCode::Char('z') => Some(Action::Suspend),
        _ => None,
      };
    }
    if self.mode != Mode::Browse {
      return None;
    }
    match key.code {
      KeyCode::Char('q') => Some(Action::ConfirmQuit),
      KeyCode::Char(c) => self.config.keybindings.get(&c.to_string()).map(|command| Action::Run(*command)),
      _ => None,
    }
  }

  fn run_command(&self, command: CommandId) {
    let surface = self.surface.clone();
    match command {
      CommandId::FetchAndDisplay => {
        tokio::spawn(async move {
          if let Err(e) = surface.fetch_and_display().await {
            log::debug!("{command} finished with {e}");
          }
        });
      },
      CommandId::FetchAndList => {
        tokio::spawn(async move {
          if let Err(e) = surface.fetch_and_list().await {
            log::debug!("{command} finished with {e}");
          }
        });
      },
      CommandId::PromptAndSearch => {
        let prompt = self.prompt.clone();
        tokio::spawn(async move {
          if let Err(e) = surface.prompt_and_search(prompt.as_ref()).await {
            log::debug!("{command} finished with {e}");
          }
        });
      },
      CommandId::OpenItem => log::warn!("{command} needs an item; select one in the list and press Enter"),
    }
  }

  fn components(&mut self) -> [&mut dyn Component; 4] {
    [
      &mut self.feed_view as &mut dyn Component,
      &mut self.info_bar as &mut dyn Component,
      &mut self.search_prompt as &mut dyn Component,
      &mut self.quit_popup as &mut dyn Component,
    ]
  }

  fn focused_components(&mut self) -> Vec<&mut dyn Component> {
    match self.mode {
      Mode::Browse => vec![&mut self.feed_view as &mut dyn Component, &mut self.info_bar as &mut dyn Component],
      Mode::Searching => vec![&mut self.search_prompt as &mut dyn Component],
      Mode::ConfirmQuit => vec![&mut self.quit_popup as &mut dyn Component],
    }
  }

  fn draw(&mut self, tui: &mut tui::Tui) -> Result<()> {
    let action_tx = self.action_tx.clone();
    let (feed_view, info_bar, search_prompt, quit_popup) =
      (&mut self.feed_view, &mut self.info_bar, &mut self.search_prompt, &mut self.quit_popup);
    tui.draw(|f| {
      let area = f.size();
      let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(1)])
        .split(area);
      let results = [
        feed_view.draw(f, layout[0]),
        info_bar.draw(f, layout[1]),
        search_prompt.draw(f, area),
        quit_popup.draw(f, area),
      ];
      for result in results {
        if let Err(e) = result {
          if action_tx.send(Action::Error(format!("Failed to draw: {e:?}"))).is_err() {
            log::error!("Failed to draw: {e:?}");
          }
        }
      }
    })?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  fn app() -> App {
    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let config = Config::default().with_default_keybindings();
    let bridge = Arc::new(ActionBridge::new(action_tx.clone()));
    let surface = Arc::new(CommandSurface::new(&config.feed, Arc::new(HttpTransport::new()), bridge.clone(), bridge));
    let prompt = Arc::new(PromptHandle::new(action_tx.clone()));
    App {
      config,
      tick_rate: 1.0,
      frame_rate: 4.0,
      should_quit: false,
      should_suspend: false,
      mode: Mode::Browse,
      feed_view: FeedView::new(ItemList::new(), DocumentPanel::new()),
      info_bar: InfoBar::new(),
      search_prompt: SearchPrompt::new(&prompt),
      quit_popup: QuitPopup::new(),
      surface,
      prompt,
      action_tx,
      action_rx,
    }
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn bound_keys_run_commands() {
    let app = app();
    assert_eq!(app.handle_key(key(KeyCode::Char('d'))), Some(Action::Run(CommandId::FetchAndDisplay)));
    assert_eq!(app.handle_key(key(KeyCode::Char('f'))), Some(Action::Run(CommandId::FetchAndList)));
    assert_eq!(app.handle_key(key(KeyCode::Char('/'))), Some(Action::Run(CommandId::PromptAndSearch)));
    assert_eq!(app.handle_key(key(KeyCode::Char('x'))), None);
  }

  #[test]
  fn bindings_are_ignored_while_searching() {
    let mut app = app();
    app.mode = Mode::Searching;
    assert_eq!(app.handle_key(key(KeyCode::Char('d'))), None);
    assert_eq!(app.handle_key(key(KeyCode::Char('q'))), None);
    assert_eq!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(Action::Quit));
  }

  #[test]
  fn q_asks_before_quitting() {
    let app = app();
    assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Some(Action::ConfirmQuit));
    assert_eq!(app.handle_key(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL)), Some(Action::Suspend));
  }
}
