use std::io::stdout;
use std::time::Duration;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;

use crate::api::types::NoteTag;
use crate::api::ApiClient;
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::sync::{AppStore, NotesStore};
use crate::ui::components::draw_footer;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::NoteListView;

/// Main application: the store, the view stack, and the event loop.
pub struct App {
  store: AppStore,
  /// Navigation stack - root is always at index 0
  views: Vec<Box<dyn View>>,
  should_quit: bool,
}

impl App {
  pub fn new(config: &Config, tag: Option<NoteTag>) -> Result<Self> {
    let api = ApiClient::new(config)?;
    let store = NotesStore::new(api, tag, config.sync.options());

    Ok(Self {
      store,
      views: vec![Box::new(NoteListView::new())],
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(100));

    // Main loop
    while !self.should_quit {
      self.draw(&mut terminal)?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.handle_tick(),
        None => break,
      }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn draw(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    let breadcrumb: Vec<String> = self.views.iter().map(|v| v.breadcrumb_label()).collect();
    let hints = self.views.last().map(|v| v.hints()).unwrap_or_default();

    terminal.draw(|frame| {
      let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
          Constraint::Min(1),    // Main content
          Constraint::Length(1), // Footer
        ])
        .split(frame.area());

      let store = &self.store;
      if let Some(view) = self.views.last_mut() {
        view.render(frame, chunks[0], store);
      }

      draw_footer(frame, chunks[1], &breadcrumb, hints);
    })?;

    Ok(())
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let action = match self.views.last_mut() {
      Some(view) => view.handle_key(key, &mut self.store),
      None => ViewAction::None,
    };
    self.apply(action);
  }

  fn handle_tick(&mut self) {
    self.store.tick();

    let action = match self.views.last_mut() {
      Some(view) => view.tick(&mut self.store),
      None => ViewAction::None,
    };
    self.apply(action);
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.views.push(view),
      ViewAction::Pop => {
        if self.views.len() > 1 {
          self.views.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }
}
