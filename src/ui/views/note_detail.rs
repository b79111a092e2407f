use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::api::types::NoteId;
use crate::sync::{AppStore, DetailSnapshot};
use crate::ui::view::{View, ViewAction};
use crate::ui::{tag_color, truncate};

/// View for displaying a single note.
pub struct NoteDetailView {
  id: NoteId,
  /// Listing title, shown until the full note arrives.
  title: String,
  started: bool,
}

impl NoteDetailView {
  pub fn new(id: NoteId, title: String) -> Self {
    Self {
      id,
      title,
      started: false,
    }
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect, store: &AppStore) {
    let snapshot = store.detail_snapshot(&self.id);

    let title = match &snapshot {
      DetailSnapshot::Loading => format!(" {} (loading...) ", truncate(&self.title, 40)),
      DetailSnapshot::Failed(_) => format!(" {} ", truncate(&self.title, 40)),
      DetailSnapshot::Ready { note, .. } => format!(" {} ", truncate(&note.title, 40)),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let note = match &snapshot {
      DetailSnapshot::Loading => {
        let paragraph =
          Paragraph::new("Loading note...").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, inner);
        return;
      }
      DetailSnapshot::Failed(error) if error.is_not_found() => {
        let paragraph = Paragraph::new("Note not found. It may have been deleted.")
          .style(Style::default().fg(Color::Red));
        frame.render_widget(paragraph, inner);
        return;
      }
      DetailSnapshot::Failed(error) => {
        let paragraph = Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", error))
          .style(Style::default().fg(Color::Red));
        frame.render_widget(paragraph, inner);
        return;
      }
      DetailSnapshot::Ready { note, .. } => note,
    };

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Tag and creation date
        Constraint::Length(1), // Separator
        Constraint::Min(1),    // Content
      ])
      .split(inner);

    let header = Line::from(vec![
      Span::styled("Tag: ", Style::default().fg(Color::DarkGray)),
      Span::styled(note.tag.as_str(), Style::default().fg(tag_color(note.tag))),
      Span::raw("  "),
      Span::styled("Created: ", Style::default().fg(Color::DarkGray)),
      Span::raw(note.created_at.format("%Y-%m-%d %H:%M").to_string()),
    ]);
    frame.render_widget(Paragraph::new(header), chunks[0]);

    let sep = Paragraph::new("─".repeat(chunks[1].width as usize))
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, chunks[1]);

    let content = if note.content.is_empty() {
      "No content"
    } else {
      &note.content
    };
    let content_para = Paragraph::new(content).wrap(Wrap { trim: false });
    frame.render_widget(content_para, chunks[2]);
  }
}

impl View for NoteDetailView {
  fn handle_key(&mut self, key: KeyEvent, store: &mut AppStore) -> ViewAction {
    match key.code {
      KeyCode::Char('r') => {
        // Resolving again is the retry path after a failure.
        store.resolve_detail(&self.id);
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, store: &AppStore) {
    self.render_detail(frame, area, store);
  }

  fn breadcrumb_label(&self) -> String {
    truncate(&self.title, 24)
  }

  fn tick(&mut self, store: &mut AppStore) -> ViewAction {
    if !self.started {
      // Cache hit when the listing prefetched this note.
      store.resolve_detail(&self.id);
      self.started = true;
    }
    ViewAction::None
  }

  fn hints(&self) -> &'static str {
    "r:refresh  q:back"
  }
}
