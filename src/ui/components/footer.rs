use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer bar: breadcrumb trail on the left, key hints on the
/// right.
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], hints: &str) {
  let mut spans = Vec::new();

  spans.push(Span::raw(" "));

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == breadcrumb.len() - 1 {
      // Current view - highlighted
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  let line = Line::from(spans);
  let left = Paragraph::new(line).style(Style::default().bg(Color::Black));

  let chunks = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Min(1), Constraint::Length(hints.len() as u16 + 1)])
    .split(area);

  frame.render_widget(left, chunks[0]);

  let right = Paragraph::new(hints)
    .style(Style::default().fg(Color::DarkGray).bg(Color::Black))
    .alignment(Alignment::Right);
  frame.render_widget(right, chunks[1]);
}
