use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::StatusMessage;

/// Draw the footer bar with view breadcrumb, and the latest status message
/// on the right
pub fn draw_footer(
  frame: &mut Frame,
  area: Rect,
  breadcrumb: &[String],
  message: Option<&StatusMessage>,
) {
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

  if let Some(message) = message {
    let (text, color) = match message {
      StatusMessage::Info(text) => (text, Color::Green),
      StatusMessage::Error(text) => (text, Color::Red),
    };
    spans.push(Span::styled("  │  ", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(text.clone(), Style::default().fg(color)));
  }

  let line = Line::from(spans);
  let paragraph = Paragraph::new(line).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}
