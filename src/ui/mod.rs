pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use renderfns::footer::draw_footer;
use renderfns::header::draw_header;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let title = app.title().to_string();
  let breadcrumb = app.view_breadcrumb();
  let message = app.message().cloned();

  if let Some(view) = app.current_view_mut() {
    draw_header(frame, chunks[0], &title, &view.shortcuts());
    view.render(frame, chunks[1]);
  }

  draw_footer(frame, chunks[2], &breadcrumb, message.as_ref());
}
