use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use tfdash::remote::{ChangeAction, ResourceChange};
use tfdash::{Action, Dispatcher, StoreView};

use crate::ui::renderfns::utils::{change_color, status_color};
use crate::ui::view::{ShortcutInfo, View, ViewAction};

/// View for one project and its current plan
pub struct ProjectDetailView {
  guid: String,
  /// Name from the list, shown until the detail fetch lands
  name: String,
  store: StoreView,
  dispatcher: Dispatcher,
}

impl ProjectDetailView {
  pub fn new(guid: String, name: String, store: StoreView, dispatcher: Dispatcher) -> Self {
    let mut view = Self {
      guid,
      name,
      store,
      dispatcher,
    };
    view.refresh();
    view
  }

  fn header_lines(&self) -> Vec<Line<'static>> {
    let Some(project) = self.store.project_by_guid(&self.guid) else {
      return vec![Line::from(Span::styled(
        "Loading project...",
        Style::default().fg(Color::DarkGray),
      ))];
    };

    let mut lines = vec![
      Line::from(vec![
        Span::styled("Status: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
          project.status.to_string(),
          Style::default().fg(status_color(project.status)),
        ),
        Span::raw("  "),
        Span::styled("Plan updated: ", Style::default().fg(Color::DarkGray)),
        Span::raw(project.plan_updated.display_relative(Utc::now())),
      ]),
      Line::from(vec![
        Span::styled("GUID: ", Style::default().fg(Color::DarkGray)),
        Span::raw(project.guid.clone()),
      ]),
    ];

    for (key, value) in &project.settings {
      lines.push(Line::from(vec![
        Span::styled(format!("{}: ", key), Style::default().fg(Color::DarkGray)),
        Span::raw(value.clone()),
      ]));
    }

    lines.extend(pending_lines(&project.pending_changes));
    lines
  }

  fn plan_lines(&self) -> Vec<Line<'static>> {
    let loading = self
      .dispatcher
      .is_in_flight(&Action::GetPlan(self.guid.clone()));

    // The current plan may still belong to a project viewed earlier
    let plan = self
      .store
      .current_plan()
      .filter(|plan| plan.project_guid == self.guid);

    let Some(plan) = plan else {
      let text = if loading {
        "Loading plan..."
      } else {
        "No plan loaded. Press 'r' to retry."
      };
      return vec![Line::from(Span::styled(
        text,
        Style::default().fg(Color::DarkGray),
      ))];
    };

    let changes = plan.changes();
    if changes.is_empty() {
      return vec![Line::from(Span::styled(
        "No changes. Infrastructure is up-to-date.",
        Style::default().fg(Color::Green),
      ))];
    }

    changes
      .into_iter()
      .map(|change| {
        Line::from(vec![
          Span::styled(
            format!("{:<10}", change.action.label()),
            Style::default().fg(change_color(&change.action)),
          ),
          Span::raw(change.name),
        ])
      })
      .collect()
  }
}

/// Changes the server reports as not yet applied
fn pending_lines(changes: &[ResourceChange]) -> Vec<Line<'static>> {
  if changes.is_empty() {
    return Vec::new();
  }

  let mut lines = vec![Line::from(Span::styled(
    format!("Pending changes: {}", changes.len()),
    Style::default().fg(Color::Yellow),
  ))];
  for change in changes {
    let action = ChangeAction::parse(&change.action);
    lines.push(Line::from(vec![
      Span::raw("  "),
      Span::styled(
        format!("{:<10}", action.label()),
        Style::default().fg(change_color(&action)),
      ),
      Span::raw(change.resource_id.clone()),
    ]));
  }
  lines
}

impl View for ProjectDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('r') => {
        self.refresh();
        ViewAction::None
      }
      KeyCode::Char('a') => {
        self.dispatcher.dispatch(Action::Apply(self.guid.clone()));
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    if let Some(project) = self.store.project_by_guid(&self.guid) {
      self.name = project.name;
    }

    let block = Block::default()
      .title(format!(" {} ", self.name))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header = self.header_lines();
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(header.len() as u16), // Project fields
        Constraint::Length(1),                   // Separator
        Constraint::Min(1),                      // Plan
      ])
      .split(inner);

    frame.render_widget(Paragraph::new(header), chunks[0]);

    let sep = Paragraph::new("─".repeat(chunks[1].width as usize))
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, chunks[1]);

    let plan = Paragraph::new(self.plan_lines()).wrap(Wrap { trim: false });
    frame.render_widget(plan, chunks[2]);
  }

  fn breadcrumb_label(&self) -> String {
    self.name.clone()
  }

  fn refresh(&mut self) {
    self
      .dispatcher
      .dispatch(Action::LoadProject(self.guid.clone()));
    self.dispatcher.dispatch(Action::GetPlan(self.guid.clone()));
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("a", "apply").with_priority(5),
      ShortcutInfo::new("r", "refresh").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn text(line: &Line) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
  }

  #[test]
  fn test_pending_lines() {
    let lines = pending_lines(&[ResourceChange {
      resource_id: "aws_s3_bucket.logs".into(),
      action: "Create".into(),
    }]);

    assert_eq!(lines.len(), 2);
    assert_eq!(text(&lines[0]), "Pending changes: 1");
    assert!(text(&lines[1]).ends_with("aws_s3_bucket.logs"));
  }

  #[test]
  fn test_no_pending_lines_when_clean() {
    assert!(pending_lines(&[]).is_empty());
  }
}
