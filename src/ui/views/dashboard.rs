use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use tfdash::remote::ConfigurationValue;
use tfdash::{Action, Dispatcher, StoreView};

use super::project_detail::ProjectDetailView;
use crate::ui::renderfns::utils::{status_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};

/// Root view listing every project
pub struct DashboardView {
  store: StoreView,
  dispatcher: Dispatcher,
  selected: usize,
}

impl DashboardView {
  pub fn new(store: StoreView, dispatcher: Dispatcher) -> Self {
    let mut view = Self {
      store,
      dispatcher,
      selected: 0,
    };
    view.refresh();
    view
  }

  fn move_selection(&mut self, delta: i32) {
    let len = self.store.project_list().len();
    if len > 0 {
      self.selected = (self.selected as i32 + delta).rem_euclid(len as i32) as usize;
    }
  }
}

/// One line of `name: value` pairs, e.g. the server's terraform version
fn configuration_line(values: &[ConfigurationValue]) -> Line<'static> {
  let mut spans = vec![Span::raw(" ")];
  for (i, value) in values.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled("  │  ", Style::default().fg(Color::DarkGray)));
    }
    let label = if value.name.is_empty() {
      &value.id
    } else {
      &value.name
    };
    spans.push(Span::styled(
      format!("{}: ", label),
      Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::styled(
      value.value.clone(),
      Style::default().fg(Color::White),
    ));
  }
  Line::from(spans)
}

impl View for DashboardView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
      KeyCode::Enter => {
        let projects = self.store.project_list();
        if let Some(project) = projects.get(self.selected) {
          return ViewAction::Push(Box::new(ProjectDetailView::new(
            project.guid.clone(),
            project.name.clone(),
            self.store.clone(),
            self.dispatcher.clone(),
          )));
        }
      }
      KeyCode::Char('r') => self.refresh(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let configuration = self.store.configuration();
    let area = if configuration.is_empty() {
      area
    } else {
      let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
          Constraint::Length(1), // Server configuration
          Constraint::Min(1),    // Project list
        ])
        .split(area);
      frame.render_widget(Paragraph::new(configuration_line(&configuration)), chunks[0]);
      chunks[1]
    };

    let projects = self.store.project_list();
    let loading = self.dispatcher.is_in_flight(&Action::LoadProjectList);

    // The list can shrink under us after a reload
    if self.selected >= projects.len() {
      self.selected = projects.len().saturating_sub(1);
    }

    let title = if loading {
      " Projects (loading...) ".to_string()
    } else {
      format!(" Projects ({}) ", projects.len())
    };

    let block = Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if projects.is_empty() {
      let content = if loading {
        "Loading projects..."
      } else {
        "No projects found."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let now = Utc::now();
    let items: Vec<ListItem> = projects
      .iter()
      .map(|project| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:<8}", project.status.as_str()),
            Style::default().fg(status_color(project.status)),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<40}", truncate(&project.name, 40)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(
            project.plan_updated.display_relative(now),
            Style::default().fg(Color::DarkGray),
          ),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(self.selected));

    frame.render_stateful_widget(list, area, &mut state);
  }

  fn breadcrumb_label(&self) -> String {
    "Projects".to_string()
  }

  fn refresh(&mut self) {
    self.dispatcher.dispatch(Action::LoadProjectList);
    self.dispatcher.dispatch(Action::LoadConfiguration);
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("enter", "open").with_priority(5),
      ShortcutInfo::new("r", "refresh").with_priority(10),
      ShortcutInfo::new("q", "quit").with_priority(30),
    ]
  }
}
