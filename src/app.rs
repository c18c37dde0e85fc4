use crate::event::{Event, EventHandler};
use crate::ui;
use crate::ui::renderfns::header::extract_domain;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::dashboard::DashboardView;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use tfdash::config::Config;
use tfdash::{Action, ActionEvent, Dispatcher, Outcome, Store};

/// Message shown in the footer until the next one replaces it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
  Info(String),
  Error(String),
}

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Application configuration
  config: Config,

  store: Store,
  dispatcher: Dispatcher,

  /// Latest action outcome worth telling the user about
  message: Option<StatusMessage>,

  /// When the project list was last requested by the refresh timer
  last_refresh: Instant,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, store: Store, dispatcher: Dispatcher) -> Self {
    let root = DashboardView::new(store.view(), dispatcher.clone());

    Self {
      view_stack: vec![Box::new(root)],
      config,
      store,
      dispatcher,
      message: None,
      last_refresh: Instant::now(),
      should_quit: false,
    }
  }

  pub async fn run(&mut self, mut events: EventHandler) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    info!(revision = self.store.revision(), "dashboard started");

    // Store commits wake the loop so views redraw without waiting for a tick
    let mut updates = self.store.view();
    let mut store_open = true;

    // Main loop
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      tokio::select! {
        event = events.next() => match event {
          Some(event) => self.handle_event(event),
          None => self.should_quit = true,
        },
        open = updates.changed(), if store_open => store_open = open,
      }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.maybe_refresh(),
      Event::Action(event) => self.handle_action_event(event),
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let Some(view) = self.view_stack.last_mut() else {
      self.should_quit = true;
      return;
    };

    match view.handle_key(key) {
      ViewAction::None => {}
      ViewAction::Push(view) => {
        debug!(view = %view.breadcrumb_label(), "push view");
        self.view_stack.push(view);
      }
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn handle_action_event(&mut self, event: ActionEvent) {
    match event {
      ActionEvent::Requesting(_) => {}
      ActionEvent::Committed(Action::Apply(_), Outcome::Applied(ack)) => {
        let text = match ack.task_id {
          Some(task) => format!("Apply scheduled for {} (task {})", ack.project_guid, task),
          None => format!("Apply scheduled for {}", ack.project_guid),
        };
        self.message = Some(StatusMessage::Info(text));
      }
      ActionEvent::Committed(..) => {
        // A later success clears a stale error from the same screen
        if matches!(self.message, Some(StatusMessage::Error(_))) {
          self.message = None;
        }
      }
      ActionEvent::Failed(err) => {
        self.message = Some(StatusMessage::Error(err.to_string()));
      }
    }
  }

  /// Re-request the project list every `refresh_secs`
  fn maybe_refresh(&mut self) {
    if self.config.refresh_secs == 0 {
      return;
    }
    if self.last_refresh.elapsed() >= Duration::from_secs(self.config.refresh_secs) {
      self.last_refresh = Instant::now();
      self.dispatcher.dispatch(Action::LoadProjectList);
    }
  }

  // Accessors for UI rendering
  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn title(&self) -> &str {
    match &self.config.title {
      Some(title) => title,
      None => extract_domain(&self.config.api.base_url),
    }
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }

  pub fn message(&self) -> Option<&StatusMessage> {
    self.message.as_ref()
  }
}
