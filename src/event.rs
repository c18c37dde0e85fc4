use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;

use tfdash::ActionEvent;

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Periodic tick for UI refresh and scheduled reloads
  Tick,
  /// Progress of a dispatched action
  Action(ActionEvent),
}

/// Event handler that merges terminal input, a tick timer and action events
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
  action_tx: mpsc::UnboundedSender<ActionEvent>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // Spawn terminal event reader
    let key_tx = tx.clone();
    tokio::task::spawn_blocking(move || loop {
      if event::poll(tick_rate).unwrap_or(false) {
        if let Ok(CrosstermEvent::Key(key)) = event::read() {
          if key.kind == KeyEventKind::Press && key_tx.send(Event::Key(key)).is_err() {
            break;
          }
        }
      } else if key_tx.send(Event::Tick).is_err() {
        break;
      }
    });

    // Forward action events into the same stream
    let (action_tx, mut action_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
      while let Some(event) = action_rx.recv().await {
        if tx.send(Event::Action(event)).is_err() {
          break;
        }
      }
    });

    Self { rx, action_tx }
  }

  /// Sender to hand to the dispatcher
  pub fn action_sender(&self) -> mpsc::UnboundedSender<ActionEvent> {
    self.action_tx.clone()
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
