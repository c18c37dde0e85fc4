use std::sync::Arc;
use tokio::sync::watch;

use super::state::StoreState;
use crate::remote::{ConfigurationValue, Plan, Project};

/// Read-only projection of the store.
///
/// Views can read derived data and wait for changes, but cannot commit.
#[derive(Clone)]
pub struct StoreView {
  rx: watch::Receiver<StoreState>,
}

impl StoreView {
  pub(super) fn new(rx: watch::Receiver<StoreState>) -> Self {
    Self { rx }
  }

  pub fn project_list(&self) -> Arc<Vec<Project>> {
    self.rx.borrow().projects()
  }

  pub fn project_by_guid(&self, guid: &str) -> Option<Project> {
    self.rx.borrow().project(guid)
  }

  pub fn current_plan(&self) -> Option<Arc<Plan>> {
    self.rx.borrow().plan()
  }

  pub fn configuration(&self) -> Arc<Vec<ConfigurationValue>> {
    self.rx.borrow().configuration()
  }

  pub fn revision(&self) -> u64 {
    self.rx.borrow().revision()
  }

  /// Wait for the next commit that changed the store.
  ///
  /// Returns false once the store has been dropped.
  pub async fn changed(&mut self) -> bool {
    self.rx.changed().await.is_ok()
  }
}
