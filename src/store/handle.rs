use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use super::state::StoreState;
use super::view::StoreView;
use crate::remote::{ConfigurationValue, Plan, Project};

/// Owner of all project, plan and configuration data.
///
/// The store is a `watch` channel: commits go through the single sender,
/// which serializes writers, and every [`StoreView`] is a receiver that
/// sees each commit whole. Cloning the handle shares the same store.
#[derive(Clone)]
pub struct Store {
  tx: Arc<watch::Sender<StoreState>>,
}

impl Store {
  pub fn new() -> Self {
    let (tx, _rx) = watch::channel(StoreState::default());
    Self { tx: Arc::new(tx) }
  }

  /// Read-only, subscribe-capable projection for views.
  pub fn view(&self) -> StoreView {
    StoreView::new(self.tx.subscribe())
  }

  /// Replace the entire project collection.
  pub fn commit_project_list(&self, list: Vec<Project>) {
    let count = list.len();
    let changed = self.tx.send_if_modified(|state| state.replace_projects(list));
    debug!(count, changed, "commit project list");
  }

  /// Upsert one project by guid, keeping its position if already listed.
  pub fn commit_project(&self, project: Project) {
    let guid = project.guid.clone();
    let changed = self.tx.send_if_modified(|state| state.upsert_project(project));
    debug!(%guid, changed, "commit project");
  }

  /// Replace the current plan unconditionally.
  ///
  /// Returns the `Arc` now held by the store.
  pub fn commit_plan(&self, plan: Plan) -> Arc<Plan> {
    let plan = Arc::new(plan);
    let stored = plan.clone();
    self.tx.send_if_modified(|state| state.replace_plan(stored));
    debug!(guid = %plan.project_guid, "commit plan");
    plan
  }

  pub fn commit_configuration(&self, values: Vec<ConfigurationValue>) {
    let changed = self
      .tx
      .send_if_modified(|state| state.replace_configuration(values));
    debug!(changed, "commit configuration");
  }

  /// The project collection; the same `Arc` is returned until a commit
  /// changes it.
  pub fn project_list(&self) -> Arc<Vec<Project>> {
    self.tx.borrow().projects()
  }

  pub fn project_by_guid(&self, guid: &str) -> Option<Project> {
    self.tx.borrow().project(guid)
  }

  /// `None` until a plan has been loaded.
  pub fn current_plan(&self) -> Option<Arc<Plan>> {
    self.tx.borrow().plan()
  }

  pub fn configuration(&self) -> Arc<Vec<ConfigurationValue>> {
    self.tx.borrow().configuration()
  }

  pub fn revision(&self) -> u64 {
    self.tx.borrow().revision()
  }
}

impl Default for Store {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::remote::ProjectStatus;
  use serde_json::json;

  fn project(guid: &str, name: &str) -> Project {
    Project::new(guid, name, ProjectStatus::Ok)
  }

  #[test]
  fn test_empty_store() {
    let store = Store::new();
    assert!(store.project_list().is_empty());
    assert!(store.project_by_guid("g1").is_none());
    assert!(store.current_plan().is_none());
    assert!(store.configuration().is_empty());
    assert_eq!(store.revision(), 0);
  }

  #[test]
  fn test_project_list_is_referentially_stable() {
    let store = Store::new();
    store.commit_project_list(vec![project("g1", "thrx")]);

    let first = store.project_list();
    let second = store.project_list();
    assert!(Arc::ptr_eq(&first, &second));

    store.commit_project(project("g1", "renamed"));
    assert!(!Arc::ptr_eq(&first, &store.project_list()));
  }

  #[test]
  fn test_commit_project_upserts() {
    let store = Store::new();
    store.commit_project_list(vec![project("g1", "old"), project("g2", "two")]);

    store.commit_project(project("g1", "new"));

    assert_eq!(store.project_by_guid("g1").unwrap().name, "new");
    assert_eq!(store.project_list().len(), 2);
  }

  #[test]
  fn test_commit_plan_replaces_previous() {
    let store = Store::new();
    store.commit_plan(Plan {
      project_guid: "a".into(),
      document: json!({}),
    });
    store.commit_plan(Plan {
      project_guid: "b".into(),
      document: json!({"resources": []}),
    });

    assert_eq!(store.current_plan().unwrap().project_guid, "b");
  }

  #[test]
  fn test_commit_plan_returns_stored_arc() {
    let store = Store::new();
    let committed = store.commit_plan(Plan {
      project_guid: "a".into(),
      document: json!({"resources": []}),
    });

    assert!(Arc::ptr_eq(&committed, &store.current_plan().unwrap()));
  }

  #[test]
  fn test_clones_share_state() {
    let store = Store::new();
    let other = store.clone();
    other.commit_project_list(vec![project("g1", "thrx")]);
    assert_eq!(store.project_list().len(), 1);
  }
}
