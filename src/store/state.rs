//! The snapshot held by the entity store.

use std::collections::HashMap;
use std::sync::Arc;

use crate::remote::{ConfigurationValue, Plan, Project};

/// Everything the store knows, as one immutable-by-default snapshot.
///
/// Collections sit behind `Arc` so readers can hold on to them cheaply and
/// so an unchanged collection keeps the same allocation across commits.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
  projects: Arc<Vec<Project>>,
  /// guid -> position in `projects`
  index: Arc<HashMap<String, usize>>,
  plan: Option<Arc<Plan>>,
  configuration: Arc<Vec<ConfigurationValue>>,
  revision: u64,
}

impl StoreState {
  pub fn projects(&self) -> Arc<Vec<Project>> {
    Arc::clone(&self.projects)
  }

  pub fn project(&self, guid: &str) -> Option<Project> {
    self
      .index
      .get(guid)
      .and_then(|&pos| self.projects.get(pos))
      .cloned()
  }

  pub fn plan(&self) -> Option<Arc<Plan>> {
    self.plan.clone()
  }

  pub fn configuration(&self) -> Arc<Vec<ConfigurationValue>> {
    Arc::clone(&self.configuration)
  }

  /// Number of commits that changed the snapshot.
  pub fn revision(&self) -> u64 {
    self.revision
  }

  /// Replace the whole collection. Returns false when nothing changed.
  pub(super) fn replace_projects(&mut self, list: Vec<Project>) -> bool {
    let (projects, index) = dedupe_by_guid(list);
    if *self.projects == projects {
      return false;
    }

    self.projects = Arc::new(projects);
    self.index = Arc::new(index);
    self.revision += 1;
    true
  }

  /// Replace a project in place, or append it if unknown.
  pub(super) fn upsert_project(&mut self, project: Project) -> bool {
    match self.index.get(&project.guid).copied() {
      Some(pos) => {
        if self.projects[pos] == project {
          return false;
        }
        Arc::make_mut(&mut self.projects)[pos] = project;
      }
      None => {
        let pos = self.projects.len();
        Arc::make_mut(&mut self.index).insert(project.guid.clone(), pos);
        Arc::make_mut(&mut self.projects).push(project);
      }
    }

    self.revision += 1;
    true
  }

  pub(super) fn replace_plan(&mut self, plan: Arc<Plan>) -> bool {
    self.plan = Some(plan);
    self.revision += 1;
    true
  }

  pub(super) fn replace_configuration(&mut self, values: Vec<ConfigurationValue>) -> bool {
    if *self.configuration == values {
      return false;
    }
    self.configuration = Arc::new(values);
    self.revision += 1;
    true
  }
}

/// Collapse duplicate guids: the first occurrence keeps its position, the
/// last occurrence supplies the data.
fn dedupe_by_guid(list: Vec<Project>) -> (Vec<Project>, HashMap<String, usize>) {
  let mut projects: Vec<Project> = Vec::with_capacity(list.len());
  let mut index = HashMap::with_capacity(list.len());

  for project in list {
    match index.get(&project.guid) {
      Some(&pos) => projects[pos] = project,
      None => {
        index.insert(project.guid.clone(), projects.len());
        projects.push(project);
      }
    }
  }

  (projects, index)
}
