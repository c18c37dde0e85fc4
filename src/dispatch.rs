//! Named actions that fetch remote data and commit it into the store.
//!
//! The dispatcher is the only component that talks to the network. Each
//! action is an async task with one suspension point (the request) and a
//! typed result:
//!
//! ```text
//! Idle -> Requesting -> Committed
//!                    -> Failed      (store untouched)
//! ```
//!
//! Actions can be awaited directly (`run`, `load_project_list`, ...) or
//! spawned with `dispatch`, which reports progress as [`ActionEvent`]s and
//! coalesces an identical action that is already in flight.
//!
//! # Example
//!
//! ```ignore
//! let store = Store::new();
//! let dispatcher = Dispatcher::new(Arc::new(client), store.clone());
//!
//! dispatcher.load_project_list().await?;
//! let view = store.view();
//! for project in view.project_list().iter() {
//!     println!("{} {}", project.name, project.status);
//! }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::remote::api_types::{
  decode_apply_ack, decode_configuration, decode_plan, decode_project, decode_projects,
};
use crate::remote::{ApplyAck, FetchError, Plan, Project, Resource, ResourceClient};
use crate::store::Store;

/// A named workflow the view layer can request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
  LoadProjectList,
  LoadProject(String),
  GetPlan(String),
  Apply(String),
  LoadConfiguration,
}

impl Action {
  pub fn name(&self) -> &'static str {
    match self {
      Action::LoadProjectList => "LOAD_PROJECT_LIST",
      Action::LoadProject(_) => "LOAD_PROJECT",
      Action::GetPlan(_) => "GET_PLAN",
      Action::Apply(_) => "APPLY",
      Action::LoadConfiguration => "LOAD_CONFIGURATION",
    }
  }

  /// The project id the action targets, if any.
  pub fn target(&self) -> Option<&str> {
    match self {
      Action::LoadProject(id) | Action::GetPlan(id) | Action::Apply(id) => Some(id),
      Action::LoadProjectList | Action::LoadConfiguration => None,
    }
  }
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.target() {
      Some(id) => write!(f, "{}({})", self.name(), id),
      None => f.write_str(self.name()),
    }
  }
}

/// A failed action. The store was not modified.
#[derive(Debug, Error)]
#[error("{action} failed: {source}")]
pub struct ActionError {
  pub action: Action,
  #[source]
  pub source: FetchError,
}

impl ActionError {
  pub fn resource(&self) -> Resource {
    self.source.resource
  }
}

/// What a successful action committed or received
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
  ProjectListLoaded { count: usize },
  ProjectLoaded(Project),
  PlanLoaded(Arc<Plan>),
  Applied(ApplyAck),
  ConfigurationLoaded { count: usize },
}

/// Lifecycle notifications for spawned actions
#[derive(Debug)]
pub enum ActionEvent {
  Requesting(Action),
  Committed(Action, Outcome),
  Failed(ActionError),
}

/// Result of [`Dispatcher::dispatch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
  /// A new request was started
  Started,
  /// The same action was already in flight; no request was issued
  Coalesced,
}

/// Runs actions against a [`ResourceClient`] and commits into a [`Store`].
///
/// Responses commit in completion order. Nothing is cancelled: if two
/// `GetPlan` calls overlap, whichever response arrives last becomes the
/// current plan.
#[derive(Clone)]
pub struct Dispatcher {
  client: Arc<dyn ResourceClient>,
  store: Store,
  in_flight: Arc<Mutex<HashSet<Action>>>,
  events: Option<mpsc::UnboundedSender<ActionEvent>>,
}

impl Dispatcher {
  pub fn new(client: Arc<dyn ResourceClient>, store: Store) -> Self {
    Self {
      client,
      store,
      in_flight: Arc::new(Mutex::new(HashSet::new())),
      events: None,
    }
  }

  /// Report lifecycle events of dispatched actions on `tx`.
  pub fn with_events(mut self, tx: mpsc::UnboundedSender<ActionEvent>) -> Self {
    self.events = Some(tx);
    self
  }

  /// Run an action to completion.
  pub async fn run(&self, action: Action) -> Result<Outcome, ActionError> {
    match action {
      Action::LoadProjectList => self
        .load_project_list()
        .await
        .map(|count| Outcome::ProjectListLoaded { count }),
      Action::LoadProject(id) => self.load_project(&id).await.map(Outcome::ProjectLoaded),
      Action::GetPlan(id) => self.get_plan(&id).await.map(Outcome::PlanLoaded),
      Action::Apply(id) => self.apply(&id).await.map(Outcome::Applied),
      Action::LoadConfiguration => self
        .load_configuration()
        .await
        .map(|count| Outcome::ConfigurationLoaded { count }),
    }
  }

  /// Spawn an action on the runtime.
  ///
  /// Returns [`Dispatched::Coalesced`] without issuing a request when an
  /// identical action is still in flight.
  pub fn dispatch(&self, action: Action) -> Dispatched {
    if !self.lock_in_flight().insert(action.clone()) {
      debug!(%action, "already in flight, coalesced");
      return Dispatched::Coalesced;
    }

    self.emit(ActionEvent::Requesting(action.clone()));

    let this = self.clone();
    tokio::spawn(async move {
      let result = this.run(action.clone()).await;
      // Release before reporting so listeners can re-dispatch right away
      this.lock_in_flight().remove(&action);
      match result {
        Ok(outcome) => this.emit(ActionEvent::Committed(action, outcome)),
        Err(err) => this.emit(ActionEvent::Failed(err)),
      }
    });

    Dispatched::Started
  }

  /// Whether an identical action is currently in flight.
  pub fn is_in_flight(&self, action: &Action) -> bool {
    self.lock_in_flight().contains(action)
  }

  /// LOAD_PROJECT_LIST: replace the project collection with the server's.
  pub async fn load_project_list(&self) -> Result<usize, ActionError> {
    let action = Action::LoadProjectList;
    debug!(%action, "requesting");

    let raw = self
      .client
      .fetch_collection(Resource::Projects)
      .await
      .map_err(|e| failed(&action, e))?;

    let projects = decode_projects(raw)
      .map_err(|e| failed(&action, FetchError::decode(Resource::Projects, None, e)))?;

    let count = projects.len();
    self.store.commit_project_list(projects);
    info!(%action, count, "committed");
    Ok(count)
  }

  /// LOAD_PROJECT: refresh one project in the collection.
  pub async fn load_project(&self, id: &str) -> Result<Project, ActionError> {
    let action = Action::LoadProject(id.to_string());
    debug!(%action, "requesting");

    let raw = self
      .client
      .fetch_one(Resource::Projects, id)
      .await
      .map_err(|e| failed(&action, e))?;

    let project = decode_project(raw)
      .and_then(|project| {
        if project.guid == id {
          Ok(project)
        } else {
          Err(format!("requested project '{}' but got '{}'", id, project.guid))
        }
      })
      .map_err(|e| failed(&action, FetchError::decode(Resource::Projects, Some(id), e)))?;

    self.store.commit_project(project.clone());
    info!(%action, "committed");
    Ok(project)
  }

  /// GET_PLAN: make the project's plan the current plan.
  pub async fn get_plan(&self, id: &str) -> Result<Arc<Plan>, ActionError> {
    let action = Action::GetPlan(id.to_string());
    debug!(%action, "requesting");

    let raw = self
      .client
      .fetch_one(Resource::Plan, id)
      .await
      .map_err(|e| failed(&action, e))?;

    let plan = decode_plan(id, raw)
      .map_err(|e| failed(&action, FetchError::decode(Resource::Plan, Some(id), e)))?;

    let plan = self.store.commit_plan(plan);
    info!(%action, changes = plan.changes().len(), "committed");
    Ok(plan)
  }

  /// APPLY: ask the server to apply the project's plan. Does not touch the
  /// store.
  pub async fn apply(&self, id: &str) -> Result<ApplyAck, ActionError> {
    let action = Action::Apply(id.to_string());
    debug!(%action, "requesting");

    let raw = self
      .client
      .trigger(Resource::Plan, id)
      .await
      .map_err(|e| failed(&action, e))?;

    let ack = decode_apply_ack(id, raw)
      .map_err(|e| failed(&action, FetchError::decode(Resource::Plan, Some(id), e)))?;

    info!(%action, task_id = ack.task_id.as_deref().unwrap_or("-"), "acknowledged");
    Ok(ack)
  }

  /// LOAD_CONFIGURATION: replace the server configuration entries.
  pub async fn load_configuration(&self) -> Result<usize, ActionError> {
    let action = Action::LoadConfiguration;
    debug!(%action, "requesting");

    let raw = self
      .client
      .fetch_collection(Resource::Configuration)
      .await
      .map_err(|e| failed(&action, e))?;

    let values = decode_configuration(raw)
      .map_err(|e| failed(&action, FetchError::decode(Resource::Configuration, None, e)))?;

    let count = values.len();
    self.store.commit_configuration(values);
    info!(%action, count, "committed");
    Ok(count)
  }

  fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, HashSet<Action>> {
    self
      .in_flight
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
  }

  fn emit(&self, event: ActionEvent) {
    if let Some(tx) = &self.events {
      // Ignore send errors - the listener may have gone away
      let _ = tx.send(event);
    }
  }
}

fn failed(action: &Action, source: FetchError) -> ActionError {
  warn!(%action, error = %source, "action failed");
  ActionError {
    action: action.clone(),
    source,
  }
}
