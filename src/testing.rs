//! In-memory [`ResourceClient`] for tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::remote::{FetchCause, FetchError, Resource, ResourceClient};

/// Failure to inject instead of a response
#[derive(Debug, Clone, Copy)]
pub enum FakeFailure {
  Transport,
  Status(u16),
}

impl FakeFailure {
  fn into_error(self, resource: Resource, id: Option<&str>) -> FetchError {
    match self {
      FakeFailure::Transport => FetchError::transport(resource, id, "connection refused"),
      FakeFailure::Status(status) => {
        FetchError::new(resource, id, FetchCause::RemoteStatus { status })
      }
    }
  }
}

type Key = (Resource, Option<String>);

/// Canned responses keyed by resource and identifier.
///
/// A gate holds a request open until the test releases it, which lets tests
/// choose the order in which concurrent requests complete.
#[derive(Default)]
pub struct FakeClient {
  gets: Mutex<HashMap<Key, Result<Value, FakeFailure>>>,
  posts: Mutex<HashMap<Key, Result<Value, FakeFailure>>>,
  gates: Mutex<HashMap<Key, oneshot::Receiver<()>>>,
  calls: AtomicUsize,
}

impl FakeClient {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn respond(&self, resource: Resource, id: Option<&str>, body: Value) {
    self.gets.lock().unwrap().insert(key(resource, id), Ok(body));
  }

  pub fn fail(&self, resource: Resource, id: Option<&str>, failure: FakeFailure) {
    self.gets.lock().unwrap().insert(key(resource, id), Err(failure));
  }

  pub fn respond_to_trigger(&self, resource: Resource, id: &str, body: Value) {
    self.posts.lock().unwrap().insert(key(resource, Some(id)), Ok(body));
  }

  pub fn fail_trigger(&self, resource: Resource, id: &str, failure: FakeFailure) {
    self.posts.lock().unwrap().insert(key(resource, Some(id)), Err(failure));
  }

  /// Hold the next request for `resource`/`id` until the sender fires or is
  /// dropped.
  pub fn gate(&self, resource: Resource, id: Option<&str>) -> oneshot::Sender<()> {
    let (tx, rx) = oneshot::channel();
    self.gates.lock().unwrap().insert(key(resource, id), rx);
    tx
  }

  /// Number of requests issued so far.
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  async fn answer(
    &self,
    table: &Mutex<HashMap<Key, Result<Value, FakeFailure>>>,
    resource: Resource,
    id: Option<&str>,
  ) -> Result<Value, FetchError> {
    self.calls.fetch_add(1, Ordering::SeqCst);

    let gate = self.gates.lock().unwrap().remove(&key(resource, id));
    if let Some(gate) = gate {
      let _ = gate.await;
    }

    let response = table.lock().unwrap().get(&key(resource, id)).cloned();
    match response {
      Some(Ok(body)) => Ok(body),
      Some(Err(failure)) => Err(failure.into_error(resource, id)),
      None => Err(FetchError::new(
        resource,
        id,
        FetchCause::RemoteStatus { status: 404 },
      )),
    }
  }
}

#[async_trait]
impl ResourceClient for FakeClient {
  async fn fetch_collection(&self, resource: Resource) -> Result<Vec<Value>, FetchError> {
    match self.answer(&self.gets, resource, None).await? {
      Value::Array(items) => Ok(items),
      _ => Err(FetchError::decode(resource, None, "expected a JSON array")),
    }
  }

  async fn fetch_one(&self, resource: Resource, id: &str) -> Result<Value, FetchError> {
    if id.is_empty() {
      return Err(FetchError::new(resource, Some(id), FetchCause::EmptyId));
    }
    self.answer(&self.gets, resource, Some(id)).await
  }

  async fn trigger(&self, resource: Resource, id: &str) -> Result<Value, FetchError> {
    if id.is_empty() {
      return Err(FetchError::new(resource, Some(id), FetchCause::EmptyId));
    }
    self.answer(&self.posts, resource, Some(id)).await
  }
}

fn key(resource: Resource, id: Option<&str>) -> Key {
  (resource, id.map(String::from))
}
