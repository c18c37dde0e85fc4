use thiserror::Error;

use super::client::Resource;

/// Why a fetch failed.
#[derive(Debug, Error)]
pub enum FetchCause {
  /// Connectivity failure, timeout or an unreadable body stream
  #[error("transport error: {0}")]
  Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("remote returned HTTP {status}")]
  RemoteStatus { status: u16 },

  /// Body could not be parsed into the expected shape
  #[error("could not decode response: {0}")]
  Decode(String),

  #[error("identifier must not be empty")]
  EmptyId,

  /// The resource has no route of the requested shape
  #[error("{0}")]
  UnsupportedRoute(&'static str),
}

/// A failed request against a named resource.
#[derive(Debug, Error)]
#[error("fetch failed for {}: {cause}", describe_target(.resource, .id))]
pub struct FetchError {
  pub resource: Resource,
  /// Identifier that was requested, if the call addressed a single entity
  pub id: Option<String>,
  #[source]
  pub cause: FetchCause,
}

impl FetchError {
  pub fn new(resource: Resource, id: Option<&str>, cause: FetchCause) -> Self {
    Self {
      resource,
      id: id.map(String::from),
      cause,
    }
  }

  pub fn transport(
    resource: Resource,
    id: Option<&str>,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
  ) -> Self {
    Self::new(resource, id, FetchCause::Transport(err.into()))
  }

  pub fn decode(resource: Resource, id: Option<&str>, message: impl Into<String>) -> Self {
    Self::new(resource, id, FetchCause::Decode(message.into()))
  }

  /// HTTP status, if the server answered with a non-success code.
  pub fn status(&self) -> Option<u16> {
    match self.cause {
      FetchCause::RemoteStatus { status } => Some(status),
      _ => None,
    }
  }

  pub fn is_decode(&self) -> bool {
    matches!(self.cause, FetchCause::Decode(_))
  }

  pub fn is_transport(&self) -> bool {
    matches!(self.cause, FetchCause::Transport(_))
  }
}

fn describe_target(resource: &Resource, id: &Option<String>) -> String {
  match id {
    Some(id) => format!("{} '{}'", resource, id),
    None => resource.to_string(),
  }
}
