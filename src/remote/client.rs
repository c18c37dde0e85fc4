use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::Method;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::error::{FetchCause, FetchError};
use crate::config::ApiConfig;

/// Named resources exposed by the tfwatch API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
  Projects,
  Plan,
  Configuration,
}

impl Resource {
  pub fn name(&self) -> &'static str {
    match self {
      Resource::Projects => "projects",
      Resource::Plan => "plan",
      Resource::Configuration => "configuration",
    }
  }

  /// Path segments below the API base URL.
  ///
  /// Plans hang off their project (`projects/{id}/tfplan`) and always need
  /// an identifier.
  fn path_segments<'a>(&self, id: Option<&'a str>) -> Option<Vec<&'a str>> {
    match (self, id) {
      (Resource::Plan, Some(id)) => Some(vec!["projects", id, "tfplan"]),
      (Resource::Plan, None) => None,
      (resource, Some(id)) => Some(vec![resource.name(), id]),
      (resource, None) => Some(vec![resource.name()]),
    }
  }
}

impl fmt::Display for Resource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Remote access to tfwatch resources.
///
/// Implementations return bodies exactly as the server sent them. Shape
/// validation belongs to the caller.
#[async_trait]
pub trait ResourceClient: Send + Sync {
  /// GET a whole collection. The body must be a JSON array.
  async fn fetch_collection(&self, resource: Resource) -> Result<Vec<Value>, FetchError>;

  /// GET a single entity by identifier.
  async fn fetch_one(&self, resource: Resource, id: &str) -> Result<Value, FetchError>;

  /// POST to an entity to trigger a server-side operation.
  async fn trigger(&self, resource: Resource, id: &str) -> Result<Value, FetchError>;
}

/// HTTP implementation of [`ResourceClient`]
#[derive(Clone)]
pub struct HttpResourceClient {
  http: reqwest::Client,
  base_url: Url,
}

impl HttpResourceClient {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let base_url = config.base_url()?;

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .user_agent(concat!("tfdash/", env!("CARGO_PKG_VERSION")))
      .cookie_store(config.credentials)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base_url })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  async fn request(
    &self,
    method: Method,
    resource: Resource,
    id: Option<&str>,
    empty: EmptyBody,
  ) -> Result<Value, FetchError> {
    let url = endpoint(&self.base_url, resource, id)?;
    debug!(%method, %url, "requesting {}", resource);

    let response = self
      .http
      .request(method, url)
      .header(reqwest::header::ACCEPT, "application/json")
      .send()
      .await
      .map_err(|e| FetchError::transport(resource, id, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::new(
        resource,
        id,
        FetchCause::RemoteStatus {
          status: status.as_u16(),
        },
      ));
    }

    let body = response
      .bytes()
      .await
      .map_err(|e| FetchError::transport(resource, id, e))?;

    if body.iter().all(u8::is_ascii_whitespace) {
      return match empty {
        EmptyBody::Null => Ok(Value::Null),
        EmptyBody::Reject => Err(FetchError::decode(resource, id, "empty response body")),
      };
    }

    serde_json::from_slice(&body).map_err(|e| FetchError::decode(resource, id, e.to_string()))
  }
}

/// How a blank response body is read
#[derive(Debug, Clone, Copy)]
enum EmptyBody {
  /// Reads must carry a document
  Reject,
  /// Triggers may acknowledge with no body
  Null,
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
  async fn fetch_collection(&self, resource: Resource) -> Result<Vec<Value>, FetchError> {
    match self.request(Method::GET, resource, None, EmptyBody::Reject).await? {
      Value::Array(items) => Ok(items),
      // Go encodes a nil slice as null
      Value::Null => Ok(Vec::new()),
      other => Err(FetchError::decode(
        resource,
        None,
        format!("expected a JSON array, got {}", json_kind(&other)),
      )),
    }
  }

  async fn fetch_one(&self, resource: Resource, id: &str) -> Result<Value, FetchError> {
    self.request(Method::GET, resource, Some(id), EmptyBody::Reject).await
  }

  async fn trigger(&self, resource: Resource, id: &str) -> Result<Value, FetchError> {
    self.request(Method::POST, resource, Some(id), EmptyBody::Null).await
  }
}

/// Build the URL for a resource, percent-encoding the identifier.
fn endpoint(base_url: &Url, resource: Resource, id: Option<&str>) -> Result<Url, FetchError> {
  if id.is_some_and(str::is_empty) {
    return Err(FetchError::new(resource, id, FetchCause::EmptyId));
  }

  let segments = resource.path_segments(id).ok_or_else(|| {
    FetchError::new(
      resource,
      id,
      FetchCause::UnsupportedRoute("plans are only addressable by project id"),
    )
  })?;

  let mut url = base_url.clone();
  url
    .path_segments_mut()
    .map_err(|_| FetchError::transport(resource, id, "base URL cannot carry a path"))?
    .pop_if_empty()
    .extend(segments);

  Ok(url)
}

/// Human name of a JSON value's type, for decode messages
pub fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}
