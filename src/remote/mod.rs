//! Remote resource access for the tfwatch REST API.
//!
//! - `client`: the [`ResourceClient`] contract and its reqwest implementation
//! - `api_types`: wire shapes and decoding into domain types
//! - `types`: the strict domain types held by the store

pub mod api_types;
pub mod client;
pub mod error;
pub mod types;

pub use client::{HttpResourceClient, Resource, ResourceClient};
pub use error::{FetchCause, FetchError};
pub use types::{
  ApplyAck, ChangeAction, ConfigurationValue, Plan, PlanUpdated, PlannedChange, Project,
  ProjectStatus, ResourceChange,
};
