//! Domain types for the tfwatch API.
//!
//! These are the strict shapes held by the store. Wire shapes live in
//! `api_types` and are converted at the dispatcher boundary.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

use crate::relative_time::format_relative;

/// Health of a project's last plan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectStatus {
  Ok,
  Error,
  Pending,
}

impl ProjectStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      ProjectStatus::Ok => "ok",
      ProjectStatus::Error => "error",
      ProjectStatus::Pending => "pending",
    }
  }

  /// Normalize a wire status into the closed enumeration.
  ///
  /// Matching is case-insensitive. The server reports freshly registered
  /// projects as `new`; they have no plan yet, so they count as pending.
  pub fn parse(raw: &str) -> Option<Self> {
    match raw.trim().to_ascii_lowercase().as_str() {
      "ok" => Some(ProjectStatus::Ok),
      "error" => Some(ProjectStatus::Error),
      "pending" | "new" => Some(ProjectStatus::Pending),
      _ => None,
    }
  }
}

impl fmt::Display for ProjectStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// When the project's plan was last refreshed, as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanUpdated {
  /// No plan has run yet
  Never,
  /// Absolute timestamp
  At(DateTime<Utc>),
  /// Server-rendered relative text such as "2 mins ago"
  Relative(String),
}

impl PlanUpdated {
  /// Text for display relative to `now`.
  pub fn display_relative(&self, now: DateTime<Utc>) -> String {
    match self {
      PlanUpdated::Never => "never".to_string(),
      PlanUpdated::At(at) => format_relative(*at, now),
      PlanUpdated::Relative(text) => text.clone(),
    }
  }
}

/// A resource change still pending on a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceChange {
  pub resource_id: String,
  pub action: String,
}

/// A watched terraform project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
  pub guid: String,
  pub name: String,
  pub status: ProjectStatus,
  pub plan_updated: PlanUpdated,
  pub settings: BTreeMap<String, String>,
  pub pending_changes: Vec<ResourceChange>,
}

impl Project {
  /// Minimal project, used mostly by tests and fixtures.
  pub fn new(guid: impl Into<String>, name: impl Into<String>, status: ProjectStatus) -> Self {
    Self {
      guid: guid.into(),
      name: name.into(),
      status,
      plan_updated: PlanUpdated::Never,
      settings: BTreeMap::new(),
      pending_changes: Vec::new(),
    }
  }
}

/// What a plan will do to a single resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeAction {
  Create,
  Recreate,
  Destroy,
  Update,
  Other(String),
}

impl ChangeAction {
  pub fn parse(raw: &str) -> Self {
    match raw {
      "Create" => ChangeAction::Create,
      "Recreate" => ChangeAction::Recreate,
      "Destroy" => ChangeAction::Destroy,
      "Update" => ChangeAction::Update,
      other => ChangeAction::Other(other.to_string()),
    }
  }

  pub fn label(&self) -> &str {
    match self {
      ChangeAction::Create => "Create",
      ChangeAction::Recreate => "Recreate",
      ChangeAction::Destroy => "Destroy",
      ChangeAction::Update => "Update",
      ChangeAction::Other(other) => other,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChange {
  pub name: String,
  pub action: ChangeAction,
}

/// The plan document for one project.
///
/// The payload is kept as the server sent it; `changes` offers a typed view
/// of the parts the dashboard understands.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
  pub project_guid: String,
  pub document: serde_json::Value,
}

impl Plan {
  /// Resource changes listed under the document's `resources` key.
  ///
  /// Entries without a string `name` are skipped.
  pub fn changes(&self) -> Vec<PlannedChange> {
    let Some(resources) = self.document.get("resources").and_then(|v| v.as_array()) else {
      return Vec::new();
    };

    resources
      .iter()
      .filter_map(|entry| {
        let name = entry.get("name")?.as_str()?;
        let action = entry
          .get("action")
          .and_then(|v| v.as_str())
          .unwrap_or_default();
        Some(PlannedChange {
          name: name.to_string(),
          action: ChangeAction::parse(action),
        })
      })
      .collect()
  }
}

/// One server configuration entry (e.g. the terraform version)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationValue {
  pub id: String,
  pub name: String,
  pub value: String,
}

/// Acknowledgement that an apply was scheduled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyAck {
  pub project_guid: String,
  /// Server-side task id, when the server returned one
  pub task_id: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use serde_json::json;

  #[test]
  fn test_status_parse_is_case_insensitive() {
    assert_eq!(ProjectStatus::parse("OK"), Some(ProjectStatus::Ok));
    assert_eq!(ProjectStatus::parse(" error "), Some(ProjectStatus::Error));
    assert_eq!(ProjectStatus::parse("Pending"), Some(ProjectStatus::Pending));
  }

  #[test]
  fn test_status_new_counts_as_pending() {
    assert_eq!(ProjectStatus::parse("new"), Some(ProjectStatus::Pending));
  }

  #[test]
  fn test_status_unknown_is_rejected() {
    assert_eq!(ProjectStatus::parse("exploded"), None);
    assert_eq!(ProjectStatus::parse(""), None);
  }

  #[test]
  fn test_plan_updated_display() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let at = PlanUpdated::At(now - chrono::Duration::minutes(12));
    assert_eq!(at.display_relative(now), "12 mins ago");
    assert_eq!(
      PlanUpdated::Relative("2 days ago".into()).display_relative(now),
      "2 days ago"
    );
    assert_eq!(PlanUpdated::Never.display_relative(now), "never");
  }

  #[test]
  fn test_plan_changes() {
    let plan = Plan {
      project_guid: "g1".into(),
      document: json!({
        "resources": [
          {"name": "aws_s3_bucket.logs", "action": "Create"},
          {"name": "aws_iam_role.ci", "action": "Recreate"},
          {"action": "Destroy"},
          {"name": "module.vpc.aws_vpc.main", "action": "Tweak"}
        ]
      }),
    };

    let changes = plan.changes();
    assert_eq!(changes.len(), 3);
    assert_eq!(changes[0].action, ChangeAction::Create);
    assert_eq!(changes[1].action, ChangeAction::Recreate);
    assert_eq!(changes[2].action, ChangeAction::Other("Tweak".into()));
    assert_eq!(changes[2].action.label(), "Tweak");
  }

  #[test]
  fn test_plan_without_resources_has_no_changes() {
    let plan = Plan {
      project_guid: "g1".into(),
      document: json!({"format": 3}),
    };
    assert!(plan.changes().is_empty());
  }
}
