//! Serde-deserializable types matching tfwatch API responses.
//!
//! These types are separate from domain types so that loosely typed JSON is
//! validated once, here, before anything reaches the store.

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::client::json_kind;
use super::types::{
  ApplyAck, ConfigurationValue, Plan, PlanUpdated, Project, ProjectStatus, ResourceChange,
};

// ============================================================================
// Project records
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiResourceChange {
  pub resource_id: String,
  #[serde(default)]
  pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiProject {
  #[serde(default)]
  pub guid: String,
  #[serde(default)]
  pub name: String,
  pub status: Option<String>,
  #[serde(default, alias = "planUpdated", alias = "planupdated")]
  pub plan_updated: Option<String>,
  // Go encodes nil maps and slices as null
  pub settings: Option<BTreeMap<String, String>>,
  pub pending_changes: Option<Vec<ApiResourceChange>>,
}

// ============================================================================
// Configuration records
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiConfigurationValue {
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub value: String,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl ApiProject {
  pub fn into_project(self) -> Result<Project, String> {
    if self.guid.is_empty() {
      return Err("project record has no guid".to_string());
    }

    // A missing status means the server has not planned the project yet
    let status = match self.status.as_deref() {
      None | Some("") => ProjectStatus::Pending,
      Some(raw) => ProjectStatus::parse(raw)
        .ok_or_else(|| format!("project {} has unknown status '{}'", self.guid, raw))?,
    };

    Ok(Project {
      status,
      plan_updated: parse_plan_updated(self.plan_updated.as_deref()),
      settings: self.settings.unwrap_or_default(),
      pending_changes: self
        .pending_changes
        .unwrap_or_default()
        .into_iter()
        .map(|c| ResourceChange {
          resource_id: c.resource_id,
          action: c.action,
        })
        .collect(),
      guid: self.guid,
      name: self.name,
    })
  }
}

impl From<ApiConfigurationValue> for ConfigurationValue {
  fn from(value: ApiConfigurationValue) -> Self {
    ConfigurationValue {
      id: value.id,
      name: value.name,
      value: value.value,
    }
  }
}

/// Decode a single project record.
pub fn decode_project(value: Value) -> Result<Project, String> {
  let api: ApiProject =
    serde_json::from_value(value).map_err(|e| format!("invalid project record: {}", e))?;
  api.into_project()
}

/// Decode a project list, failing on the first bad record.
pub fn decode_projects(values: Vec<Value>) -> Result<Vec<Project>, String> {
  values
    .into_iter()
    .enumerate()
    .map(|(i, value)| decode_project(value).map_err(|e| format!("record {}: {}", i, e)))
    .collect()
}

/// Decode a plan document for the given project.
pub fn decode_plan(project_guid: &str, value: Value) -> Result<Plan, String> {
  if !value.is_object() {
    return Err(format!(
      "plan document must be an object, got {}",
      json_kind(&value)
    ));
  }

  Ok(Plan {
    project_guid: project_guid.to_string(),
    document: value,
  })
}

pub fn decode_configuration(values: Vec<Value>) -> Result<Vec<ConfigurationValue>, String> {
  values
    .into_iter()
    .enumerate()
    .map(|(i, value)| {
      serde_json::from_value::<ApiConfigurationValue>(value)
        .map(ConfigurationValue::from)
        .map_err(|e| format!("configuration entry {}: {}", i, e))
    })
    .collect()
}

/// Decode the answer to an apply trigger.
///
/// The server replies with the scheduled task id as a bare JSON string.
pub fn decode_apply_ack(project_guid: &str, value: Value) -> Result<ApplyAck, String> {
  let task_id = match value {
    Value::String(id) if !id.is_empty() => Some(id),
    Value::String(_) | Value::Null => None,
    Value::Object(obj) => obj
      .get("task_id")
      .or_else(|| obj.get("guid"))
      .and_then(|v| v.as_str())
      .map(String::from),
    other => {
      return Err(format!(
        "apply acknowledgement must be a string or object, got {}",
        json_kind(&other)
      ))
    }
  };

  Ok(ApplyAck {
    project_guid: project_guid.to_string(),
    task_id,
  })
}

// ============================================================================
// Helpers
// ============================================================================

/// Interpret the `plan_updated` field.
///
/// RFC 3339 strings become timestamps. Go's zero time (year 1) means the
/// project was never planned. Anything else is server-rendered text and is
/// kept verbatim.
fn parse_plan_updated(raw: Option<&str>) -> PlanUpdated {
  let raw = match raw.map(str::trim) {
    None | Some("") => return PlanUpdated::Never,
    Some(raw) => raw,
  };

  match DateTime::parse_from_rfc3339(raw) {
    Ok(at) if at.year() <= 1 => PlanUpdated::Never,
    Ok(at) => PlanUpdated::At(at.with_timezone(&Utc)),
    Err(_) => PlanUpdated::Relative(raw.to_string()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use serde_json::json;

  #[test]
  fn test_decode_dashboard_record() {
    let project = decode_project(json!({
      "guid": "2460ae5a-e7cb-4083-406c-f447aad10a0b",
      "name": "thrx",
      "status": "ok",
      "planupdated": "2 mins ago"
    }))
    .unwrap();

    assert_eq!(project.guid, "2460ae5a-e7cb-4083-406c-f447aad10a0b");
    assert_eq!(project.name, "thrx");
    assert_eq!(project.status, ProjectStatus::Ok);
    assert_eq!(
      project.plan_updated,
      PlanUpdated::Relative("2 mins ago".into())
    );
    assert!(project.settings.is_empty());
    assert!(project.pending_changes.is_empty());
  }

  #[test]
  fn test_decode_server_record() {
    let project = decode_project(json!({
      "guid": "g1",
      "name": "infra_vpc",
      "settings": {"region": "us-east-1"},
      "plan_updated": "2024-05-01T11:58:00Z",
      "pending_changes": [{"resource_id": "aws_vpc.main", "action": "Update"}],
      "status": "error"
    }))
    .unwrap();

    assert_eq!(project.status, ProjectStatus::Error);
    assert_eq!(
      project.plan_updated,
      PlanUpdated::At(Utc.with_ymd_and_hms(2024, 5, 1, 11, 58, 0).unwrap())
    );
    assert_eq!(project.settings.get("region").map(String::as_str), Some("us-east-1"));
    assert_eq!(project.pending_changes[0].resource_id, "aws_vpc.main");
  }

  #[test]
  fn test_camel_case_plan_updated_alias() {
    let project = decode_project(json!({
      "guid": "g1", "name": "thrx", "status": "ok", "planUpdated": "2 mins ago"
    }))
    .unwrap();
    assert_eq!(
      project.plan_updated,
      PlanUpdated::Relative("2 mins ago".into())
    );
  }

  #[test]
  fn test_zero_time_means_never() {
    let project = decode_project(json!({
      "guid": "g1",
      "name": "new_project",
      "status": "new",
      "plan_updated": "0001-01-01T00:00:00Z",
      "pending_changes": null,
      "settings": null
    }))
    .unwrap();
    assert_eq!(project.plan_updated, PlanUpdated::Never);
    assert_eq!(project.status, ProjectStatus::Pending);
  }

  #[test]
  fn test_missing_status_is_pending() {
    let project = decode_project(json!({"guid": "g1", "name": "x"})).unwrap();
    assert_eq!(project.status, ProjectStatus::Pending);
  }

  #[test]
  fn test_unknown_status_is_rejected() {
    let err = decode_project(json!({"guid": "g1", "name": "x", "status": "melted"})).unwrap_err();
    assert!(err.contains("unknown status 'melted'"));
  }

  #[test]
  fn test_missing_guid_is_rejected() {
    let err = decode_project(json!({"name": "x", "status": "ok"})).unwrap_err();
    assert!(err.contains("no guid"));
  }

  #[test]
  fn test_non_object_project_is_rejected() {
    assert!(decode_project(json!("thrx")).is_err());
  }

  #[test]
  fn test_decode_projects_reports_index() {
    let err = decode_projects(vec![
      json!({"guid": "g1", "name": "a", "status": "ok"}),
      json!({"guid": "g2", "name": "b", "status": 7}),
    ])
    .unwrap_err();
    assert!(err.starts_with("record 1:"), "{}", err);
  }

  #[test]
  fn test_decode_plan_requires_object() {
    let plan = decode_plan("g1", json!({"resources": []})).unwrap();
    assert_eq!(plan.project_guid, "g1");
    assert!(decode_plan("g1", json!([1, 2])).is_err());
  }

  #[test]
  fn test_decode_configuration() {
    let values = decode_configuration(vec![json!({
      "id": "TerraformVersion",
      "name": "Terraform Version",
      "value": "Terraform v0.9.8"
    })])
    .unwrap();
    assert_eq!(values[0].id, "TerraformVersion");
    assert_eq!(values[0].value, "Terraform v0.9.8");

    assert!(decode_configuration(vec![json!({"name": "no id"})]).is_err());
  }

  #[test]
  fn test_decode_apply_ack() {
    let ack = decode_apply_ack("g1", json!("task-42")).unwrap();
    assert_eq!(ack.task_id.as_deref(), Some("task-42"));

    let ack = decode_apply_ack("g1", Value::Null).unwrap();
    assert!(ack.task_id.is_none());

    assert!(decode_apply_ack("g1", json!(42)).is_err());
  }
}
