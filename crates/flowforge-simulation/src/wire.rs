use std::fmt;

use flowforge_graph::{Edge, Graph, NodeData, NodeKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Endpoint, ServiceError};

/// Request body sent to the execution service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationPayload {
  pub nodes: Vec<PayloadNode>,
  pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadNode {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: NodeKind,
  pub data: NodeData,
}

impl SimulationPayload {
  /// Minimal projection of the graph: positions are not sent.
  pub fn from_graph(graph: &Graph) -> Self {
    Self {
      nodes: graph
        .nodes()
        .iter()
        .map(|n| PayloadNode {
          id: n.id.clone(),
          kind: n.kind(),
          data: n.data.clone(),
        })
        .collect(),
      edges: graph.edges().to_vec(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
  Success,
  Failed,
  #[serde(untagged)]
  Other(String),
}

impl StepStatus {
  pub fn is_success(&self) -> bool {
    matches!(self, StepStatus::Success)
  }
}

impl fmt::Display for StepStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StepStatus::Success => f.write_str("success"),
      StepStatus::Failed => f.write_str("failed"),
      StepStatus::Other(s) => f.write_str(s),
    }
  }
}

/// One step reported by the execution service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStep {
  pub node_id: String,
  #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
  pub kind: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  pub status: StepStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub details: Option<Value>,
  /// Milliseconds since the Unix epoch.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timestamp: Option<f64>,
}

/// An entry of the automation catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationAction {
  pub id: String,
  pub label: String,
  pub params: Vec<String>,
}

/// Decode a `{ "steps": [...] }` response body.
pub fn parse_simulation_response(body: &str) -> Result<Vec<SimulationStep>, ServiceError> {
  let endpoint = Endpoint::Simulate;
  let value: Value = serde_json::from_str(body)
    .map_err(|_| ServiceError::invalid(endpoint, "failed to parse response as JSON"))?;

  let Some(steps) = value.get("steps").filter(|s| s.is_array()) else {
    return Err(ServiceError::invalid(
      endpoint,
      format!("expected {{ steps: [...] }}, got {}", value),
    ));
  };

  serde_json::from_value(steps.clone())
    .map_err(|e| ServiceError::invalid(endpoint, format!("invalid step: {}", e)))
}

/// Decode and shape-check an automation catalog response body.
pub fn parse_automations(body: &str) -> Result<Vec<AutomationAction>, ServiceError> {
  let endpoint = Endpoint::Automations;
  let value: Value = serde_json::from_str(body)
    .map_err(|_| ServiceError::invalid(endpoint, "failed to parse response as JSON"))?;

  let Value::Array(items) = value else {
    return Err(ServiceError::invalid(
      endpoint,
      format!("expected array, got {}", type_name(&value)),
    ));
  };

  items
    .into_iter()
    .map(|item| {
      serde_json::from_value::<AutomationAction>(item.clone())
        .map_err(|_| ServiceError::invalid(endpoint, format!("invalid item shape: {}", item)))
    })
    .collect()
}

fn type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
