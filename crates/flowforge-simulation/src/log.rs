use std::fmt;

use chrono::{DateTime, Utc};
use flowforge_graph::{Graph, NodeKind};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::wire::{SimulationStep, StepStatus};

/// Node id used for the synthetic entry that reports a failed run.
pub const ERROR_NODE_ID: &str = "error";

/// A display line of the execution log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
  pub node_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kind: Option<NodeKind>,
  pub message: String,
  pub status: StepStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub timestamp: Option<DateTime<Utc>>,
}

impl LogEntry {
  /// Turn a reported step into a log line.
  ///
  /// The message is synthesized from `details` when the step carries them,
  /// falls back to the step's own `message`, then to a generic line. The kind
  /// is taken from the step or, failing that, from the graph.
  pub fn from_step(step: &SimulationStep, graph: &Graph) -> Self {
    let kind = step
      .kind
      .as_deref()
      .and_then(|k| k.parse::<NodeKind>().ok())
      .or_else(|| graph.node(&step.node_id).map(|n| n.kind()));

    let message = kind
      .zip(step.details.as_ref().and_then(Value::as_object))
      .map(|(kind, details)| describe(kind, details))
      .or_else(|| step.message.clone().filter(|m| !m.is_empty()))
      .unwrap_or_else(|| format!("Executed node `{}`", step.node_id));

    let timestamp = step
      .timestamp
      .and_then(|ms| DateTime::from_timestamp_millis(ms as i64));

    Self {
      node_id: step.node_id.clone(),
      kind,
      message,
      status: step.status.clone(),
      timestamp,
    }
  }

  /// The single entry recorded when a run could not complete.
  pub fn failure(message: impl Into<String>) -> Self {
    Self {
      node_id: ERROR_NODE_ID.to_string(),
      kind: None,
      message: message.into(),
      status: StepStatus::Failed,
      timestamp: None,
    }
  }
}

impl fmt::Display for LogEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}] {}: {}", self.status, self.node_id, self.message)
  }
}

fn text<'a>(details: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
  details
    .get(key)
    .and_then(Value::as_str)
    .filter(|s| !s.trim().is_empty())
}

fn describe(kind: NodeKind, details: &Map<String, Value>) -> String {
  match kind {
    NodeKind::Start => {
      format!("Started workflow \"{}\"", text(details, "title").unwrap_or("Start"))
    }
    NodeKind::Task => {
      let mut line = format!(
        "Completed task \"{}\" (assignee: {})",
        text(details, "title").unwrap_or("Task"),
        text(details, "assignee").unwrap_or("Unassigned"),
      );
      if let Some(due) = text(details, "dueDate") {
        line.push_str(&format!(", due {}", due));
      }
      line
    }
    NodeKind::Approval => {
      let verb = match text(details, "decision") {
        Some("rejected") => "Rejected",
        _ => "Approved",
      };
      format!(
        "{} \"{}\" as {}",
        verb,
        text(details, "title").unwrap_or("Approval"),
        text(details, "approverRole").unwrap_or("Approver"),
      )
    }
    NodeKind::Automated => {
      let label = text(details, "actionLabel")
        .or_else(|| text(details, "actionId"))
        .unwrap_or("Automated action");
      let mut line = format!("Executed automated action \"{}\"", label);
      if let Some(params) = details.get("actionParams").and_then(Value::as_object)
        && !params.is_empty()
      {
        let rendered: Vec<String> = params
          .iter()
          .map(|(k, v)| match v.as_str() {
            Some(s) => format!("{}={}", k, s),
            None => format!("{}={}", k, v),
          })
          .collect();
        line.push_str(&format!(" with {}", rendered.join(", ")));
      }
      line
    }
    NodeKind::End => {
      let mut line = format!(
        "Completed workflow: {}",
        text(details, "endMessage").unwrap_or("End")
      );
      if details.get("summary").and_then(Value::as_bool) == Some(true) {
        line.push_str(" (summary requested)");
      }
      line
    }
  }
}
