//! Whole-workflow checks.

use std::collections::HashMap;
use std::fmt;

use flowforge_graph::{Graph, NodeKind, find_cycle};
use serde::Serialize;
use tracing::debug;

use crate::result::{Severity, ValidationResult};
use crate::rules::validate_nodes;

/// A problem with the workflow as a whole, independent of any single node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum WorkflowIssue {
  MissingStart,
  MissingEnd,
  MultipleStarts { count: usize },
  Cycle { path: Vec<String> },
}

impl fmt::Display for WorkflowIssue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      WorkflowIssue::MissingStart => write!(f, "Workflow is missing a Start node."),
      WorkflowIssue::MissingEnd => write!(f, "Workflow is missing an End node."),
      WorkflowIssue::MultipleStarts { count } => write!(
        f,
        "Workflow has {} Start nodes. Only one is allowed.",
        count
      ),
      WorkflowIssue::Cycle { path } => {
        write!(f, "Cycle detected in workflow: {}", path.join(" -> "))
      }
    }
  }
}

/// Structural problems with the start/end layout of the workflow.
pub fn workflow_errors(graph: &Graph) -> Vec<WorkflowIssue> {
  let starts = graph.count_kind(NodeKind::Start);
  let ends = graph.count_kind(NodeKind::End);

  let mut issues = Vec::new();
  if starts == 0 {
    issues.push(WorkflowIssue::MissingStart);
  }
  if ends == 0 {
    issues.push(WorkflowIssue::MissingEnd);
  }
  if starts > 1 {
    issues.push(WorkflowIssue::MultipleStarts { count: starts });
  }
  issues
}

/// Go/no-go check run before a workflow is sent for simulation.
///
/// Only start/end presence and acyclicity matter here; per-node warnings do
/// not block a run.
pub fn preflight(graph: &Graph) -> Vec<WorkflowIssue> {
  let starts = graph.count_kind(NodeKind::Start);

  let mut issues = Vec::new();
  if starts == 0 {
    issues.push(WorkflowIssue::MissingStart);
  }
  if starts > 1 {
    issues.push(WorkflowIssue::MultipleStarts { count: starts });
  }
  if graph.count_kind(NodeKind::End) == 0 {
    issues.push(WorkflowIssue::MissingEnd);
  }
  if let Some(path) = find_cycle(graph) {
    issues.push(WorkflowIssue::Cycle { path });
  }
  issues
}

/// No workflow issues and no node with a result.
pub fn is_workflow_valid(graph: &Graph) -> bool {
  workflow_errors(graph).is_empty() && validate_nodes(graph).values().all(|r| r.valid)
}

/// Per-node results together with the whole-workflow issues.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
  pub nodes: HashMap<String, ValidationResult>,
  pub issues: Vec<WorkflowIssue>,
}

impl ValidationReport {
  pub fn is_valid(&self) -> bool {
    self.issues.is_empty() && self.nodes.values().all(|r| r.valid)
  }

  pub fn count(&self, severity: Severity) -> usize {
    self
      .nodes
      .values()
      .filter(|r| r.severity == severity)
      .count()
  }

  pub fn node(&self, id: &str) -> Option<&ValidationResult> {
    self.nodes.get(id)
  }
}

/// Run all node rules and workflow checks.
pub fn validate(graph: &Graph) -> ValidationReport {
  let report = ValidationReport {
    nodes: validate_nodes(graph),
    issues: workflow_errors(graph),
  };
  debug!(
    nodes = graph.nodes().len(),
    errors = report.count(Severity::Error),
    warnings = report.count(Severity::Warning),
    issues = report.issues.len(),
    "validated workflow"
  );
  report
}
