use chrono::{DateTime, NaiveDate, Utc};
use flowforge_graph::{Edge, Graph, GraphError, Node};
use serde::{Deserialize, Serialize};

use crate::error::SerializationError;

/// Format version written into every exported document.
pub const FORMAT_VERSION: &str = "1.0";

/// File name prefix used for exported workflows.
pub const DEFAULT_FILE_PREFIX: &str = "workflow";

/// A persisted workflow: the graph plus export metadata.
///
/// Documents produced by older tools may lack `version` and `exportedAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDocument {
  pub nodes: Vec<Node>,
  pub edges: Vec<Edge>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub exported_at: Option<DateTime<Utc>>,
}

impl WorkflowDocument {
  /// Snapshot a graph into a document stamped with the given time.
  pub fn export(graph: &Graph, now: DateTime<Utc>) -> Self {
    Self {
      nodes: graph.nodes().to_vec(),
      edges: graph.edges().to_vec(),
      version: Some(FORMAT_VERSION.to_string()),
      exported_at: Some(now),
    }
  }

  pub fn export_now(graph: &Graph) -> Self {
    Self::export(graph, Utc::now())
  }

  /// Pretty-printed JSON form of the document.
  pub fn to_json(&self) -> Result<String, SerializationError> {
    serde_json::to_string_pretty(self).map_err(SerializationError::Encode)
  }

  /// Build a graph, enforcing unique ids and resolvable edge endpoints.
  pub fn into_graph(self) -> Result<Graph, GraphError> {
    Graph::from_parts(self.nodes, self.edges)
  }

  /// Suggested file name for this document, e.g. `workflow-2024-03-01.json`.
  pub fn file_name(&self, prefix: &str) -> String {
    let date = self.exported_at.unwrap_or_else(Utc::now).date_naive();
    file_name(prefix, date)
  }
}

pub fn file_name(prefix: &str, date: NaiveDate) -> String {
  format!("{}-{}.json", prefix, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use flowforge_graph::{NewEdge, NodeKind, Position};

  fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
  }

  #[test]
  fn test_export_stamps_version_and_time() {
    let mut graph = Graph::new();
    let a = graph.add_node(NodeKind::Start, Position::new(0.0, 0.0));
    let b = graph.add_node(NodeKind::End, Position::new(0.0, 100.0));
    graph.add_edge(NewEdge::between(&a, &b)).unwrap();

    let doc = WorkflowDocument::export(&graph, fixed_time());
    assert_eq!(doc.version.as_deref(), Some("1.0"));
    assert_eq!(doc.exported_at, Some(fixed_time()));
    assert_eq!(doc.nodes.len(), 2);
    assert_eq!(doc.edges.len(), 1);

    let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
    assert_eq!(value["version"], "1.0");
    assert!(value["exportedAt"].as_str().unwrap().starts_with("2024-03-01T09:30:00"));
    assert_eq!(value["nodes"][0]["type"], "start");
  }

  #[test]
  fn test_file_name() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    assert_eq!(file_name("workflow", date), "workflow-2024-03-01.json");

    let doc = WorkflowDocument::export(&Graph::new(), fixed_time());
    assert_eq!(doc.file_name(DEFAULT_FILE_PREFIX), "workflow-2024-03-01.json");
  }

  #[test]
  fn test_into_graph_rejects_dangling_edges() {
    let doc = WorkflowDocument {
      nodes: vec![],
      edges: vec![Edge::new("e", "a", "b")],
      version: None,
      exported_at: None,
    };
    assert!(doc.into_graph().is_err());
  }
}
