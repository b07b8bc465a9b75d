use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::edge::{Edge, NewEdge};
use crate::error::GraphError;
use crate::node::{Node, NodeData, NodeKind, NodePatch, Position};

/// Generate a fresh, globally unique identifier for a node or edge.
pub fn fresh_id() -> String {
  uuid::Uuid::new_v4().to_string()
}

/// The workflow graph: nodes and directed edges with referential integrity.
///
/// Every edge endpoint names an existing node, and node and edge ids are
/// unique. All mutating operations preserve both properties; removing a node
/// removes the edges that touch it. A clone is a fully independent copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphParts")]
pub struct Graph {
  nodes: Vec<Node>,
  edges: Vec<Edge>,
}

#[derive(Deserialize)]
struct GraphParts {
  nodes: Vec<Node>,
  edges: Vec<Edge>,
}

impl TryFrom<GraphParts> for Graph {
  type Error = GraphError;

  fn try_from(parts: GraphParts) -> Result<Self, Self::Error> {
    Graph::from_parts(parts.nodes, parts.edges)
  }
}

impl Graph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a graph from raw collections, rejecting duplicate ids and
  /// edges that reference unknown nodes.
  pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, GraphError> {
    let mut graph = Graph::new();
    graph.extend(nodes, edges)?;
    Ok(graph)
  }

  pub fn nodes(&self) -> &[Node] {
    &self.nodes
  }

  pub fn edges(&self) -> &[Edge] {
    &self.edges
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Get a node by ID.
  pub fn node(&self, id: &str) -> Option<&Node> {
    self.nodes.iter().find(|n| n.id == id)
  }

  pub fn edge(&self, id: &str) -> Option<&Edge> {
    self.edges.iter().find(|e| e.id == id)
  }

  pub fn count_kind(&self, kind: NodeKind) -> usize {
    self.nodes.iter().filter(|n| n.kind() == kind).count()
  }

  pub fn into_parts(self) -> (Vec<Node>, Vec<Edge>) {
    (self.nodes, self.edges)
  }

  /// Add a node of the given kind with default data. Returns the new id.
  pub fn add_node(&mut self, kind: NodeKind, position: Position) -> String {
    let id = fresh_id();
    debug!(node_id = %id, kind = %kind, "adding node");
    self
      .nodes
      .push(Node::new(id.clone(), position, NodeData::defaults(kind)));
    id
  }

  /// Merge a typed patch into a node's data.
  ///
  /// Returns `Ok(false)` when no node has the id.
  pub fn update_node_data(&mut self, id: &str, patch: &NodePatch) -> Result<bool, GraphError> {
    let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
      return Ok(false);
    };

    let data = node
      .data
      .merged(patch)
      .ok_or_else(|| GraphError::KindMismatch {
        node_id: id.to_string(),
        node: node.kind(),
        patch: patch.kind(),
      })?;
    node.data = data;
    debug!(node_id = %id, "updated node data");
    Ok(true)
  }

  /// Move a node. Returns `false` when no node has the id.
  pub fn move_node(&mut self, id: &str, position: Position) -> bool {
    match self.nodes.iter_mut().find(|n| n.id == id) {
      Some(node) => {
        node.position = position;
        true
      }
      None => false,
    }
  }

  /// Remove a node and every edge that starts or ends at it.
  ///
  /// Removing an unknown id is a no-op and returns `false`.
  pub fn remove_node(&mut self, id: &str) -> bool {
    let before = self.nodes.len();
    self.nodes.retain(|n| n.id != id);
    if self.nodes.len() == before {
      return false;
    }

    let edges_before = self.edges.len();
    self.edges.retain(|e| !e.touches(id));
    debug!(
      node_id = %id,
      removed_edges = edges_before - self.edges.len(),
      "removed node"
    );
    true
  }

  /// Connect two existing nodes. Returns the id of the new edge.
  pub fn add_edge(&mut self, edge: NewEdge) -> Result<String, GraphError> {
    let id = edge.id.unwrap_or_else(fresh_id);
    if self.edge(&id).is_some() {
      return Err(GraphError::DuplicateEdgeId(id));
    }
    for endpoint in [&edge.source, &edge.target] {
      if self.node(endpoint).is_none() {
        return Err(GraphError::UnknownNode {
          edge_id: id,
          node_id: endpoint.clone(),
        });
      }
    }

    debug!(edge_id = %id, source = %edge.source, target = %edge.target, "adding edge");
    self.edges.push(Edge {
      id: id.clone(),
      source: edge.source,
      target: edge.target,
    });
    Ok(id)
  }

  /// Remove an edge. Returns `false` when no edge has the id.
  pub fn remove_edge(&mut self, id: &str) -> bool {
    let before = self.edges.len();
    self.edges.retain(|e| e.id != id);
    self.edges.len() != before
  }

  /// Append a sub-graph. Either everything is added or, on error, nothing is.
  ///
  /// New edges may reference existing nodes as well as the new ones.
  pub fn extend(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<(), GraphError> {
    let mut node_ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
    for node in &nodes {
      if !node_ids.insert(node.id.as_str()) {
        return Err(GraphError::DuplicateNodeId(node.id.clone()));
      }
    }

    let mut edge_ids: HashSet<&str> = self.edges.iter().map(|e| e.id.as_str()).collect();
    for edge in &edges {
      if !edge_ids.insert(edge.id.as_str()) {
        return Err(GraphError::DuplicateEdgeId(edge.id.clone()));
      }
      for endpoint in [&edge.source, &edge.target] {
        if !node_ids.contains(endpoint.as_str()) {
          return Err(GraphError::UnknownNode {
            edge_id: edge.id.clone(),
            node_id: endpoint.clone(),
          });
        }
      }
    }

    self.nodes.extend(nodes);
    self.edges.extend(edges);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::node::{StartPatch, TaskPatch};

  fn chain() -> (Graph, String, String, String) {
    let mut graph = Graph::new();
    let a = graph.add_node(NodeKind::Start, Position::default());
    let b = graph.add_node(NodeKind::Task, Position::default());
    let c = graph.add_node(NodeKind::End, Position::default());
    graph.add_edge(NewEdge::between(&a, &b)).unwrap();
    graph.add_edge(NewEdge::between(&b, &c)).unwrap();
    (graph, a, b, c)
  }

  #[test]
  fn test_add_node_assigns_unique_ids_and_defaults() {
    let mut graph = Graph::new();
    let a = graph.add_node(NodeKind::Task, Position::new(10.0, 20.0));
    let b = graph.add_node(NodeKind::Task, Position::new(10.0, 20.0));

    assert_ne!(a, b);
    let node = graph.node(&a).unwrap();
    assert_eq!(node.kind(), NodeKind::Task);
    assert_eq!(node.data.title(), Some("New Task"));
    assert_eq!(node.position, Position::new(10.0, 20.0));
  }

  #[test]
  fn test_remove_node_cascades_exactly_touching_edges() {
    let (mut graph, a, b, c) = chain();
    let extra = graph.add_edge(NewEdge::between(&a, &c)).unwrap();

    assert!(graph.remove_node(&b));

    assert!(graph.node(&b).is_none());
    let remaining: Vec<&str> = graph.edges().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(remaining, vec![extra.as_str()]);
  }

  #[test]
  fn test_remove_unknown_node_is_noop() {
    let (mut graph, ..) = chain();
    let before = graph.clone();

    assert!(!graph.remove_node("missing"));
    assert_eq!(graph, before);
  }

  #[test]
  fn test_add_edge_rejects_dangling_endpoint() {
    let (mut graph, a, ..) = chain();
    let before = graph.clone();

    let result = graph.add_edge(NewEdge::between(&a, "ghost"));
    assert!(matches!(result, Err(GraphError::UnknownNode { .. })));
    assert_eq!(graph, before);
  }

  #[test]
  fn test_add_edge_keeps_given_id_and_rejects_duplicates() {
    let (mut graph, a, _, c) = chain();

    let id = graph
      .add_edge(NewEdge::between(&a, &c).with_id("shortcut"))
      .unwrap();
    assert_eq!(id, "shortcut");

    let again = graph.add_edge(NewEdge::between(&a, &c).with_id("shortcut"));
    assert_eq!(again, Err(GraphError::DuplicateEdgeId("shortcut".into())));
  }

  #[test]
  fn test_self_loop_is_structurally_allowed() {
    let mut graph = Graph::new();
    let a = graph.add_node(NodeKind::Task, Position::default());
    assert!(graph.add_edge(NewEdge::between(&a, &a)).is_ok());
  }

  #[test]
  fn test_update_node_data() {
    let (mut graph, a, b, _) = chain();

    let patch = NodePatch::Task(TaskPatch {
      assignee: Some("alice".into()),
      ..Default::default()
    });
    assert_eq!(graph.update_node_data(&b, &patch), Ok(true));
    assert_eq!(graph.update_node_data("missing", &patch), Ok(false));

    let mismatch = graph.update_node_data(&a, &patch);
    assert!(matches!(mismatch, Err(GraphError::KindMismatch { .. })));

    let start = NodePatch::Start(StartPatch {
      title: Some("Kickoff".into()),
      ..Default::default()
    });
    graph.update_node_data(&a, &start).unwrap();
    assert_eq!(graph.node(&a).unwrap().data.title(), Some("Kickoff"));
  }

  #[test]
  fn test_clone_is_independent() {
    let (mut graph, a, ..) = chain();
    let snapshot = graph.clone();

    graph.move_node(&a, Position::new(999.0, 999.0));
    graph.remove_node(&a);

    assert_eq!(snapshot.nodes().len(), 3);
    assert_eq!(snapshot.node(&a).unwrap().position, Position::default());
  }

  #[test]
  fn test_from_parts_rejects_duplicates_and_dangling() {
    let node = Node::new("a", Position::default(), NodeData::defaults(NodeKind::Start));

    let dup = Graph::from_parts(vec![node.clone(), node.clone()], vec![]);
    assert_eq!(dup, Err(GraphError::DuplicateNodeId("a".into())));

    let dangling = Graph::from_parts(vec![node], vec![Edge::new("e", "a", "b")]);
    assert!(matches!(dangling, Err(GraphError::UnknownNode { .. })));
  }

  #[test]
  fn test_extend_is_atomic() {
    let (mut graph, a, ..) = chain();
    let before = graph.clone();

    let node = Node::new("new", Position::default(), NodeData::defaults(NodeKind::Task));
    let result = graph.extend(
      vec![node],
      vec![Edge::new("e1", &a, "new"), Edge::new("e2", "new", "ghost")],
    );

    assert!(result.is_err());
    assert_eq!(graph, before);
  }

  #[test]
  fn test_deserialize_validates_integrity() {
    let json = r#"{
      "nodes": [{ "id": "a", "type": "start", "position": { "x": 0, "y": 0 }, "data": {} }],
      "edges": [{ "id": "e", "source": "a", "target": "b" }]
    }"#;
    assert!(serde_json::from_str::<Graph>(json).is_err());
  }
}
