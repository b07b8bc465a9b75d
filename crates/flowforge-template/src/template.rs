use flowforge_graph::{Edge, Node, NodeData, NodeKind, Position, fresh_id};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::info;

use crate::error::TemplateError;

/// A node of a template: everything but the id.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateNode {
  pub position: Position,
  pub data: NodeData,
}

impl TemplateNode {
  pub fn new(x: f64, y: f64, data: NodeData) -> Self {
    Self {
      position: Position::new(x, y),
      data,
    }
  }

  pub fn kind(&self) -> NodeKind {
    self.data.kind()
  }
}

impl Serialize for TemplateNode {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("TemplateNode", 3)?;
    state.serialize_field("type", &self.kind())?;
    state.serialize_field("position", &self.position)?;
    state.serialize_field("data", &self.data)?;
    state.end()
  }
}

/// An edge of a template, addressed by indices into the template's node list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateEdge {
  pub source_index: usize,
  pub target_index: usize,
}

/// A reusable workflow fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowTemplate {
  pub id: String,
  pub name: String,
  pub description: String,
  pub nodes: Vec<TemplateNode>,
  pub edges: Vec<TemplateEdge>,
}

/// Concrete nodes and edges produced from a template, with fresh ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
  pub nodes: Vec<Node>,
  pub edges: Vec<Edge>,
}

impl Instance {
  /// Shift every node by the given amount.
  pub fn offset(mut self, dx: f64, dy: f64) -> Self {
    for node in &mut self.nodes {
      node.position = node.position.offset(dx, dy);
    }
    self
  }

  pub fn into_parts(self) -> (Vec<Node>, Vec<Edge>) {
    (self.nodes, self.edges)
  }
}

impl WorkflowTemplate {
  /// Materialize the template. Each call yields ids disjoint from every
  /// previous call; the template itself is left untouched.
  pub fn instantiate(&self) -> Result<Instance, TemplateError> {
    let nodes: Vec<Node> = self
      .nodes
      .iter()
      .map(|n| Node::new(fresh_id(), n.position, n.data.clone()))
      .collect();

    let resolve = |edge: usize, index: usize| {
      nodes
        .get(index)
        .map(|n| n.id.clone())
        .ok_or_else(|| TemplateError::EdgeIndexOutOfRange {
          template: self.id.clone(),
          edge,
          index,
          nodes: nodes.len(),
        })
    };

    let mut edges = Vec::with_capacity(self.edges.len());
    for (i, edge) in self.edges.iter().enumerate() {
      let source = resolve(i, edge.source_index)?;
      let target = resolve(i, edge.target_index)?;
      edges.push(Edge::new(fresh_id(), source, target));
    }

    info!(template = %self.id, nodes = nodes.len(), edges = edges.len(), "instantiated template");
    Ok(Instance { nodes, edges })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use flowforge_graph::StartData;
  use std::collections::HashSet;

  fn start(title: &str) -> NodeData {
    NodeData::Start(StartData {
      title: title.to_string(),
      ..Default::default()
    })
  }

  fn pair() -> WorkflowTemplate {
    WorkflowTemplate {
      id: "pair".into(),
      name: "Pair".into(),
      description: String::new(),
      nodes: vec![
        TemplateNode::new(0.0, 0.0, start("a")),
        TemplateNode::new(0.0, 100.0, NodeData::defaults(NodeKind::End)),
      ],
      edges: vec![TemplateEdge {
        source_index: 0,
        target_index: 1,
      }],
    }
  }

  #[test]
  fn test_instantiate_rewrites_indices_to_ids() {
    let instance = pair().instantiate().unwrap();

    assert_eq!(instance.nodes.len(), 2);
    assert_eq!(instance.edges[0].source, instance.nodes[0].id);
    assert_eq!(instance.edges[0].target, instance.nodes[1].id);
    assert_eq!(instance.nodes[0].data, start("a"));
  }

  #[test]
  fn test_instances_are_id_disjoint() {
    let template = pair();
    let before = template.clone();

    let first = template.instantiate().unwrap();
    let second = template.instantiate().unwrap();

    let ids = |i: &Instance| -> HashSet<String> {
      i.nodes
        .iter()
        .map(|n| n.id.clone())
        .chain(i.edges.iter().map(|e| e.id.clone()))
        .collect()
    };
    assert!(ids(&first).is_disjoint(&ids(&second)));
    assert_eq!(template, before);
  }

  #[test]
  fn test_instances_share_topology() {
    let mut template = pair();
    template
      .nodes
      .push(TemplateNode::new(100.0, 100.0, NodeData::defaults(NodeKind::End)));
    template.edges.push(TemplateEdge {
      source_index: 0,
      target_index: 2,
    });

    // Edge endpoints expressed as indices into the instance's node list.
    let topology = |i: &Instance| -> Vec<(usize, usize)> {
      let index = |id: &str| i.nodes.iter().position(|n| n.id == id).unwrap();
      i.edges
        .iter()
        .map(|e| (index(&e.source), index(&e.target)))
        .collect()
    };

    let first = template.instantiate().unwrap();
    let second = template.instantiate().unwrap();

    assert_eq!(topology(&first), vec![(0, 1), (0, 2)]);
    assert_eq!(topology(&first), topology(&second));
    let kinds = |i: &Instance| i.nodes.iter().map(Node::kind).collect::<Vec<_>>();
    assert_eq!(kinds(&first), kinds(&second));
  }

  #[test]
  fn test_out_of_range_index_is_rejected() {
    let mut template = pair();
    template.edges.push(TemplateEdge {
      source_index: 1,
      target_index: 5,
    });

    let err = template.instantiate().unwrap_err();
    assert_eq!(
      err,
      TemplateError::EdgeIndexOutOfRange {
        template: "pair".into(),
        edge: 1,
        index: 5,
        nodes: 2,
      }
    );
  }

  #[test]
  fn test_offset_moves_every_node() {
    let instance = pair().instantiate().unwrap().offset(400.0, 0.0);
    assert_eq!(instance.nodes[0].position, Position::new(400.0, 0.0));
    assert_eq!(instance.nodes[1].position, Position::new(400.0, 100.0));
  }
}
