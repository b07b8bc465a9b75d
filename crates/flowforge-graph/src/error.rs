use thiserror::Error;

use crate::node::NodeKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
  #[error("duplicate node id: {0}")]
  DuplicateNodeId(String),

  #[error("duplicate edge id: {0}")]
  DuplicateEdgeId(String),

  #[error("edge '{edge_id}' references unknown node '{node_id}'")]
  UnknownNode { edge_id: String, node_id: String },

  #[error("cannot apply a {patch} patch to {node} node '{node_id}'")]
  KindMismatch {
    node_id: String,
    node: NodeKind,
    patch: NodeKind,
  },

  #[error("graph has {nodes} nodes, limit is {limit}")]
  TooLarge { nodes: usize, limit: usize },

  #[error("invalid type for node '{node_id}': {message}")]
  InvalidKind { node_id: String, message: String },

  #[error("invalid data for {kind} node '{node_id}': {message}")]
  InvalidData {
    node_id: String,
    kind: NodeKind,
    message: String,
  },
}
