//! Flowforge Graph
//!
//! The workflow graph model: typed nodes, directed edges, and the structural
//! operations that keep them consistent.
//!
//! Key guarantees:
//! - Node ids and edge ids are unique within a graph
//! - Every edge references existing nodes (removal cascades)
//! - Node data is a typed union over the node kinds, updated through typed patches
//!
//! The [`cycle`] module provides iterative cycle detection over the same graph.

mod adjacency;
pub mod cycle;
mod edge;
mod error;
mod graph;
mod node;

pub use adjacency::Adjacency;
pub use cycle::{CycleDetector, find_cycle, has_cycle};
pub use edge::{Edge, NewEdge};
pub use error::GraphError;
pub use graph::{Graph, fresh_id};
pub use node::{
  ApprovalData, ApprovalPatch, AutomatedData, AutomatedPatch, CustomField, EndData, EndPatch,
  Node, NodeData, NodeKind, NodePatch, Position, StartData, StartPatch, TaskData, TaskPatch,
};
