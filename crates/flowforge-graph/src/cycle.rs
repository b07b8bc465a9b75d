//! Cycle detection over a workflow graph.
//!
//! Depth-first search with an explicit stack, so very deep graphs cannot
//! overflow the call stack. Roots are tried in insertion order.

use tracing::debug;

use crate::adjacency::Adjacency;
use crate::error::GraphError;
use crate::graph::Graph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
  Unvisited,
  InProgress,
  Done,
}

/// Cycle detector with an optional node-count ceiling.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleDetector {
  node_limit: Option<usize>,
}

impl CycleDetector {
  pub fn new() -> Self {
    Self::default()
  }

  /// Refuse to analyse graphs with more than `limit` nodes.
  pub fn with_node_limit(limit: usize) -> Self {
    Self {
      node_limit: Some(limit),
    }
  }

  /// Return the first cycle found, as node ids with the closing id repeated.
  pub fn find(&self, graph: &Graph) -> Result<Option<Vec<String>>, GraphError> {
    if let Some(limit) = self.node_limit
      && graph.nodes().len() > limit
    {
      return Err(GraphError::TooLarge {
        nodes: graph.nodes().len(),
        limit,
      });
    }
    Ok(find_cycle_in(&Adjacency::from_graph(graph)))
  }

  pub fn has_cycle(&self, graph: &Graph) -> Result<bool, GraphError> {
    Ok(self.find(graph)?.is_some())
  }
}

/// Whether the graph contains at least one directed cycle.
pub fn has_cycle(graph: &Graph) -> bool {
  find_cycle(graph).is_some()
}

/// First directed cycle in the graph, if any.
pub fn find_cycle(graph: &Graph) -> Option<Vec<String>> {
  find_cycle_in(&Adjacency::from_graph(graph))
}

/// First directed cycle in an adjacency view, if any.
pub fn find_cycle_in(view: &Adjacency<'_>) -> Option<Vec<String>> {
  let mut mark = vec![Mark::Unvisited; view.len()];
  // (vertex, index of the next successor to visit)
  let mut stack: Vec<(usize, usize)> = Vec::new();

  for root in 0..view.len() {
    if mark[root] != Mark::Unvisited {
      continue;
    }
    mark[root] = Mark::InProgress;
    stack.push((root, 0));

    while let Some(frame) = stack.last_mut() {
      let (vertex, cursor) = *frame;
      let Some(&next) = view.successors(vertex).get(cursor) else {
        mark[vertex] = Mark::Done;
        stack.pop();
        continue;
      };
      frame.1 += 1;

      match mark[next] {
        Mark::InProgress => {
          // Back edge: everything on the stack from `next` upwards is the cycle.
          let start = stack.iter().position(|&(v, _)| v == next).unwrap_or(0);
          let mut cycle: Vec<String> = stack[start..]
            .iter()
            .map(|&(v, _)| view.id(v).to_string())
            .collect();
          cycle.push(view.id(next).to_string());
          debug!(cycle = ?cycle, "cycle detected");
          return Some(cycle);
        }
        Mark::Unvisited => {
          mark[next] = Mark::InProgress;
          stack.push((next, 0));
        }
        Mark::Done => {}
      }
    }
  }

  None
}
