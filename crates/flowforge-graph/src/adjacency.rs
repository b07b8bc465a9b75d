use std::collections::HashMap;

use crate::graph::Graph;

/// Index-based adjacency view over a node/edge set.
///
/// Vertices are numbered in insertion order, and neighbour lists keep edge
/// order, so every traversal built on this view is deterministic for a given
/// construction order.
#[derive(Debug, Clone)]
pub struct Adjacency<'a> {
  ids: Vec<&'a str>,
  index: HashMap<&'a str, usize>,
  /// Adjacency list: vertex -> downstream vertices.
  outgoing: Vec<Vec<usize>>,
  /// Reverse adjacency: vertex -> upstream vertices.
  incoming: Vec<Vec<usize>>,
}

impl<'a> Adjacency<'a> {
  /// Build the view from node ids and `(source, target)` pairs.
  ///
  /// Edge endpoints that are not in `nodes` are appended as extra vertices so
  /// that a dangling edge never panics a traversal.
  pub fn new<N, E>(nodes: N, edges: E) -> Self
  where
    N: IntoIterator<Item = &'a str>,
    E: IntoIterator<Item = (&'a str, &'a str)>,
  {
    let mut view = Self {
      ids: Vec::new(),
      index: HashMap::new(),
      outgoing: Vec::new(),
      incoming: Vec::new(),
    };

    for id in nodes {
      view.vertex(id);
    }

    for (source, target) in edges {
      let from = view.vertex(source);
      let to = view.vertex(target);
      view.outgoing[from].push(to);
      view.incoming[to].push(from);
    }

    view
  }

  pub fn from_graph(graph: &'a Graph) -> Self {
    Self::new(
      graph.nodes().iter().map(|n| n.id.as_str()),
      graph
        .edges()
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str())),
    )
  }

  fn vertex(&mut self, id: &'a str) -> usize {
    if let Some(&i) = self.index.get(id) {
      return i;
    }
    let i = self.ids.len();
    self.ids.push(id);
    self.index.insert(id, i);
    self.outgoing.push(Vec::new());
    self.incoming.push(Vec::new());
    i
  }

  pub fn len(&self) -> usize {
    self.ids.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ids.is_empty()
  }

  pub fn id(&self, vertex: usize) -> &'a str {
    self.ids[vertex]
  }

  pub fn index_of(&self, id: &str) -> Option<usize> {
    self.index.get(id).copied()
  }

  pub fn successors(&self, vertex: usize) -> &[usize] {
    &self.outgoing[vertex]
  }

  pub fn predecessors(&self, vertex: usize) -> &[usize] {
    &self.incoming[vertex]
  }

  /// Number of edges leaving the node, zero for unknown ids.
  pub fn outgoing_count(&self, id: &str) -> usize {
    self.index_of(id).map_or(0, |i| self.outgoing[i].len())
  }

  /// Number of edges entering the node, zero for unknown ids.
  pub fn incoming_count(&self, id: &str) -> usize {
    self.index_of(id).map_or(0, |i| self.incoming[i].len())
  }

  /// Nodes with no incoming edges, in insertion order.
  pub fn entry_points(&self) -> Vec<&'a str> {
    (0..self.len())
      .filter(|&i| self.incoming[i].is_empty())
      .map(|i| self.ids[i])
      .collect()
  }
}
