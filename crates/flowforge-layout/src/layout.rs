//! Layered (Sugiyama-style) layout.
//!
//! Phases:
//! 1. Cycle breaking: back edges found by an insertion-ordered DFS are
//!    reversed and self-loops dropped, so cyclic graphs still get a layout.
//! 2. Ranking: longest path from the sources.
//! 3. Ordering: one barycenter sweep per rank.
//! 4. Coordinates: ranks stacked along the layout direction, each rank
//!    centered on the widest one.

use std::collections::{HashSet, VecDeque};

use flowforge_graph::{Adjacency, Graph, Position};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::options::{Direction, LayoutOptions, Size};

/// Computed top-left position for one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
  pub id: String,
  pub position: Position,
}

/// Compute positions for every node of the graph, in node order.
pub fn auto_layout(graph: &Graph, options: &LayoutOptions) -> Vec<Placement> {
  let view = Adjacency::from_graph(graph);
  if view.is_empty() {
    return Vec::new();
  }

  let (successors, predecessors) = acyclic_edges(&view);
  let ranks = longest_path_ranks(&successors);
  let layers = order_layers(&ranks, &predecessors);

  let sizes: Vec<Size> = (0..view.len())
    .map(|v| {
      graph
        .nodes()
        .get(v)
        .map_or(options.default_size, |node| options.size_of(node.kind()))
    })
    .collect();
  let centers = coordinates(&layers, &sizes, options);

  debug!(
    nodes = graph.nodes().len(),
    ranks = layers.len(),
    direction = %options.direction,
    "computed layout"
  );

  graph
    .nodes()
    .iter()
    .filter_map(|node| {
      let v = view.index_of(&node.id)?;
      let (cx, cy) = centers[v];
      let size = sizes[v];
      Some(Placement {
        id: node.id.clone(),
        position: Position::new(cx - size.width / 2.0, cy - size.height / 2.0),
      })
    })
    .collect()
}

/// Successor and predecessor lists of a DAG derived from the view.
fn acyclic_edges(view: &Adjacency<'_>) -> (Vec<Vec<usize>>, Vec<Vec<usize>>) {
  let back = back_edges(view);
  let n = view.len();
  let mut successors = vec![Vec::new(); n];
  let mut predecessors = vec![Vec::new(); n];

  for u in 0..n {
    for &v in view.successors(u) {
      if u == v {
        continue;
      }
      let (from, to) = if back.contains(&(u, v)) { (v, u) } else { (u, v) };
      successors[from].push(to);
      predecessors[to].push(from);
    }
  }

  (successors, predecessors)
}

/// Edges that close a cycle during an insertion-ordered DFS.
fn back_edges(view: &Adjacency<'_>) -> HashSet<(usize, usize)> {
  let n = view.len();
  let mut visited = vec![false; n];
  let mut on_stack = vec![false; n];
  let mut back = HashSet::new();
  let mut stack: Vec<(usize, usize)> = Vec::new();

  for root in 0..n {
    if visited[root] {
      continue;
    }
    visited[root] = true;
    on_stack[root] = true;
    stack.push((root, 0));

    while let Some(frame) = stack.last_mut() {
      let (u, cursor) = *frame;
      let Some(&v) = view.successors(u).get(cursor) else {
        on_stack[u] = false;
        stack.pop();
        continue;
      };
      frame.1 += 1;

      if on_stack[v] {
        back.insert((u, v));
      } else if !visited[v] {
        visited[v] = true;
        on_stack[v] = true;
        stack.push((v, 0));
      }
    }
  }

  back
}

/// Rank of each vertex: length of the longest path reaching it from a source.
fn longest_path_ranks(successors: &[Vec<usize>]) -> Vec<usize> {
  let n = successors.len();
  let mut in_degree = vec![0usize; n];
  for targets in successors {
    for &v in targets {
      in_degree[v] += 1;
    }
  }

  let mut queue: VecDeque<usize> = (0..n).filter(|&v| in_degree[v] == 0).collect();
  let mut rank = vec![0usize; n];
  while let Some(u) = queue.pop_front() {
    for &v in &successors[u] {
      rank[v] = rank[v].max(rank[u] + 1);
      in_degree[v] -= 1;
      if in_degree[v] == 0 {
        queue.push_back(v);
      }
    }
  }

  rank
}

/// Group vertices by rank, then order each rank by the mean position of its
/// predecessors. Vertices without predecessors keep their slot.
fn order_layers(ranks: &[usize], predecessors: &[Vec<usize>]) -> Vec<Vec<usize>> {
  let depth = ranks.iter().copied().max().map_or(0, |r| r + 1);
  let mut layers: Vec<Vec<usize>> = vec![Vec::new(); depth];
  for (v, &r) in ranks.iter().enumerate() {
    layers[r].push(v);
  }

  let mut slot = vec![0usize; ranks.len()];
  for layer in &layers {
    for (i, &v) in layer.iter().enumerate() {
      slot[v] = i;
    }
  }

  for layer in layers.iter_mut().skip(1) {
    let mut keyed: Vec<(f64, usize)> = layer
      .iter()
      .map(|&v| {
        let preds = &predecessors[v];
        let key = if preds.is_empty() {
          slot[v] as f64
        } else {
          preds.iter().map(|&p| slot[p] as f64).sum::<f64>() / preds.len() as f64
        };
        (key, v)
      })
      .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

    *layer = keyed.into_iter().map(|(_, v)| v).collect();
    for (i, &v) in layer.iter().enumerate() {
      slot[v] = i;
    }
  }

  layers
}

/// Center point of every vertex.
fn coordinates(layers: &[Vec<usize>], sizes: &[Size], options: &LayoutOptions) -> Vec<(f64, f64)> {
  let vertical = options.direction.is_vertical();
  // Extent across the rank (breadth) and along the rank axis (depth).
  let breadth = |v: usize| if vertical { sizes[v].width } else { sizes[v].height };
  let depth = |v: usize| if vertical { sizes[v].height } else { sizes[v].width };

  let rank_depths: Vec<f64> = layers
    .iter()
    .map(|layer| layer.iter().map(|&v| depth(v)).fold(0.0, f64::max))
    .collect();
  let layer_breadths: Vec<f64> = layers
    .iter()
    .map(|layer| {
      let gaps = layer.len().saturating_sub(1) as f64 * options.node_sep;
      layer.iter().map(|&v| breadth(v)).sum::<f64>() + gaps
    })
    .collect();
  let max_breadth = layer_breadths.iter().copied().fold(0.0, f64::max);
  let total_depth = rank_depths.iter().sum::<f64>()
    + layers.len().saturating_sub(1) as f64 * options.rank_sep;

  let mut centers = vec![(0.0, 0.0); sizes.len()];
  let mut rank_start = 0.0;
  for (r, layer) in layers.iter().enumerate() {
    let mut along = rank_start + rank_depths[r] / 2.0;
    if options.direction.is_reversed() {
      along = total_depth - along;
    }

    let mut cursor = (max_breadth - layer_breadths[r]) / 2.0;
    for &v in layer {
      let across = cursor + breadth(v) / 2.0;
      cursor += breadth(v) + options.node_sep;
      centers[v] = match options.direction {
        Direction::TopToBottom | Direction::BottomToTop => (across, along),
        Direction::LeftToRight | Direction::RightToLeft => (along, across),
      };
    }

    rank_start += rank_depths[r] + options.rank_sep;
  }

  centers
}
