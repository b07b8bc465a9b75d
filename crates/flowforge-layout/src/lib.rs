//! Flowforge Layout
//!
//! Automatic positioning of workflow nodes. Layout is a visual aid only: it
//! never fails, and graphs with cycles still get a deterministic result.
//!
//! ```ignore
//! let options = LayoutOptions::default().with_direction(Direction::LeftToRight);
//! let placements = auto_layout(&graph, &options);
//! apply_placements(&mut graph, &placements);
//! ```

mod layout;
mod options;

use flowforge_graph::Graph;

pub use layout::{Placement, auto_layout};
pub use options::{Direction, LayoutOptions, Size};

/// Move every placed node to its computed position. Returns the number moved.
pub fn apply_placements(graph: &mut Graph, placements: &[Placement]) -> usize {
  placements
    .iter()
    .filter(|p| graph.move_node(&p.id, p.position))
    .count()
}
