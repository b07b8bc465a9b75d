use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use flowforge_graph::NodeKind;
use serde::{Deserialize, Serialize};

/// Direction in which ranks advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
  #[default]
  #[serde(rename = "TB")]
  TopToBottom,
  #[serde(rename = "BT")]
  BottomToTop,
  #[serde(rename = "LR")]
  LeftToRight,
  #[serde(rename = "RL")]
  RightToLeft,
}

impl Direction {
  /// Ranks advance along the y axis.
  pub fn is_vertical(&self) -> bool {
    matches!(self, Direction::TopToBottom | Direction::BottomToTop)
  }

  /// Ranks advance towards smaller coordinates.
  pub fn is_reversed(&self) -> bool {
    matches!(self, Direction::BottomToTop | Direction::RightToLeft)
  }
}

impl fmt::Display for Direction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Direction::TopToBottom => "TB",
      Direction::BottomToTop => "BT",
      Direction::LeftToRight => "LR",
      Direction::RightToLeft => "RL",
    };
    f.write_str(s)
  }
}

impl FromStr for Direction {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_uppercase().as_str() {
      "TB" => Ok(Direction::TopToBottom),
      "BT" => Ok(Direction::BottomToTop),
      "LR" => Ok(Direction::LeftToRight),
      "RL" => Ok(Direction::RightToLeft),
      _ => Err(format!("invalid layout direction: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
  pub width: f64,
  pub height: f64,
}

impl Size {
  pub const fn new(width: f64, height: f64) -> Self {
    Self { width, height }
  }
}

/// Spacing and node-size configuration for [`crate::auto_layout`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
  pub direction: Direction,
  /// Gap between consecutive ranks.
  pub rank_sep: f64,
  /// Gap between neighbouring nodes of the same rank.
  pub node_sep: f64,
  /// Size of kinds missing from `sizes`.
  pub default_size: Size,
  pub sizes: HashMap<NodeKind, Size>,
}

impl Default for LayoutOptions {
  fn default() -> Self {
    let terminal = Size::new(200.0, 80.0);
    Self {
      direction: Direction::TopToBottom,
      rank_sep: 80.0,
      node_sep: 50.0,
      default_size: Size::new(220.0, 100.0),
      sizes: HashMap::from([
        (NodeKind::Start, terminal),
        (NodeKind::End, terminal),
        (NodeKind::Task, Size::new(240.0, 120.0)),
      ]),
    }
  }
}

impl LayoutOptions {
  pub fn with_direction(mut self, direction: Direction) -> Self {
    self.direction = direction;
    self
  }

  pub fn size_of(&self, kind: NodeKind) -> Size {
    self.sizes.get(&kind).copied().unwrap_or(self.default_size)
  }
}
