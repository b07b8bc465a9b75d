use flowforge_history::DEFAULT_MAX_HISTORY;
use flowforge_layout::LayoutOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
  /// Maximum number of undo steps kept.
  pub max_history: usize,
  pub layout: LayoutOptions,
}

impl Default for EditorConfig {
  fn default() -> Self {
    Self {
      max_history: DEFAULT_MAX_HISTORY,
      layout: LayoutOptions::default(),
    }
  }
}
