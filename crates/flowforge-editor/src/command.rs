use flowforge_graph::{NodeKind, NodePatch, Position};
use flowforge_layout::Direction;
use serde::{Deserialize, Serialize};

use crate::editor::WorkflowEditor;
use crate::error::EditorError;

/// A serializable editor operation.
///
/// ```json
/// { "command": "add_node", "kind": "task", "position": { "x": 10, "y": 20 } }
/// { "command": "apply_template", "templateId": "basic-approval" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EditorCommand {
  AddNode {
    kind: NodeKind,
    #[serde(default)]
    position: Option<Position>,
  },
  UpdateNodeData {
    id: String,
    patch: NodePatch,
  },
  MoveNode {
    id: String,
    position: Position,
  },
  RemoveNode {
    id: String,
  },
  Connect {
    source: String,
    target: String,
  },
  Disconnect {
    id: String,
  },
  ApplyTemplate {
    template_id: String,
  },
  AutoLayout {
    #[serde(default)]
    direction: Option<Direction>,
  },
  Clear,
  Undo,
  Redo,
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CommandOutcome {
  pub changed: bool,
  /// Ids of nodes or edges the command created.
  pub created: Vec<String>,
}

impl CommandOutcome {
  fn changed(changed: bool) -> Self {
    Self {
      changed,
      created: Vec::new(),
    }
  }

  fn created(ids: Vec<String>) -> Self {
    Self {
      changed: true,
      created: ids,
    }
  }
}

impl WorkflowEditor {
  pub fn apply(&mut self, command: EditorCommand) -> Result<CommandOutcome, EditorError> {
    let outcome = match command {
      EditorCommand::AddNode { kind, position } => {
        CommandOutcome::created(vec![self.add_node(kind, position)])
      }
      EditorCommand::UpdateNodeData { id, patch } => {
        CommandOutcome::changed(self.update_node_data(&id, &patch)?)
      }
      EditorCommand::MoveNode { id, position } => CommandOutcome::changed(self.move_node(&id, position)),
      EditorCommand::RemoveNode { id } => CommandOutcome::changed(self.remove_node(&id)),
      EditorCommand::Connect { source, target } => {
        CommandOutcome::created(vec![self.connect(&source, &target)?])
      }
      EditorCommand::Disconnect { id } => CommandOutcome::changed(self.disconnect(&id)),
      EditorCommand::ApplyTemplate { template_id } => {
        CommandOutcome::created(self.apply_template_by_id(&template_id)?)
      }
      EditorCommand::AutoLayout { direction } => CommandOutcome::changed(self.auto_layout(direction)),
      EditorCommand::Clear => CommandOutcome::changed(self.clear()),
      EditorCommand::Undo => CommandOutcome::changed(self.undo()),
      EditorCommand::Redo => CommandOutcome::changed(self.redo()),
    };
    Ok(outcome)
  }

  /// Apply commands in order, stopping at the first error.
  pub fn apply_all(
    &mut self,
    commands: impl IntoIterator<Item = EditorCommand>,
  ) -> Result<Vec<CommandOutcome>, EditorError> {
    commands.into_iter().map(|c| self.apply(c)).collect()
  }
}
