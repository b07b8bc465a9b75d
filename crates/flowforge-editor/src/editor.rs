use chrono::{DateTime, Utc};
use flowforge_graph::{Graph, NewEdge, NodeKind, NodePatch, Position};
use flowforge_history::History;
use flowforge_io::{WorkflowDocument, import};
use flowforge_layout::{Direction, LayoutOptions, apply_placements, auto_layout};
use flowforge_template::{WorkflowTemplate, find_template};
use flowforge_validation::{ValidationReport, validate};
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::error::EditorError;

/// Where a node lands when the caller gives no position.
pub const DEFAULT_POSITION: Position = Position { x: 50.0, y: 50.0 };

/// Horizontal shift applied to a template dropped onto a non-empty canvas.
pub const TEMPLATE_OFFSET_X: f64 = 400.0;

/// The single writer of a workflow graph.
///
/// Every edit works on a copy of the current graph; if the copy differs, the
/// previous graph is pushed to the undo history and the copy becomes current.
/// Edits that fail or change nothing leave both graph and history untouched.
pub struct WorkflowEditor {
  history: History<Graph>,
  layout: LayoutOptions,
}

impl Default for WorkflowEditor {
  fn default() -> Self {
    Self::new(EditorConfig::default())
  }
}

impl WorkflowEditor {
  pub fn new(config: EditorConfig) -> Self {
    Self::with_graph(Graph::new(), config)
  }

  /// Start editing an existing graph. The history starts empty.
  pub fn with_graph(graph: Graph, config: EditorConfig) -> Self {
    Self {
      history: History::new(graph, config.max_history),
      layout: config.layout,
    }
  }

  pub fn graph(&self) -> &Graph {
    self.history.current()
  }

  pub fn history(&self) -> &History<Graph> {
    &self.history
  }

  pub fn can_undo(&self) -> bool {
    self.history.can_undo()
  }

  pub fn can_redo(&self) -> bool {
    self.history.can_redo()
  }

  fn commit(&mut self, next: Graph) -> bool {
    if &next == self.graph() {
      return false;
    }
    self.history.take_snapshot();
    self.history.set_current(next);
    true
  }

  pub fn add_node(&mut self, kind: NodeKind, position: Option<Position>) -> String {
    let mut next = self.graph().clone();
    let id = next.add_node(kind, position.unwrap_or(DEFAULT_POSITION));
    self.commit(next);
    id
  }

  /// Returns whether the node's data changed.
  pub fn update_node_data(&mut self, id: &str, patch: &NodePatch) -> Result<bool, EditorError> {
    let mut next = self.graph().clone();
    if !next.update_node_data(id, patch)? {
      return Ok(false);
    }
    Ok(self.commit(next))
  }

  pub fn move_node(&mut self, id: &str, position: Position) -> bool {
    let mut next = self.graph().clone();
    next.move_node(id, position) && self.commit(next)
  }

  pub fn remove_node(&mut self, id: &str) -> bool {
    let mut next = self.graph().clone();
    next.remove_node(id) && self.commit(next)
  }

  pub fn connect(&mut self, source: &str, target: &str) -> Result<String, EditorError> {
    self.add_edge(NewEdge::between(source, target))
  }

  pub fn add_edge(&mut self, edge: NewEdge) -> Result<String, EditorError> {
    let mut next = self.graph().clone();
    let id = next.add_edge(edge).inspect_err(|e| warn!(error = %e, "rejected edge"))?;
    self.commit(next);
    Ok(id)
  }

  pub fn disconnect(&mut self, edge_id: &str) -> bool {
    let mut next = self.graph().clone();
    next.remove_edge(edge_id) && self.commit(next)
  }

  /// Remove every node and edge.
  pub fn clear(&mut self) -> bool {
    self.commit(Graph::new())
  }

  /// Restore the graph before the last edit. Returns `false` with nothing to undo.
  pub fn undo(&mut self) -> bool {
    let Some(previous) = self.history.undo() else {
      return false;
    };
    debug!(remaining = self.history.past_len(), "undo");
    self.history.set_current(previous);
    true
  }

  pub fn redo(&mut self) -> bool {
    let Some(next) = self.history.redo() else {
      return false;
    };
    debug!(remaining = self.history.future_len(), "redo");
    self.history.set_current(next);
    true
  }

  /// Merge a fresh instance of the template into the graph. Returns the new node ids.
  ///
  /// On a non-empty canvas the instance is shifted right so it does not
  /// overlap the existing nodes.
  pub fn apply_template(&mut self, template: &WorkflowTemplate) -> Result<Vec<String>, EditorError> {
    let mut instance = template.instantiate()?;
    if !self.graph().is_empty() {
      instance = instance.offset(TEMPLATE_OFFSET_X, 0.0);
    }

    let (nodes, edges) = instance.into_parts();
    let ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();

    let mut next = self.graph().clone();
    next.extend(nodes, edges)?;
    self.commit(next);
    info!(template = %template.id, nodes = ids.len(), "applied template");
    Ok(ids)
  }

  pub fn apply_template_by_id(&mut self, template_id: &str) -> Result<Vec<String>, EditorError> {
    let template = find_template(template_id)
      .ok_or_else(|| EditorError::UnknownTemplate(template_id.to_string()))?;
    self.apply_template(&template)
  }

  /// Reposition every node. `direction` overrides the configured one.
  /// Returns whether any node moved.
  pub fn auto_layout(&mut self, direction: Option<Direction>) -> bool {
    let mut options = self.layout.clone();
    if let Some(direction) = direction {
      options.direction = direction;
    }

    let placements = auto_layout(self.graph(), &options);
    let mut next = self.graph().clone();
    apply_placements(&mut next, &placements);
    let changed = self.commit(next);
    info!(direction = %options.direction, nodes = placements.len(), changed, "applied auto-layout");
    changed
  }

  /// Replace the graph with the contents of a workflow document.
  ///
  /// Nothing changes unless the whole document is valid.
  pub fn import_json(&mut self, raw: &str) -> Result<(), EditorError> {
    let document = import(raw).inspect_err(|e| warn!(error = %e, "import rejected"))?;
    self.load_document(document)
  }

  pub fn load_document(&mut self, document: WorkflowDocument) -> Result<(), EditorError> {
    let graph = document.into_graph()?;
    info!(nodes = graph.nodes().len(), edges = graph.edges().len(), "imported workflow");
    self.commit(graph);
    Ok(())
  }

  pub fn export(&self, now: DateTime<Utc>) -> WorkflowDocument {
    WorkflowDocument::export(self.graph(), now)
  }

  pub fn validate(&self) -> ValidationReport {
    validate(self.graph())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use flowforge_graph::{ApprovalPatch, GraphError};
  use flowforge_validation::WorkflowIssue;

  #[test]
  fn test_basic_approval_template_is_valid() {
    let mut editor = WorkflowEditor::default();
    let ids = editor.apply_template_by_id("basic-approval").unwrap();

    assert_eq!(ids.len(), 3);
    let report = editor.validate();
    assert!(report.issues.is_empty());
    assert!(report.nodes.is_empty(), "{:?}", report.nodes);
    assert!(report.is_valid());
  }

  #[test]
  fn test_template_on_non_empty_canvas_is_offset() {
    let mut editor = WorkflowEditor::default();
    editor.add_node(NodeKind::Task, None);

    let ids = editor.apply_template_by_id("basic-approval").unwrap();
    let start = editor.graph().node(&ids[0]).unwrap();
    assert_eq!(start.position, Position::new(650.0, 50.0));
    assert_eq!(editor.graph().nodes().len(), 4);
  }

  #[test]
  fn test_unknown_template() {
    let mut editor = WorkflowEditor::default();
    assert!(matches!(
      editor.apply_template_by_id("nope"),
      Err(EditorError::UnknownTemplate(id)) if id == "nope"
    ));
    assert!(!editor.can_undo());
  }

  #[test]
  fn test_undo_redo_sequence() {
    let mut editor = WorkflowEditor::default();
    let original = editor.graph().clone();

    let a = editor.add_node(NodeKind::Start, None);
    let b = editor.add_node(NodeKind::End, Some(Position::new(50.0, 200.0)));
    editor.connect(&a, &b).unwrap();
    let full = editor.graph().clone();

    assert!(editor.undo());
    assert!(editor.undo());
    assert!(editor.undo());
    assert_eq!(editor.graph(), &original);
    assert!(!editor.undo());

    assert!(editor.redo());
    assert_eq!(editor.graph().nodes().len(), 1);
    assert!(editor.redo());
    assert!(editor.redo());
    assert_eq!(editor.graph(), &full);
    assert!(!editor.redo());
  }

  #[test]
  fn test_new_edit_after_undo_clears_redo() {
    let mut editor = WorkflowEditor::default();
    editor.add_node(NodeKind::Start, None);
    editor.undo();
    assert!(editor.can_redo());

    editor.add_node(NodeKind::End, None);
    assert!(!editor.can_redo());
    assert!(!editor.redo());
  }

  #[test]
  fn test_failed_and_noop_edits_leave_history_alone() {
    let mut editor = WorkflowEditor::default();
    let a = editor.add_node(NodeKind::Approval, None);
    let depth = editor.history().past_len();

    assert!(matches!(
      editor.connect(&a, "ghost"),
      Err(EditorError::Graph(GraphError::UnknownNode { .. }))
    ));
    assert!(!editor.remove_node("ghost"));
    assert!(!editor.disconnect("ghost"));
    assert!(!editor.move_node(&a, DEFAULT_POSITION));
    assert_eq!(
      editor.update_node_data(
        &a,
        &NodePatch::Approval(ApprovalPatch {
          approver_role: Some("Manager".into()),
          ..Default::default()
        })
      )
      .unwrap(),
      false
    );

    assert_eq!(editor.history().past_len(), depth);
  }

  #[test]
  fn test_remove_node_is_undoable() {
    let mut editor = WorkflowEditor::default();
    let ids = editor.apply_template_by_id("task-approval-pair").unwrap();
    let before = editor.graph().clone();

    assert!(editor.remove_node(&ids[1]));
    assert_eq!(editor.graph().edges().len(), 1);

    editor.undo();
    assert_eq!(editor.graph(), &before);
  }

  #[test]
  fn test_import_is_atomic() {
    let mut editor = WorkflowEditor::default();
    editor.add_node(NodeKind::Start, None);
    let before = editor.graph().clone();

    let dangling = r#"{
      "nodes": [{ "id": "a", "type": "start", "position": { "x": 0, "y": 0 } }],
      "edges": [{ "id": "e", "source": "a", "target": "missing" }]
    }"#;
    assert!(editor.import_json(dangling).is_err());
    assert!(editor.import_json("{").is_err());
    assert_eq!(editor.graph(), &before);
  }

  #[test]
  fn test_export_import_round_trip() {
    let mut editor = WorkflowEditor::default();
    editor.apply_template_by_id("onboarding").unwrap();
    let json = editor.export(Utc::now()).to_json().unwrap();

    let mut other = WorkflowEditor::default();
    other.import_json(&json).unwrap();
    assert_eq!(other.graph(), editor.graph());

    other.undo();
    assert!(other.graph().is_empty());
  }

  #[test]
  fn test_auto_layout_is_undoable_and_idempotent() {
    let mut editor = WorkflowEditor::default();
    editor.apply_template_by_id("basic-approval").unwrap();
    let before = editor.graph().clone();

    assert!(editor.auto_layout(Some(Direction::LeftToRight)));
    assert!(!editor.auto_layout(Some(Direction::LeftToRight)));

    editor.undo();
    assert_eq!(editor.graph(), &before);
  }

  #[test]
  fn test_clear_and_validation_of_empty_graph() {
    let mut editor = WorkflowEditor::default();
    editor.add_node(NodeKind::Task, None);
    assert!(editor.clear());
    assert!(!editor.clear());

    let report = editor.validate();
    assert_eq!(
      report.issues,
      vec![WorkflowIssue::MissingStart, WorkflowIssue::MissingEnd]
    );
  }

  #[test]
  fn test_history_bound_is_respected() {
    let mut editor = WorkflowEditor::new(EditorConfig {
      max_history: 3,
      ..Default::default()
    });
    for i in 0..10 {
      editor.add_node(NodeKind::Task, Some(Position::new(i as f64, 0.0)));
    }

    assert_eq!(editor.history().past_len(), 3);
    let mut undone = 0;
    while editor.undo() {
      undone += 1;
    }
    assert_eq!(undone, 3);
    assert_eq!(editor.graph().nodes().len(), 7);
  }
}
