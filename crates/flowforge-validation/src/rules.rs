//! Per-node validation rules.
//!
//! Each node kind has an ordered list of checks; the first one that fires
//! decides the node's result. A non-terminal node with no connections at all
//! is always reported as an error.

use std::collections::HashMap;

use flowforge_graph::{Adjacency, Graph, Node, NodeData, NodeKind, TaskData};

use crate::result::ValidationResult;

/// Connection counts for one node, plus graph-wide kind counts.
struct Context {
  incoming: usize,
  outgoing: usize,
  starts: usize,
  ends: usize,
}

impl Context {
  fn disconnected(&self) -> bool {
    self.incoming == 0 && self.outgoing == 0
  }
}

/// Validate every node. Nodes without issues have no entry in the map.
pub fn validate_nodes(graph: &Graph) -> HashMap<String, ValidationResult> {
  let view = Adjacency::from_graph(graph);
  let starts = graph.count_kind(NodeKind::Start);
  let ends = graph.count_kind(NodeKind::End);

  graph
    .nodes()
    .iter()
    .filter_map(|node| {
      let ctx = Context {
        incoming: view.incoming_count(&node.id),
        outgoing: view.outgoing_count(&node.id),
        starts,
        ends,
      };
      check_node(node, &ctx).map(|result| (node.id.clone(), result))
    })
    .collect()
}

fn check_node(node: &Node, ctx: &Context) -> Option<ValidationResult> {
  let result = match &node.data {
    NodeData::Start(_) => check_start(ctx),
    NodeData::End(_) => check_end(ctx),
    NodeData::Task(data) => check_task(data, ctx),
    NodeData::Approval(data) => check_approval(data.approver_role.as_deref(), ctx),
    NodeData::Automated(data) => check_automated(data.action_id.as_deref(), ctx),
  };

  if !node.kind().is_terminal() && ctx.disconnected() {
    return match result {
      Some(r) if r.is_error() => Some(r),
      _ => Some(ValidationResult::error(
        "Node is disconnected from the workflow.",
      )),
    };
  }

  result
}

fn check_start(ctx: &Context) -> Option<ValidationResult> {
  if ctx.starts > 1 {
    return Some(ValidationResult::error(
      "Multiple start nodes detected. Only one start node is allowed.",
    ));
  }
  if ctx.incoming > 0 {
    return Some(ValidationResult::error(
      "Start node should not have incoming connections.",
    ));
  }
  if ctx.outgoing == 0 {
    return Some(ValidationResult::error(
      "Start node must have at least one outgoing connection.",
    ));
  }
  None
}

fn check_end(ctx: &Context) -> Option<ValidationResult> {
  if ctx.ends > 1 {
    return Some(ValidationResult::warning(
      "Multiple end nodes detected. Consider having a single end point.",
    ));
  }
  if ctx.outgoing > 0 {
    return Some(ValidationResult::error(
      "End node should not have outgoing connections.",
    ));
  }
  if ctx.incoming == 0 {
    return Some(ValidationResult::error(
      "End node must have at least one incoming connection.",
    ));
  }
  None
}

fn check_task(data: &TaskData, ctx: &Context) -> Option<ValidationResult> {
  let title = data.title.trim();
  if title.is_empty() || data.title == TaskData::PLACEHOLDER_TITLE {
    return Some(ValidationResult::warning("Task requires a meaningful title."));
  }
  if ctx.disconnected() {
    return Some(ValidationResult::error(
      "Task node is disconnected. Connect it to the workflow.",
    ));
  }
  if ctx.incoming == 0 {
    return Some(ValidationResult::warning(
      "Task node has no incoming connection.",
    ));
  }
  if ctx.outgoing == 0 {
    return Some(ValidationResult::warning(
      "Task node has no outgoing connection.",
    ));
  }
  None
}

fn check_approval(approver_role: Option<&str>, ctx: &Context) -> Option<ValidationResult> {
  if is_blank(approver_role) {
    return Some(ValidationResult::warning(
      "Approval node requires an approver role.",
    ));
  }
  if ctx.incoming == 0 {
    return Some(ValidationResult::error(
      "Approval node has no incoming connection.",
    ));
  }
  if ctx.outgoing == 0 {
    return Some(ValidationResult::warning(
      "Approval node has no outgoing connection.",
    ));
  }
  None
}

fn check_automated(action_id: Option<&str>, ctx: &Context) -> Option<ValidationResult> {
  if is_blank(action_id) {
    return Some(ValidationResult::warning(
      "Automated node requires an action to be selected.",
    ));
  }
  if ctx.incoming == 0 || ctx.outgoing == 0 {
    return Some(ValidationResult::error(
      "Automated node must be connected to the workflow.",
    ));
  }
  None
}

fn is_blank(value: Option<&str>) -> bool {
  value.is_none_or(|v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::result::Severity;
  use flowforge_graph::{
    ApprovalPatch, AutomatedPatch, NewEdge, NodePatch, Position, TaskPatch,
  };

  fn add(graph: &mut Graph, kind: NodeKind) -> String {
    graph.add_node(kind, Position::default())
  }

  fn connect(graph: &mut Graph, from: &str, to: &str) {
    graph.add_edge(NewEdge::between(from, to)).unwrap();
  }

  fn titled_task(graph: &mut Graph, title: &str) -> String {
    let id = add(graph, NodeKind::Task);
    let patch = NodePatch::Task(TaskPatch {
      title: Some(title.to_string()),
      ..Default::default()
    });
    graph.update_node_data(&id, &patch).unwrap();
    id
  }

  #[test]
  fn test_clean_chain_has_no_results() {
    let mut graph = Graph::new();
    let s = add(&mut graph, NodeKind::Start);
    let t = titled_task(&mut graph, "Collect documents");
    let e = add(&mut graph, NodeKind::End);
    connect(&mut graph, &s, &t);
    connect(&mut graph, &t, &e);

    assert!(validate_nodes(&graph).is_empty());
  }

  #[test]
  fn test_multiple_starts_win_over_other_start_rules() {
    let mut graph = Graph::new();
    let a = add(&mut graph, NodeKind::Start);
    let b = add(&mut graph, NodeKind::Start);
    connect(&mut graph, &b, &a);

    let results = validate_nodes(&graph);
    for id in [&a, &b] {
      assert_eq!(
        results[id].message,
        "Multiple start nodes detected. Only one start node is allowed."
      );
    }
  }

  #[test]
  fn test_start_rules_in_order() {
    let mut graph = Graph::new();
    let s = add(&mut graph, NodeKind::Start);
    let results = validate_nodes(&graph);
    assert_eq!(
      results[&s].message,
      "Start node must have at least one outgoing connection."
    );

    let t = titled_task(&mut graph, "Work");
    connect(&mut graph, &t, &s);
    let results = validate_nodes(&graph);
    assert_eq!(
      results[&s].message,
      "Start node should not have incoming connections."
    );
  }

  #[test]
  fn test_multiple_ends_are_warnings() {
    let mut graph = Graph::new();
    let s = add(&mut graph, NodeKind::Start);
    let e1 = add(&mut graph, NodeKind::End);
    let e2 = add(&mut graph, NodeKind::End);
    connect(&mut graph, &s, &e1);
    connect(&mut graph, &s, &e2);

    let results = validate_nodes(&graph);
    assert_eq!(results[&e1].severity, Severity::Warning);
    assert_eq!(results[&e2].severity, Severity::Warning);
  }

  #[test]
  fn test_end_with_outgoing_is_error() {
    let mut graph = Graph::new();
    let s = add(&mut graph, NodeKind::Start);
    let e = add(&mut graph, NodeKind::End);
    let t = titled_task(&mut graph, "After end");
    connect(&mut graph, &s, &e);
    connect(&mut graph, &e, &t);

    let results = validate_nodes(&graph);
    assert_eq!(
      results[&e].message,
      "End node should not have outgoing connections."
    );
  }

  #[test]
  fn test_end_without_incoming_is_error() {
    let mut graph = Graph::new();
    let s = add(&mut graph, NodeKind::Start);
    let t = titled_task(&mut graph, "Review");
    let e = add(&mut graph, NodeKind::End);
    connect(&mut graph, &s, &t);

    let results = validate_nodes(&graph);
    assert_eq!(results[&e].severity, Severity::Error);
    assert_eq!(
      results[&e].message,
      "End node must have at least one incoming connection."
    );
  }

  #[test]
  fn test_task_placeholder_title_is_warning_when_connected() {
    let mut graph = Graph::new();
    let s = add(&mut graph, NodeKind::Start);
    let t = add(&mut graph, NodeKind::Task);
    let e = add(&mut graph, NodeKind::End);
    connect(&mut graph, &s, &t);
    connect(&mut graph, &t, &e);

    let results = validate_nodes(&graph);
    assert_eq!(
      results[&t],
      ValidationResult::warning("Task requires a meaningful title.")
    );
  }

  #[test]
  fn test_disconnected_node_is_always_error() {
    let mut graph = Graph::new();
    // Placeholder title would be a warning, but disconnection takes over.
    let t = add(&mut graph, NodeKind::Task);
    let a = add(&mut graph, NodeKind::Approval);
    graph
      .update_node_data(
        &a,
        &NodePatch::Approval(ApprovalPatch {
          approver_role: Some(" ".into()),
          ..Default::default()
        }),
      )
      .unwrap();

    let results = validate_nodes(&graph);
    assert_eq!(
      results[&t],
      ValidationResult::error("Node is disconnected from the workflow.")
    );
    assert_eq!(
      results[&a],
      ValidationResult::error("Node is disconnected from the workflow.")
    );
  }

  #[test]
  fn test_task_specific_disconnected_message_is_kept() {
    let mut graph = Graph::new();
    let t = titled_task(&mut graph, "Orphan");

    let results = validate_nodes(&graph);
    assert_eq!(
      results[&t].message,
      "Task node is disconnected. Connect it to the workflow."
    );
  }

  #[test]
  fn test_task_missing_one_side_is_warning() {
    let mut graph = Graph::new();
    let s = add(&mut graph, NodeKind::Start);
    let t = titled_task(&mut graph, "Dead end");
    connect(&mut graph, &s, &t);

    let results = validate_nodes(&graph);
    assert_eq!(
      results[&t],
      ValidationResult::warning("Task node has no outgoing connection.")
    );
  }

  #[test]
  fn test_approval_rules() {
    let mut graph = Graph::new();
    let a = add(&mut graph, NodeKind::Approval);
    let e = add(&mut graph, NodeKind::End);
    connect(&mut graph, &a, &e);

    let results = validate_nodes(&graph);
    assert_eq!(
      results[&a],
      ValidationResult::error("Approval node has no incoming connection.")
    );

    let s = add(&mut graph, NodeKind::Start);
    let lone = add(&mut graph, NodeKind::Approval);
    connect(&mut graph, &s, &lone);
    let results = validate_nodes(&graph);
    assert_eq!(
      results[&lone],
      ValidationResult::warning("Approval node has no outgoing connection.")
    );
  }

  #[test]
  fn test_automated_rules() {
    let mut graph = Graph::new();
    let s = add(&mut graph, NodeKind::Start);
    let auto = add(&mut graph, NodeKind::Automated);
    connect(&mut graph, &s, &auto);

    let results = validate_nodes(&graph);
    assert_eq!(
      results[&auto],
      ValidationResult::warning("Automated node requires an action to be selected.")
    );

    graph
      .update_node_data(
        &auto,
        &NodePatch::Automated(AutomatedPatch {
          action_id: Some("send_email".into()),
          ..Default::default()
        }),
      )
      .unwrap();
    let results = validate_nodes(&graph);
    assert_eq!(
      results[&auto],
      ValidationResult::error("Automated node must be connected to the workflow.")
    );
  }
}
