use std::collections::BTreeMap;

use flowforge_graph::{ApprovalData, AutomatedData, EndData, NodeData, StartData, TaskData};

use crate::template::{TemplateEdge, TemplateNode, WorkflowTemplate};

/// The templates shipped with the editor, in display order.
pub fn builtin_templates() -> Vec<WorkflowTemplate> {
  vec![
    basic_approval(),
    task_approval_pair(),
    onboarding(),
    leave_request(),
  ]
}

pub fn find_template(id: &str) -> Option<WorkflowTemplate> {
  builtin_templates().into_iter().find(|t| t.id == id)
}

fn basic_approval() -> WorkflowTemplate {
  linear(
    "basic-approval",
    "Basic Approval Flow",
    "Start → Approval → End",
    vec![
      TemplateNode::new(250.0, 50.0, start("Start")),
      TemplateNode::new(220.0, 180.0, approval("Manager Approval", "Manager")),
      TemplateNode::new(250.0, 320.0, end("Complete", "Workflow completed")),
    ],
  )
}

fn task_approval_pair() -> WorkflowTemplate {
  linear(
    "task-approval-pair",
    "Task + Approval Pair",
    "Start → Task → Approval → End",
    vec![
      TemplateNode::new(250.0, 50.0, start("Start")),
      TemplateNode::new(
        200.0,
        160.0,
        task("Complete Form", "Fill out the required form", ""),
      ),
      TemplateNode::new(210.0, 320.0, approval("Review", "Supervisor")),
      TemplateNode::new(250.0, 470.0, end("Done", "Process complete")),
    ],
  )
}

fn onboarding() -> WorkflowTemplate {
  linear(
    "onboarding",
    "Employee Onboarding",
    "Complete HR onboarding flow",
    vec![
      TemplateNode::new(250.0, 30.0, start("New Hire")),
      TemplateNode::new(
        180.0,
        130.0,
        task("Submit Documents", "Upload ID and tax forms", "New Employee"),
      ),
      TemplateNode::new(
        190.0,
        280.0,
        automated("Create Accounts", "create-accounts", BTreeMap::new()),
      ),
      TemplateNode::new(200.0, 420.0, approval("HR Verification", "HR Manager")),
      TemplateNode::new(
        180.0,
        560.0,
        task("Equipment Setup", "Assign laptop and badge", "IT Support"),
      ),
      TemplateNode::new(250.0, 700.0, end("Onboarded", "Welcome to the team!")),
    ],
  )
}

fn leave_request() -> WorkflowTemplate {
  let params = BTreeMap::from([("template".to_string(), "leave-approved".to_string())]);
  linear(
    "leave-request",
    "Leave Request",
    "Request → Approval → Notification",
    vec![
      TemplateNode::new(250.0, 50.0, start("Leave Request")),
      TemplateNode::new(
        180.0,
        150.0,
        task("Submit Request", "Enter leave dates and reason", "Employee"),
      ),
      TemplateNode::new(200.0, 300.0, approval("Manager Approval", "Direct Manager")),
      TemplateNode::new(
        190.0,
        450.0,
        automated("Send Notification", "send-email", params),
      ),
      TemplateNode::new(250.0, 580.0, end("Approved", "Leave request approved")),
    ],
  )
}

/// A template whose nodes are connected in list order.
fn linear(id: &str, name: &str, description: &str, nodes: Vec<TemplateNode>) -> WorkflowTemplate {
  let edges = (1..nodes.len())
    .map(|i| TemplateEdge {
      source_index: i - 1,
      target_index: i,
    })
    .collect();

  WorkflowTemplate {
    id: id.to_string(),
    name: name.to_string(),
    description: description.to_string(),
    nodes,
    edges,
  }
}

fn start(title: &str) -> NodeData {
  NodeData::Start(StartData {
    title: title.to_string(),
    ..Default::default()
  })
}

fn task(title: &str, description: &str, assignee: &str) -> NodeData {
  NodeData::Task(TaskData {
    title: title.to_string(),
    description: Some(description.to_string()),
    assignee: Some(assignee.to_string()),
    due_date: Some(String::new()),
    ..Default::default()
  })
}

fn approval(title: &str, role: &str) -> NodeData {
  NodeData::Approval(ApprovalData {
    title: title.to_string(),
    approver_role: Some(role.to_string()),
    auto_approve_threshold: Some(0.0),
    ..Default::default()
  })
}

fn automated(title: &str, action_id: &str, params: BTreeMap<String, String>) -> NodeData {
  NodeData::Automated(AutomatedData {
    title: title.to_string(),
    action_id: Some(action_id.to_string()),
    action_params: params,
    ..Default::default()
  })
}

fn end(title: &str, message: &str) -> NodeData {
  NodeData::End(EndData {
    title: Some(title.to_string()),
    end_message: Some(message.to_string()),
    ..Default::default()
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use flowforge_graph::{Graph, NodeKind, find_cycle};

  #[test]
  fn test_builtin_ids_are_unique_and_findable() {
    let ids: Vec<String> = builtin_templates().into_iter().map(|t| t.id).collect();
    assert_eq!(
      ids,
      vec!["basic-approval", "task-approval-pair", "onboarding", "leave-request"]
    );
    assert!(find_template("onboarding").is_some());
    assert!(find_template("missing").is_none());
  }

  #[test]
  fn test_every_builtin_instantiates_into_a_valid_chain() {
    for template in builtin_templates() {
      let instance = template.instantiate().unwrap();
      assert_eq!(instance.edges.len(), template.nodes.len() - 1);

      let (nodes, edges) = instance.into_parts();
      let graph = Graph::from_parts(nodes, edges).unwrap();
      assert_eq!(graph.count_kind(NodeKind::Start), 1, "{}", template.id);
      assert_eq!(graph.count_kind(NodeKind::End), 1, "{}", template.id);
      assert!(find_cycle(&graph).is_none());
    }
  }

  #[test]
  fn test_leave_request_notification_params() {
    let template = find_template("leave-request").unwrap();
    let NodeData::Automated(data) = &template.nodes[3].data else {
      panic!("expected an automated node");
    };
    assert_eq!(data.action_id.as_deref(), Some("send-email"));
    assert_eq!(data.action_params["template"], "leave-approved");
  }

  #[test]
  fn test_template_serializes_with_index_edges() {
    let value = serde_json::to_value(find_template("basic-approval").unwrap()).unwrap();
    assert_eq!(value["edges"][0]["sourceIndex"], 0);
    assert_eq!(value["nodes"][1]["type"], "approval");
    assert_eq!(value["nodes"][1]["data"]["approverRole"], "Manager");
  }
}
