use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::GraphError;

/// Discriminant of a workflow node. Serialized as the node's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
  Start,
  Task,
  Approval,
  Automated,
  End,
}

impl NodeKind {
  pub const ALL: [NodeKind; 5] = [
    NodeKind::Start,
    NodeKind::Task,
    NodeKind::Approval,
    NodeKind::Automated,
    NodeKind::End,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      NodeKind::Start => "start",
      NodeKind::Task => "task",
      NodeKind::Approval => "approval",
      NodeKind::Automated => "automated",
      NodeKind::End => "end",
    }
  }

  /// Start and end nodes are the terminals of a workflow.
  pub fn is_terminal(&self) -> bool {
    matches!(self, NodeKind::Start | NodeKind::End)
  }
}

impl fmt::Display for NodeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for NodeKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    NodeKind::ALL
      .into_iter()
      .find(|kind| kind.as_str() == s)
      .ok_or_else(|| format!("unknown node kind: {}", s))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
  pub x: f64,
  pub y: f64,
}

impl Position {
  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  pub fn offset(&self, dx: f64, dy: f64) -> Self {
    Self {
      x: self.x + dx,
      y: self.y + dy,
    }
  }
}

/// A free-form key/value pair attached to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
  pub key: String,
  pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartData {
  #[serde(default)]
  pub title: String,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskData {
  #[serde(default)]
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub assignee: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub due_date: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub custom_fields: Vec<CustomField>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalData {
  #[serde(default)]
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub approver_role: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub auto_approve_threshold: Option<f64>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomatedData {
  #[serde(default)]
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub action_id: Option<String>,
  #[serde(default)]
  pub action_params: BTreeMap<String, String>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndData {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_message: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub summary: Option<bool>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub metadata: BTreeMap<String, String>,
}

/// Kind-specific node payload.
///
/// The variant is the node's kind; there is no separate tag to keep in sync.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
  Start(StartData),
  Task(TaskData),
  Approval(ApprovalData),
  Automated(AutomatedData),
  End(EndData),
}

impl NodeData {
  /// Seed data for a freshly added node of the given kind.
  pub fn defaults(kind: NodeKind) -> Self {
    match kind {
      NodeKind::Start => NodeData::Start(StartData {
        title: "Start".to_string(),
        ..Default::default()
      }),
      NodeKind::Task => NodeData::Task(TaskData {
        title: TaskData::PLACEHOLDER_TITLE.to_string(),
        description: Some(String::new()),
        assignee: Some(String::new()),
        ..Default::default()
      }),
      NodeKind::Approval => NodeData::Approval(ApprovalData {
        title: "Approval".to_string(),
        approver_role: Some("Manager".to_string()),
        auto_approve_threshold: Some(0.0),
        ..Default::default()
      }),
      NodeKind::Automated => NodeData::Automated(AutomatedData {
        title: "Automated Step".to_string(),
        action_id: Some(String::new()),
        ..Default::default()
      }),
      NodeKind::End => NodeData::End(EndData {
        title: Some("End".to_string()),
        end_message: Some(String::new()),
        ..Default::default()
      }),
    }
  }

  pub fn kind(&self) -> NodeKind {
    match self {
      NodeData::Start(_) => NodeKind::Start,
      NodeData::Task(_) => NodeKind::Task,
      NodeData::Approval(_) => NodeKind::Approval,
      NodeData::Automated(_) => NodeKind::Automated,
      NodeData::End(_) => NodeKind::End,
    }
  }

  pub fn title(&self) -> Option<&str> {
    match self {
      NodeData::Start(d) => Some(&d.title),
      NodeData::Task(d) => Some(&d.title),
      NodeData::Approval(d) => Some(&d.title),
      NodeData::Automated(d) => Some(&d.title),
      NodeData::End(d) => d.title.as_deref(),
    }
  }

  /// Merge a typed patch into this record, returning the new record.
  ///
  /// Returns `None` when the patch targets a different kind.
  pub fn merged(&self, patch: &NodePatch) -> Option<NodeData> {
    let data = match (self, patch) {
      (NodeData::Start(d), NodePatch::Start(p)) => NodeData::Start(d.merged(p)),
      (NodeData::Task(d), NodePatch::Task(p)) => NodeData::Task(d.merged(p)),
      (NodeData::Approval(d), NodePatch::Approval(p)) => NodeData::Approval(d.merged(p)),
      (NodeData::Automated(d), NodePatch::Automated(p)) => NodeData::Automated(d.merged(p)),
      (NodeData::End(d), NodePatch::End(p)) => NodeData::End(d.merged(p)),
      _ => return None,
    };
    Some(data)
  }

  /// Decode a raw JSON payload for the given kind. `null` is treated as `{}`.
  pub fn from_value(kind: NodeKind, value: serde_json::Value) -> Result<Self, serde_json::Error> {
    let value = match value {
      serde_json::Value::Null => serde_json::Value::Object(Default::default()),
      other => other,
    };
    let data = match kind {
      NodeKind::Start => NodeData::Start(serde_json::from_value(value)?),
      NodeKind::Task => NodeData::Task(serde_json::from_value(value)?),
      NodeKind::Approval => NodeData::Approval(serde_json::from_value(value)?),
      NodeKind::Automated => NodeData::Automated(serde_json::from_value(value)?),
      NodeKind::End => NodeData::End(serde_json::from_value(value)?),
    };
    Ok(data)
  }
}

impl Serialize for NodeData {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      NodeData::Start(d) => d.serialize(serializer),
      NodeData::Task(d) => d.serialize(serializer),
      NodeData::Approval(d) => d.serialize(serializer),
      NodeData::Automated(d) => d.serialize(serializer),
      NodeData::End(d) => d.serialize(serializer),
    }
  }
}

impl TaskData {
  /// Title given to new tasks; validation treats it as unset.
  pub const PLACEHOLDER_TITLE: &'static str = "New Task";
}

// Per-kind partial updates. `Some` replaces the field, `None` keeps it.

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPatch {
  pub title: Option<String>,
  pub metadata: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
  pub title: Option<String>,
  pub description: Option<String>,
  pub assignee: Option<String>,
  pub due_date: Option<String>,
  pub custom_fields: Option<Vec<CustomField>>,
  pub metadata: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalPatch {
  pub title: Option<String>,
  pub approver_role: Option<String>,
  pub auto_approve_threshold: Option<f64>,
  pub metadata: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomatedPatch {
  pub title: Option<String>,
  pub action_id: Option<String>,
  pub action_params: Option<BTreeMap<String, String>>,
  pub metadata: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndPatch {
  pub title: Option<String>,
  pub end_message: Option<String>,
  pub summary: Option<bool>,
  pub metadata: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodePatch {
  Start(StartPatch),
  Task(TaskPatch),
  Approval(ApprovalPatch),
  Automated(AutomatedPatch),
  End(EndPatch),
}

impl NodePatch {
  pub fn kind(&self) -> NodeKind {
    match self {
      NodePatch::Start(_) => NodeKind::Start,
      NodePatch::Task(_) => NodeKind::Task,
      NodePatch::Approval(_) => NodeKind::Approval,
      NodePatch::Automated(_) => NodeKind::Automated,
      NodePatch::End(_) => NodeKind::End,
    }
  }
}

fn pick<T: Clone>(patch: &Option<T>, current: &T) -> T {
  patch.clone().unwrap_or_else(|| current.clone())
}

fn pick_opt<T: Clone>(patch: &Option<T>, current: &Option<T>) -> Option<T> {
  patch.clone().or_else(|| current.clone())
}

impl StartData {
  pub fn merged(&self, patch: &StartPatch) -> Self {
    Self {
      title: pick(&patch.title, &self.title),

      metadata: pick(&patch.metadata, &self.metadata),
    }
  }
}

impl TaskData {
  pub fn merged(&self, patch: &TaskPatch) -> Self {
    Self {
      title: pick(&patch.title, &self.title),
      description: pick_opt(&patch.description, &self.description),
      assignee: pick_opt(&patch.assignee, &self.assignee),
      due_date: pick_opt(&patch.due_date, &self.due_date),
      custom_fields: pick(&patch.custom_fields, &self.custom_fields),

      metadata: pick(&patch.metadata, &self.metadata),
    }
  }
}

impl ApprovalData {
  pub fn merged(&self, patch: &ApprovalPatch) -> Self {
    Self {
      title: pick(&patch.title, &self.title),
      approver_role: pick_opt(&patch.approver_role, &self.approver_role),
      auto_approve_threshold: pick_opt(&patch.auto_approve_threshold, &self.auto_approve_threshold),

      metadata: pick(&patch.metadata, &self.metadata),
    }
  }
}

impl AutomatedData {
  pub fn merged(&self, patch: &AutomatedPatch) -> Self {
    Self {
      title: pick(&patch.title, &self.title),
      action_id: pick_opt(&patch.action_id, &self.action_id),
      action_params: pick(&patch.action_params, &self.action_params),

      metadata: pick(&patch.metadata, &self.metadata),
    }
  }
}

impl EndData {
  pub fn merged(&self, patch: &EndPatch) -> Self {
    Self {
      title: pick_opt(&patch.title, &self.title),
      end_message: pick_opt(&patch.end_message, &self.end_message),
      summary: pick_opt(&patch.summary, &self.summary),

      metadata: pick(&patch.metadata, &self.metadata),
    }
  }
}

/// A workflow node.
///
/// On the wire a node is `{ "id", "type", "position", "data" }`; `type` is
/// derived from the data variant when serializing and selects the data shape
/// when deserializing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawNode")]
pub struct Node {
  pub id: String,
  pub position: Position,
  pub data: NodeData,
}

impl Node {
  pub fn new(id: impl Into<String>, position: Position, data: NodeData) -> Self {
    Self {
      id: id.into(),
      position,
      data,
    }
  }

  pub fn kind(&self) -> NodeKind {
    self.data.kind()
  }
}

impl Serialize for Node {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("Node", 4)?;
    state.serialize_field("id", &self.id)?;
    state.serialize_field("type", &self.kind())?;
    state.serialize_field("position", &self.position)?;
    state.serialize_field("data", &self.data)?;
    state.end()
  }
}

// `type` wins; `kind` is only read when `type` is absent.
#[derive(Deserialize)]
struct RawNode {
  id: String,
  #[serde(rename = "type", default)]
  kind: Option<NodeKind>,
  #[serde(rename = "kind", default)]
  legacy_kind: Option<serde_json::Value>,
  position: Position,
  #[serde(default)]
  data: serde_json::Value,
}

impl RawNode {
  fn resolve_kind(&self) -> Result<NodeKind, GraphError> {
    if let Some(kind) = self.kind {
      return Ok(kind);
    }
    let invalid = |message: String| GraphError::InvalidKind {
      node_id: self.id.clone(),
      message,
    };
    match &self.legacy_kind {
      Some(value) => NodeKind::deserialize(value).map_err(|e| invalid(e.to_string())),
      None => Err(invalid("missing field `type`".to_string())),
    }
  }
}

impl TryFrom<RawNode> for Node {
  type Error = GraphError;

  fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
    let kind = raw.resolve_kind()?;
    let data = NodeData::from_value(kind, raw.data).map_err(|e| GraphError::InvalidData {
      node_id: raw.id.clone(),
      kind,
      message: e.to_string(),
    })?;

    Ok(Node {
      id: raw.id,
      position: raw.position,
      data,
    })
  }
}
