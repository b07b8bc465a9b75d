use chrono::{DateTime, Utc};
use flowforge_graph::{Edge, Node};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::document::{FORMAT_VERSION, WorkflowDocument};
use crate::error::SerializationError;

/// Parse and structurally validate a workflow document.
///
/// Checks run in order and stop at the first failure: the root must be an
/// object, `nodes` and `edges` must be arrays, every node needs a non-empty
/// string `id`, a `type` (or `kind`) and a `position` object, and every edge
/// needs non-empty string `id`, `source` and `target`. Node payloads are then
/// decoded per kind. Referential integrity is checked by
/// [`WorkflowDocument::into_graph`].
pub fn import(raw: &str) -> Result<WorkflowDocument, SerializationError> {
  let value: Value = serde_json::from_str(raw).map_err(SerializationError::InvalidJson)?;
  import_value(&value)
}

/// Same as [`import`] for an already parsed JSON value.
pub fn import_value(value: &Value) -> Result<WorkflowDocument, SerializationError> {
  let root = value.as_object().ok_or(SerializationError::NotAnObject)?;
  let raw_nodes = array_field(root, "nodes")?;
  let raw_edges = array_field(root, "edges")?;

  for (index, node) in raw_nodes.iter().enumerate() {
    check_node(index, node)?;
  }
  for (index, edge) in raw_edges.iter().enumerate() {
    check_edge(index, edge)?;
  }

  let nodes = raw_nodes
    .iter()
    .map(decode_node)
    .collect::<Result<Vec<_>, _>>()?;
  let edges = raw_edges
    .iter()
    .map(decode_edge)
    .collect::<Result<Vec<_>, _>>()?;

  let version = root
    .get("version")
    .and_then(Value::as_str)
    .map(str::to_string);
  if let Some(version) = &version
    && version != FORMAT_VERSION
  {
    warn!(version = %version, expected = FORMAT_VERSION, "importing document with unknown version");
  }

  let exported_at = match root.get("exportedAt") {
    None | Some(Value::Null) => None,
    Some(value) => Some(parse_timestamp(value)?),
  };

  debug!(nodes = nodes.len(), edges = edges.len(), "imported workflow document");
  Ok(WorkflowDocument {
    nodes,
    edges,
    version,
    exported_at,
  })
}

fn array_field<'a>(
  root: &'a Map<String, Value>,
  field: &'static str,
) -> Result<&'a Vec<Value>, SerializationError> {
  root
    .get(field)
    .and_then(Value::as_array)
    .ok_or(SerializationError::MissingArray { field })
}

fn non_empty_str<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
  value
    .get(field)
    .and_then(Value::as_str)
    .filter(|s| !s.is_empty())
}

fn check_node(index: usize, node: &Value) -> Result<(), SerializationError> {
  let id = non_empty_str(node, "id").ok_or(SerializationError::NodeMissingId { index })?;
  if non_empty_str(node, "type")
    .or_else(|| non_empty_str(node, "kind"))
    .is_none()
  {
    return Err(SerializationError::NodeMissingField {
      id: id.to_string(),
      field: "type",
    });
  }
  if !node.get("position").is_some_and(Value::is_object) {
    return Err(SerializationError::NodeMissingField {
      id: id.to_string(),
      field: "position",
    });
  }
  Ok(())
}

fn check_edge(index: usize, edge: &Value) -> Result<(), SerializationError> {
  let id = non_empty_str(edge, "id").ok_or(SerializationError::EdgeMissingId { index })?;
  for field in ["source", "target"] {
    if non_empty_str(edge, field).is_none() {
      return Err(SerializationError::EdgeMissingField {
        id: id.to_string(),
        field,
      });
    }
  }
  Ok(())
}

fn decode_node(value: &Value) -> Result<Node, SerializationError> {
  serde_json::from_value(value.clone()).map_err(|e| SerializationError::InvalidNode {
    id: non_empty_str(value, "id").unwrap_or_default().to_string(),
    message: e.to_string(),
  })
}

fn decode_edge(value: &Value) -> Result<Edge, SerializationError> {
  serde_json::from_value(value.clone()).map_err(|e| SerializationError::InvalidEdge {
    id: non_empty_str(value, "id").unwrap_or_default().to_string(),
    message: e.to_string(),
  })
}

fn parse_timestamp(value: &Value) -> Result<DateTime<Utc>, SerializationError> {
  let invalid = |message: String| SerializationError::InvalidField {
    field: "exportedAt",
    message,
  };
  let raw = value
    .as_str()
    .ok_or_else(|| invalid(format!("expected a string, got {}", value)))?;
  DateTime::parse_from_rfc3339(raw)
    .map(|t| t.with_timezone(&Utc))
    .map_err(|e| invalid(e.to_string()))
}
