use flowforge_graph::GraphError;
use thiserror::Error;

/// Errors raised while reading or writing workflow documents.
///
/// Any of these aborts an import as a whole; nothing is partially applied.
#[derive(Debug, Error)]
pub enum SerializationError {
  #[error("failed to parse JSON: {0}")]
  InvalidJson(#[source] serde_json::Error),

  #[error("invalid JSON structure: expected an object")]
  NotAnObject,

  #[error("missing or invalid \"{field}\" array")]
  MissingArray { field: &'static str },

  #[error("node at index {index} is missing a valid \"id\"")]
  NodeMissingId { index: usize },

  #[error("node \"{id}\" is missing a valid \"{field}\"")]
  NodeMissingField { id: String, field: &'static str },

  #[error("edge at index {index} is missing a valid \"id\"")]
  EdgeMissingId { index: usize },

  #[error("edge \"{id}\" is missing a valid \"{field}\"")]
  EdgeMissingField { id: String, field: &'static str },

  #[error("invalid node \"{id}\": {message}")]
  InvalidNode { id: String, message: String },

  #[error("invalid edge \"{id}\": {message}")]
  InvalidEdge { id: String, message: String },

  #[error("invalid \"{field}\": {message}")]
  InvalidField { field: &'static str, message: String },

  /// The document is well-formed but its graph breaks referential integrity.
  #[error("inconsistent graph: {0}")]
  Graph(#[from] GraphError),

  #[error("failed to encode document: {0}")]
  Encode(#[source] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
