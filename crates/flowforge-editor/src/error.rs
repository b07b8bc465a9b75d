use flowforge_graph::GraphError;
use flowforge_io::SerializationError;
use flowforge_template::TemplateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error("import failed: {0}")]
  Serialization(#[from] SerializationError),

  #[error(transparent)]
  Template(#[from] TemplateError),

  #[error("unknown template: {0}")]
  UnknownTemplate(String),
}
