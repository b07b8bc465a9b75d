use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use crate::document::WorkflowDocument;
use crate::error::SerializationError;
use crate::import::import;

/// Write a document into `dir` under its dated file name. Returns the path written.
pub async fn write_document(
  dir: &Path,
  prefix: &str,
  document: &WorkflowDocument,
) -> Result<PathBuf, SerializationError> {
  let path = dir.join(document.file_name(prefix));
  write_document_to(&path, document).await?;
  Ok(path)
}

pub async fn write_document_to(
  path: &Path,
  document: &WorkflowDocument,
) -> Result<(), SerializationError> {
  let json = document.to_json()?;
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent).await?;
  }
  fs::write(path, json).await?;
  info!(path = %path.display(), nodes = document.nodes.len(), "wrote workflow document");
  Ok(())
}

/// Read and validate a document from disk.
pub async fn read_document(path: &Path) -> Result<WorkflowDocument, SerializationError> {
  let raw = fs::read_to_string(path).await?;
  import(&raw)
}
