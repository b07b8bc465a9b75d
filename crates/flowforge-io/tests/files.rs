use chrono::{TimeZone, Utc};
use flowforge_graph::{Graph, NewEdge, NodeKind, Position};
use flowforge_io::{SerializationError, WorkflowDocument, read_document, write_document};
use tempfile::TempDir;

#[tokio::test]
async fn test_write_then_read_document() {
  let dir = TempDir::new().unwrap();

  let mut graph = Graph::new();
  let start = graph.add_node(NodeKind::Start, Position::new(0.0, 0.0));
  let end = graph.add_node(NodeKind::End, Position::new(0.0, 200.0));
  graph.add_edge(NewEdge::between(&start, &end)).unwrap();

  let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
  let doc = WorkflowDocument::export(&graph, now);
  let path = write_document(dir.path(), "workflow", &doc).await.unwrap();

  assert_eq!(path.file_name().unwrap(), "workflow-2024-03-01.json");

  let read = read_document(&path).await.unwrap();
  assert_eq!(read, doc);
  assert_eq!(read.into_graph().unwrap(), graph);
}

#[tokio::test]
async fn test_read_rejects_invalid_file() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("broken.json");
  tokio::fs::write(&path, r#"{ "nodes": [] }"#).await.unwrap();

  let err = read_document(&path).await.unwrap_err();
  assert!(matches!(err, SerializationError::MissingArray { field: "edges" }));
}

#[tokio::test]
async fn test_read_missing_file_is_io_error() {
  let dir = TempDir::new().unwrap();
  let err = read_document(&dir.path().join("nope.json")).await.unwrap_err();
  assert!(matches!(err, SerializationError::Io(_)));
}
