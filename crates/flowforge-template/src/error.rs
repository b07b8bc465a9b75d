use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
  #[error("template {template}: edge {edge} references node index {index}, but only {nodes} nodes exist")]
  EdgeIndexOutOfRange {
    template: String,
    edge: usize,
    index: usize,
    nodes: usize,
  },
}
