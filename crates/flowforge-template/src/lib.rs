//! Flowforge Template
//!
//! Reusable workflow fragments. A [`WorkflowTemplate`] stores nodes without ids
//! and edges as index pairs; [`WorkflowTemplate::instantiate`] turns it into
//! concrete nodes and edges with fresh ids, ready to be merged into a graph.

mod builtin;
mod error;
mod template;

pub use builtin::{builtin_templates, find_template};
pub use error::TemplateError;
pub use template::{Instance, TemplateEdge, TemplateNode, WorkflowTemplate};
