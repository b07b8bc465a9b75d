//! Flowforge Validation
//!
//! Rule evaluation over a workflow graph:
//! - [`validate_nodes`] produces at most one [`ValidationResult`] per node
//! - [`workflow_errors`] reports start/end problems for the graph as a whole
//! - [`preflight`] is the go/no-go check used before simulation (adds cycle detection)
//!
//! Validation never fails; findings are data for the caller to display.

mod result;
mod rules;
mod workflow;

pub use result::{Severity, ValidationResult};
pub use rules::validate_nodes;
pub use workflow::{
  ValidationReport, WorkflowIssue, is_workflow_valid, preflight, validate, workflow_errors,
};
