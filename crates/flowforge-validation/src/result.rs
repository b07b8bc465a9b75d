use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  /// Blocks a workflow from being considered ready.
  Error,
  /// Advisory only.
  Warning,
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Severity::Error => f.write_str("error"),
      Severity::Warning => f.write_str("warning"),
    }
  }
}

/// Outcome of validating a single node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
  pub valid: bool,
  pub message: String,
  pub severity: Severity,
}

impl ValidationResult {
  pub fn error(message: impl Into<String>) -> Self {
    Self {
      valid: false,
      message: message.into(),
      severity: Severity::Error,
    }
  }

  pub fn warning(message: impl Into<String>) -> Self {
    Self {
      valid: false,
      message: message.into(),
      severity: Severity::Warning,
    }
  }

  pub fn is_error(&self) -> bool {
    self.severity == Severity::Error
  }
}
