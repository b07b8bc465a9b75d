use std::fmt;

use thiserror::Error;

/// The remote endpoint a [`ServiceError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
  Simulate,
  Automations,
}

impl fmt::Display for Endpoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Endpoint::Simulate => f.write_str("simulation"),
      Endpoint::Automations => f.write_str("automations"),
    }
  }
}

/// Failure talking to a remote collaborator.
///
/// Cloneable so a cached failure can be handed to every waiting caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
  #[error("invalid service url: {0}")]
  InvalidUrl(String),

  #[error("failed to build http client: {0}")]
  Client(String),

  #[error("{endpoint} request failed: {message}")]
  Transport { endpoint: Endpoint, message: String },

  #[error("{endpoint} request failed: {status} {reason}")]
  Status {
    endpoint: Endpoint,
    status: u16,
    reason: String,
  },

  #[error("invalid {endpoint} response: {message}")]
  InvalidResponse { endpoint: Endpoint, message: String },
}

impl ServiceError {
  pub(crate) fn transport(endpoint: Endpoint, err: reqwest::Error) -> Self {
    ServiceError::Transport {
      endpoint,
      message: err.to_string(),
    }
  }

  pub(crate) fn invalid(endpoint: Endpoint, message: impl Into<String>) -> Self {
    ServiceError::InvalidResponse {
      endpoint,
      message: message.into(),
    }
  }
}
