//! Flowforge Simulation
//!
//! Dispatches workflows to a remote execution service and turns the reported
//! steps into a display log.
//!
//! - [`Simulator`] runs pre-flight checks, then the remote call; only one run
//!   may be in flight at a time
//! - [`AutomationCatalog`] caches the list of automated actions, sharing one
//!   in-flight request among concurrent callers
//! - [`HttpService`] implements both collaborators over HTTP
//!
//! Collaborator failures never escape a run: they become a single failed
//! [`LogEntry`].

mod catalog;
mod error;
mod log;
mod service;
mod simulator;
mod wire;

pub use catalog::{AutomationCatalog, CatalogStatus};
pub use error::{Endpoint, ServiceError};
pub use log::{ERROR_NODE_ID, LogEntry};
pub use service::{AutomationService, ExecutionService, HttpService, HttpServiceConfig};
pub use simulator::{SimulationOutcome, Simulator};
pub use wire::{
  AutomationAction, PayloadNode, SimulationPayload, SimulationStep, StepStatus, parse_automations,
  parse_simulation_response,
};
