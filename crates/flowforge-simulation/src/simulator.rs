use std::sync::atomic::{AtomicBool, Ordering};

use flowforge_graph::Graph;
use flowforge_validation::{WorkflowIssue, preflight};
use tracing::{info, instrument, warn};

use crate::log::LogEntry;
use crate::service::ExecutionService;
use crate::wire::SimulationPayload;

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationOutcome {
  /// Pre-flight failed; the execution service was not contacted.
  Rejected(Vec<WorkflowIssue>),
  /// Another run is still in flight.
  AlreadyRunning,
  /// The run finished. A service failure shows up as a single failed entry.
  Completed(Vec<LogEntry>),
}

impl SimulationOutcome {
  pub fn log(&self) -> &[LogEntry] {
    match self {
      SimulationOutcome::Completed(log) => log,
      _ => &[],
    }
  }

  /// Whether the run completed and every entry succeeded.
  pub fn succeeded(&self) -> bool {
    matches!(self, SimulationOutcome::Completed(log) if log.iter().all(|e| e.status.is_success()))
  }
}

/// Runs workflows against an [`ExecutionService`], one at a time.
pub struct Simulator<E> {
  service: E,
  running: AtomicBool,
}

/// Clears the running flag when dropped.
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
  fn acquire(flag: &'a AtomicBool) -> Option<Self> {
    flag
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .ok()
      .map(|_| RunningGuard(flag))
  }
}

impl Drop for RunningGuard<'_> {
  fn drop(&mut self) {
    self.0.store(false, Ordering::Release);
  }
}

impl<E: ExecutionService> Simulator<E> {
  pub fn new(service: E) -> Self {
    Self {
      service,
      running: AtomicBool::new(false),
    }
  }

  pub fn service(&self) -> &E {
    &self.service
  }

  pub fn is_running(&self) -> bool {
    self.running.load(Ordering::Acquire)
  }

  /// Check the workflow, send it to the execution service, and format the
  /// returned steps. Never fails: every problem is reported in the outcome.
  #[instrument(skip(self, graph), fields(nodes = graph.nodes().len(), edges = graph.edges().len()))]
  pub async fn run(&self, graph: &Graph) -> SimulationOutcome {
    let Some(_guard) = RunningGuard::acquire(&self.running) else {
      warn!("simulation already running");
      return SimulationOutcome::AlreadyRunning;
    };

    let issues = preflight(graph);
    if !issues.is_empty() {
      warn!(issues = issues.len(), "workflow failed pre-flight checks");
      return SimulationOutcome::Rejected(issues);
    }

    let payload = SimulationPayload::from_graph(graph);
    match self.service.simulate(&payload).await {
      Ok(steps) => {
        info!(steps = steps.len(), "simulation completed");
        SimulationOutcome::Completed(
          steps
            .iter()
            .map(|step| LogEntry::from_step(step, graph))
            .collect(),
        )
      }
      Err(err) => {
        warn!(error = %err, "simulation failed");
        SimulationOutcome::Completed(vec![LogEntry::failure(err.to_string())])
      }
    }
  }
}
