use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::service::AutomationService;
use crate::wire::AutomationAction;

type FetchResult = Result<Arc<Vec<AutomationAction>>, ServiceError>;
type Fetch = Shared<BoxFuture<'static, FetchResult>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogStatus {
  Idle,
  Loading,
  Ready,
  Errored,
}

enum State {
  Idle,
  Loading(Fetch),
  Ready(Arc<Vec<AutomationAction>>),
  Errored(ServiceError),
}

/// Cached view of the automation catalog.
///
/// The first caller starts the fetch; callers arriving while it is in flight
/// await the same request. Both success and failure are cached until
/// [`AutomationCatalog::reset`].
pub struct AutomationCatalog {
  service: Arc<dyn AutomationService>,
  state: Mutex<State>,
}

impl AutomationCatalog {
  pub fn new(service: Arc<dyn AutomationService>) -> Self {
    Self {
      service,
      state: Mutex::new(State::Idle),
    }
  }

  pub async fn status(&self) -> CatalogStatus {
    match &*self.state.lock().await {
      State::Idle => CatalogStatus::Idle,
      State::Loading(_) => CatalogStatus::Loading,
      State::Ready(_) => CatalogStatus::Ready,
      State::Errored(_) => CatalogStatus::Errored,
    }
  }

  pub async fn actions(&self) -> FetchResult {
    let fetch = {
      let mut state = self.state.lock().await;
      match &*state {
        State::Ready(actions) => return Ok(actions.clone()),
        State::Errored(err) => return Err(err.clone()),
        State::Loading(fetch) => fetch.clone(),
        State::Idle => {
          debug!("loading automation catalog");
          let service = self.service.clone();
          let fetch = async move { service.list_automations().await.map(Arc::new) }
            .boxed()
            .shared();
          *state = State::Loading(fetch.clone());
          fetch
        }
      }
    };

    let result = fetch.clone().await;

    // Only the caller that settles this fetch records and reports it.
    let mut state = self.state.lock().await;
    if let State::Loading(current) = &*state
      && current.ptr_eq(&fetch)
    {
      *state = match &result {
        Ok(actions) => {
          info!(count = actions.len(), "automation catalog loaded");
          State::Ready(actions.clone())
        }
        Err(err) => {
          warn!(error = %err, "failed to load automation catalog");
          State::Errored(err.clone())
        }
      };
    }
    result
  }

  /// Look up a single action by id.
  pub async fn find(&self, id: &str) -> Result<Option<AutomationAction>, ServiceError> {
    let actions = self.actions().await?;
    Ok(actions.iter().find(|a| a.id == id).cloned())
  }

  /// Forget any cached result so the next call fetches again.
  pub async fn reset(&self) {
    *self.state.lock().await = State::Idle;
  }
}
