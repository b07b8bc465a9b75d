use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Endpoint, ServiceError};
use crate::wire::{
  AutomationAction, SimulationPayload, SimulationStep, parse_automations,
  parse_simulation_response,
};

/// Remote service that runs a workflow and reports its steps.
#[async_trait]
pub trait ExecutionService: Send + Sync {
  async fn simulate(&self, payload: &SimulationPayload) -> Result<Vec<SimulationStep>, ServiceError>;
}

/// Remote directory of automated actions.
#[async_trait]
pub trait AutomationService: Send + Sync {
  async fn list_automations(&self) -> Result<Vec<AutomationAction>, ServiceError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpServiceConfig {
  pub base_url: String,
  #[serde(with = "duration_secs")]
  pub timeout: Duration,
}

impl Default for HttpServiceConfig {
  fn default() -> Self {
    Self {
      base_url: "http://localhost:5173".to_string(),
      timeout: Duration::from_secs(30),
    }
  }
}

mod duration_secs {
  use std::time::Duration;

  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_secs())
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_secs)
  }
}

/// HTTP implementation of both collaborators:
/// `POST {base}/simulate` and `GET {base}/automations`.
#[derive(Debug, Clone)]
pub struct HttpService {
  client: Client,
  base_url: Url,
}

impl HttpService {
  pub fn new(config: &HttpServiceConfig) -> Result<Self, ServiceError> {
    let mut base_url =
      Url::parse(&config.base_url).map_err(|e| ServiceError::InvalidUrl(e.to_string()))?;
    if base_url.cannot_be_a_base() {
      return Err(ServiceError::InvalidUrl(config.base_url.clone()));
    }
    // Url::join replaces the last segment unless the path ends with '/'.
    if !base_url.path().ends_with('/') {
      let path = format!("{}/", base_url.path());
      base_url.set_path(&path);
    }

    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| ServiceError::Client(e.to_string()))?;

    Ok(Self { client, base_url })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, ServiceError> {
    let path = match endpoint {
      Endpoint::Simulate => "simulate",
      Endpoint::Automations => "automations",
    };
    self
      .base_url
      .join(path)
      .map_err(|e| ServiceError::InvalidUrl(e.to_string()))
  }

  async fn read_body(
    endpoint: Endpoint,
    response: reqwest::Response,
  ) -> Result<String, ServiceError> {
    let status = response.status();
    if !status.is_success() {
      return Err(ServiceError::Status {
        endpoint,
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_string(),
      });
    }
    response
      .text()
      .await
      .map_err(|e| ServiceError::transport(endpoint, e))
  }
}

#[async_trait]
impl ExecutionService for HttpService {
  async fn simulate(&self, payload: &SimulationPayload) -> Result<Vec<SimulationStep>, ServiceError> {
    let endpoint = Endpoint::Simulate;
    let url = self.endpoint_url(endpoint)?;
    debug!(url = %url, nodes = payload.nodes.len(), "posting simulation request");

    let response = self
      .client
      .post(url)
      .json(payload)
      .send()
      .await
      .map_err(|e| ServiceError::transport(endpoint, e))?;

    let body = Self::read_body(endpoint, response).await?;
    parse_simulation_response(&body)
  }
}

#[async_trait]
impl AutomationService for HttpService {
  async fn list_automations(&self) -> Result<Vec<AutomationAction>, ServiceError> {
    let endpoint = Endpoint::Automations;
    let url = self.endpoint_url(endpoint)?;
    debug!(url = %url, "fetching automation catalog");

    let response = self
      .client
      .get(url)
      .send()
      .await
      .map_err(|e| ServiceError::transport(endpoint, e))?;

    let body = Self::read_body(endpoint, response).await?;
    parse_automations(&body)
  }
}
