use flowforge_graph::{Graph, NewEdge, NodeKind, Position};
use flowforge_simulation::{
  AutomationService, ERROR_NODE_ID, Endpoint, ExecutionService, HttpService, HttpServiceConfig,
  ServiceError, SimulationOutcome, SimulationPayload, Simulator, StepStatus,
};
use mockito::{Matcher, Server};
use serde_json::json;

fn http_service(base_url: String) -> HttpService {
  HttpService::new(&HttpServiceConfig {
    base_url,
    ..Default::default()
  })
  .unwrap()
}

fn runnable() -> Graph {
  let mut graph = Graph::new();
  let start = graph.add_node(NodeKind::Start, Position::default());
  let end = graph.add_node(NodeKind::End, Position::default());
  graph.add_edge(NewEdge::between(&start, &end)).unwrap();
  graph
}

#[tokio::test]
async fn test_simulate_posts_payload_and_decodes_steps() {
  let mut server = Server::new_async().await;
  let graph = runnable();
  let start_id = graph.nodes()[0].id.clone();

  let mock = server
    .mock("POST", "/simulate")
    .match_header("content-type", "application/json")
    .match_body(Matcher::Regex(r#""type":"start""#.to_string()))
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(json!({ "steps": [{ "nodeId": start_id, "status": "success" }] }).to_string())
    .create_async()
    .await;

  let steps = http_service(server.url())
    .simulate(&SimulationPayload::from_graph(&graph))
    .await
    .unwrap();

  mock.assert_async().await;
  assert_eq!(steps.len(), 1);
  assert_eq!(steps[0].node_id, start_id);
  assert_eq!(steps[0].status, StepStatus::Success);
}

#[tokio::test]
async fn test_simulate_server_error_is_status_failure() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("POST", "/simulate")
    .with_status(500)
    .with_body("boom")
    .create_async()
    .await;

  let result = http_service(server.url())
    .simulate(&SimulationPayload::from_graph(&runnable()))
    .await;

  mock.assert_async().await;
  assert_eq!(
    result,
    Err(ServiceError::Status {
      endpoint: Endpoint::Simulate,
      status: 500,
      reason: "Internal Server Error".into(),
    })
  );
}

#[tokio::test]
async fn test_server_error_becomes_single_failed_log_entry() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("POST", "/simulate")
    .with_status(500)
    .create_async()
    .await;

  let simulator = Simulator::new(http_service(server.url()));
  let outcome = simulator.run(&runnable()).await;

  mock.assert_async().await;
  let SimulationOutcome::Completed(log) = &outcome else {
    panic!("expected a completed run, got {:?}", outcome);
  };
  assert_eq!(log.len(), 1);
  assert_eq!(log[0].node_id, ERROR_NODE_ID);
  assert_eq!(log[0].status, StepStatus::Failed);
  assert!(log[0].message.contains("500"), "{}", log[0].message);
  assert!(!outcome.succeeded());
  assert!(!simulator.is_running());
}

#[tokio::test]
async fn test_automations_non_array_body_is_invalid_response() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("GET", "/automations")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(r#"{ "actions": [] }"#)
    .create_async()
    .await;

  let result = http_service(server.url()).list_automations().await;

  mock.assert_async().await;
  assert_eq!(
    result,
    Err(ServiceError::InvalidResponse {
      endpoint: Endpoint::Automations,
      message: "expected array, got object".into(),
    })
  );
}

#[tokio::test]
async fn test_automations_are_fetched_under_base_path() {
  let mut server = Server::new_async().await;
  let mock = server
    .mock("GET", "/api/automations")
    .with_status(200)
    .with_body(json!([{ "id": "send_email", "label": "Send Email", "params": ["to"] }]).to_string())
    .create_async()
    .await;

  let actions = http_service(format!("{}/api", server.url()))
    .list_automations()
    .await
    .unwrap();

  mock.assert_async().await;
  assert_eq!(actions.len(), 1);
  assert_eq!(actions[0].id, "send_email");
}

#[tokio::test]
async fn test_unreachable_service_is_transport_failure() {
  let result = http_service("http://127.0.0.1:1".to_string())
    .list_automations()
    .await;
  assert!(
    matches!(
      result,
      Err(ServiceError::Transport {
        endpoint: Endpoint::Automations,
        ..
      })
    ),
    "{:?}",
    result
  );
}
