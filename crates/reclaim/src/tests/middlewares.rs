use std::sync::{Arc, Mutex};

use axum::http::header::AUTHORIZATION;
use axum_test::TestServer;
use serde_json::json;

use crate::{
  api::{self, config::Config},
  tests::{log_writer::VecLogWriter, state},
  trace::{build_prometheus, init_tracing},
};

#[tokio::test]
async fn api_invalid_credentials() {
  let state = state(Config {
    api_key: Some("myapikey".into()),
    ..Default::default()
  });

  let app = api::router(state);
  let server = TestServer::try_new(app).unwrap();
  let response = server.post("/similar").await;

  assert_eq!(response.status_code(), 401);

  response.assert_text_contains("invalid credentials");

  let response = server.post("/similar").add_header(AUTHORIZATION, "Bearer invalidkey").await;

  assert_eq!(response.status_code(), 401);

  response.assert_text_contains("invalid credentials");
}

#[tokio::test]
async fn api_valid_credentials() {
  let state = state(Config {
    api_key: Some("myapikey".into()),
    ..Default::default()
  });

  let app = api::router(state);
  let server = TestServer::try_new(app).unwrap();
  let response = server.post("/similar").add_header(AUTHORIZATION, "Bearer myapikey").await;

  assert_eq!(response.status_code(), 415);

  let response = server
    .post("/similar")
    .add_header(AUTHORIZATION, "Bearer myapikey")
    .json(&json!({ "query": { "url": "http://cdn/query.png" }, "candidates": [] }))
    .await;

  assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn logging() {
  let buf = Arc::new(Mutex::new(Vec::default()));
  let state = state(Config::default());

  let guard = init_tracing(&state.config, VecLogWriter::new(Arc::clone(&buf))).await;

  let app = api::router(state);
  let server = TestServer::try_new(app).unwrap();
  let _ = server.post("/logging-probe").await;

  drop(guard);

  let lines = buf.lock().unwrap();
  let line = lines.iter().find(|line| line.contains("POST http://localhost/logging-probe")).unwrap();

  assert!(line.contains("request_id="));
  assert!(line.contains(r#"remote="-" method=POST path="/logging-probe" status=404"#));
}

#[tokio::test]
async fn metrics() {
  let mut state = state(Config {
    enable_prometheus: true,
    ..Default::default()
  });

  state.prometheus = Some(build_prometheus().unwrap());

  let app = api::router(state);
  let server = TestServer::try_new(app).unwrap();
  let _ = server.post("/similar").await;
  let resp = server.get("/metrics").await;

  assert!(resp.text().contains(r#"http_requests_total{service="reclaim",status="415"}"#))
}
