use axum::{
  Router, middleware,
  routing::{get, post},
};
use libreclaim::prelude::*;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

use crate::{api::config::Config, trace::build_prometheus};

pub mod config;
pub mod dto;
pub mod errors;

pub mod handlers;
mod middlewares;

#[derive(Clone)]
pub struct AppState<D: RasterDecoder = HttpRasterDecoder> {
  pub config: Config,
  pub prometheus: Option<PrometheusHandle>,
  pub reclaim: Reclaim<D>,
}

pub async fn routes(config: &Config) -> anyhow::Result<Router> {
  let client = reqwest::Client::builder().timeout(config.decode_timeout).build()?;
  let decoder = HttpRasterDecoder::new(client, config.max_image_bytes);
  let reclaim = Reclaim::new(decoder).config(config.reclaim_config()).build()?;

  let prometheus = match config.enable_prometheus {
    true => Some(build_prometheus()?),
    false => None,
  };

  let state = AppState {
    config: config.clone(),
    prometheus,
    reclaim,
  };

  Ok(router(state))
}

pub fn router<D: RasterDecoder>(state: AppState<D>) -> Router {
  Router::new()
    .route("/similar", post(handlers::find_similar::<D>))
    .route("/descriptors", post(handlers::describe_image::<D>))
    .route("/algorithms", get(handlers::algorithms))
    .fallback(handlers::not_found)
    .layer(middleware::from_fn(middlewares::metrics))
    // The routes below are not counted in request metrics
    .route("/healthz", get(handlers::healthz))
    .route("/readyz", get(handlers::readyz))
    .route("/metrics", get(handlers::prometheus::<D>))
    .layer(middleware::from_fn(middlewares::logging::api_logger))
    .layer(TraceLayer::new_for_http().make_span_with(middlewares::create_request_span))
    .layer(middleware::from_fn(middlewares::request_id))
    .with_state(state)
}
