mod algorithms;
mod descriptors;
mod similar;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use libreclaim::prelude::*;

use crate::api::{AppState, errors::AppError};

pub use self::algorithms::algorithms;
pub use self::descriptors::describe_image;
pub use self::similar::find_similar;

pub async fn not_found() -> impl IntoResponse {
  AppError::ResourceNotFound
}

pub async fn healthz() -> StatusCode {
  StatusCode::OK
}

pub async fn readyz() -> StatusCode {
  StatusCode::OK
}

pub async fn prometheus<D: RasterDecoder>(State(state): State<AppState<D>>) -> Result<String, AppError> {
  match state.prometheus {
    Some(handle) => Ok(handle.render()),
    None => Err(AppError::ResourceNotFound),
  }
}
