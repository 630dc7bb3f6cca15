use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use libreclaim::prelude::*;
use tracing::instrument;

use crate::api::{
  AppState,
  dto::{SimilarPayload, SimilarResponse},
  errors::AppError,
  middlewares::{auth::Auth, json_rejection::TypedJson},
};

#[instrument(skip_all)]
pub async fn find_similar<D: RasterDecoder>(State(state): State<AppState<D>>, _: Auth<D>, TypedJson(body): TypedJson<SimilarPayload>) -> Result<(StatusCode, impl IntoResponse), AppError> {
  if body.candidates.len() > state.config.max_candidates {
    return Err(AppError::TooManyCandidates(state.config.max_candidates));
  }

  if body.references_forbidden_locations(state.config.allow_internal_urls) {
    return Err(AppError::ForbiddenImageLocation);
  }

  let report = state.reclaim.rank(&body.query, body.candidates, &body.params).await?;

  tracing::info!(algorithm = %body.params.algorithm, matches = report.matches.len(), failed = report.failed, skipped = report.skipped, "ranked candidates");

  Ok((StatusCode::OK, Json(SimilarResponse::from(report))))
}
