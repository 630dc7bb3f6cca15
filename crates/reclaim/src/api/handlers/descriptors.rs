use axum::{Json, extract::State};
use libreclaim::prelude::*;
use tracing::instrument;

use crate::api::{
  AppState,
  dto::{DescriptorPayload, is_forbidden},
  errors::AppError,
  middlewares::{auth::Auth, json_rejection::TypedJson},
};

#[instrument(skip_all)]
pub async fn describe_image<D: RasterDecoder>(State(state): State<AppState<D>>, _: Auth<D>, TypedJson(body): TypedJson<DescriptorPayload>) -> Result<Json<ImageDescriptor>, AppError> {
  if is_forbidden(&body.image, state.config.allow_internal_urls) {
    return Err(AppError::ForbiddenImageLocation);
  }

  let descriptor = state.reclaim.extract(&body.image).await?;

  Ok(Json(ImageDescriptor::clone(&descriptor)))
}
