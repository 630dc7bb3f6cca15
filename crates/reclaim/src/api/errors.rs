use std::error::Error;

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use libreclaim::prelude::*;
use serde_json::json;
use tracing::*;

pub(super) struct ApiError(pub StatusCode, pub String, pub Option<Vec<String>>);

#[derive(Debug, thiserror::Error)]
pub enum AppError {
  #[error("invalid credentials")]
  InvalidCredentials,
  #[error("missing resource")]
  ResourceNotFound,
  #[error(transparent)]
  OtherError(#[from] anyhow::Error),

  #[error("invalid configuration: {0}")]
  ConfigError(String),
  #[error("could not analyze your image, try a different photo")]
  QueryImageInvalid(#[source] ReclaimError),
  #[error("could not analyze the provided image")]
  ImageInvalid(#[source] ReclaimError),
  #[error("too many candidates, at most {0} can be compared at once")]
  TooManyCandidates(usize),
  #[error("local or internal image locations are not accepted")]
  ForbiddenImageLocation,
}

impl From<ReclaimError> for AppError {
  fn from(value: ReclaimError) -> Self {
    match value {
      ReclaimError::ConfigError(err) => AppError::ConfigError(err),
      ReclaimError::QueryImageInvalid(err) => AppError::QueryImageInvalid(*err),
      err @ ReclaimError::ExtractionFailure { .. } => AppError::ImageInvalid(err),
      ReclaimError::OtherError(err) => AppError::OtherError(err),
    }
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    error!(error = self.source(), "{}", self.to_string());

    ApiError::from(&self).into_response()
  }
}

impl From<&AppError> for ApiError {
  fn from(value: &AppError) -> Self {
    match value {
      AppError::InvalidCredentials => ApiError(StatusCode::UNAUTHORIZED, value.to_string(), None),
      AppError::ResourceNotFound => ApiError(StatusCode::NOT_FOUND, value.to_string(), None),
      AppError::QueryImageInvalid(err) | AppError::ImageInvalid(err) => ApiError(StatusCode::UNPROCESSABLE_ENTITY, value.to_string(), Some(vec![cause(err)])),
      AppError::TooManyCandidates(_) | AppError::ForbiddenImageLocation => ApiError(StatusCode::UNPROCESSABLE_ENTITY, value.to_string(), None),
      AppError::OtherError(inner) if inner.is::<AppError>() => match inner.downcast_ref::<AppError>() {
        Some(inner) => inner.into(),
        _ => ApiError(StatusCode::INTERNAL_SERVER_ERROR, value.to_string(), None),
      },
      _ => ApiError(StatusCode::INTERNAL_SERVER_ERROR, value.to_string(), None),
    }
  }
}

/// Innermost cause of an extraction failure, safe to show to callers.
fn cause(err: &ReclaimError) -> String {
  match err {
    ReclaimError::ExtractionFailure { source, .. } => source.root_cause().to_string(),
    err => err.to_string(),
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let payload = match self.2 {
      Some(details) => json!({
          "message": self.1.to_string(),
          "details": details,
      }),
      None => json!({
          "message": self.1.to_string(),
      }),
    };

    (self.0, Json(payload)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use axum::http::StatusCode;
  use libreclaim::prelude::*;

  use super::{ApiError, AppError};

  #[test]
  fn status_codes() {
    let extraction = || ReclaimError::ExtractionFailure {
      reference: "http://cdn/1.png".into(),
      source: anyhow::anyhow!("could not decode image"),
    };

    let cases = [
      (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
      (AppError::ResourceNotFound, StatusCode::NOT_FOUND),
      (AppError::TooManyCandidates(10), StatusCode::UNPROCESSABLE_ENTITY),
      (AppError::ForbiddenImageLocation, StatusCode::UNPROCESSABLE_ENTITY),
      (AppError::from(ReclaimError::QueryImageInvalid(Box::new(extraction()))), StatusCode::UNPROCESSABLE_ENTITY),
      (AppError::from(extraction()), StatusCode::UNPROCESSABLE_ENTITY),
      (AppError::from(ReclaimError::ConfigError("bad".into())), StatusCode::INTERNAL_SERVER_ERROR),
      (AppError::OtherError(AppError::InvalidCredentials.into()), StatusCode::UNAUTHORIZED),
      (AppError::OtherError(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (err, status) in cases {
      assert_eq!(ApiError::from(&err).0, status);
    }
  }

  #[test]
  fn query_image_message() {
    let err = AppError::from(ReclaimError::QueryImageInvalid(Box::new(ReclaimError::ExtractionFailure {
      reference: "http://cdn/1.png".into(),
      source: anyhow::anyhow!("image location returned an error"),
    })));

    let ApiError(_, message, details) = ApiError::from(&err);

    assert_eq!(message, "could not analyze your image, try a different photo");
    assert_eq!(details, Some(vec!["image location returned an error".to_string()]));
  }
}
