use std::marker::PhantomData;

use anyhow::Context;
use axum::{
  RequestPartsExt,
  extract::{FromRef, FromRequestParts, State},
  http::request::Parts,
};
use axum_extra::{
  TypedHeader,
  headers::{Authorization, authorization::Bearer},
};
use libreclaim::prelude::*;

use crate::api::{AppState, errors::AppError};

/// Rejects requests without the configured bearer token, if any.
#[non_exhaustive]
pub(crate) struct Auth<D> {
  _marker: PhantomData<D>,
}

impl<S, D> FromRequestParts<S> for Auth<D>
where
  D: RasterDecoder,
  S: Send + Sync,
  AppState<D>: FromRef<S>,
{
  type Rejection = AppError;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
    let State(app_state) = parts.extract_with_state::<State<AppState<D>>, S>(state).await.context("could not extract application state")?;

    let Some(api_key) = app_state.config.api_key else {
      return Ok(Auth { _marker: PhantomData });
    };

    let header = parts
      .extract::<TypedHeader<Authorization<Bearer>>>()
      .await
      .context("no authorization header found")
      .context(AppError::InvalidCredentials)?;

    if header.token() != api_key {
      return Err(AppError::InvalidCredentials);
    }

    Ok(Auth { _marker: PhantomData })
  }
}
