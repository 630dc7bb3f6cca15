#[derive(Debug, thiserror::Error)]
pub enum ReclaimError {
  #[error("invalid configuration: {0}")]
  ConfigError(String),
  #[error("could not extract features from {reference}")]
  ExtractionFailure {
    reference: String,
    #[source]
    source: anyhow::Error,
  },
  #[error("could not analyze query image")]
  QueryImageInvalid(#[source] Box<ReclaimError>),
  #[error(transparent)]
  OtherError(#[from] anyhow::Error),
}

impl ReclaimError {
  pub(crate) fn extraction(reference: impl ToString, source: anyhow::Error) -> ReclaimError {
    ReclaimError::ExtractionFailure {
      reference: reference.to_string(),
      source,
    }
  }
}
