mod matchers;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;
use validator::Validate;

use crate::descriptor::ImageDescriptor;

pub(crate) mod comparers;
pub(crate) mod extractors;
pub(crate) mod visual_symmetric;
pub(crate) mod visual_v1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Algorithm {
  #[default]
  #[serde(rename = "visual-v1")]
  VisualV1,
  #[serde(rename = "visual-symmetric")]
  VisualSymmetric,
}

impl Algorithm {
  pub const ALL: [Algorithm; 2] = [Algorithm::VisualV1, Algorithm::VisualSymmetric];

  pub fn name(&self) -> &'static str {
    match self {
      Algorithm::VisualV1 => visual_v1::VisualV1::name(),
      Algorithm::VisualSymmetric => visual_symmetric::VisualSymmetric::name(),
    }
  }

  pub fn features(&self) -> &'static [(&'static dyn Feature, f64)] {
    match self {
      Algorithm::VisualV1 => visual_v1::VisualV1::features(),
      Algorithm::VisualSymmetric => visual_symmetric::VisualSymmetric::features(),
    }
  }
}

impl fmt::Display for Algorithm {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// A fixed-weight combination of descriptor comparisons.
///
/// The default `score` divides by the sum of weights, so the table does not
/// need to be normalized.
pub trait MatchingAlgorithm {
  fn name() -> &'static str;
  fn features() -> &'static [(&'static dyn Feature, f64)];

  fn score(lhs: &ImageDescriptor, rhs: &ImageDescriptor) -> (f64, Vec<(&'static str, f64)>) {
    let mut results = Vec::with_capacity(Self::features().len());
    let score = run_features(lhs, rhs, Self::features(), &mut results);

    (score, results)
  }
}

pub trait Feature: Send + Sync {
  fn name(&self) -> &'static str;
  fn description(&self) -> &'static str;
  fn score_feature(&self, lhs: &ImageDescriptor, rhs: &ImageDescriptor) -> f64;
}

fn run_features(lhs: &ImageDescriptor, rhs: &ImageDescriptor, features: &[(&dyn Feature, f64)], results: &mut Vec<(&'static str, f64)>) -> f64 {
  let (total, weights) = features.iter().fold((0.0, 0.0), |(total, weights), (func, weight)| {
    let feature_score = clamp_unit(func.score_feature(lhs, rhs));

    results.push((func.name(), feature_score));

    tracing::debug!(feature = func.name(), score = feature_score, "computed feature score");

    (total + feature_score * weight, weights + weight)
  });

  if weights <= 0.0 {
    return 0.0;
  }

  clamp_unit(total / weights)
}

/// Clamp to [0, 1], mapping NaN to 0.
#[inline]
pub(crate) fn clamp_unit(value: f64) -> f64 {
  if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

#[serde_inline_default]
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct RankParams {
  #[serde_inline_default(0.3)]
  #[validate(range(min = 0.0, max = 1.0, message = "threshold must be between 0 and 1"))]
  pub threshold: f64,
  #[serde_inline_default(6)]
  #[validate(range(min = 1, message = "limit must be at least 1"))]
  pub limit: usize,
  #[serde_inline_default(Algorithm::VisualV1)]
  pub algorithm: Algorithm,
}

impl Default for RankParams {
  fn default() -> Self {
    RankParams {
      threshold: 0.3,
      limit: 6,
      algorithm: Algorithm::VisualV1,
    }
  }
}
