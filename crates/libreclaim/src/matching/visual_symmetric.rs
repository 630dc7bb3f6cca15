use crate::matching::{
  Feature, MatchingAlgorithm,
  matchers::{
    brightness::BrightnessCloseness, contrast::ContrastCloseness, dominant_color::SymmetricDominantColorMatch, edge_density::EdgeDensityCloseness,
    histogram::ColorHistogramOverlap,
  },
};

const FEATURES: &[(&dyn Feature, f64)] = &[
  (&ColorHistogramOverlap, 0.30),
  (&SymmetricDominantColorMatch, 0.25),
  (&EdgeDensityCloseness, 0.20),
  (&BrightnessCloseness, 0.15),
  (&ContrastCloseness, 0.10),
];

/// Same weighting as [`VisualV1`](super::visual_v1::VisualV1), with the
/// dominant color comparison averaged over both directions so that
/// `score(a, b) == score(b, a)` always holds.
pub struct VisualSymmetric;

impl MatchingAlgorithm for VisualSymmetric {
  fn name() -> &'static str {
    "visual-symmetric"
  }

  fn features() -> &'static [(&'static dyn Feature, f64)] {
    FEATURES
  }
}
