use crate::matching::{
  Feature, MatchingAlgorithm,
  matchers::{
    brightness::BrightnessCloseness, contrast::ContrastCloseness, dominant_color::DominantColorMatch, edge_density::EdgeDensityCloseness, histogram::ColorHistogramOverlap,
  },
};

const FEATURES: &[(&dyn Feature, f64)] = &[
  (&ColorHistogramOverlap, 0.30),
  (&DominantColorMatch, 0.25),
  (&EdgeDensityCloseness, 0.20),
  (&BrightnessCloseness, 0.15),
  (&ContrastCloseness, 0.10),
];

/// Default visual matching heuristic.
///
/// The dominant color comparison only walks the query palette, so scores are
/// not strictly symmetric when palettes differ in size or spread.
pub struct VisualV1;

impl MatchingAlgorithm for VisualV1 {
  fn name() -> &'static str {
    "visual-v1"
  }

  fn features() -> &'static [(&'static dyn Feature, f64)] {
    FEATURES
  }
}
