use libreclaim_macros::scoring_feature;

use crate::{
  descriptor::ImageDescriptor,
  matching::{Feature, comparers::palette_similarity},
};

#[scoring_feature(
  DominantColorMatch,
  name = "dominant_color_match",
  description = "Average closeness of each query dominant color to its nearest candidate dominant color"
)]
fn score_feature(&self, lhs: &ImageDescriptor, rhs: &ImageDescriptor) -> f64 {
  palette_similarity(&lhs.dominant_colors, &rhs.dominant_colors)
}

#[scoring_feature(
  SymmetricDominantColorMatch,
  name = "dominant_color_match_symmetric",
  description = "Mean of the nearest dominant color closeness computed in both directions"
)]
fn score_feature(&self, lhs: &ImageDescriptor, rhs: &ImageDescriptor) -> f64 {
  (palette_similarity(&lhs.dominant_colors, &rhs.dominant_colors) + palette_similarity(&rhs.dominant_colors, &lhs.dominant_colors)) / 2.0
}
