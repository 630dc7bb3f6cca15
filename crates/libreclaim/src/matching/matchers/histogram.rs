use libreclaim_macros::scoring_feature;

use crate::{
  descriptor::ImageDescriptor,
  matching::{Feature, comparers::histogram_overlap},
};

#[scoring_feature(ColorHistogramOverlap, name = "color_histogram_overlap", description = "Shared pixel-channel intensities across the red, green and blue histograms")]
fn score_feature(&self, lhs: &ImageDescriptor, rhs: &ImageDescriptor) -> f64 {
  histogram_overlap(&lhs.color_histogram, &rhs.color_histogram, lhs.samples().max(rhs.samples()))
}
