use libreclaim_macros::scoring_feature;

use crate::{
  descriptor::ImageDescriptor,
  matching::{Feature, comparers::relative_closeness},
};

const CONTRAST_FLOOR: f64 = 1.0;

#[scoring_feature(ContrastCloseness, name = "contrast_closeness", description = "Relative difference in brightness standard deviation")]
fn score_feature(&self, lhs: &ImageDescriptor, rhs: &ImageDescriptor) -> f64 {
  relative_closeness(lhs.contrast, rhs.contrast, CONTRAST_FLOOR)
}
