use libreclaim_macros::scoring_feature;

use crate::{
  descriptor::ImageDescriptor,
  matching::{Feature, comparers::absolute_closeness},
};

#[scoring_feature(BrightnessCloseness, name = "brightness_closeness", description = "Difference in mean brightness over the full 0-255 range")]
fn score_feature(&self, lhs: &ImageDescriptor, rhs: &ImageDescriptor) -> f64 {
  absolute_closeness(lhs.brightness, rhs.brightness, 255.0)
}
