use libreclaim_macros::scoring_feature;

use crate::{
  descriptor::ImageDescriptor,
  matching::{Feature, comparers::relative_closeness},
};

/// Floor for the denominator, so two nearly flat images are not penalized
/// for tiny absolute differences.
const EDGE_DENSITY_FLOOR: f64 = 0.1;

#[scoring_feature(EdgeDensityCloseness, name = "edge_density_closeness", description = "Relative difference in the share of edge pixels")]
fn score_feature(&self, lhs: &ImageDescriptor, rhs: &ImageDescriptor) -> f64 {
  relative_closeness(lhs.edge_density, rhs.edge_density, EDGE_DENSITY_FLOOR)
}
