#![allow(unexpected_cfgs)]

mod cache;
mod descriptor;
mod error;
mod matching;
mod model;
mod raster;
mod ranking;
mod reclaim;

pub mod scoring;

#[cfg(test)]
mod tests;

pub use crate::reclaim::{Reclaim, ReclaimConfig};

pub mod prelude {
  pub use crate::cache::DescriptorCache;
  pub use crate::descriptor::{ColorHistogram, DescriptorParams, DominantColor, ImageDescriptor};
  pub use crate::error::ReclaimError;
  pub use crate::matching::{Algorithm, Feature, MatchingAlgorithm, RankParams, visual_symmetric::VisualSymmetric, visual_v1::VisualV1};
  pub use crate::model::{Candidate, ImageRef, MatchResult, RankReport, features_to_map};
  pub use crate::raster::{
    PixelBuffer, RasterDecoder,
    http::{DEFAULT_MAX_IMAGE_BYTES, HttpRasterDecoder},
    mock::{MockedDecoder, MockedImage},
  };
  pub use crate::reclaim::{Reclaim, ReclaimConfig};
}
