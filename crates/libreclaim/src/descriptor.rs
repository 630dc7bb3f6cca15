use serde::{Deserialize, Serialize};

use crate::{matching::extractors, raster::PixelBuffer};

pub const HISTOGRAM_BINS: usize = 256;

/// Tuning knobs for descriptor extraction.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct DescriptorParams {
  /// Maximum number of dominant colors kept.
  pub palette_size: usize,
  /// Only every n-th pixel (row-major) is counted towards dominant colors.
  pub palette_stride: usize,
  /// Minimum gradient, on a 0-255 brightness scale, for a pixel to be an edge.
  pub edge_threshold: f64,
}

impl Default for DescriptorParams {
  fn default() -> Self {
    DescriptorParams {
      palette_size: 5,
      palette_stride: 4,
      edge_threshold: 30.0,
    }
  }
}

/// Compact visual summary of an image, computed from a fixed-size raster.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ImageDescriptor {
  pub side: u32,
  pub color_histogram: ColorHistogram,
  pub dominant_colors: Vec<DominantColor>,
  pub edge_density: f64,
  pub brightness: f64,
  pub contrast: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColorHistogram {
  pub red: Vec<u32>,
  pub green: Vec<u32>,
  pub blue: Vec<u32>,
}

impl Default for ColorHistogram {
  fn default() -> Self {
    ColorHistogram {
      red: vec![0; HISTOGRAM_BINS],
      green: vec![0; HISTOGRAM_BINS],
      blue: vec![0; HISTOGRAM_BINS],
    }
  }
}

impl ColorHistogram {
  pub fn channels(&self) -> [&[u32]; 3] {
    [&self.red, &self.green, &self.blue]
  }
}

/// A quantized color, reported as the floor of its bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DominantColor {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub count: u32,
}

impl ImageDescriptor {
  pub fn describe(raster: &PixelBuffer, params: &DescriptorParams) -> ImageDescriptor {
    let brightness = extractors::brightness(raster);

    ImageDescriptor {
      side: raster.side(),
      color_histogram: extractors::color_histogram(raster),
      dominant_colors: extractors::dominant_colors(raster, params.palette_size, params.palette_stride),
      edge_density: extractors::edge_density(raster, params.edge_threshold),
      brightness,
      contrast: extractors::contrast(raster, brightness),
    }
  }

  /// Number of pixel-channel samples the histogram was built from.
  pub fn samples(&self) -> u64 {
    (self.side as u64) * (self.side as u64) * 3
  }
}
