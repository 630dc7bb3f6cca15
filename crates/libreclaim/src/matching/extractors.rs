use std::cmp::Reverse;

use itertools::Itertools;

use crate::{
  descriptor::{ColorHistogram, DominantColor},
  raster::PixelBuffer,
};

const QUANTUM: u8 = 32;
const LEVELS: usize = 256 / QUANTUM as usize;

#[inline]
pub(crate) fn pixel_brightness([r, g, b]: [u8; 3]) -> f64 {
  (r as f64 + g as f64 + b as f64) / 3.0
}

pub(crate) fn color_histogram(raster: &PixelBuffer) -> ColorHistogram {
  let mut histogram = ColorHistogram::default();

  for [r, g, b] in raster.pixels() {
    histogram.red[r as usize] += 1;
    histogram.green[g as usize] += 1;
    histogram.blue[b as usize] += 1;
  }

  histogram
}

/// Most frequent colors, each channel floored to a multiple of 32.
///
/// Only every `stride`-th pixel is counted. Buckets with equal counts are
/// ordered by the position at which they were first seen.
pub(crate) fn dominant_colors(raster: &PixelBuffer, size: usize, stride: usize) -> Vec<DominantColor> {
  let mut counts = [0u32; LEVELS * LEVELS * LEVELS];
  let mut first_seen = [usize::MAX; LEVELS * LEVELS * LEVELS];

  for (position, [r, g, b]) in raster.pixels().step_by(stride.max(1)).enumerate() {
    let bucket = bucket_index(r, g, b);

    if counts[bucket] == 0 {
      first_seen[bucket] = position;
    }

    counts[bucket] += 1;
  }

  counts
    .iter()
    .enumerate()
    .filter(|(_, count)| **count > 0)
    .sorted_by_key(|(bucket, count)| (Reverse(**count), first_seen[*bucket]))
    .take(size)
    .map(|(bucket, count)| {
      let (r, g, b) = bucket_floor(bucket);

      DominantColor { r, g, b, count: *count }
    })
    .collect()
}

#[inline]
fn bucket_index(r: u8, g: u8, b: u8) -> usize {
  let (r, g, b) = ((r / QUANTUM) as usize, (g / QUANTUM) as usize, (b / QUANTUM) as usize);

  (r * LEVELS + g) * LEVELS + b
}

#[inline]
fn bucket_floor(bucket: usize) -> (u8, u8, u8) {
  let b = bucket % LEVELS;
  let g = (bucket / LEVELS) % LEVELS;
  let r = bucket / (LEVELS * LEVELS);

  ((r as u8) * QUANTUM, (g as u8) * QUANTUM, (b as u8) * QUANTUM)
}

/// Fraction of interior pixels whose gradient towards their right and bottom
/// neighbours exceeds `threshold`.
pub(crate) fn edge_density(raster: &PixelBuffer, threshold: f64) -> f64 {
  let side = raster.side();

  if side < 3 {
    return 0.0;
  }

  let mut edges = 0usize;

  for y in 1..side - 1 {
    for x in 1..side - 1 {
      let current = pixel_brightness(raster.get(x, y));
      let right = pixel_brightness(raster.get(x + 1, y));
      let bottom = pixel_brightness(raster.get(x, y + 1));

      if (current - right).abs() + (current - bottom).abs() > threshold {
        edges += 1;
      }
    }
  }

  let interior = ((side - 2) as usize).pow(2);

  edges as f64 / interior as f64
}

pub(crate) fn brightness(raster: &PixelBuffer) -> f64 {
  if raster.is_empty() {
    return 0.0;
  }

  raster.pixels().map(pixel_brightness).sum::<f64>() / raster.len() as f64
}

/// Standard deviation of per-pixel brightness around `mean`.
pub(crate) fn contrast(raster: &PixelBuffer, mean: f64) -> f64 {
  if raster.is_empty() {
    return 0.0;
  }

  let variance = raster.pixels().map(|pixel| (pixel_brightness(pixel) - mean).powi(2)).sum::<f64>() / raster.len() as f64;

  variance.sqrt()
}

#[cfg(test)]
mod tests {
  use float_cmp::approx_eq;

  use crate::{
    descriptor::DominantColor,
    raster::PixelBuffer,
    tests::{checkerboard, gradient},
  };

  #[test]
  fn color_histogram() {
    let raster = PixelBuffer::from_fn(4, |x, _| if x < 2 { [10, 20, 30] } else { [10, 200, 255] });
    let histogram = super::color_histogram(&raster);

    assert_eq!(histogram.red[10], 16);
    assert_eq!(histogram.green[20], 8);
    assert_eq!(histogram.green[200], 8);
    assert_eq!(histogram.blue[30], 8);
    assert_eq!(histogram.blue[255], 8);
    assert_eq!(histogram.channels().iter().map(|channel| channel.iter().sum::<u32>()).collect::<Vec<_>>(), vec![16, 16, 16]);
  }

  #[test]
  fn dominant_colors_are_floored_and_ranked() {
    // Three quarters of the rows are teal, the rest are orange.
    let raster = PixelBuffer::from_fn(8, |_, y| if y < 6 { [40, 170, 169] } else { [255, 130, 31] });
    let colors = super::dominant_colors(&raster, 5, 1);

    assert_eq!(
      colors,
      vec![DominantColor { r: 32, g: 160, b: 160, count: 48 }, DominantColor { r: 224, g: 128, b: 0, count: 16 }]
    );
  }

  #[test]
  fn dominant_colors_stride_and_size() {
    let raster = gradient(64);

    assert_eq!(super::dominant_colors(&raster, 5, 4).len(), 5);
    assert_eq!(super::dominant_colors(&raster, 2, 4).len(), 2);
    assert_eq!(super::dominant_colors(&raster, 5, 4).iter().map(|color| color.count).sum::<u32>() <= 1024, true);

    let solid = PixelBuffer::solid(64, [0, 0, 0]);

    assert_eq!(super::dominant_colors(&solid, 5, 4)[0].count, 1024);
    assert_eq!(super::dominant_colors(&solid, 5, 1)[0].count, 4096);
    assert!(super::dominant_colors(&solid, 0, 4).is_empty());
  }

  #[test]
  fn dominant_colors_ties_keep_scan_order() {
    let raster = checkerboard(4, [0, 0, 255], [255, 0, 0]);
    let colors = super::dominant_colors(&raster, 5, 1);

    assert_eq!(colors[0], DominantColor { r: 0, g: 0, b: 224, count: 8 });
    assert_eq!(colors[1], DominantColor { r: 224, g: 0, b: 0, count: 8 });
  }

  #[test]
  fn edge_density() {
    assert_eq!(super::edge_density(&PixelBuffer::solid(64, [120, 120, 120]), 30.0), 0.0);
    assert_eq!(super::edge_density(&checkerboard(64, [0, 0, 0], [255, 255, 255]), 30.0), 1.0);

    // A single vertical boundary: only the column left of it sees a gradient.
    let split = PixelBuffer::from_fn(10, |x, _| if x < 5 { [0, 0, 0] } else { [255, 255, 255] });

    assert!(approx_eq!(f64, super::edge_density(&split, 30.0), 8.0 / 64.0));
  }

  #[test]
  fn edge_density_threshold_is_strict() {
    // Brightness steps of exactly 15 per pixel give a gradient sum of 30.
    let raster = PixelBuffer::from_fn(8, |x, y| {
      let level = ((x + y) * 15) as u8;
      [level, level, level]
    });

    assert_eq!(super::edge_density(&raster, 30.0), 0.0);
    assert_eq!(super::edge_density(&raster, 29.9), 1.0);
  }

  #[test]
  fn edge_density_tiny_rasters() {
    assert_eq!(super::edge_density(&PixelBuffer::solid(2, [0, 0, 0]), 30.0), 0.0);
    assert_eq!(super::edge_density(&PixelBuffer::solid(1, [0, 0, 0]), 30.0), 0.0);
  }

  #[test]
  fn brightness_and_contrast() {
    let solid = PixelBuffer::solid(16, [30, 60, 90]);

    assert!(approx_eq!(f64, super::brightness(&solid), 60.0));
    assert_eq!(super::contrast(&solid, super::brightness(&solid)), 0.0);

    let board = checkerboard(16, [0, 0, 0], [255, 255, 255]);
    let mean = super::brightness(&board);

    assert!(approx_eq!(f64, mean, 127.5));
    assert!(approx_eq!(f64, super::contrast(&board, mean), 127.5));
  }
}
