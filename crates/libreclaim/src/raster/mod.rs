pub mod http;
pub mod mock;

use anyhow::Context;
use image::{DynamicImage, Rgb, RgbImage, imageops::FilterType};

use crate::model::ImageRef;

/// Capability turning an image reference into a fixed-size square raster.
///
/// Implementations must not share a mutable raster between calls, since
/// extractions run concurrently.
#[allow(async_fn_in_trait)]
pub trait RasterDecoder: Clone + Send + Sync + 'static {
  fn decode_to_square_raster(&self, image: &ImageRef, side: u32) -> impl Future<Output = anyhow::Result<PixelBuffer>> + Send;
}

/// Owned square RGB raster, 8 bits per channel.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
  raster: RgbImage,
}

impl PixelBuffer {
  pub fn new(raster: RgbImage) -> anyhow::Result<PixelBuffer> {
    if raster.width() != raster.height() {
      anyhow::bail!("raster must be square, got {}x{}", raster.width(), raster.height());
    }
    if raster.width() == 0 {
      anyhow::bail!("raster cannot be empty");
    }

    Ok(PixelBuffer { raster })
  }

  pub fn solid(side: u32, rgb: [u8; 3]) -> PixelBuffer {
    PixelBuffer {
      raster: RgbImage::from_pixel(side.max(1), side.max(1), Rgb(rgb)),
    }
  }

  pub fn from_fn(side: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> PixelBuffer {
    PixelBuffer {
      raster: RgbImage::from_fn(side.max(1), side.max(1), |x, y| Rgb(f(x, y))),
    }
  }

  /// Resample an arbitrary image to a `side` x `side` raster, ignoring its
  /// aspect ratio.
  pub fn resample(image: &DynamicImage, side: u32) -> anyhow::Result<PixelBuffer> {
    if image.width() == 0 || image.height() == 0 {
      anyhow::bail!("image has no pixels");
    }

    PixelBuffer::new(image.resize_exact(side, side, FilterType::Nearest).to_rgb8())
  }

  pub fn side(&self) -> u32 {
    self.raster.width()
  }

  pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
    self.raster.get_pixel(x, y).0
  }

  /// Pixels in row-major order.
  pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
    self.raster.pixels().map(|pixel| pixel.0)
  }

  pub fn len(&self) -> usize {
    (self.side() as usize) * (self.side() as usize)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn as_image(&self) -> &RgbImage {
    &self.raster
  }
}

/// Decode encoded image bytes (PNG, JPEG, ...) into a square raster.
pub(crate) fn decode_bytes(bytes: &[u8], side: u32) -> anyhow::Result<PixelBuffer> {
  let image = image::load_from_memory(bytes).context("could not decode image")?;

  PixelBuffer::resample(&image, side)
}
