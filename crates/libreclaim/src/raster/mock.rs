use std::{
  collections::HashMap,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use ahash::RandomState;
use image::DynamicImage;

use crate::{
  model::ImageRef,
  raster::{PixelBuffer, RasterDecoder},
};

#[derive(Clone, Debug)]
pub enum MockedImage {
  Raster(PixelBuffer),
  Slow(Duration, PixelBuffer),
  Broken,
}

/// In-memory decoder serving preregistered rasters.
///
/// Unknown references fail to decode, like an unreachable URL would.
#[derive(Clone, Debug, Default)]
pub struct MockedDecoder {
  images: Arc<HashMap<ImageRef, MockedImage, RandomState>>,
  calls: Arc<AtomicUsize>,
  decoded: Arc<AtomicUsize>,
}

impl MockedDecoder {
  pub fn with_images(images: impl IntoIterator<Item = (ImageRef, MockedImage)>) -> MockedDecoder {
    MockedDecoder {
      images: Arc::new(images.into_iter().collect()),
      calls: Arc::default(),
      decoded: Arc::default(),
    }
  }

  pub fn with_rasters(rasters: impl IntoIterator<Item = (ImageRef, PixelBuffer)>) -> MockedDecoder {
    MockedDecoder::with_images(rasters.into_iter().map(|(image, raster)| (image, MockedImage::Raster(raster))))
  }

  /// Number of decode calls served so far.
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  /// Number of decode calls that ran to completion and returned a raster.
  pub fn decoded(&self) -> usize {
    self.decoded.load(Ordering::SeqCst)
  }
}

impl RasterDecoder for MockedDecoder {
  async fn decode_to_square_raster(&self, image: &ImageRef, side: u32) -> anyhow::Result<PixelBuffer> {
    self.calls.fetch_add(1, Ordering::SeqCst);

    let raster = match self.images.get(image) {
      None => anyhow::bail!("unknown image {image}"),
      Some(MockedImage::Broken) => anyhow::bail!("could not decode image"),
      Some(MockedImage::Raster(raster)) => raster,
      Some(MockedImage::Slow(delay, raster)) => {
        tokio::time::sleep(*delay).await;
        raster
      }
    };

    let raster = match raster.side() == side {
      true => raster.clone(),
      false => PixelBuffer::resample(&DynamicImage::ImageRgb8(raster.as_image().clone()), side)?,
    };

    self.decoded.fetch_add(1, Ordering::SeqCst);

    Ok(raster)
  }
}
