use std::{sync::Arc, time::Duration};

use bon::{Builder, bon};
use metrics::{counter, histogram};
use tokio::time::Instant;
use tracing::instrument;

use crate::{
  cache::DescriptorCache,
  descriptor::{DescriptorParams, ImageDescriptor},
  error::ReclaimError,
  matching::{MatchingAlgorithm, RankParams},
  model::{Candidate, ImageRef, RankReport},
  raster::{RasterDecoder, http::HttpRasterDecoder},
  ranking,
};

#[derive(Builder, Clone, Debug)]
pub struct ReclaimConfig {
  /// Side of the square raster every image is resampled to.
  #[builder(default = 64)]
  pub side: u32,
  #[builder(default)]
  pub descriptor: DescriptorParams,
  /// Maximum number of images decoded at the same time during a ranking.
  #[builder(default = 6)]
  pub concurrency: usize,
  #[builder(default = Duration::from_secs(5))]
  pub decode_timeout: Duration,
  /// Capacity of the descriptor cache, disabled when `None`.
  pub cache_capacity: Option<usize>,
}

impl Default for ReclaimConfig {
  fn default() -> Self {
    ReclaimConfig::builder().build()
  }
}

impl ReclaimConfig {
  fn validate(&self) -> Result<(), ReclaimError> {
    if self.side == 0 {
      return Err(ReclaimError::ConfigError("raster side must be at least 1".into()));
    }
    if self.concurrency == 0 {
      return Err(ReclaimError::ConfigError("extraction concurrency must be at least 1".into()));
    }
    if self.descriptor.palette_stride == 0 {
      return Err(ReclaimError::ConfigError("palette stride must be at least 1".into()));
    }
    if self.decode_timeout.is_zero() {
      return Err(ReclaimError::ConfigError("decode timeout cannot be zero".into()));
    }

    Ok(())
  }
}

/// The main entrypoint for matching item photos.
///
/// `Reclaim` extracts visual descriptors from images through a
/// [`RasterDecoder`] and ranks candidate items against a query image.
///
/// # Examples
///
/// ```rust
/// # use libreclaim::prelude::*;
/// # tokio_test::block_on(async {
///   let query = ImageRef::url("https://cdn.example.edu/uploads/found-wallet.jpg");
///   let decoder = MockedDecoder::with_rasters([(query.clone(), PixelBuffer::solid(64, [120, 60, 20]))]);
///   let reclaim = Reclaim::new(decoder).build().unwrap();
///
///   let candidates = vec![Candidate::builder("lost-42").images(vec![query.clone()]).build()];
///   let report = reclaim.rank(&query, candidates, &RankParams::default()).await.unwrap();
///
///   for result in report.matches {
///     println!("{} matches at {:.0}%", result.candidate.id, result.similarity * 100.0);
///   }
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct Reclaim<D: RasterDecoder = HttpRasterDecoder> {
  decoder: D,
  config: Arc<ReclaimConfig>,
  cache: Option<Arc<DescriptorCache>>,
}

#[bon]
impl<D: RasterDecoder> Reclaim<D> {
  /// Create a new Reclaim instance around a decoder.
  ///
  /// This struct can be safely cloned and sent across thread boundaries,
  /// clones share the descriptor cache.
  #[allow(clippy::new_ret_no_self)]
  #[builder(start_fn = new, finish_fn = build)]
  pub fn _new(#[builder(start_fn)] decoder: D, #[builder(default)] config: ReclaimConfig) -> Result<Reclaim<D>, ReclaimError> {
    config.validate()?;

    Ok(Reclaim {
      decoder,
      cache: config.cache_capacity.map(|capacity| Arc::new(DescriptorCache::new(capacity))),
      config: Arc::new(config),
    })
  }
}

impl<D: RasterDecoder> Reclaim<D> {
  pub fn config(&self) -> &ReclaimConfig {
    &self.config
  }

  /// Decode an image and compute its descriptor.
  ///
  /// Decoding is bounded by the configured timeout. Any failure, including a
  /// timeout, is reported as [`ReclaimError::ExtractionFailure`].
  #[instrument(name = "extract_descriptor", skip_all, fields(image = %image))]
  pub async fn extract(&self, image: &ImageRef) -> Result<Arc<ImageDescriptor>, ReclaimError> {
    if let Some(cache) = &self.cache
      && let Some(descriptor) = cache.get(image).await
    {
      tracing::debug!("descriptor cache hit");

      return Ok(descriptor);
    }

    let then = Instant::now();

    let raster = match tokio::time::timeout(self.config.decode_timeout, self.decoder.decode_to_square_raster(image, self.config.side)).await {
      Ok(Ok(raster)) => raster,
      Ok(Err(err)) => {
        counter!("reclaim_extraction_failures_total", "reason" => "decode").increment(1);

        return Err(ReclaimError::extraction(image, err));
      }
      Err(_) => {
        counter!("reclaim_extraction_failures_total", "reason" => "timeout").increment(1);

        return Err(ReclaimError::extraction(image, anyhow::anyhow!("decoding timed out after {}ms", self.config.decode_timeout.as_millis())));
      }
    };

    if raster.side() != self.config.side {
      return Err(ReclaimError::extraction(
        image,
        anyhow::anyhow!("decoder returned a {0}x{0} raster, expected {1}x{1}", raster.side(), self.config.side),
      ));
    }

    let descriptor = Arc::new(ImageDescriptor::describe(&raster, &self.config.descriptor));

    histogram!("reclaim_extraction_latency_seconds").record(then.elapsed().as_secs_f64());

    if let Some(cache) = &self.cache {
      cache.insert(image, Arc::clone(&descriptor)).await;
    }

    Ok(descriptor)
  }

  /// Rank candidates by visual similarity to the query image.
  ///
  /// Fails only when the query image itself cannot be analyzed. Candidates
  /// whose primary image cannot be extracted are skipped and counted in the
  /// returned report.
  pub async fn rank(&self, query: &ImageRef, candidates: Vec<Candidate>, params: &RankParams) -> Result<RankReport, ReclaimError> {
    ranking::rank(self, query, candidates, params).await
  }

  /// Compare two descriptors with the given algorithm.
  pub fn score<A: MatchingAlgorithm>(&self, lhs: &ImageDescriptor, rhs: &ImageDescriptor) -> (f64, Vec<(&'static str, f64)>) {
    A::score(lhs, rhs)
  }

  /// Drop a cached descriptor, returns whether one was present.
  pub async fn invalidate(&self, image: &ImageRef) -> bool {
    match &self.cache {
      Some(cache) => cache.invalidate(image).await,
      None => false,
    }
  }

  /// Drop every cached descriptor.
  pub async fn clear_cache(&self) {
    if let Some(cache) = &self.cache {
      cache.clear().await;
    }
  }

  /// Number of descriptors currently cached, zero when caching is disabled.
  pub async fn cached_descriptors(&self) -> usize {
    match &self.cache {
      Some(cache) => cache.len().await,
      None => 0,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::{Reclaim, ReclaimConfig};
  use crate::{
    error::ReclaimError,
    matching::visual_v1::VisualV1,
    model::ImageRef,
    raster::{
      PixelBuffer,
      mock::{MockedDecoder, MockedImage},
    },
  };

  #[test]
  fn invalid_configurations() {
    for config in [
      ReclaimConfig { side: 0, ..Default::default() },
      ReclaimConfig { concurrency: 0, ..Default::default() },
      ReclaimConfig {
        decode_timeout: Duration::ZERO,
        ..Default::default()
      },
    ] {
      assert!(matches!(Reclaim::new(MockedDecoder::default()).config(config).build(), Err(ReclaimError::ConfigError(_))));
    }
  }

  #[test]
  fn default_configuration() {
    let config = ReclaimConfig::default();

    assert_eq!(config.side, 64);
    assert_eq!(config.concurrency, 6);
    assert_eq!(config.decode_timeout, Duration::from_secs(5));
    assert_eq!(config.descriptor.palette_size, 5);
    assert!(config.cache_capacity.is_none());
  }

  #[tokio::test]
  async fn extract_resamples_to_configured_side() {
    let image = ImageRef::url("http://cdn/large.png");
    let decoder = MockedDecoder::with_rasters([(image.clone(), PixelBuffer::solid(300, [255, 0, 0]))]);
    let reclaim = Reclaim::new(decoder).build().unwrap();

    let descriptor = reclaim.extract(&image).await.unwrap();

    assert_eq!(descriptor.side, 64);
    assert_eq!(descriptor.color_histogram.red[255], 64 * 64);
  }

  #[tokio::test]
  async fn extract_failure_carries_cause() {
    let image = ImageRef::url("http://cdn/broken.png");
    let reclaim = Reclaim::new(MockedDecoder::with_images([(image.clone(), MockedImage::Broken)])).build().unwrap();

    match reclaim.extract(&image).await {
      Err(ReclaimError::ExtractionFailure { reference, source }) => {
        assert_eq!(reference, "http://cdn/broken.png");
        assert!(source.to_string().contains("could not decode image"));
      }
      other => panic!("unexpected result: {other:?}"),
    }
  }

  #[tokio::test(start_paused = true)]
  async fn extract_times_out() {
    let image = ImageRef::url("http://cdn/slow.png");
    let decoder = MockedDecoder::with_images([(image.clone(), MockedImage::Slow(Duration::from_secs(60), PixelBuffer::solid(64, [0, 0, 0])))]);
    let config = ReclaimConfig {
      decode_timeout: Duration::from_millis(100),
      ..Default::default()
    };
    let reclaim = Reclaim::new(decoder).config(config).build().unwrap();

    match reclaim.extract(&image).await {
      Err(ReclaimError::ExtractionFailure { source, .. }) => assert!(source.to_string().contains("timed out")),
      other => panic!("unexpected result: {other:?}"),
    }
  }

  #[tokio::test]
  async fn extract_uses_cache() {
    let image = ImageRef::url("http://cdn/1.png");
    let decoder = MockedDecoder::with_rasters([(image.clone(), PixelBuffer::solid(64, [0, 0, 0]))]);
    let config = ReclaimConfig {
      cache_capacity: Some(16),
      ..Default::default()
    };
    let reclaim = Reclaim::new(decoder.clone()).config(config).build().unwrap();

    let first = reclaim.extract(&image).await.unwrap();
    let second = reclaim.clone().extract(&image).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(decoder.calls(), 1);

    assert!(reclaim.invalidate(&image).await);

    reclaim.extract(&image).await.unwrap();

    assert_eq!(decoder.calls(), 2);
  }

  #[tokio::test]
  async fn clear_cache_forces_new_decodes() {
    let images = [ImageRef::url("http://cdn/1.png"), ImageRef::url("http://cdn/2.png")];
    let decoder = MockedDecoder::with_rasters(images.iter().map(|image| (image.clone(), PixelBuffer::solid(64, [0, 0, 0]))));
    let config = ReclaimConfig {
      cache_capacity: Some(16),
      ..Default::default()
    };
    let reclaim = Reclaim::new(decoder.clone()).config(config).build().unwrap();

    for image in &images {
      reclaim.extract(image).await.unwrap();
    }

    assert_eq!(reclaim.cached_descriptors().await, 2);

    reclaim.clone().clear_cache().await;

    assert_eq!(reclaim.cached_descriptors().await, 0);

    reclaim.extract(&images[0]).await.unwrap();

    assert_eq!(decoder.calls(), 3);
    assert_eq!(reclaim.cached_descriptors().await, 1);
  }

  #[tokio::test]
  async fn extract_without_cache() {
    let image = ImageRef::url("http://cdn/1.png");
    let decoder = MockedDecoder::with_rasters([(image.clone(), PixelBuffer::solid(64, [0, 0, 0]))]);
    let reclaim = Reclaim::new(decoder.clone()).build().unwrap();

    reclaim.extract(&image).await.unwrap();
    reclaim.extract(&image).await.unwrap();

    assert_eq!(decoder.calls(), 2);
    assert!(!reclaim.invalidate(&image).await);

    reclaim.clear_cache().await;

    assert_eq!(reclaim.cached_descriptors().await, 0);
  }

  #[tokio::test]
  async fn score_identical_images() {
    let image = ImageRef::url("http://cdn/1.png");
    let reclaim = Reclaim::new(MockedDecoder::with_rasters([(image.clone(), PixelBuffer::solid(64, [255, 0, 0]))])).build().unwrap();

    let lhs = reclaim.extract(&image).await.unwrap();
    let rhs = reclaim.extract(&image).await.unwrap();

    assert_eq!(lhs, rhs);
    assert_eq!(reclaim.score::<VisualV1>(&lhs, &rhs).0, 1.0);
  }
}
