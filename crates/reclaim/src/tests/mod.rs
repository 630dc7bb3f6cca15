use libreclaim::prelude::*;

use crate::api::{AppState, config::Config};

mod middlewares;

pub(super) fn decoder() -> MockedDecoder {
  MockedDecoder::with_images([
    (ImageRef::url("http://cdn/query.png"), MockedImage::Raster(PixelBuffer::solid(64, [255, 0, 0]))),
    (ImageRef::url("http://cdn/red.png"), MockedImage::Raster(PixelBuffer::solid(64, [255, 0, 0]))),
    (ImageRef::url("http://cdn/blue.png"), MockedImage::Raster(PixelBuffer::solid(64, [0, 0, 255]))),
    (ImageRef::bytes(vec![1u8, 2, 3]), MockedImage::Raster(PixelBuffer::solid(32, [255, 0, 0]))),
    (ImageRef::url("http://cdn/broken.png"), MockedImage::Broken),
  ])
}

pub(super) fn state(config: Config) -> AppState<MockedDecoder> {
  AppState {
    reclaim: Reclaim::new(decoder()).config(config.reclaim_config()).build().unwrap(),
    prometheus: None,
    config,
  }
}
