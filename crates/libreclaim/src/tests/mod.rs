use std::io::Cursor;

use image::ImageFormat;

use crate::{
  descriptor::{DescriptorParams, ImageDescriptor},
  raster::PixelBuffer,
};

pub(crate) fn checkerboard(side: u32, even: [u8; 3], odd: [u8; 3]) -> PixelBuffer {
  PixelBuffer::from_fn(side, |x, y| if (x + y) % 2 == 0 { even } else { odd })
}

pub(crate) fn gradient(side: u32) -> PixelBuffer {
  PixelBuffer::from_fn(side, |x, y| [(x * 4 % 256) as u8, (y * 4 % 256) as u8, ((x + y) * 2 % 256) as u8])
}

pub(crate) fn describe(raster: &PixelBuffer) -> ImageDescriptor {
  ImageDescriptor::describe(raster, &DescriptorParams::default())
}

pub(crate) fn encode_png(raster: &PixelBuffer) -> Vec<u8> {
  let mut bytes = Vec::new();

  raster.as_image().write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();

  bytes
}
