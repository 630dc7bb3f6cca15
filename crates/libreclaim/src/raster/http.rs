use std::sync::Arc;

use anyhow::Context;
use reqwest::Client;

use crate::{
  model::ImageRef,
  raster::{PixelBuffer, RasterDecoder, decode_bytes},
};

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Default decoder: fetches remote references over HTTP, reads local ones
/// from disk, and decodes on the blocking thread pool.
#[derive(Clone, Debug)]
pub struct HttpRasterDecoder {
  client: Client,
  max_bytes: usize,
}

impl Default for HttpRasterDecoder {
  fn default() -> Self {
    HttpRasterDecoder::new(Client::new(), DEFAULT_MAX_IMAGE_BYTES)
  }
}

impl HttpRasterDecoder {
  pub fn new(client: Client, max_bytes: usize) -> HttpRasterDecoder {
    HttpRasterDecoder { client, max_bytes }
  }

  async fn load(&self, image: &ImageRef) -> anyhow::Result<Arc<[u8]>> {
    let bytes: Arc<[u8]> = match image {
      ImageRef::Bytes(bytes) => Arc::clone(bytes),

      ImageRef::Path(path) => {
        let metadata = tokio::fs::metadata(path).await.with_context(|| format!("could not read image file {}", path.display()))?;

        if metadata.len() > self.max_bytes as u64 {
          anyhow::bail!("image is too large ({} bytes, at most {} allowed)", metadata.len(), self.max_bytes);
        }

        tokio::fs::read(path).await.with_context(|| format!("could not read image file {}", path.display()))?.into()
      }

      ImageRef::Url(url) => {
        let mut response = self
          .client
          .get(url)
          .send()
          .await
          .context("could not reach image location")?
          .error_for_status()
          .context("image location returned an error")?;

        if let Some(length) = response.content_length()
          && length > self.max_bytes as u64
        {
          anyhow::bail!("image is too large ({length} bytes, at most {} allowed)", self.max_bytes);
        }

        // Content-Length is optional, chunked bodies are only bounded while reading.
        let mut body = Vec::with_capacity(response.content_length().map_or(0, |length| length as usize));

        while let Some(chunk) = response.chunk().await.context("could not read image body")? {
          if body.len() + chunk.len() > self.max_bytes {
            anyhow::bail!("image is too large (more than {} bytes)", self.max_bytes);
          }

          body.extend_from_slice(&chunk);
        }

        body.into()
      }
    };

    if bytes.len() > self.max_bytes {
      anyhow::bail!("image is too large ({} bytes, at most {} allowed)", bytes.len(), self.max_bytes);
    }

    Ok(bytes)
  }
}

impl RasterDecoder for HttpRasterDecoder {
  async fn decode_to_square_raster(&self, image: &ImageRef, side: u32) -> anyhow::Result<PixelBuffer> {
    let bytes = self.load(image).await?;

    tokio::task::spawn_blocking(move || decode_bytes(&bytes, side)).await.context("decoding task did not complete")?
  }
}
