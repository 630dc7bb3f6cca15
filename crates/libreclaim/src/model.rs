use std::{fmt, path::PathBuf, sync::Arc};

use bon::bon;
use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};
use validator::Validate;

/// A resolvable image source.
///
/// On the wire, references are externally tagged: `{"url": "https://..."}`,
/// `{"path": "/var/uploads/..."}` or `{"data": "<base64>"}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRef {
  Url(String),
  Path(PathBuf),
  #[serde(rename = "data", with = "base64_bytes")]
  Bytes(Arc<[u8]>),
}

impl ImageRef {
  pub fn url(url: impl Into<String>) -> ImageRef {
    ImageRef::Url(url.into())
  }

  pub fn path(path: impl Into<PathBuf>) -> ImageRef {
    ImageRef::Path(path.into())
  }

  pub fn bytes(bytes: impl Into<Arc<[u8]>>) -> ImageRef {
    ImageRef::Bytes(bytes.into())
  }

  /// Key identifying the image content for caching purposes.
  ///
  /// In-memory buffers are keyed by a hash of their content, so two
  /// identical uploads share a cache entry.
  pub fn cache_key(&self) -> String {
    match self {
      ImageRef::Url(url) => format!("url:{url}"),
      ImageRef::Path(path) => format!("path:{}", path.display()),
      ImageRef::Bytes(bytes) => format!("blake3:{}", blake3::hash(bytes).to_hex()),
    }
  }
}

impl fmt::Display for ImageRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ImageRef::Url(url) => write!(f, "{url}"),
      ImageRef::Path(path) => write!(f, "{}", path.display()),
      ImageRef::Bytes(bytes) => write!(f, "<{} bytes in memory>", bytes.len()),
    }
  }
}

mod base64_bytes {
  use std::sync::Arc;

  use base64::{Engine, engine::general_purpose::STANDARD};
  use serde::{Deserialize, Deserializer, Serializer, de::Error};

  pub(super) fn serialize<S: Serializer>(bytes: &Arc<[u8]>, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&STANDARD.encode(bytes))
  }

  pub(super) fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Arc<[u8]>, D::Error> {
    let encoded = String::deserialize(de)?;

    STANDARD.decode(encoded.as_bytes()).map(Into::into).map_err(|err| D::Error::custom(format!("invalid base64 image data: {err}")))
  }
}

/// An item record submitted for comparison.
///
/// Candidates are pre-filtered by the caller (status, lost/found type,
/// category, ownership); `tags` and `metadata` are carried through untouched.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
pub struct Candidate {
  #[validate(length(min = 1, message = "candidate identifiers cannot be empty"))]
  pub id: String,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default)]
  pub images: Vec<ImageRef>,
  #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
  pub metadata: serde_json::Value,
}

impl Candidate {
  /// The image compared against the query.
  pub fn primary_image(&self) -> Option<&ImageRef> {
    self.images.first()
  }
}

#[bon]
impl Candidate {
  #[builder]
  pub fn builder(#[builder(start_fn)] id: &str, #[builder(default)] tags: &[&str], images: Vec<ImageRef>) -> Candidate {
    Candidate {
      id: id.to_string(),
      tags: tags.iter().map(|tag| tag.to_string()).collect(),
      images,
      metadata: serde_json::Value::Null,
    }
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct MatchResult {
  pub candidate: Candidate,
  pub similarity: f64,
  pub matched_image: ImageRef,
  #[serde(serialize_with = "features_to_map")]
  pub features: Vec<(&'static str, f64)>,
}

/// Output of a ranking pass.
///
/// `failed` counts candidates whose image could not be extracted (including
/// timeouts), `skipped` those that carried no image at all.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RankReport {
  pub matches: Vec<MatchResult>,
  pub candidates: usize,
  pub failed: usize,
  pub skipped: usize,
}

/// Serializes named sub-scores as a JSON object, keeping their table order.
pub fn features_to_map<S: Serializer>(input: &[(&'static str, f64)], ser: S) -> Result<S::Ok, S::Error> {
  let mut map = ser.serialize_map(Some(input.len()))?;
  for (k, v) in input {
    map.serialize_entry(k, &v)?;
  }
  map.end()
}
