use std::net::{IpAddr, Ipv4Addr};

use libreclaim::prelude::*;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Clone, Debug, Deserialize, Validate)]
pub(crate) struct SimilarPayload {
  pub query: ImageRef,
  #[validate(nested)]
  pub candidates: Vec<Candidate>,

  #[serde(default)]
  #[validate(nested)]
  pub params: RankParams,
}

impl SimilarPayload {
  pub fn references_forbidden_locations(&self, allow_internal: bool) -> bool {
    is_forbidden(&self.query, allow_internal) || self.candidates.iter().flat_map(|candidate| &candidate.images).any(|image| is_forbidden(image, allow_internal))
  }
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub(crate) struct DescriptorPayload {
  pub image: ImageRef,
}

/// Server-side paths are only reachable through the library, never over HTTP.
///
/// URLs must use http(s), and unless `allow_internal` is set, cannot name a
/// loopback, private or link-local address. Host names are not resolved.
pub(crate) fn is_forbidden(image: &ImageRef, allow_internal: bool) -> bool {
  match image {
    ImageRef::Path(_) => true,
    ImageRef::Bytes(_) => false,
    ImageRef::Url(url) => match Url::parse(url) {
      Ok(url) if !matches!(url.scheme(), "http" | "https") => true,
      Ok(url) => !allow_internal && url.host_str().is_some_and(is_internal_host),
      Err(_) => false,
    },
  }
}

fn is_internal_host(host: &str) -> bool {
  let host = host.trim_start_matches('[').trim_end_matches(']').trim_end_matches('.');

  match host.parse::<IpAddr>() {
    Ok(IpAddr::V4(ip)) => is_internal_v4(ip),
    Ok(IpAddr::V6(ip)) => match ip.to_ipv4_mapped() {
      Some(ip) => is_internal_v4(ip),
      None => ip.is_loopback() || ip.is_unspecified() || (ip.segments()[0] & 0xfe00) == 0xfc00 || (ip.segments()[0] & 0xffc0) == 0xfe80,
    },
    Err(_) => {
      let host = host.to_ascii_lowercase();

      host == "localhost" || host.ends_with(".localhost")
    }
  }
}

fn is_internal_v4(ip: Ipv4Addr) -> bool {
  ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified() || ip.is_broadcast()
}

#[derive(Default, Serialize)]
pub(super) struct SimilarResponse {
  pub results: Vec<SimilarHit>,
  pub total: usize,
  pub candidates: usize,
  pub failed: usize,
  pub skipped: usize,
}

impl From<RankReport> for SimilarResponse {
  fn from(report: RankReport) -> Self {
    let results = report.matches.into_iter().map(SimilarHit::from).collect::<Vec<_>>();

    SimilarResponse {
      total: results.len(),
      results,
      candidates: report.candidates,
      failed: report.failed,
      skipped: report.skipped,
    }
  }
}

#[derive(Serialize)]
pub(super) struct SimilarHit {
  pub candidate: Candidate,
  pub similarity: f64,
  pub percentage: u8,
  pub confidence: Confidence,
  pub matched_image: ImageRef,
  #[serde(serialize_with = "features_to_map")]
  pub features: Vec<(&'static str, f64)>,
}

impl From<MatchResult> for SimilarHit {
  fn from(result: MatchResult) -> Self {
    SimilarHit {
      percentage: (result.similarity * 100.0).round().clamp(0.0, 100.0) as u8,
      confidence: Confidence::of(result.similarity, &result.features),
      similarity: result.similarity,
      features: result.features,
      candidate: result.candidate,
      matched_image: result.matched_image,
    }
  }
}

/// Coarse label shown next to a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
  High,
  Medium,
  Low,
}

impl Confidence {
  pub fn of(similarity: f64, features: &[(&'static str, f64)]) -> Confidence {
    let mean = match features.len() {
      0 => 0.0,
      count => features.iter().map(|(_, score)| score).sum::<f64>() / count as f64,
    };

    match similarity {
      s if s > 0.7 && mean > 0.6 && features.len() >= 4 => Confidence::High,
      s if s > 0.5 && mean > 0.4 => Confidence::Medium,
      _ => Confidence::Low,
    }
  }
}

#[derive(Serialize)]
pub struct Algorithms {
  pub algorithms: Vec<AlgorithmDescription>,
  pub default: &'static str,
}

#[derive(Serialize)]
pub struct AlgorithmDescription {
  pub name: &'static str,
  pub features: Vec<FeatureDescription>,
}

#[derive(Serialize)]
pub struct FeatureDescription {
  pub name: &'static str,
  pub description: &'static str,
  pub weight: f64,
}
