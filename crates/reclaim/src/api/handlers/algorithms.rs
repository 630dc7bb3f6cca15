use axum::Json;
use libreclaim::prelude::*;

use crate::api::dto::{AlgorithmDescription, Algorithms, FeatureDescription};

pub async fn algorithms() -> Json<Algorithms> {
  let algorithms = Algorithm::ALL
    .iter()
    .map(|algorithm| AlgorithmDescription {
      name: algorithm.name(),
      features: algorithm
        .features()
        .iter()
        .map(|(feature, weight)| FeatureDescription {
          name: feature.name(),
          description: feature.description(),
          weight: *weight,
        })
        .collect(),
    })
    .collect();

  Json(Algorithms {
    algorithms,
    default: Algorithm::default().name(),
  })
}
