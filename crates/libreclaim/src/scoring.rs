use std::sync::Arc;

use metrics::histogram;
use opentelemetry::global;
use tokio::time::Instant;
use tracing::{Span, instrument};

use crate::{descriptor::ImageDescriptor, matching::MatchingAlgorithm};

pub type Scored<T> = (T, f64, Vec<(&'static str, f64)>);

/// Score every hit against the query descriptor, preserving input order.
#[instrument(name = "compute_scores", skip_all, fields(algorithm = A::name(), hits = hits.len()))]
pub fn score<A: MatchingAlgorithm, T>(query: &ImageDescriptor, hits: Vec<(T, Arc<ImageDescriptor>)>) -> Vec<Scored<T>> {
  let span = Span::current();
  let then = Instant::now();

  let results = hits
    .into_iter()
    .map(|(hit, descriptor)| {
      let _enter = span.enter();
      let (score, features) = A::score(query, &descriptor);

      tracing::debug!(score = score, "computed score");

      histogram!("reclaim_scoring_scores").record(score);

      (hit, score, features)
    })
    .collect::<Vec<_>>();

  histogram!("reclaim_scoring_latency_seconds").record(then.elapsed().as_secs_f64());

  global::meter("reclaim").f64_histogram("scoring_latency").build().record(then.elapsed().as_secs_f64() * 1000.0, &[]);

  results
}
