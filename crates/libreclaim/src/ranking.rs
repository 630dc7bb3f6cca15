use std::sync::Arc;

use anyhow::Context;
use itertools::Itertools;
use metrics::{counter, histogram};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{Instrument, instrument};

use crate::{
  descriptor::ImageDescriptor,
  error::ReclaimError,
  matching::{Algorithm, RankParams, visual_symmetric::VisualSymmetric, visual_v1::VisualV1},
  model::{Candidate, ImageRef, MatchResult, RankReport},
  raster::RasterDecoder,
  reclaim::Reclaim,
  scoring,
};

struct Extracted {
  position: usize,
  candidate: Candidate,
  image: ImageRef,
}

type ExtractionTask = (usize, Candidate, ImageRef, Result<Arc<ImageDescriptor>, ReclaimError>);

#[instrument(name = "rank_candidates", skip_all, fields(candidates = candidates.len(), algorithm = %params.algorithm))]
pub(crate) async fn rank<D: RasterDecoder>(reclaim: &Reclaim<D>, query: &ImageRef, candidates: Vec<Candidate>, params: &RankParams) -> Result<RankReport, ReclaimError> {
  let total = candidates.len();
  let semaphore = Arc::new(Semaphore::new(reclaim.config().concurrency));

  // Dropping the set aborts whatever is still in flight, so an abandoned
  // ranking does not keep decoding images.
  let mut tasks: JoinSet<ExtractionTask> = JoinSet::new();
  let mut skipped = 0;

  for (position, candidate) in candidates.into_iter().enumerate() {
    let Some(image) = candidate.primary_image().cloned() else {
      tracing::debug!(candidate = %candidate.id, "candidate has no image, skipping");

      skipped += 1;
      continue;
    };

    let reclaim = reclaim.clone();
    let semaphore = Arc::clone(&semaphore);

    tasks.spawn(
      async move {
        let result = extract_bounded(&reclaim, &semaphore, &image).await;

        (position, candidate, image, result)
      }
      .in_current_span(),
    );
  }

  let query_descriptor = async { extract_bounded(reclaim, &semaphore, query).await.map_err(|err| ReclaimError::QueryImageInvalid(Box::new(err))) };

  let (query_descriptor, (extracted, failed)) = tokio::try_join!(query_descriptor, collect(&mut tasks))?;

  let scores = match params.algorithm {
    Algorithm::VisualV1 => scoring::score::<VisualV1, _>(&query_descriptor, extracted),
    Algorithm::VisualSymmetric => scoring::score::<VisualSymmetric, _>(&query_descriptor, extracted),
  };

  let scored = scores.len();

  let matches = scores
    .into_iter()
    .filter(|(_, score, _)| *score >= params.threshold)
    .sorted_by(|(lhs, lscore, _), (rhs, rscore, _)| lscore.total_cmp(rscore).reverse().then_with(|| lhs.position.cmp(&rhs.position)))
    .take(params.limit)
    .map(|(extracted, similarity, features)| MatchResult {
      candidate: extracted.candidate,
      similarity,
      matched_image: extracted.image,
      features,
    })
    .collect::<Vec<_>>();

  histogram!("reclaim_matches_above_threshold_total").record(matches.len() as f64);
  histogram!("reclaim_matches_below_threshold_total").record(scored.saturating_sub(matches.len()) as f64);

  if failed > 0 {
    tracing::warn!(failed = failed, total = total, "some candidate images could not be analyzed");
  }

  Ok(RankReport {
    matches,
    candidates: total,
    failed,
    skipped,
  })
}

async fn extract_bounded<D: RasterDecoder>(reclaim: &Reclaim<D>, semaphore: &Semaphore, image: &ImageRef) -> Result<Arc<ImageDescriptor>, ReclaimError> {
  let _permit = semaphore.acquire().await.context("extraction pool was closed")?;

  reclaim.extract(image).await
}

async fn collect(tasks: &mut JoinSet<ExtractionTask>) -> Result<(Vec<(Extracted, Arc<ImageDescriptor>)>, usize), ReclaimError> {
  let mut extracted = Vec::with_capacity(tasks.len());
  let mut failed = 0;

  while let Some(joined) = tasks.join_next().await {
    match joined {
      Ok((position, candidate, image, Ok(descriptor))) => extracted.push((Extracted { position, candidate, image }, descriptor)),

      Ok((_, candidate, image, Err(err))) => {
        failed += 1;

        counter!("reclaim_candidate_failures_total").increment(1);

        tracing::warn!(candidate = %candidate.id, image = %image, error = ?err, "could not analyze candidate image, skipping");
      }

      Err(err) => {
        failed += 1;

        tracing::error!(error = %err, "candidate extraction task did not complete");
      }
    }
  }

  Ok((extracted, failed))
}
