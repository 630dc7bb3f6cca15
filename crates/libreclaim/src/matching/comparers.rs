use crate::descriptor::{ColorHistogram, DominantColor};

/// Largest possible euclidean distance between two RGB colors.
pub(crate) const MAX_RGB_DISTANCE: f64 = 441.672_955_930_063_7; // 255 * sqrt(3)

/// Sum of per-bin minimums across all three channels, over `samples`.
pub(crate) fn histogram_overlap(lhs: &ColorHistogram, rhs: &ColorHistogram, samples: u64) -> f64 {
  if samples == 0 {
    return 0.0;
  }

  let shared: u64 = lhs
    .channels()
    .iter()
    .zip(rhs.channels().iter())
    .map(|(lhs, rhs)| lhs.iter().zip(rhs.iter()).map(|(l, r)| (*l).min(*r) as u64).sum::<u64>())
    .sum();

  shared as f64 / samples as f64
}

#[inline]
pub(crate) fn color_distance(lhs: &DominantColor, rhs: &DominantColor) -> f64 {
  let dr = lhs.r as f64 - rhs.r as f64;
  let dg = lhs.g as f64 - rhs.g as f64;
  let db = lhs.b as f64 - rhs.b as f64;

  (dr * dr + dg * dg + db * db).sqrt()
}

#[inline]
pub(crate) fn color_similarity(lhs: &DominantColor, rhs: &DominantColor) -> f64 {
  1.0 - color_distance(lhs, rhs) / MAX_RGB_DISTANCE
}

/// Average, over every color of `lhs`, of its best similarity in `rhs`.
///
/// This is directional: a small palette fully contained in a larger one
/// scores 1.0 one way and less the other way.
pub(crate) fn palette_similarity(lhs: &[DominantColor], rhs: &[DominantColor]) -> f64 {
  if lhs.is_empty() {
    return 0.0;
  }

  let total: f64 = lhs.iter().map(|color| rhs.iter().map(|other| color_similarity(color, other)).fold(0.0, f64::max)).sum();

  total / lhs.len() as f64
}

/// `1 - |lhs - rhs| / max(lhs, rhs, floor)`.
#[inline]
pub(crate) fn relative_closeness(lhs: f64, rhs: f64, floor: f64) -> f64 {
  1.0 - (lhs - rhs).abs() / lhs.max(rhs).max(floor)
}

/// `1 - |lhs - rhs| / range`.
#[inline]
pub(crate) fn absolute_closeness(lhs: f64, rhs: f64, range: f64) -> f64 {
  1.0 - (lhs - rhs).abs() / range
}
