//! # Percentile Filters
//!
//! Post-hoc reductions of an evaluated candidate table by one metric
//! column. A single [`Metric`] tag carries the column accessor and the
//! "better" direction, so risk, Sharpe and returns share one filtering
//! path instead of three duplicated ones.

use std::cmp::Ordering;

use crate::evaluator::PortfolioCandidate;

/// Ranking metric over a candidate table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
  Returns,
  Risk,
  Sharpe,
}

impl Metric {
  /// Column accessor.
  pub fn value(&self, candidate: &PortfolioCandidate) -> f64 {
    match self {
      Metric::Returns => candidate.returns,
      Metric::Risk => candidate.risk,
      Metric::Sharpe => candidate.sharpe,
    }
  }

  /// Natural "better" direction: lower for risk, higher otherwise.
  pub fn lower_is_better(&self) -> bool {
    matches!(self, Metric::Risk)
  }

  fn better_first(&self, a: &PortfolioCandidate, b: &PortfolioCandidate) -> Ordering {
    let ord = self
      .value(a)
      .partial_cmp(&self.value(b))
      .unwrap_or(Ordering::Equal);
    if self.lower_is_better() {
      ord
    } else {
      ord.reverse()
    }
  }
}

/// Percentile by linear interpolation over a sorted column.
fn percentile(sorted: &[f64], q: f64) -> f64 {
  match sorted.len() {
    0 => f64::NAN,
    1 => sorted[0],
    n => {
      let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
      let lo = rank.floor() as usize;
      let hi = rank.ceil() as usize;
      let frac = rank - lo as f64;
      sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
  }
}

fn sorted_column(data: &[PortfolioCandidate], metric: Metric) -> Vec<f64> {
  let mut column: Vec<f64> = data.iter().map(|c| metric.value(c)).collect();
  column.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
  column
}

fn keep_at_or_better(data: &[PortfolioCandidate], metric: Metric, q: f64) -> Vec<PortfolioCandidate> {
  if data.is_empty() {
    return Vec::new();
  }
  let threshold = percentile(&sorted_column(data, metric), q);
  data
    .iter()
    .filter(|c| {
      let v = metric.value(c);
      if metric.lower_is_better() {
        v <= threshold
      } else {
        v >= threshold
      }
    })
    .cloned()
    .collect()
}

/// Keep the best `size` candidates by the metric's natural direction.
pub fn shave(data: &[PortfolioCandidate], metric: Metric, size: usize) -> Vec<PortfolioCandidate> {
  let mut out = data.to_vec();
  out.sort_by(|a, b| metric.better_first(a, b));
  out.truncate(size);
  out
}

/// Keep candidates at or better than the lenient quartile threshold:
/// risk at or below its 75th percentile, Sharpe/returns at or above
/// their 25th.
pub fn trim(data: &[PortfolioCandidate], metric: Metric) -> Vec<PortfolioCandidate> {
  let q = if metric.lower_is_better() { 0.75 } else { 0.25 };
  keep_at_or_better(data, metric, q)
}

/// The stricter complement of [`trim`]: risk at or below its 25th
/// percentile, Sharpe/returns at or above their 75th.
pub fn cut(data: &[PortfolioCandidate], metric: Metric) -> Vec<PortfolioCandidate> {
  let q = if metric.lower_is_better() { 0.25 } else { 0.75 };
  keep_at_or_better(data, metric, q)
}

/// Quartile buckets ordered best to worst, empty buckets dropped.
pub fn quartile_bins(data: &[PortfolioCandidate], metric: Metric) -> Vec<Vec<PortfolioCandidate>> {
  if data.is_empty() {
    return Vec::new();
  }

  let column = sorted_column(data, metric);
  let p25 = percentile(&column, 0.25);
  let p50 = percentile(&column, 0.50);
  let p75 = percentile(&column, 0.75);

  let mut bins: Vec<Vec<PortfolioCandidate>> = vec![Vec::new(); 4];
  for candidate in data {
    let v = metric.value(candidate);
    let idx = if metric.lower_is_better() {
      if v < p25 {
        0
      } else if v < p50 {
        1
      } else if v < p75 {
        2
      } else {
        3
      }
    } else if v > p75 {
      0
    } else if v > p50 {
      1
    } else if v > p25 {
      2
    } else {
      3
    };
    bins[idx].push(candidate.clone());
  }

  bins.retain(|bin| !bin.is_empty());
  bins
}
