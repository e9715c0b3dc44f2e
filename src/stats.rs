//! # Single-Asset Risk/Return Estimator
//!
//! $$
//! S = \frac{\mu - r_f}{\sigma}
//! $$
//!
//! Mean, volatility and Sharpe ratio for one asset's return series, with an
//! optional exponentially weighted recency bias matching pandas `ewm`
//! semantics (`adjust = true`, bias-corrected standard deviation).

use tracing::warn;

use crate::series::ReturnSeries;

/// Clamp a possibly negative count-like parameter to zero, with a warning.
pub(crate) fn clamp_count(name: &str, value: i64) -> usize {
  if value < 0 {
    warn!(name, value, "negative parameter clamped to 0");
    0
  } else {
    value as usize
  }
}

/// Clamp a possibly negative rate to zero, with a warning.
pub(crate) fn clamp_rate(name: &str, value: f64) -> f64 {
  if value < 0.0 {
    warn!(name, value, "negative parameter clamped to 0");
    0.0
  } else {
    value
  }
}

/// Estimator configuration. Negative values are clamped to 0 with a logged
/// warning rather than treated as fatal.
#[derive(Clone, Copy, Debug)]
pub struct SharpeConfig {
  /// Annualization factor: periods per year, 0 disables annualization.
  pub period: i64,
  /// Baseline return of a zero-risk investment.
  pub risk_free_rate: f64,
  /// Exponential-weighting window; 0 selects the plain mean/std path.
  pub span: i64,
}

impl Default for SharpeConfig {
  fn default() -> Self {
    Self {
      period: 252,
      risk_free_rate: 0.02,
      span: 500,
    }
  }
}

/// Per-asset risk/return record. Derived once per request, never mutated.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AssetStats {
  /// Mean return, annualized when `period > 0`.
  pub returns: f64,
  /// Return volatility, annualized when `period > 0`.
  pub risk: f64,
  /// `(returns - risk_free_rate) / risk`, 0 when risk is 0.
  pub sharpe: f64,
  /// Number of return observations actually seen.
  pub len: usize,
}

fn sample_mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    0.0
  } else {
    xs.iter().sum::<f64>() / xs.len() as f64
  }
}

fn sample_std(xs: &[f64], mean: f64) -> f64 {
  if xs.len() < 2 {
    return 0.0;
  }
  let mut acc = 0.0;
  for &x in xs {
    let d = x - mean;
    acc += d * d;
  }
  (acc / (xs.len() - 1) as f64).sqrt()
}

/// Exponentially weighted mean and standard deviation, last fitted value.
///
/// Matches pandas `ewm(span=span).mean()/.std()` with `adjust = true`:
/// observation at lag `i` carries weight `(1 - alpha)^i`, and the variance
/// gets the `W1^2 / (W1^2 - W2)` reliability correction.
fn ewm_mean_std(xs: &[f64], span: usize) -> (f64, f64) {
  if xs.is_empty() {
    return (0.0, 0.0);
  }

  let alpha = 2.0 / (span as f64 + 1.0);
  let decay = 1.0 - alpha;

  let mut w = 1.0;
  let mut w1 = 0.0;
  let mut w2 = 0.0;
  let mut weighted_sum = 0.0;
  for &x in xs.iter().rev() {
    w1 += w;
    w2 += w * w;
    weighted_sum += w * x;
    w *= decay;
  }
  let mean = weighted_sum / w1;

  let mut w = 1.0;
  let mut weighted_sq_dev = 0.0;
  for &x in xs.iter().rev() {
    let d = x - mean;
    weighted_sq_dev += w * d * d;
    w *= decay;
  }

  let denom = w1 * w1 - w2;
  if denom <= 0.0 {
    return (mean, 0.0);
  }
  let var = weighted_sq_dev / w1 * (w1 * w1 / denom);
  (mean, var.max(0.0).sqrt())
}

/// Risk/return/Sharpe for a single asset's return series.
///
/// Fewer observations than `period` signal insufficient history: the result
/// is all-zero except for the observation count. A zero-risk asset reports
/// Sharpe 0 rather than infinity.
pub fn asset_stats(returns: &ReturnSeries, cfg: &SharpeConfig) -> AssetStats {
  let period = clamp_count("period", cfg.period);
  let risk_free_rate = clamp_rate("risk_free_rate", cfg.risk_free_rate);
  let span = clamp_count("span", cfg.span);

  let xs = returns.values();
  let len = xs.len();
  if len < period {
    return AssetStats {
      len,
      ..AssetStats::default()
    };
  }

  let (mut returns, mut risk) = if span == 0 {
    let mean = sample_mean(xs);
    (mean, sample_std(xs, mean))
  } else {
    ewm_mean_std(xs, span)
  };

  if period > 0 {
    returns *= period as f64;
    risk *= (period as f64).sqrt();
  }

  let sharpe = if risk != 0.0 {
    (returns - risk_free_rate) / risk
  } else {
    0.0
  };

  AssetStats {
    returns,
    risk,
    sharpe,
    len,
  }
}
