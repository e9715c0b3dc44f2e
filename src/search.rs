//! # Monte Carlo Search
//!
//! $$
//! \mathbf{w}^\* = \arg\max_{k} S(\mathbf{w}_k), \qquad
//! \mathbf{w}^{\dagger} = \arg\min_{k} \sigma(\mathbf{w}_k)
//! $$
//!
//! Randomized search over portfolio weightings: sample, evaluate against a
//! shared covariance model, and keep the maximum-Sharpe and minimum-risk
//! candidates. Trials are embarrassingly parallel; selection is an
//! associative reduction with a first-seen tie-break, so the outcome does
//! not depend on the worker count.

use ndarray::Array1;
use rayon::prelude::*;
use tracing::debug;
use tracing::warn;

use crate::covariance::CovarianceModel;
use crate::error::EngineError;
use crate::evaluator::evaluate_portfolio;
use crate::evaluator::PortfolioCandidate;
use crate::evaluator::PortfolioEval;
use crate::sampler::WeightSampler;
use crate::series::PricePanel;
use crate::stats::clamp_count;
use crate::stats::clamp_rate;

/// Search configuration. Negative values are clamped to 0 with a logged
/// warning, matching the estimator's policy.
#[derive(Clone, Copy, Debug)]
pub struct SearchConfig {
  /// Number of Monte Carlo trials.
  pub portfolios: i64,
  /// Annualization factor, periods per year.
  pub period: i64,
  /// Baseline return of a zero-risk investment.
  pub risk_free_rate: f64,
  /// Exponential-weighting window, carried for single-asset estimation;
  /// the portfolio path uses plain sample moments.
  pub span: i64,
  /// Optional seed for reproducible trial streams.
  pub seed: Option<u64>,
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      portfolios: 25_000,
      period: 252,
      risk_free_rate: 0.02,
      span: 500,
      seed: None,
    }
  }
}

/// Terminal output of one search invocation. Both selections are `None`
/// only when the requested universe was empty.
#[derive(Clone, Debug, Default)]
pub struct SearchOutcome {
  /// Symbols actually retained from the request, in request order.
  pub symbols: Vec<String>,
  /// Candidate with the highest Sharpe ratio.
  pub max_sharpe: Option<PortfolioCandidate>,
  /// Candidate with the lowest risk.
  pub min_risk: Option<PortfolioCandidate>,
}

impl SearchOutcome {
  pub fn is_empty(&self) -> bool {
    self.max_sharpe.is_none() && self.min_risk.is_none()
  }
}

/// Monte Carlo driver over a price panel.
#[derive(Clone, Debug)]
pub struct MonteCarloSearch {
  config: SearchConfig,
}

impl MonteCarloSearch {
  pub fn new(config: SearchConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &SearchConfig {
    &self.config
  }

  /// Run the full search: restrict the panel to the requested symbols,
  /// estimate the covariance model, evaluate every trial, and select the
  /// maximum-Sharpe and minimum-risk candidates.
  ///
  /// Symbols missing from the panel are dropped; an entirely absent
  /// universe yields an empty outcome, not an error. Zero requested trials
  /// over a non-empty universe fail with [`EngineError::NoCandidates`].
  pub fn run(&self, panel: &PricePanel, symbols: &[&str]) -> Result<SearchOutcome, EngineError> {
    let retained = panel.select(symbols);
    if retained.width() == 0 {
      warn!(requested = symbols.len(), "no requested symbols present in the panel");
      return Ok(SearchOutcome::default());
    }

    let trials = self.trials_for(&retained)?;
    let (max_sharpe, min_risk) = select_optima(&trials)?;

    Ok(SearchOutcome {
      symbols: retained.symbols().to_vec(),
      max_sharpe: Some(max_sharpe),
      min_risk: Some(min_risk),
    })
  }

  /// The full evaluated trial table, for post-hoc filtering. An empty
  /// universe yields an empty table.
  pub fn trials(
    &self,
    panel: &PricePanel,
    symbols: &[&str],
  ) -> Result<Vec<PortfolioCandidate>, EngineError> {
    let retained = panel.select(symbols);
    if retained.width() == 0 {
      return Ok(Vec::new());
    }
    self.trials_for(&retained)
  }

  /// Evaluate one caller-supplied weight vector against the covariance
  /// model estimated from the panel's aligned returns.
  ///
  /// Requested symbols absent from the panel are dropped, so the weight
  /// vector must match the retained universe; a length mismatch fails with
  /// [`EngineError::MalformedCovariance`].
  pub fn weighted_sharpe(
    &self,
    panel: &PricePanel,
    symbols: &[&str],
    weights: &Array1<f64>,
  ) -> Result<PortfolioEval, EngineError> {
    let retained = panel.select(symbols);
    let model = CovarianceModel::from_panel(&retained)?;
    let period = clamp_count("period", self.config.period);
    let risk_free_rate = clamp_rate("risk_free_rate", self.config.risk_free_rate);
    evaluate_portfolio(&model, period, risk_free_rate, weights)
  }

  fn trials_for(&self, panel: &PricePanel) -> Result<Vec<PortfolioCandidate>, EngineError> {
    let portfolios = clamp_count("portfolios", self.config.portfolios);
    let period = clamp_count("period", self.config.period);
    let risk_free_rate = clamp_rate("risk_free_rate", self.config.risk_free_rate);
    if portfolios == 0 {
      return Err(EngineError::NoCandidates);
    }

    // Computed once, shared read-only by every worker.
    let model = CovarianceModel::from_panel(panel)?;
    let sampler = WeightSampler::new(panel.width(), portfolios, self.config.seed);
    debug!(
      assets = panel.width(),
      portfolios, period, "starting Monte Carlo trials"
    );

    (0..portfolios)
      .into_par_iter()
      .map(|trial| {
        let mut rng = sampler.trial_rng(trial);
        let weights = sampler.draw(&mut rng);
        let eval = evaluate_portfolio(&model, period, risk_free_rate, &weights)?;
        Ok(PortfolioCandidate {
          trial,
          returns: eval.returns,
          risk: eval.risk,
          sharpe: eval.sharpe,
          weights,
        })
      })
      .collect()
  }
}

fn higher_sharpe<'a>(a: &'a PortfolioCandidate, b: &'a PortfolioCandidate) -> &'a PortfolioCandidate {
  if b.sharpe > a.sharpe || (b.sharpe == a.sharpe && b.trial < a.trial) {
    b
  } else {
    a
  }
}

fn lower_risk<'a>(a: &'a PortfolioCandidate, b: &'a PortfolioCandidate) -> &'a PortfolioCandidate {
  if b.risk < a.risk || (b.risk == a.risk && b.trial < a.trial) {
    b
  } else {
    a
  }
}

/// Select the maximum-Sharpe and minimum-risk candidates. Ties go to the
/// lowest trial index, which makes the reduction associative and the
/// result independent of partitioning.
pub fn select_optima(
  trials: &[PortfolioCandidate],
) -> Result<(PortfolioCandidate, PortfolioCandidate), EngineError> {
  trials
    .par_iter()
    .map(|candidate| (candidate, candidate))
    .reduce_with(|a, b| (higher_sharpe(a.0, b.0), lower_risk(a.1, b.1)))
    .map(|(best_sharpe, best_risk)| (best_sharpe.clone(), best_risk.clone()))
    .ok_or(EngineError::NoCandidates)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use chrono::NaiveDate;
  use ndarray::arr1;
  use rand::rngs::StdRng;
  use rand::Rng;
  use rand::SeedableRng;

  use super::select_optima;
  use super::MonteCarloSearch;
  use super::SearchConfig;
  use crate::error::EngineError;
  use crate::evaluator::PortfolioCandidate;
  use crate::series::PricePanel;

  fn synthetic_panel() -> PricePanel {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let days = 300;
    let dates: Vec<_> = (0..days).map(|i| start + chrono::Duration::days(i)).collect();

    let mut rng = StdRng::seed_from_u64(9);
    let mut column = |drift: f64, vol: f64| -> Vec<f64> {
      let mut closes = Vec::with_capacity(days as usize);
      let mut price = 100.0;
      for _ in 0..days {
        closes.push(price);
        let shock: f64 = rng.gen_range(-1.0..1.0);
        price *= 1.0 + drift + vol * shock;
      }
      closes
    };

    PricePanel::new(
      dates,
      vec![
        ("AAA".to_string(), column(0.0006, 0.01)),
        ("BBB".to_string(), column(0.0004, 0.02)),
        ("CCC".to_string(), column(0.0002, 0.005)),
      ],
    )
    .unwrap()
  }

  fn candidate(trial: usize, returns: f64, risk: f64, sharpe: f64) -> PortfolioCandidate {
    PortfolioCandidate {
      trial,
      returns,
      risk,
      sharpe,
      weights: arr1(&[1.0]),
    }
  }

  #[test]
  fn search_selects_valid_candidates() {
    let search = MonteCarloSearch::new(SearchConfig {
      portfolios: 500,
      seed: Some(7),
      ..SearchConfig::default()
    });
    let panel = synthetic_panel();
    let outcome = search.run(&panel, &["AAA", "BBB", "CCC"]).unwrap();

    let max_sharpe = outcome.max_sharpe.unwrap();
    let min_risk = outcome.min_risk.unwrap();
    assert_eq!(outcome.symbols.len(), 3);
    assert!(max_sharpe.risk >= 0.0);
    assert!(min_risk.risk <= max_sharpe.risk);
    assert!(max_sharpe.sharpe >= min_risk.sharpe);
    assert_abs_diff_eq!(max_sharpe.weights.sum(), 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(min_risk.weights.sum(), 1.0, epsilon = 1e-9);
  }

  #[test]
  fn zero_portfolios_fail_with_no_candidates() {
    let search = MonteCarloSearch::new(SearchConfig {
      portfolios: 0,
      ..SearchConfig::default()
    });
    let panel = synthetic_panel();
    let result = search.run(&panel, &["AAA", "BBB"]);
    assert_eq!(result.unwrap_err(), EngineError::NoCandidates);
  }

  #[test]
  fn absent_universe_yields_empty_outcome_not_error() {
    let search = MonteCarloSearch::new(SearchConfig::default());
    let panel = synthetic_panel();
    let outcome = search.run(&panel, &["XXX", "YYY"]).unwrap();

    assert!(outcome.is_empty());
    assert!(outcome.symbols.is_empty());
  }

  #[test]
  fn unknown_symbols_are_dropped_before_the_search() {
    let search = MonteCarloSearch::new(SearchConfig {
      portfolios: 100,
      seed: Some(3),
      ..SearchConfig::default()
    });
    let panel = synthetic_panel();
    let outcome = search.run(&panel, &["AAA", "XXX", "CCC"]).unwrap();

    assert_eq!(outcome.symbols, vec!["AAA".to_string(), "CCC".to_string()]);
    assert_eq!(outcome.max_sharpe.unwrap().weights.len(), 2);
  }

  #[test]
  fn selection_is_identical_across_worker_counts() {
    let search = MonteCarloSearch::new(SearchConfig {
      portfolios: 2_000,
      seed: Some(11),
      ..SearchConfig::default()
    });
    let panel = synthetic_panel();
    let symbols = ["AAA", "BBB", "CCC"];

    let single = rayon::ThreadPoolBuilder::new()
      .num_threads(1)
      .build()
      .unwrap()
      .install(|| search.run(&panel, &symbols))
      .unwrap();
    let multi = rayon::ThreadPoolBuilder::new()
      .num_threads(4)
      .build()
      .unwrap()
      .install(|| search.run(&panel, &symbols))
      .unwrap();

    let (s1, s2) = (single.max_sharpe.unwrap(), multi.max_sharpe.unwrap());
    let (r1, r2) = (single.min_risk.unwrap(), multi.min_risk.unwrap());
    assert_eq!(s1.trial, s2.trial);
    assert_eq!(s1.weights, s2.weights);
    assert_eq!(r1.trial, r2.trial);
    assert_eq!(r1.weights, r2.weights);
  }

  #[test]
  fn select_optima_breaks_ties_by_first_seen_trial() {
    let trials = vec![
      candidate(0, 0.1, 0.3, 1.0),
      candidate(1, 0.1, 0.2, 2.0),
      candidate(2, 0.1, 0.2, 2.0),
      candidate(3, 0.1, 0.4, 2.0),
    ];
    let (max_sharpe, min_risk) = select_optima(&trials).unwrap();

    assert_eq!(max_sharpe.trial, 1);
    assert_eq!(min_risk.trial, 1);
  }

  #[test]
  fn select_optima_over_empty_table_is_no_candidates() {
    assert_eq!(select_optima(&[]).unwrap_err(), EngineError::NoCandidates);
  }

  #[test]
  fn weighted_sharpe_evaluates_supplied_weights() {
    let search = MonteCarloSearch::new(SearchConfig::default());
    let panel = synthetic_panel();
    let eval = search
      .weighted_sharpe(&panel, &["AAA", "BBB", "CCC"], &arr1(&[0.4, 0.3, 0.3]))
      .unwrap();

    assert!(eval.risk > 0.0);
    assert!(eval.returns.is_finite());
  }

  #[test]
  fn weighted_sharpe_rejects_weights_sized_for_dropped_symbols() {
    let search = MonteCarloSearch::new(SearchConfig::default());
    let panel = synthetic_panel();

    // Three weights for three requested symbols, but only two are present.
    let result = search.weighted_sharpe(&panel, &["AAA", "XXX", "CCC"], &arr1(&[0.4, 0.3, 0.3]));
    assert!(matches!(
      result,
      Err(EngineError::MalformedCovariance { .. })
    ));
  }

  #[test]
  fn weighted_sharpe_rejects_weights_over_an_empty_universe() {
    let search = MonteCarloSearch::new(SearchConfig::default());
    let panel = synthetic_panel();

    let result = search.weighted_sharpe(&panel, &["XXX", "YYY"], &arr1(&[0.5, 0.5]));
    assert!(matches!(
      result,
      Err(EngineError::MalformedCovariance { .. })
    ));
  }
}
