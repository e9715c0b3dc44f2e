//! # Portfolio Evaluator
//!
//! $$
//! \sigma_p = \sqrt{\mathbf{w}^\top \Sigma \mathbf{w}}\sqrt{T}, \qquad
//! \mu_p = (\mu \cdot \mathbf{w})\,T
//! $$
//!
//! Pure, stateless evaluation of one weight vector against a covariance
//! model. Identical inputs always produce identical outputs, so trials can
//! run concurrently without coordination.

use ndarray::Array1;

use crate::covariance::CovarianceModel;
use crate::error::EngineError;

/// Risk/return/Sharpe triple for one evaluated weighting.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PortfolioEval {
  pub returns: f64,
  pub risk: f64,
  pub sharpe: f64,
}

/// One Monte Carlo trial result: the evaluated weighting plus the trial
/// index used for stable first-seen tie-breaking.
#[derive(Clone, Debug)]
pub struct PortfolioCandidate {
  pub trial: usize,
  pub returns: f64,
  pub risk: f64,
  pub sharpe: f64,
  pub weights: Array1<f64>,
}

/// Evaluate a weight vector: quadratic-form variance, annualized risk and
/// return, Sharpe with the zero-risk-means-zero policy.
///
/// A weight vector whose length differs from the covariance dimension and
/// a numerically negative quadratic form are both reported as
/// [`EngineError::MalformedCovariance`]; the engine does not repair
/// covariance input.
pub fn evaluate_portfolio(
  model: &CovarianceModel,
  period: usize,
  risk_free_rate: f64,
  weights: &Array1<f64>,
) -> Result<PortfolioEval, EngineError> {
  if weights.len() != model.dim() {
    return Err(EngineError::MalformedCovariance {
      detail: format!(
        "weight vector has length {}, covariance dimension is {}",
        weights.len(),
        model.dim()
      ),
    });
  }

  let variance = weights.dot(&model.cov().dot(weights));
  if variance < 0.0 || !variance.is_finite() {
    return Err(EngineError::MalformedCovariance {
      detail: format!("portfolio variance {variance} from quadratic form"),
    });
  }

  let scale = period as f64;
  let risk = variance.sqrt() * scale.sqrt();
  let returns = model.mean().dot(weights) * scale;
  let sharpe = if risk != 0.0 {
    (returns - risk_free_rate) / risk
  } else {
    0.0
  };

  Ok(PortfolioEval {
    returns,
    risk,
    sharpe,
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;
  use ndarray::arr1;
  use ndarray::arr2;

  use super::evaluate_portfolio;
  use crate::covariance::CovarianceModel;
  use crate::error::EngineError;

  fn two_asset_model() -> CovarianceModel {
    CovarianceModel::new(
      arr2(&[[0.04, 0.02], [0.02, 0.09]]),
      arr1(&[0.08, 0.12]),
    )
    .unwrap()
  }

  #[test]
  fn equal_weights_reference_values() {
    let model = two_asset_model();
    let eval = evaluate_portfolio(&model, 1, 0.02, &arr1(&[0.5, 0.5])).unwrap();

    // variance = 0.25*0.04 + 2*0.25*0.02 + 0.25*0.09 = 0.0425
    assert_relative_eq!(eval.risk, 0.0425_f64.sqrt(), max_relative = 1e-12);
    assert_relative_eq!(eval.returns, 0.10, max_relative = 1e-12);
    assert_relative_eq!(
      eval.sharpe,
      (0.10 - 0.02) / 0.0425_f64.sqrt(),
      max_relative = 1e-12
    );
  }

  #[test]
  fn evaluation_is_idempotent() {
    let model = two_asset_model();
    let weights = arr1(&[0.3, 0.7]);
    let a = evaluate_portfolio(&model, 252, 0.02, &weights).unwrap();
    let b = evaluate_portfolio(&model, 252, 0.02, &weights).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn zero_risk_reports_zero_sharpe() {
    let model = CovarianceModel::new(arr2(&[[0.0]]), arr1(&[0.10])).unwrap();
    let eval = evaluate_portfolio(&model, 1, 0.02, &arr1(&[1.0])).unwrap();

    assert_eq!(eval.risk, 0.0);
    assert_eq!(eval.sharpe, 0.0);
    assert_relative_eq!(eval.returns, 0.10, max_relative = 1e-12);
  }

  #[test]
  fn dimension_mismatch_is_malformed_covariance_not_panic() {
    let model = two_asset_model();
    let result = evaluate_portfolio(&model, 1, 0.02, &arr1(&[0.5, 0.3, 0.2]));
    assert!(matches!(
      result,
      Err(EngineError::MalformedCovariance { .. })
    ));
  }

  #[test]
  fn negative_quadratic_form_is_malformed_covariance() {
    // Symmetric but indefinite: eigenvalues 1 and -3.
    let model = CovarianceModel::new(arr2(&[[-1.0, 2.0], [2.0, -1.0]]), arr1(&[0.0, 0.0])).unwrap();
    let result = evaluate_portfolio(&model, 1, 0.0, &arr1(&[0.5, -0.5]));
    assert!(matches!(
      result,
      Err(EngineError::MalformedCovariance { .. })
    ));
  }

  #[test]
  fn risk_scales_with_sqrt_of_period() {
    let model = two_asset_model();
    let weights = arr1(&[0.5, 0.5]);
    let daily = evaluate_portfolio(&model, 1, 0.0, &weights).unwrap();
    let annual = evaluate_portfolio(&model, 252, 0.0, &weights).unwrap();

    assert_relative_eq!(annual.risk, daily.risk * 252.0_f64.sqrt(), max_relative = 1e-12);
    assert_relative_eq!(annual.returns, daily.returns * 252.0, max_relative = 1e-12);
  }
}
