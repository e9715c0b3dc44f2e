//! # Covariance Model
//!
//! $$
//! \Sigma_{ij} = \frac{1}{T-1}\sum_t (r_{ti}-\bar r_i)(r_{tj}-\bar r_j)
//! $$
//!
//! Sample covariance matrix and mean-return vector over a date-aligned
//! return panel. Construction is the only validated path: a non-square or
//! asymmetric matrix is rejected up front, never repaired.

use ndarray::Array1;
use ndarray::Array2;

use crate::error::EngineError;
use crate::series::PricePanel;

const SYMMETRY_TOL: f64 = 1e-9;

/// Symmetric covariance matrix paired with the mean-return vector of the
/// same N assets. Shared read-only by all Monte Carlo workers.
#[derive(Clone, Debug)]
pub struct CovarianceModel {
  cov: Array2<f64>,
  mean: Array1<f64>,
}

impl CovarianceModel {
  /// Validate and wrap an externally supplied covariance matrix and mean
  /// vector. Fails with [`EngineError::MalformedCovariance`] when the
  /// matrix is non-square, asymmetric beyond tolerance, or its dimension
  /// does not match the mean vector.
  pub fn new(cov: Array2<f64>, mean: Array1<f64>) -> Result<Self, EngineError> {
    let (rows, cols) = cov.dim();
    if rows != cols {
      return Err(EngineError::MalformedCovariance {
        detail: format!("matrix is {rows}x{cols}, expected square"),
      });
    }
    if mean.len() != rows {
      return Err(EngineError::MalformedCovariance {
        detail: format!("mean vector has length {}, matrix dimension is {rows}", mean.len()),
      });
    }
    for i in 0..rows {
      for j in (i + 1)..rows {
        let a = cov[[i, j]];
        let b = cov[[j, i]];
        let scale = a.abs().max(b.abs()).max(1.0);
        if !a.is_finite() || !b.is_finite() || (a - b).abs() > SYMMETRY_TOL * scale {
          return Err(EngineError::MalformedCovariance {
            detail: format!("matrix is asymmetric at ({i}, {j}): {a} vs {b}"),
          });
        }
      }
    }
    Ok(Self { cov, mean })
  }

  /// Estimate the model from a price panel: aligned returns, column means
  /// and the ddof-1 sample covariance. Fewer than two aligned return rows
  /// yield a zero matrix (degenerate but well-defined, like any other
  /// insufficient-history case).
  pub fn from_panel(panel: &PricePanel) -> Result<Self, EngineError> {
    let columns = panel.aligned_returns();
    let n = columns.len();
    let rows = columns.first().map(|c| c.len()).unwrap_or(0);

    let mean = Array1::from_shape_fn(n, |i| {
      if rows == 0 {
        0.0
      } else {
        columns[i].iter().sum::<f64>() / rows as f64
      }
    });

    let cov = Array2::from_shape_fn((n, n), |(i, j)| {
      if rows < 2 {
        return 0.0;
      }
      let mut acc = 0.0;
      for t in 0..rows {
        acc += (columns[i][t] - mean[i]) * (columns[j][t] - mean[j]);
      }
      acc / (rows - 1) as f64
    });

    Self::new(cov, mean)
  }

  /// Number of assets N.
  pub fn dim(&self) -> usize {
    self.mean.len()
  }

  pub fn cov(&self) -> &Array2<f64> {
    &self.cov
  }

  pub fn mean(&self) -> &Array1<f64> {
    &self.mean
  }
}
