//! # Price and Return Series
//!
//! $$
//! r_i = \frac{p_i - p_{i-1}}{p_{i-1}}
//! $$
//!
//! Price history containers and the period-over-period returns transform.
//! A [`ReturnSeries`] can only be built through the transform, so every
//! downstream statistic works on the same validated representation.

use chrono::Duration;
use chrono::NaiveDate;

use crate::error::EngineError;

/// Daily adjusted-close history for one security, sorted by date.
#[derive(Clone, Debug)]
pub struct PriceSeries {
  dates: Vec<NaiveDate>,
  closes: Vec<f64>,
}

impl PriceSeries {
  /// Build a series from `(date, close)` observations. Observations are
  /// sorted by date; irregular calendars are tolerated.
  pub fn new(mut observations: Vec<(NaiveDate, f64)>) -> Self {
    observations.sort_by_key(|(date, _)| *date);
    let (dates, closes) = observations.into_iter().unzip();
    Self { dates, closes }
  }

  /// Convenience constructor for consecutive daily closes starting at `start`.
  pub fn from_closes(start: NaiveDate, closes: Vec<f64>) -> Self {
    let dates = (0..closes.len())
      .map(|i| start + Duration::days(i as i64))
      .collect();
    Self { dates, closes }
  }

  pub fn len(&self) -> usize {
    self.closes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.closes.is_empty()
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn closes(&self) -> &[f64] {
    &self.closes
  }

  /// Fractional period-over-period returns of this series.
  pub fn returns(&self) -> ReturnSeries {
    ReturnSeries::from_closes(&self.closes)
  }
}

/// Fractional period-over-period price changes, one shorter than the
/// source price series. Non-finite inputs are dropped, not propagated.
#[derive(Clone, Debug, Default)]
pub struct ReturnSeries {
  values: Vec<f64>,
}

impl ReturnSeries {
  /// The returns transform: `(p[i] - p[i-1]) / p[i-1]` over consecutive
  /// closes. A pair touching a missing or non-finite close contributes
  /// nothing; fewer than two closes yield an empty series.
  pub fn from_closes(closes: &[f64]) -> Self {
    let mut values = Vec::with_capacity(closes.len().saturating_sub(1));
    for pair in closes.windows(2) {
      let (prev, cur) = (pair[0], pair[1]);
      if !prev.is_finite() || !cur.is_finite() || prev == 0.0 {
        continue;
      }
      let r = (cur - prev) / prev;
      if r.is_finite() {
        values.push(r);
      }
    }
    Self { values }
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn values(&self) -> &[f64] {
    &self.values
  }
}

/// A date-aligned table of close columns keyed by symbol, the input to the
/// Monte Carlo search. All columns share the panel's date index.
#[derive(Clone, Debug)]
pub struct PricePanel {
  dates: Vec<NaiveDate>,
  symbols: Vec<String>,
  closes: Vec<Vec<f64>>,
}

impl PricePanel {
  /// Build a panel from a shared date index and `(symbol, closes)` columns.
  /// Every column must have exactly one close per date.
  pub fn new(dates: Vec<NaiveDate>, columns: Vec<(String, Vec<f64>)>) -> Result<Self, EngineError> {
    let mut symbols = Vec::with_capacity(columns.len());
    let mut closes = Vec::with_capacity(columns.len());
    for (symbol, column) in columns {
      if column.len() != dates.len() {
        return Err(EngineError::MisalignedPanel {
          detail: format!(
            "column {symbol} has {} closes for {} dates",
            column.len(),
            dates.len()
          ),
        });
      }
      symbols.push(symbol);
      closes.push(column);
    }
    Ok(Self {
      dates,
      symbols,
      closes,
    })
  }

  /// Number of dates (rows).
  pub fn len(&self) -> usize {
    self.dates.len()
  }

  pub fn is_empty(&self) -> bool {
    self.dates.is_empty()
  }

  /// Number of securities (columns).
  pub fn width(&self) -> usize {
    self.symbols.len()
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn symbols(&self) -> &[String] {
    &self.symbols
  }

  pub fn contains(&self, symbol: &str) -> bool {
    self.symbols.iter().any(|s| s == symbol)
  }

  pub fn column(&self, symbol: &str) -> Option<&[f64]> {
    let idx = self.symbols.iter().position(|s| s == symbol)?;
    Some(&self.closes[idx])
  }

  /// Restrict the panel to the requested symbols, in request order.
  /// Symbols absent from the panel are silently dropped.
  pub fn select(&self, symbols: &[&str]) -> PricePanel {
    let mut retained_symbols = Vec::new();
    let mut retained_closes = Vec::new();
    for &symbol in symbols {
      if let Some(idx) = self.symbols.iter().position(|s| s == symbol) {
        retained_symbols.push(self.symbols[idx].clone());
        retained_closes.push(self.closes[idx].clone());
      }
    }
    PricePanel {
      dates: self.dates.clone(),
      symbols: retained_symbols,
      closes: retained_closes,
    }
  }

  /// Column-major returns over the shared date index. A row is kept only
  /// when every column's return is finite, so the columns stay aligned for
  /// the covariance step.
  pub fn aligned_returns(&self) -> Vec<Vec<f64>> {
    let n = self.width();
    let rows = self.len();
    let mut out = vec![Vec::with_capacity(rows.saturating_sub(1)); n];
    for t in 1..rows {
      let row: Vec<f64> = (0..n)
        .map(|j| {
          let prev = self.closes[j][t - 1];
          let cur = self.closes[j][t];
          if prev.is_finite() && cur.is_finite() && prev != 0.0 {
            (cur - prev) / prev
          } else {
            f64::NAN
          }
        })
        .collect();
      if row.iter().all(|r| r.is_finite()) {
        for (j, r) in row.into_iter().enumerate() {
          out[j].push(r);
        }
      }
    }
    out
  }
}
