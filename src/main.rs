use anyhow::Result;
use chrono::NaiveDate;
use prettytable::row;
use prettytable::Table;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Distribution;
use rand_distr::Normal;
use sharpe_mc::asset_stats;
use sharpe_mc::MonteCarloSearch;
use sharpe_mc::PricePanel;
use sharpe_mc::ReturnSeries;
use sharpe_mc::SearchConfig;
use sharpe_mc::SharpeConfig;

/// Synthetic daily closes: a simple multiplicative random walk.
fn random_walk(rng: &mut StdRng, days: usize, drift: f64, vol: f64) -> Vec<f64> {
  let shocks = Normal::new(drift, vol).expect("valid normal parameters");
  let mut closes = Vec::with_capacity(days);
  let mut price = 100.0;
  for _ in 0..days {
    closes.push(price);
    price *= 1.0 + shocks.sample(rng);
  }
  closes
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let days = 504;
  let start = NaiveDate::from_ymd_opt(2023, 1, 2).expect("valid date");
  let dates: Vec<_> = (0..days)
    .map(|i| start + chrono::Duration::days(i as i64))
    .collect();

  let mut rng = StdRng::seed_from_u64(42);
  let panel = PricePanel::new(
    dates,
    vec![
      ("ACME".to_string(), random_walk(&mut rng, days, 0.0007, 0.012)),
      ("BOLT".to_string(), random_walk(&mut rng, days, 0.0004, 0.020)),
      ("CRUX".to_string(), random_walk(&mut rng, days, 0.0005, 0.008)),
      ("DYNE".to_string(), random_walk(&mut rng, days, 0.0002, 0.015)),
    ],
  )?;

  let mut assets = Table::new();
  assets.add_row(row!["symbol", "returns", "risk", "sharpe", "obs"]);
  for symbol in panel.symbols() {
    let returns = ReturnSeries::from_closes(panel.column(symbol).expect("known symbol"));
    let stats = asset_stats(&returns, &SharpeConfig::default());
    assets.add_row(row![
      symbol,
      format!("{:.4}", stats.returns),
      format!("{:.4}", stats.risk),
      format!("{:.4}", stats.sharpe),
      stats.len
    ]);
  }
  assets.printstd();

  let search = MonteCarloSearch::new(SearchConfig {
    portfolios: 25_000,
    seed: Some(42),
    ..SearchConfig::default()
  });
  let symbols: Vec<&str> = panel.symbols().iter().map(String::as_str).collect();
  let outcome = search.run(&panel, &symbols)?;

  let mut optima = Table::new();
  let mut header = row!["portfolio", "returns", "risk", "sharpe"];
  for symbol in &outcome.symbols {
    header.add_cell(prettytable::Cell::new(symbol));
  }
  optima.add_row(header);
  for (label, candidate) in [
    ("max sharpe", outcome.max_sharpe.as_ref()),
    ("min risk", outcome.min_risk.as_ref()),
  ] {
    if let Some(c) = candidate {
      let mut r = row![
        label,
        format!("{:.4}", c.returns),
        format!("{:.4}", c.risk),
        format!("{:.4}", c.sharpe)
      ];
      for w in c.weights.iter() {
        r.add_cell(prettytable::Cell::new(&format!("{w:.4}")));
      }
      optima.add_row(r);
    }
  }
  optima.printstd();

  Ok(())
}
