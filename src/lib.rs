//! # Portfolio Risk/Return Engine
//!
//! $$
//! S = \frac{\mathbb E[R_p] - r_f}{\sigma_p}
//! $$
//!
//! Turns historical daily price series into return distributions and runs a
//! Monte Carlo search for the portfolio weighting that maximizes the Sharpe
//! ratio versus the one that minimizes risk.
//!
//! ## Modules
//!
//! | Module         | Description                                                        |
//! |----------------|--------------------------------------------------------------------|
//! | [`series`]     | Price/return series and the date-aligned price panel.              |
//! | [`stats`]      | Single-asset mean/volatility/Sharpe estimation, optional EWM bias. |
//! | [`covariance`] | Covariance matrix and mean-return vector over aligned returns.     |
//! | [`sampler`]    | Random normalized long-only weight vectors.                        |
//! | [`evaluator`]  | Pure risk/return/Sharpe evaluation of one weighting.               |
//! | [`search`]     | Parallel Monte Carlo search and optimum selection.                 |
//! | [`filters`]    | Percentile-based reductions of an evaluated candidate table.       |
//! | [`error`]      | Structural error taxonomy.                                         |
//!
//! ## Parallelism
//!
//! Trials are partitioned across a `rayon` worker pool; the covariance
//! model is shared read-only and selection is a single associative
//! reduction, so results are identical for any worker count when a seed is
//! pinned.

pub mod covariance;
pub mod error;
pub mod evaluator;
pub mod filters;
pub mod sampler;
pub mod search;
pub mod series;
pub mod stats;

pub use covariance::CovarianceModel;
pub use error::EngineError;
pub use evaluator::evaluate_portfolio;
pub use evaluator::PortfolioCandidate;
pub use evaluator::PortfolioEval;
pub use filters::cut;
pub use filters::quartile_bins;
pub use filters::shave;
pub use filters::trim;
pub use filters::Metric;
pub use sampler::WeightSampler;
pub use search::select_optima;
pub use search::MonteCarloSearch;
pub use search::SearchConfig;
pub use search::SearchOutcome;
pub use series::PricePanel;
pub use series::PriceSeries;
pub use series::ReturnSeries;
pub use stats::asset_stats;
pub use stats::AssetStats;
pub use stats::SharpeConfig;
