//! # Errors
//!
//! Structural failures surfaced by the engine. Statistical edge cases
//! (insufficient history, negative configuration values, an empty symbol
//! universe) are absorbed locally and produce degenerate results instead.

use std::error::Error;
use std::fmt;

/// Failures the engine cannot recover from locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
  /// A best-candidate selection was demanded over an empty trial table.
  NoCandidates,
  /// Non-square, asymmetric or otherwise unusable covariance input.
  MalformedCovariance { detail: String },
  /// Panel columns do not share a common date index.
  MisalignedPanel { detail: String },
}

impl fmt::Display for EngineError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EngineError::NoCandidates => write!(f, "no portfolio candidates to select from"),
      EngineError::MalformedCovariance { detail } => {
        write!(f, "malformed covariance input: {detail}")
      }
      EngineError::MisalignedPanel { detail } => write!(f, "misaligned price panel: {detail}"),
    }
  }
}

impl Error for EngineError {}
