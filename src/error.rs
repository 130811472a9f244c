//! Error kinds raised by the allocation core.

use thiserror::Error;

use crate::portfolio::Objective;

/// Failures of a requested portfolio computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
  #[error("at least 2 assets are required to form a portfolio, got {actual}")]
  InsufficientAssets { actual: usize },

  #[error("odds must be positive, got {odds} for asset #{index}")]
  InvalidOdds { index: usize, odds: f64 },

  #[error("probability must lie in [0, 1], got {probability} for asset #{index}")]
  InvalidProbability { index: usize, probability: f64 },

  #[error("all expected returns are equal ({value}); the efficient frontier is undefined")]
  DegenerateReturns { value: f64 },

  #[error("{objective} optimization did not converge after {iterations} iterations")]
  OptimizationDidNotConverge { objective: Objective, iterations: u64 },

  #[error("no frontier point converged out of {attempted} target returns")]
  EmptyFrontier { attempted: usize },

  #[error("no frontier point carries positive risk; the maximum-Sharpe portfolio is undefined")]
  UndefinedSharpe,

  #[error("dimension mismatch: expected {expected}, got {actual}")]
  DimensionMismatch { expected: usize, actual: usize },

  #[error("invalid configuration: {0}")]
  InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AllocationError>;
