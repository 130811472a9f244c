//! # Portfolio Data Utilities
//!
//! $$
//! \Sigma = \operatorname{diag}(\sigma_1^2,\dots,\sigma_n^2)
//! $$
//!
//! Return vectors and risk matrices derived from quoted odds.

use ndarray::Array1;
use ndarray::Array2;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use super::evaluator::evaluate;
use super::types::Asset;
use super::types::Portfolio;
use crate::error::AllocationError;
use crate::error::Result;
use crate::traits::RiskEstimator;
use crate::traits::TwoOutcomeVariance;
use crate::traits::VolatilityFloor;

const RETURN_RTOL: f64 = 1e-5;
const RETURN_ATOL: f64 = 1e-8;

/// How expected returns are derived from the quotes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnModel {
  /// Single deterministic scenario: the bet wins, `mu = odds - 1`.
  #[default]
  Simple,
  /// Expected value over win/lose outcomes, `mu = p g - (1 - p)`.
  Probabilistic,
}

impl ReturnModel {
  pub fn expected_return(&self, asset: &Asset) -> f64 {
    match self {
      ReturnModel::Simple => asset.net_gain(),
      ReturnModel::Probabilistic => asset.expected_value(),
    }
  }
}

/// Return vector and diagonal risk matrix for an ordered set of wagers.
#[derive(Clone, Debug, PartialEq)]
pub struct MarketStatistics {
  pub descriptions: Vec<String>,
  pub odds: Array1<f64>,
  /// Win probabilities, market-implied where none was given.
  pub probabilities: Array1<f64>,
  /// Expected return per asset.
  pub mu: Array1<f64>,
  /// Covariance matrix, diagonal.
  pub cov: Array2<f64>,
  pub model: ReturnModel,
}

impl MarketStatistics {
  /// Build statistics with the default risk estimator of `model`.
  pub fn build(assets: &[Asset], model: ReturnModel) -> Result<Self> {
    match model {
      ReturnModel::Simple => Self::build_with_estimator(assets, model, &VolatilityFloor::default()),
      ReturnModel::Probabilistic => Self::build_with_estimator(assets, model, &TwoOutcomeVariance),
    }
  }

  /// Build statistics with an explicit risk estimator.
  pub fn build_with_estimator<E: RiskEstimator + ?Sized>(
    assets: &[Asset],
    model: ReturnModel,
    estimator: &E,
  ) -> Result<Self> {
    if assets.len() < 2 {
      return Err(AllocationError::InsufficientAssets {
        actual: assets.len(),
      });
    }

    for (i, asset) in assets.iter().enumerate() {
      asset.validate(i)?;
    }

    let mu: Array1<f64> = assets.iter().map(|a| model.expected_return(a)).collect();
    let variances: Array1<f64> = assets
      .iter()
      .zip(mu.iter())
      .map(|(a, &m)| estimator.variance(a, m))
      .collect();

    let stats = Self {
      descriptions: assets.iter().map(|a| a.description.clone()).collect(),
      odds: assets.iter().map(|a| a.odds).collect(),
      probabilities: assets.iter().map(|a| a.win_probability()).collect(),
      mu,
      cov: Array2::from_diag(&variances),
      model,
    };

    debug!(
      assets = stats.len(),
      model = ?model,
      estimator = estimator.name(),
      "built market statistics"
    );

    if model == ReturnModel::Simple {
      stats.ensure_distinct_returns()?;
    }

    Ok(stats)
  }

  /// Wrap a bare return vector and covariance matrix. The odds and
  /// probabilities are placeholders.
  #[cfg(test)]
  pub(crate) fn from_moments(mu: Array1<f64>, cov: Array2<f64>) -> Result<Self> {
    let n = mu.len();
    if cov.nrows() != n || cov.ncols() != n {
      return Err(AllocationError::DimensionMismatch {
        expected: n,
        actual: cov.nrows().max(cov.ncols()),
      });
    }

    Ok(Self {
      descriptions: (0..n).map(|i| format!("asset_{i}")).collect(),
      odds: mu.mapv(|m| m + 1.0),
      probabilities: Array1::ones(n),
      mu,
      cov,
      model: ReturnModel::Simple,
    })
  }

  pub fn len(&self) -> usize {
    self.mu.len()
  }

  pub fn is_empty(&self) -> bool {
    self.mu.is_empty()
  }

  /// Diagonal of the risk matrix.
  pub fn variances(&self) -> Array1<f64> {
    self.cov.diag().to_owned()
  }

  /// Smallest and largest expected return.
  pub fn return_range(&self) -> (f64, f64) {
    self
      .mu
      .iter()
      .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &m| {
        (lo.min(m), hi.max(m))
      })
  }

  /// Fail with [`AllocationError::DegenerateReturns`] when every expected
  /// return is numerically the same.
  pub fn ensure_distinct_returns(&self) -> Result<()> {
    let (lo, hi) = self.return_range();
    if (hi - lo).abs() <= RETURN_ATOL + RETURN_RTOL * hi.abs() {
      return Err(AllocationError::DegenerateReturns { value: lo });
    }
    Ok(())
  }

  /// Score a weight vector against these statistics.
  pub fn portfolio(&self, weights: Vec<f64>) -> Portfolio {
    let (expected_return, risk) = evaluate(&weights, &self.mu, &self.cov);
    Portfolio {
      weights,
      expected_return,
      risk,
    }
  }

  /// Restrict the statistics to the given asset indices, in order.
  pub fn subset(&self, indices: &[usize]) -> Self {
    let n = indices.len();
    let mut cov = Array2::zeros((n, n));
    for (a, &i) in indices.iter().enumerate() {
      for (b, &j) in indices.iter().enumerate() {
        cov[[a, b]] = self.cov[[i, j]];
      }
    }

    Self {
      descriptions: indices.iter().map(|&i| self.descriptions[i].clone()).collect(),
      odds: indices.iter().map(|&i| self.odds[i]).collect(),
      probabilities: indices.iter().map(|&i| self.probabilities[i]).collect(),
      mu: indices.iter().map(|&i| self.mu[i]).collect(),
      cov,
      model: self.model,
    }
  }
}

/// Indices of the assets with strictly positive expected return.
///
/// When no asset qualifies the whole set is kept, so a book of losing bets
/// still yields a minimum-risk allocation. The flag reports that fallback.
pub fn select_positive_ev(stats: &MarketStatistics) -> (Vec<usize>, bool) {
  let positive: Vec<usize> = stats
    .mu
    .iter()
    .enumerate()
    .filter(|&(_, &m)| m > 0.0)
    .map(|(i, _)| i)
    .collect();

  if positive.is_empty() {
    warn!(
      assets = stats.len(),
      "no asset has positive expected value, keeping the full set"
    );
    ((0..stats.len()).collect(), true)
  } else {
    (positive, false)
  }
}
