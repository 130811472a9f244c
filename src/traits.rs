//! # Traits
//!
//! $$
//! \hat\sigma_i^2 = g(\text{asset}_i, \mu_i)
//! $$
//!
//! Pluggable per-asset risk estimation.

use crate::portfolio::Asset;

/// Per-asset variance estimate used on the diagonal of the risk matrix.
///
/// Bets carry no joint history, so only the diagonal is estimated and every
/// off-diagonal entry is zero.
pub trait RiskEstimator {
  /// Variance of one asset given its modeled expected return.
  fn variance(&self, asset: &Asset, expected_return: f64) -> f64;

  /// Short label used in logs and reports.
  fn name(&self) -> &'static str;
}

/// Heuristic volatility floor: `max(floor, scale * |mu|)^2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolatilityFloor {
  /// Minimum volatility assigned to any asset.
  pub floor: f64,
  /// Share of the absolute expected return taken as volatility.
  pub scale: f64,
}

impl Default for VolatilityFloor {
  fn default() -> Self {
    Self {
      floor: 0.10,
      scale: 0.5,
    }
  }
}

impl RiskEstimator for VolatilityFloor {
  fn variance(&self, _asset: &Asset, expected_return: f64) -> f64 {
    let vol = self.floor.max(self.scale * expected_return.abs());
    vol * vol
  }

  fn name(&self) -> &'static str {
    "volatility-floor"
  }
}

/// Exact variance of the win/lose outcome of a unit stake.
///
/// A win pays `odds - 1`, a loss costs the stake:
/// `p (g - mu)^2 + (1 - p) (-1 - mu)^2`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TwoOutcomeVariance;

impl RiskEstimator for TwoOutcomeVariance {
  fn variance(&self, asset: &Asset, expected_return: f64) -> f64 {
    let p = asset.win_probability();
    let g = asset.net_gain();
    p * (g - expected_return).powi(2) + (1.0 - p) * (-1.0 - expected_return).powi(2)
  }

  fn name(&self) -> &'static str {
    "two-outcome"
  }
}
