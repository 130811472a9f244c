//! # Portfolio Types
//!
//! $$
//! \mathbb E[R_i] = p_i (o_i - 1) - (1 - p_i)
//! $$
//!
//! Wagers, objectives and result containers.

use std::fmt::Display;

use impl_new_derive::ImplNew;
use serde::Deserialize;
use serde::Serialize;

use super::evaluator::sharpe_ratio;
use crate::error::AllocationError;
use crate::error::Result;

/// One candidate wager.
#[derive(ImplNew, Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Asset {
  /// Free-text label of the bet.
  pub description: String,
  /// Decimal payout multiplier; a winning unit stake returns `odds` gross.
  pub odds: f64,
  /// Estimated win probability. Falls back to the market-implied `1 / odds`.
  #[serde(default)]
  pub probability: Option<f64>,
}

impl Asset {
  /// Probability implied by the quoted odds.
  pub fn implied_probability(&self) -> f64 {
    1.0 / self.odds
  }

  /// Win probability used by the models.
  pub fn win_probability(&self) -> f64 {
    self.probability.unwrap_or_else(|| self.implied_probability())
  }

  /// Profit per unit stake if the bet wins.
  pub fn net_gain(&self) -> f64 {
    self.odds - 1.0
  }

  /// Expected net outcome of a unit stake over the win/lose outcomes.
  pub fn expected_value(&self) -> f64 {
    let p = self.win_probability();
    p * self.net_gain() - (1.0 - p)
  }

  pub(crate) fn validate(&self, index: usize) -> Result<()> {
    if !(self.odds > 0.0) || !self.odds.is_finite() {
      return Err(AllocationError::InvalidOdds {
        index,
        odds: self.odds,
      });
    }

    if let Some(probability) = self.probability {
      if !(0.0..=1.0).contains(&probability) {
        return Err(AllocationError::InvalidProbability { index, probability });
      }
    }

    Ok(())
  }
}

/// Objective minimized over the long-only, fully invested simplex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Objective {
  /// `w' Σ w`.
  MinVariance,
  /// `w' Σ w + PENALTY (μ'w - target)^2`.
  TargetReturn { target: f64 },
  /// `-μ'w`.
  MaxReturn,
  /// `-(μ'w - λ w' Σ w)`.
  MeanVariance { risk_aversion: f64 },
}

impl Display for Objective {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Objective::MinVariance => write!(f, "minimum variance"),
      Objective::TargetReturn { target } => write!(f, "minimum variance at target return {target}"),
      Objective::MaxReturn => write!(f, "maximum return"),
      Objective::MeanVariance { risk_aversion } => {
        write!(f, "mean-variance (risk aversion {risk_aversion})")
      }
    }
  }
}

/// A weight vector scored against a return vector and risk matrix.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Portfolio {
  /// Non-negative weights summing to one.
  pub weights: Vec<f64>,
  /// `μ'w`.
  pub expected_return: f64,
  /// `sqrt(w' Σ w)`.
  pub risk: f64,
}

impl Portfolio {
  pub fn variance(&self) -> f64 {
    self.risk * self.risk
  }

  /// Return per unit of risk, `None` for a riskless portfolio.
  pub fn sharpe(&self) -> Option<f64> {
    sharpe_ratio(self.expected_return, self.risk)
  }

  /// Monetary stake per asset for a total budget.
  pub fn stakes(&self, total_budget: f64) -> Vec<f64> {
    self.weights.iter().map(|w| w * total_budget).collect()
  }
}

/// Minimum-risk portfolio found for one target return.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FrontierPoint {
  pub target_return: f64,
  pub portfolio: Portfolio,
}

/// Investor risk appetite mapped onto a portfolio choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum InvestorProfile {
  /// Minimum-variance portfolio.
  Conservative,
  /// Maximum-Sharpe point of the efficient frontier.
  Balanced,
  /// Maximum expected return.
  Aggressive,
}

impl InvestorProfile {
  pub const ALL: [InvestorProfile; 3] = [
    InvestorProfile::Conservative,
    InvestorProfile::Balanced,
    InvestorProfile::Aggressive,
  ];
}

impl Display for InvestorProfile {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      InvestorProfile::Conservative => write!(f, "Conservative"),
      InvestorProfile::Balanced => write!(f, "Balanced"),
      InvestorProfile::Aggressive => write!(f, "Aggressive"),
    }
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn probability_defaults_to_implied() {
    let asset = Asset::new("home win".to_string(), 4.0, None);
    assert_abs_diff_eq!(asset.win_probability(), 0.25, epsilon = 1e-12);
    assert_abs_diff_eq!(asset.net_gain(), 3.0, epsilon = 1e-12);
    // At the implied probability a bet is fair.
    assert_abs_diff_eq!(asset.expected_value(), 0.0, epsilon = 1e-12);
  }

  #[test]
  fn negative_expected_value_is_reported() {
    let asset = Asset::new("underdog".to_string(), 2.0, Some(0.4));
    assert_abs_diff_eq!(asset.net_gain(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(asset.expected_value(), -0.2, epsilon = 1e-12);
    assert!(asset.validate(0).is_ok());
  }

  #[test]
  fn validate_rejects_bad_inputs() {
    let bad_prob = Asset::new("x".to_string(), 2.0, Some(1.2));
    assert_eq!(
      bad_prob.validate(3),
      Err(AllocationError::InvalidProbability {
        index: 3,
        probability: 1.2
      })
    );

    let bad_odds = Asset::new("y".to_string(), 0.0, None);
    assert!(matches!(
      bad_odds.validate(0),
      Err(AllocationError::InvalidOdds { index: 0, .. })
    ));

    let nan_odds = Asset::new("z".to_string(), f64::NAN, None);
    assert!(nan_odds.validate(1).is_err());
  }

  #[test]
  fn stakes_scale_with_budget() {
    let portfolio = Portfolio {
      weights: vec![0.25, 0.75],
      expected_return: 0.5,
      risk: 0.2,
    };
    assert_eq!(portfolio.stakes(200.0), vec![50.0, 150.0]);
    assert_abs_diff_eq!(portfolio.sharpe().unwrap_or_default(), 2.5, epsilon = 1e-12);
  }

  #[test]
  fn riskless_portfolio_has_no_sharpe() {
    let portfolio = Portfolio {
      weights: vec![1.0],
      expected_return: 0.1,
      risk: 0.0,
    };
    assert!(portfolio.sharpe().is_none());
  }
}
