//! # Efficient Frontier
//!
//! $$
//! \mathcal F = \{(\sigma^\*(r), r) : r \in [\min_i \mu_i, \max_i \mu_i]\}
//! $$
//!
//! Target-return sweep over the penalized optimizer and maximum-Sharpe
//! selection.

use ndarray::Array1;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use super::data::MarketStatistics;
use super::optimizers::SolverSettings;
use super::optimizers::optimize_target_return;
use super::types::FrontierPoint;
use crate::error::AllocationError;
use crate::error::Result;

pub const DEFAULT_FRONTIER_POINTS: usize = 50;

/// Evenly spaced target returns from `min` to `max`, both inclusive.
pub fn target_returns(min: f64, max: f64, count: usize) -> Vec<f64> {
  Array1::linspace(min, max, count).to_vec()
}

/// Converged frontier points, ordered by increasing target return.
#[derive(Clone, Debug, Default, Serialize)]
pub struct EfficientFrontier {
  pub points: Vec<FrontierPoint>,
  /// Number of target returns that were attempted.
  pub attempted: usize,
}

impl EfficientFrontier {
  /// Sweep `point_count` target returns across the range of `stats.mu`.
  ///
  /// Targets whose solve does not converge are skipped; the sweep fails only
  /// when none converges.
  pub fn build(
    stats: &MarketStatistics,
    point_count: usize,
    settings: &SolverSettings,
  ) -> Result<Self> {
    if point_count == 0 {
      return Err(AllocationError::InvalidConfig(
        "frontier needs at least one target return".to_string(),
      ));
    }

    stats.ensure_distinct_returns()?;
    let (min_ret, max_ret) = stats.return_range();
    let targets = target_returns(min_ret, max_ret, point_count);

    let solved: Vec<Result<FrontierPoint>> = targets
      .par_iter()
      .map(|&target| {
        optimize_target_return(stats, target, settings).map(|portfolio| FrontierPoint {
          target_return: target,
          portfolio,
        })
      })
      .collect();

    let mut points = Vec::with_capacity(solved.len());
    for (target, res) in targets.iter().zip(solved) {
      match res {
        Ok(point) => points.push(point),
        Err(err) => warn!(target_return = *target, error = %err, "skipping frontier point"),
      }
    }

    if points.is_empty() {
      return Err(AllocationError::EmptyFrontier {
        attempted: targets.len(),
      });
    }

    debug!(
      converged = points.len(),
      attempted = targets.len(),
      "efficient frontier built"
    );

    Ok(Self {
      points,
      attempted: targets.len(),
    })
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  /// Index of the point with the highest `return / risk`, ignoring riskless points.
  pub fn max_sharpe_index(&self) -> Option<usize> {
    self
      .points
      .iter()
      .enumerate()
      .filter_map(|(i, p)| p.portfolio.sharpe().map(|s| (i, s)))
      .fold(None, |best: Option<(usize, f64)>, (i, s)| match best {
        Some((_, best_s)) if best_s >= s => best,
        _ => Some((i, s)),
      })
      .map(|(i, _)| i)
  }

  /// Maximum-Sharpe frontier point.
  pub fn max_sharpe(&self) -> Option<&FrontierPoint> {
    self.max_sharpe_index().map(|i| &self.points[i])
  }

  pub fn risks(&self) -> Vec<f64> {
    self.points.iter().map(|p| p.portfolio.risk).collect()
  }

  pub fn returns(&self) -> Vec<f64> {
    self.points.iter().map(|p| p.portfolio.expected_return).collect()
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::Array2;
  use ndarray::array;

  use super::*;
  use crate::portfolio::optimizers::optimize_min_variance;
  use crate::portfolio::Asset;
  use crate::portfolio::Portfolio;
  use crate::portfolio::ReturnModel;

  fn three_bets() -> MarketStatistics {
    let assets = vec![
      Asset::new("a".to_string(), 2.0, None),
      Asset::new("b".to_string(), 3.0, None),
      Asset::new("c".to_string(), 1.5, None),
    ];
    MarketStatistics::build(&assets, ReturnModel::Simple).unwrap()
  }

  #[test]
  fn target_returns_are_inclusive_and_even() {
    let t = target_returns(0.5, 2.0, 4);
    assert_eq!(t.len(), 4);
    assert_abs_diff_eq!(t[0], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(t[1], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(t[3], 2.0, epsilon = 1e-12);
  }

  #[test]
  fn frontier_points_are_feasible_and_ordered() {
    let frontier =
      EfficientFrontier::build(&three_bets(), DEFAULT_FRONTIER_POINTS, &SolverSettings::default())
        .unwrap();

    assert_eq!(frontier.attempted, 50);
    assert!(!frontier.is_empty());
    for pair in frontier.points.windows(2) {
      assert!(pair[0].target_return < pair[1].target_return);
    }
    for p in &frontier.points {
      let sum_w: f64 = p.portfolio.weights.iter().sum();
      assert!((sum_w - 1.0).abs() < 1e-6);
      assert!(p.portfolio.weights.iter().all(|&w| (0.0..=1.0).contains(&w)));
      assert!(p.portfolio.risk >= 0.0);
    }
  }

  #[test]
  fn upper_branch_return_grows_with_risk() {
    let stats = three_bets();
    let settings = SolverSettings::default();
    let min_var = optimize_min_variance(&stats, &settings).unwrap();
    let frontier = EfficientFrontier::build(&stats, 30, &settings).unwrap();

    let upper: Vec<&Portfolio> = frontier
      .points
      .iter()
      .map(|p| &p.portfolio)
      .filter(|p| p.expected_return >= min_var.expected_return + 1e-3)
      .collect();

    assert!(upper.len() > 5);
    for pair in upper.windows(2) {
      assert!(pair[1].risk >= pair[0].risk - 1e-6);
      assert!(pair[1].expected_return >= pair[0].expected_return - 1e-6);
    }
  }

  #[test]
  fn max_sharpe_beats_every_frontier_point() {
    let frontier = EfficientFrontier::build(&three_bets(), 25, &SolverSettings::default()).unwrap();
    let best = frontier.max_sharpe().unwrap().portfolio.sharpe().unwrap();

    for p in &frontier.points {
      assert!(p.portfolio.sharpe().unwrap() <= best);
    }
  }

  #[test]
  fn degenerate_returns_abort_the_sweep() {
    let stats = MarketStatistics::from_moments(
      array![0.3, 0.3, 0.3],
      Array2::from_diag(&array![0.1, 0.2, 0.3]),
    )
    .unwrap();
    let err = EfficientFrontier::build(&stats, 10, &SolverSettings::default()).unwrap_err();
    assert!(matches!(err, AllocationError::DegenerateReturns { .. }));
  }

  #[test]
  fn all_failed_points_give_empty_frontier() {
    let settings = SolverSettings {
      max_iterations: 1,
      sd_tolerance: 1e-14,
    };
    let err = EfficientFrontier::build(&three_bets(), 5, &settings).unwrap_err();
    assert_eq!(err, AllocationError::EmptyFrontier { attempted: 5 });
  }

  #[test]
  fn riskless_points_are_ignored_for_sharpe() {
    let frontier = EfficientFrontier {
      points: vec![
        FrontierPoint {
          target_return: 0.1,
          portfolio: Portfolio {
            weights: vec![1.0, 0.0],
            expected_return: 0.1,
            risk: 0.0,
          },
        },
        FrontierPoint {
          target_return: 0.2,
          portfolio: Portfolio {
            weights: vec![0.0, 1.0],
            expected_return: 0.2,
            risk: 0.4,
          },
        },
      ],
      attempted: 2,
    };
    assert_eq!(frontier.max_sharpe_index(), Some(1));
  }
}
