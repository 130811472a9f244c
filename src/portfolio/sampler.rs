//! # Random Portfolios
//!
//! $$
//! w_i = u_i \Big/ \sum_j u_j,\qquad u_j \sim \mathcal U(0,1)
//! $$
//!
//! Seeded cloud of feasible portfolios for plotting and sanity checks. The
//! normalized uniforms are not uniform over the simplex.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use super::data::MarketStatistics;
use super::evaluator::evaluate;
use super::evaluator::sharpe_ratio;

/// Three parallel sequences, one entry per sampled portfolio.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RandomPortfolios {
  pub risks: Vec<f64>,
  pub returns: Vec<f64>,
  /// `return / risk`, zero for a numerically riskless sample.
  pub sharpes: Vec<f64>,
}

impl RandomPortfolios {
  pub fn sample(stats: &MarketStatistics, count: usize, seed: u64) -> Self {
    let n = stats.len();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Self {
      risks: Vec::with_capacity(count),
      returns: Vec::with_capacity(count),
      sharpes: Vec::with_capacity(count),
    };

    if n == 0 {
      return out;
    }

    let mut w = vec![0.0; n];
    for _ in 0..count {
      for wi in w.iter_mut() {
        *wi = rng.random::<f64>();
      }
      let total: f64 = w.iter().sum();
      if total > 0.0 {
        w.iter_mut().for_each(|wi| *wi /= total);
      } else {
        w.fill(1.0 / n as f64);
      }

      let (ret, risk) = evaluate(&w, &stats.mu, &stats.cov);
      out.risks.push(risk);
      out.returns.push(ret);
      out.sharpes.push(sharpe_ratio(ret, risk).unwrap_or(0.0));
    }

    out
  }

  pub fn len(&self) -> usize {
    self.risks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.risks.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::portfolio::optimizers::SolverSettings;
  use crate::portfolio::optimizers::optimize_max_return;
  use crate::portfolio::optimizers::optimize_min_variance;
  use crate::portfolio::Asset;
  use crate::portfolio::ReturnModel;

  fn stats() -> MarketStatistics {
    let assets = vec![
      Asset::new("a".to_string(), 2.0, Some(0.55)),
      Asset::new("b".to_string(), 3.0, Some(0.4)),
      Asset::new("c".to_string(), 1.5, Some(0.7)),
      Asset::new("d".to_string(), 5.0, Some(0.15)),
    ];
    MarketStatistics::build(&assets, ReturnModel::Probabilistic).unwrap()
  }

  #[test]
  fn sampling_is_reproducible_per_seed() {
    let s = stats();
    let a = RandomPortfolios::sample(&s, 200, 42);
    let b = RandomPortfolios::sample(&s, 200, 42);
    let c = RandomPortfolios::sample(&s, 200, 7);

    assert_eq!(a.len(), 200);
    assert_eq!(a.returns.len(), 200);
    assert_eq!(a.sharpes.len(), 200);
    assert_eq!(a, b);
    assert_ne!(a, c);
  }

  #[test]
  fn optimized_extremes_bound_the_cloud() {
    let s = stats();
    let settings = SolverSettings::default();
    let cloud = RandomPortfolios::sample(&s, 3000, 42);
    let min_var = optimize_min_variance(&s, &settings).unwrap();
    let max_ret = optimize_max_return(&s, &settings).unwrap();

    for &risk in &cloud.risks {
      assert!(risk >= 0.0);
      assert!(min_var.risk <= risk + 1e-6);
    }
    for &ret in &cloud.returns {
      assert!(max_ret.expected_return >= ret - 1e-6);
    }
  }

  #[test]
  fn riskless_samples_get_zero_sharpe() {
    let stats = MarketStatistics::from_moments(
      ndarray::array![0.2, -1.0],
      ndarray::Array2::zeros((2, 2)),
    )
    .unwrap();
    let cloud = RandomPortfolios::sample(&stats, 50, 3);

    assert!(cloud.risks.iter().all(|&r| r == 0.0));
    assert!(cloud.sharpes.iter().all(|&s| s == 0.0));
  }

  #[test]
  fn zero_samples_gives_empty_cloud() {
    let cloud = RandomPortfolios::sample(&stats(), 0, 1);
    assert!(cloud.is_empty());
  }
}
