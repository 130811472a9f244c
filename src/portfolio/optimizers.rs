//! # Portfolio Optimizers
//!
//! $$
//! \min_{\mathbf{w}} \ \mathbf{w}^\top\Sigma\mathbf{w} + \lambda(\mu^\top\mathbf{w}-r^\*)^2
//! \quad\text{s.t.}\quad \mathbf{1}^\top\mathbf{w}=1,\ 0\le w_i\le 1
//! $$
//!
//! Long-only, fully invested optimizers. Weights are parametrized through a
//! softmax so every candidate the solver visits already satisfies the budget
//! and box constraints; Nelder-Mead then searches the unconstrained logits.
//!
//! The target-return mode enforces the return with a quadratic penalty
//! rather than a hard equality. This approximates the exact efficient
//! frontier and can bias points near the extreme target returns slightly.

use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::core::State;
use argmin::core::TerminationReason;
use argmin::solver::neldermead::NelderMead;
use ndarray::Array1;
use ndarray::Array2;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::data::MarketStatistics;
use super::evaluator::evaluate;
use super::types::Objective;
use super::types::Portfolio;
use crate::error::AllocationError;
use crate::error::Result;

/// Weight of the squared return shortfall in target-return mode.
pub const TARGET_RETURN_PENALTY: f64 = 1000.0;

/// Stopping rules handed to the underlying solver.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct SolverSettings {
  /// Iteration cap; reaching it counts as non-convergence.
  pub max_iterations: u64,
  /// Convergence once the simplex cost standard deviation drops below this.
  pub sd_tolerance: f64,
}

impl Default for SolverSettings {
  fn default() -> Self {
    Self {
      max_iterations: 10_000,
      sd_tolerance: 1e-10,
    }
  }
}

impl Objective {
  /// Objective value for a portfolio with the given moments.
  pub fn value(&self, expected_return: f64, variance: f64) -> f64 {
    match *self {
      Objective::MinVariance => variance,
      Objective::TargetReturn { target } => {
        variance + TARGET_RETURN_PENALTY * (expected_return - target).powi(2)
      }
      Objective::MaxReturn => -expected_return,
      Objective::MeanVariance { risk_aversion } => -(expected_return - risk_aversion * variance),
    }
  }
}

fn softmax(x: &[f64]) -> Vec<f64> {
  if x.is_empty() {
    return Vec::new();
  }

  let max_x = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  let exps: Vec<f64> = x.iter().map(|&v| (v - max_x).exp()).collect();
  let sum: f64 = exps.iter().sum();

  if sum < 1e-15 {
    vec![1.0 / x.len() as f64; x.len()]
  } else {
    exps.iter().map(|&e| e / sum).collect()
  }
}

/// Initial simplex around the zero logit, i.e. the equal-weight portfolio.
fn logit_simplex(n: usize) -> Vec<Vec<f64>> {
  let x0 = vec![0.0; n];
  let mut simplex = Vec::with_capacity(n + 1);
  simplex.push(x0.clone());
  for i in 0..n {
    let mut point = x0.clone();
    point[i] = 1.0;
    simplex.push(point);
  }
  simplex
}

struct SimplexCost {
  mu: Array1<f64>,
  cov: Array2<f64>,
  objective: Objective,
}

impl CostFunction for SimplexCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
    let w = softmax(x);
    let (expected_return, risk) = evaluate(&w, &self.mu, &self.cov);
    Ok(self.objective.value(expected_return, risk * risk))
  }
}

/// Minimize `objective` over the long-only simplex, starting from equal weights.
pub fn optimize(
  stats: &MarketStatistics,
  objective: Objective,
  settings: &SolverSettings,
) -> Result<Portfolio> {
  let n = stats.len();
  if n == 0 {
    return Err(AllocationError::InsufficientAssets { actual: 0 });
  }
  if n == 1 {
    return Ok(stats.portfolio(vec![1.0]));
  }

  let cost = SimplexCost {
    mu: stats.mu.clone(),
    cov: stats.cov.clone(),
    objective,
  };

  let solver = NelderMead::new(logit_simplex(n))
    .with_sd_tolerance(settings.sd_tolerance)
    .map_err(|err| AllocationError::InvalidConfig(err.to_string()))?;

  let res = Executor::new(cost, solver)
    .configure(|state| state.max_iters(settings.max_iterations))
    .run()
    .map_err(|err| {
      debug!(%objective, error = %err, "solver aborted");
      AllocationError::OptimizationDidNotConverge {
        objective,
        iterations: 0,
      }
    })?;

  let iterations = res.state.get_iter();
  let converged = matches!(
    res.state.get_termination_reason(),
    Some(TerminationReason::SolverConverged)
  );

  let best_x = match res.state.best_param {
    Some(x) if converged => x,
    _ => {
      debug!(%objective, iterations, "solver stopped without converging");
      return Err(AllocationError::OptimizationDidNotConverge {
        objective,
        iterations,
      });
    }
  };

  let portfolio = stats.portfolio(softmax(&best_x));
  debug!(
    %objective,
    iterations,
    expected_return = portfolio.expected_return,
    risk = portfolio.risk,
    "solved"
  );

  Ok(portfolio)
}

/// Global minimum-variance portfolio.
pub fn optimize_min_variance(
  stats: &MarketStatistics,
  settings: &SolverSettings,
) -> Result<Portfolio> {
  optimize(stats, Objective::MinVariance, settings)
}

/// Minimum-variance portfolio for a target expected return (penalized).
pub fn optimize_target_return(
  stats: &MarketStatistics,
  target: f64,
  settings: &SolverSettings,
) -> Result<Portfolio> {
  optimize(stats, Objective::TargetReturn { target }, settings)
}

/// Maximum expected-return portfolio.
pub fn optimize_max_return(
  stats: &MarketStatistics,
  settings: &SolverSettings,
) -> Result<Portfolio> {
  optimize(stats, Objective::MaxReturn, settings)
}

/// Markowitz utility maximizer, `μ'w - λ w'Σw`.
pub fn optimize_markowitz(
  stats: &MarketStatistics,
  risk_aversion: f64,
  settings: &SolverSettings,
) -> Result<Portfolio> {
  optimize(stats, Objective::MeanVariance { risk_aversion }, settings)
}
