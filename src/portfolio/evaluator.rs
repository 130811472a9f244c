//! # Portfolio Evaluator
//!
//! $$
//! R_p = \mu^\top \mathbf{w},\qquad \sigma_p = \sqrt{\mathbf{w}^\top \Sigma \mathbf{w}}
//! $$

use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;

/// Expected return and risk (standard deviation) of a weight vector.
pub fn evaluate(weights: &[f64], mu: &Array1<f64>, cov: &Array2<f64>) -> (f64, f64) {
  let w = ArrayView1::from(weights);
  let expected_return = w.dot(mu);
  let variance = w.dot(&cov.dot(&w));
  (expected_return, variance.max(0.0).sqrt())
}

/// Risk at or below this level counts as riskless.
pub const RISK_EPSILON: f64 = 1e-12;

/// `expected_return / risk`, undefined for a riskless portfolio.
pub fn sharpe_ratio(expected_return: f64, risk: f64) -> Option<f64> {
  if risk > RISK_EPSILON {
    Some(expected_return / risk)
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;

  #[test]
  fn evaluate_diagonal_portfolio() {
    let mu = array![1.0, 2.0, 0.5];
    let cov = Array2::from_diag(&array![0.25, 1.0, 0.0625]);
    let w = [1.0 / 3.0; 3];

    let (ret, risk) = evaluate(&w, &mu, &cov);
    assert_abs_diff_eq!(ret, 3.5 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(risk, (1.3125_f64 / 9.0).sqrt(), epsilon = 1e-12);
  }

  #[test]
  fn risk_is_zero_only_without_variance() {
    let mu = array![0.3, 0.1];
    let cov = Array2::from_diag(&array![0.0, 0.04]);

    let (_, risk) = evaluate(&[1.0, 0.0], &mu, &cov);
    assert_eq!(risk, 0.0);
    assert!(sharpe_ratio(0.3, risk).is_none());

    let (_, risk) = evaluate(&[0.5, 0.5], &mu, &cov);
    assert!(risk > 0.0);
  }

  #[test]
  fn numerically_riskless_portfolio_has_no_sharpe() {
    let mu = array![0.2, 0.5];
    let cov = Array2::from_diag(&array![0.0, 2.25]);

    // Softmax weights never reach an exact zero.
    let (ret, risk) = evaluate(&[1.0 - 1e-25, 1e-25], &mu, &cov);
    assert!(risk > 0.0);
    assert!(risk <= RISK_EPSILON);
    assert!(sharpe_ratio(ret, risk).is_none());
    assert!(sharpe_ratio(0.2, 2.0 * RISK_EPSILON).is_some());
  }
}
