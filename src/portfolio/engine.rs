//! # Allocation Engine
//!
//! $$
//! \mathbf{s} = B\,\mathbf{w}^\*(\mu, \Sigma, \text{profile})
//! $$
//!
//! High-level orchestration: statistics, the three investor profiles, the
//! efficient frontier, the random cloud and the Markowitz recommendation.

use serde::Deserialize;
use serde::Serialize;
use tracing::info;

use super::data::MarketStatistics;
use super::data::ReturnModel;
use super::data::select_positive_ev;
use super::frontier::DEFAULT_FRONTIER_POINTS;
use super::frontier::EfficientFrontier;
use super::optimizers::SolverSettings;
use super::optimizers::optimize_markowitz;
use super::optimizers::optimize_max_return;
use super::optimizers::optimize_min_variance;
use super::sampler::RandomPortfolios;
use super::types::Asset;
use super::types::InvestorProfile;
use super::types::Portfolio;
use crate::error::AllocationError;
use crate::error::Result;

/// Runtime configuration for [`AllocationEngine`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllocationConfig {
  /// Money spread across the wagers.
  pub total_budget: f64,
  /// Number of target returns swept on the frontier.
  pub target_point_count: usize,
  /// `λ` of the Markowitz utility.
  pub risk_aversion: f64,
  /// Seed of the random portfolio cloud.
  pub random_seed: u64,
  pub random_portfolio_count: usize,
  /// Solver iteration cap.
  pub max_iterations: u64,
  /// Return model used for the profile allocations.
  pub return_model: ReturnModel,
  /// Restrict the Markowitz recommendation to positive-EV bets.
  pub positive_ev_only: bool,
}

impl Default for AllocationConfig {
  fn default() -> Self {
    Self {
      total_budget: 100.0,
      target_point_count: DEFAULT_FRONTIER_POINTS,
      risk_aversion: 1.0,
      random_seed: 42,
      random_portfolio_count: 3000,
      max_iterations: 10_000,
      return_model: ReturnModel::Simple,
      positive_ev_only: true,
    }
  }
}

impl AllocationConfig {
  /// Parse a TOML document; absent keys keep their defaults.
  pub fn from_toml_str(s: &str) -> Result<Self> {
    let config: Self =
      toml::from_str(s).map_err(|err| AllocationError::InvalidConfig(err.to_string()))?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    if !(self.total_budget > 0.0) || !self.total_budget.is_finite() {
      return Err(AllocationError::InvalidConfig(format!(
        "total_budget must be positive, got {}",
        self.total_budget
      )));
    }
    if self.target_point_count == 0 {
      return Err(AllocationError::InvalidConfig(
        "target_point_count must be at least 1".to_string(),
      ));
    }
    if !(self.risk_aversion >= 0.0) || !self.risk_aversion.is_finite() {
      return Err(AllocationError::InvalidConfig(format!(
        "risk_aversion must be non-negative, got {}",
        self.risk_aversion
      )));
    }
    if self.max_iterations == 0 {
      return Err(AllocationError::InvalidConfig(
        "max_iterations must be at least 1".to_string(),
      ));
    }
    Ok(())
  }

  pub fn solver_settings(&self) -> SolverSettings {
    SolverSettings {
      max_iterations: self.max_iterations,
      ..SolverSettings::default()
    }
  }
}

/// Portfolio chosen for one investor profile, with its stakes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProfileAllocation {
  pub profile: InvestorProfile,
  pub portfolio: Portfolio,
  /// `weight * total_budget` per asset.
  pub stakes: Vec<f64>,
  pub total_budget: f64,
}

impl ProfileAllocation {
  fn new(profile: InvestorProfile, portfolio: Portfolio, total_budget: f64) -> Self {
    let stakes = portfolio.stakes(total_budget);
    Self {
      profile,
      portfolio,
      stakes,
      total_budget,
    }
  }

  /// Expected monetary gain of the whole stake.
  pub fn expected_gain(&self) -> f64 {
    self.portfolio.expected_return * self.total_budget
  }
}

/// Everything produced by one profile run.
#[derive(Clone, Debug)]
pub struct AllocationReport {
  pub statistics: MarketStatistics,
  /// Conservative, Balanced, Aggressive, in that order.
  pub profiles: Vec<ProfileAllocation>,
  pub frontier: EfficientFrontier,
  pub cloud: RandomPortfolios,
}

impl AllocationReport {
  pub fn profile(&self, profile: InvestorProfile) -> Option<&ProfileAllocation> {
    self.profiles.iter().find(|p| p.profile == profile)
  }
}

/// Markowitz utility recommendation over the positive-EV bets.
#[derive(Clone, Debug)]
pub struct MarkowitzAllocation {
  /// Probabilistic statistics of the full input.
  pub statistics: MarketStatistics,
  /// Indices into the input of the bets that were optimized.
  pub selected: Vec<usize>,
  /// The positive-EV filter found nothing and kept every bet.
  pub fallback: bool,
  /// Portfolio over the selected bets.
  pub portfolio: Portfolio,
  /// Stakes over the selected bets.
  pub stakes: Vec<f64>,
  pub risk_aversion: f64,
  pub total_budget: f64,
}

impl MarkowitzAllocation {
  /// `(description, weight, stake)` for every selected bet.
  pub fn rows(&self) -> Vec<(&str, f64, f64)> {
    self
      .selected
      .iter()
      .zip(self.portfolio.weights.iter().zip(&self.stakes))
      .map(|(&i, (&w, &s))| (self.statistics.descriptions[i].as_str(), w, s))
      .collect()
  }
}

/// Single entry point for allocation workflows.
#[derive(Clone, Debug, Default)]
pub struct AllocationEngine {
  config: AllocationConfig,
}

impl AllocationEngine {
  pub fn new(config: AllocationConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &AllocationConfig {
    &self.config
  }

  /// Statistics under the configured return model.
  pub fn statistics(&self, assets: &[Asset]) -> Result<MarketStatistics> {
    MarketStatistics::build(assets, self.config.return_model)
  }

  /// Conservative, Balanced and Aggressive allocations plus the frontier and
  /// the random cloud they are plotted against.
  pub fn recommend_profiles(&self, assets: &[Asset]) -> Result<AllocationReport> {
    self.config.validate()?;
    let stats = self.statistics(assets)?;
    stats.ensure_distinct_returns()?;

    let settings = self.config.solver_settings();
    let budget = self.config.total_budget;

    let min_var = optimize_min_variance(&stats, &settings)?;
    let frontier = EfficientFrontier::build(&stats, self.config.target_point_count, &settings)?;
    let balanced = frontier
      .max_sharpe()
      .map(|p| p.portfolio.clone())
      .ok_or(AllocationError::UndefinedSharpe)?;
    let max_ret = optimize_max_return(&stats, &settings)?;
    let cloud = RandomPortfolios::sample(
      &stats,
      self.config.random_portfolio_count,
      self.config.random_seed,
    );

    let profiles: Vec<ProfileAllocation> = InvestorProfile::ALL
      .into_iter()
      .zip([min_var, balanced, max_ret])
      .map(|(profile, portfolio)| ProfileAllocation::new(profile, portfolio, budget))
      .collect();

    for p in &profiles {
      info!(
        profile = %p.profile,
        expected_return = p.portfolio.expected_return,
        risk = p.portfolio.risk,
        "profile allocation"
      );
    }
    info!(
      assets = stats.len(),
      frontier_points = frontier.len(),
      samples = cloud.len(),
      "allocation run complete"
    );

    Ok(AllocationReport {
      statistics: stats,
      profiles,
      frontier,
      cloud,
    })
  }

  /// Markowitz utility allocation under the probabilistic model.
  pub fn recommend_markowitz(&self, assets: &[Asset]) -> Result<MarkowitzAllocation> {
    self.config.validate()?;
    let stats = MarketStatistics::build(assets, ReturnModel::Probabilistic)?;

    let (selected, fallback) = if self.config.positive_ev_only {
      select_positive_ev(&stats)
    } else {
      ((0..stats.len()).collect(), false)
    };

    let sub = stats.subset(&selected);
    let portfolio = optimize_markowitz(
      &sub,
      self.config.risk_aversion,
      &self.config.solver_settings(),
    )?;
    let stakes = portfolio.stakes(self.config.total_budget);

    info!(
      selected = selected.len(),
      fallback,
      expected_return = portfolio.expected_return,
      risk = portfolio.risk,
      "markowitz allocation"
    );

    Ok(MarkowitzAllocation {
      statistics: stats,
      selected,
      fallback,
      portfolio,
      stakes,
      risk_aversion: self.config.risk_aversion,
      total_budget: self.config.total_budget,
    })
  }
}
