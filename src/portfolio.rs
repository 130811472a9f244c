//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Statistics, long-only optimizers, efficient frontier and investor
//! profiles for a book of independent wagers.

pub mod data;
pub mod engine;
pub mod evaluator;
pub mod frontier;
pub mod optimizers;
pub mod sampler;
pub mod types;

pub use data::MarketStatistics;
pub use data::ReturnModel;
pub use data::select_positive_ev;
pub use engine::AllocationConfig;
pub use engine::AllocationEngine;
pub use engine::AllocationReport;
pub use engine::MarkowitzAllocation;
pub use engine::ProfileAllocation;
pub use evaluator::RISK_EPSILON;
pub use evaluator::evaluate;
pub use evaluator::sharpe_ratio;
pub use frontier::EfficientFrontier;
pub use frontier::target_returns;
pub use optimizers::SolverSettings;
pub use optimizers::TARGET_RETURN_PENALTY;
pub use optimizers::optimize;
pub use optimizers::optimize_markowitz;
pub use optimizers::optimize_max_return;
pub use optimizers::optimize_min_variance;
pub use optimizers::optimize_target_return;
pub use sampler::RandomPortfolios;
pub use types::Asset;
pub use types::FrontierPoint;
pub use types::InvestorProfile;
pub use types::Objective;
pub use types::Portfolio;
