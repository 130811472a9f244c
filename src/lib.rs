//! # wager-frontier
//!
//! $$
//! \min_{\mathbf{w}\in\Delta^{n-1}} \mathbf{w}^\top \Sigma \mathbf{w}
//! \quad\text{s.t.}\quad \mu^\top \mathbf{w} = r^\*
//! $$
//!
//! Mean-variance portfolio construction over a set of wagers quoted in
//! decimal odds. Bets are treated as independent assets, the efficient
//! frontier is traced with a penalized long-only optimizer, and three
//! investor profiles (conservative, balanced, aggressive) are turned into
//! stake recommendations.

pub mod error;
pub mod io;
pub mod portfolio;
pub mod report;
pub mod traits;
pub mod visualization;

pub use error::AllocationError;
pub use error::Result;
