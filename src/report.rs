//! # Report
//!
//! Tabular and plot-ready views of an allocation run. Nothing here feeds back
//! into the optimization.

use prettytable::Table;
use prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE;
use prettytable::row;
use serde::Serialize;

use crate::portfolio::AllocationReport;
use crate::portfolio::InvestorProfile;
use crate::portfolio::MarkowitzAllocation;
use crate::portfolio::ProfileAllocation;

/// One line of the per-asset allocation table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AssetRow {
  pub description: String,
  pub odds: f64,
  pub expected_return: f64,
  pub variance: f64,
  pub conservative_weight: f64,
  pub conservative_stake: f64,
  pub balanced_weight: f64,
  pub balanced_stake: f64,
  pub aggressive_weight: f64,
  pub aggressive_stake: f64,
}

/// One line of the per-profile summary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummaryRow {
  pub profile: String,
  pub expected_return: f64,
  pub risk: f64,
  /// Empty for a riskless portfolio.
  pub sharpe: Option<f64>,
  pub total_budget: f64,
  pub expected_gain: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarkowitzRow {
  pub description: String,
  pub expected_value: f64,
  pub weight: f64,
  pub stake: f64,
}

fn weight_and_stake(p: Option<&ProfileAllocation>, i: usize) -> (f64, f64) {
  p.map(|p| (p.portfolio.weights[i], p.stakes[i]))
    .unwrap_or((0.0, 0.0))
}

pub fn asset_rows(report: &AllocationReport) -> Vec<AssetRow> {
  let stats = &report.statistics;
  let variances = stats.variances();
  let conservative = report.profile(InvestorProfile::Conservative);
  let balanced = report.profile(InvestorProfile::Balanced);
  let aggressive = report.profile(InvestorProfile::Aggressive);

  (0..stats.len())
    .map(|i| {
      let (conservative_weight, conservative_stake) = weight_and_stake(conservative, i);
      let (balanced_weight, balanced_stake) = weight_and_stake(balanced, i);
      let (aggressive_weight, aggressive_stake) = weight_and_stake(aggressive, i);
      AssetRow {
        description: stats.descriptions[i].clone(),
        odds: stats.odds[i],
        expected_return: stats.mu[i],
        variance: variances[i],
        conservative_weight,
        conservative_stake,
        balanced_weight,
        balanced_stake,
        aggressive_weight,
        aggressive_stake,
      }
    })
    .collect()
}

pub fn summary_rows(report: &AllocationReport) -> Vec<SummaryRow> {
  report
    .profiles
    .iter()
    .map(|p| SummaryRow {
      profile: p.profile.to_string(),
      expected_return: p.portfolio.expected_return,
      risk: p.portfolio.risk,
      sharpe: p.portfolio.sharpe(),
      total_budget: p.total_budget,
      expected_gain: p.expected_gain(),
    })
    .collect()
}

pub fn markowitz_rows(allocation: &MarkowitzAllocation) -> Vec<MarkowitzRow> {
  allocation
    .selected
    .iter()
    .zip(allocation.rows())
    .map(|(&i, (description, weight, stake))| MarkowitzRow {
      description: description.to_string(),
      expected_value: allocation.statistics.mu[i],
      weight,
      stake,
    })
    .collect()
}

pub fn asset_table(report: &AllocationReport) -> Table {
  let mut table = Table::new();
  table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
  table.set_titles(row![
    "Bet",
    "Odds",
    "E[R]",
    "Var",
    "Conservative",
    "Balanced",
    "Aggressive"
  ]);
  for r in asset_rows(report) {
    table.add_row(row![
      r.description,
      r ->format!("{:.2}", r.odds),
      r ->format!("{:.4}", r.expected_return),
      r ->format!("{:.4}", r.variance),
      r ->format!("{:.2}", r.conservative_stake),
      r ->format!("{:.2}", r.balanced_stake),
      r ->format!("{:.2}", r.aggressive_stake)
    ]);
  }
  table
}

pub fn summary_table(report: &AllocationReport) -> Table {
  let mut table = Table::new();
  table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
  table.set_titles(row!["Profile", "E[R]", "Risk", "Sharpe", "Budget", "E[gain]"]);
  for r in summary_rows(report) {
    let sharpe = r
      .sharpe
      .map(|s| format!("{s:.4}"))
      .unwrap_or_else(|| "-".to_string());
    table.add_row(row![
      r.profile,
      r ->format!("{:.4}", r.expected_return),
      r ->format!("{:.4}", r.risk),
      r ->sharpe,
      r ->format!("{:.2}", r.total_budget),
      r ->format!("{:.2}", r.expected_gain)
    ]);
  }
  table
}

pub fn markowitz_table(allocation: &MarkowitzAllocation) -> Table {
  let mut table = Table::new();
  table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
  table.set_titles(row!["Bet", "EV", "Weight", "Stake"]);
  for r in markowitz_rows(allocation) {
    table.add_row(row![
      r.description,
      r ->format!("{:.4}", r.expected_value),
      r ->format!("{:.4}", r.weight),
      r ->format!("{:.2}", r.stake)
    ]);
  }
  table
}

/// A named point drawn on top of the risk/return chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProfileMarker {
  pub name: String,
  pub risk: f64,
  pub expected_return: f64,
}

/// Plot-ready series of one allocation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChartData {
  pub cloud_risks: Vec<f64>,
  pub cloud_returns: Vec<f64>,
  pub cloud_sharpes: Vec<f64>,
  pub frontier_risks: Vec<f64>,
  pub frontier_returns: Vec<f64>,
  pub profiles: Vec<ProfileMarker>,
}

impl ChartData {
  pub fn from_report(report: &AllocationReport) -> Self {
    Self {
      cloud_risks: report.cloud.risks.clone(),
      cloud_returns: report.cloud.returns.clone(),
      cloud_sharpes: report.cloud.sharpes.clone(),
      frontier_risks: report.frontier.risks(),
      frontier_returns: report.frontier.returns(),
      profiles: report
        .profiles
        .iter()
        .map(|p| ProfileMarker {
          name: p.profile.to_string(),
          risk: p.portfolio.risk,
          expected_return: p.portfolio.expected_return,
        })
        .collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;
  use crate::portfolio::AllocationConfig;
  use crate::portfolio::AllocationEngine;
  use crate::portfolio::Asset;

  fn report() -> AllocationReport {
    let assets = vec![
      Asset::new("home".to_string(), 2.0, None),
      Asset::new("away".to_string(), 3.0, None),
      Asset::new("draw".to_string(), 1.5, None),
    ];
    AllocationEngine::new(AllocationConfig {
      target_point_count: 10,
      random_portfolio_count: 50,
      ..AllocationConfig::default()
    })
    .recommend_profiles(&assets)
    .unwrap()
  }

  #[test]
  fn asset_rows_follow_input_order() {
    let report = report();
    let rows = asset_rows(&report);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].description, "away");
    assert_eq!(rows[1].odds, 3.0);
    assert_abs_diff_eq!(rows[1].expected_return, 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(rows[1].variance, 1.0, epsilon = 1e-12);

    let conservative: f64 = rows.iter().map(|r| r.conservative_stake).sum();
    assert_abs_diff_eq!(conservative, 100.0, epsilon = 1e-4);
  }

  #[test]
  fn summary_has_one_row_per_profile() {
    let rows = summary_rows(&report());
    let names: Vec<&str> = rows.iter().map(|r| r.profile.as_str()).collect();
    assert_eq!(names, vec!["Conservative", "Balanced", "Aggressive"]);
    assert!(rows.iter().all(|r| r.sharpe.is_some()));
  }

  #[test]
  fn tables_render_every_row() {
    let report = report();
    let assets = asset_table(&report);
    let summary = summary_table(&report);

    assert_eq!(assets.len(), 3);
    assert_eq!(summary.len(), 3);
    assert!(summary.to_string().contains("Aggressive"));
  }

  #[test]
  fn chart_data_mirrors_report() {
    let report = report();
    let chart = ChartData::from_report(&report);

    assert_eq!(chart.cloud_risks.len(), 50);
    assert_eq!(chart.cloud_sharpes.len(), 50);
    assert_eq!(chart.frontier_risks.len(), report.frontier.len());
    assert_eq!(chart.profiles.len(), 3);
    assert_eq!(chart.profiles[0].name, "Conservative");
  }
}
