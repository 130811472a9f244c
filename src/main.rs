use std::env;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wager_frontier::io::load_config;
use wager_frontier::io::read_assets_csv;
use wager_frontier::io::write_markowitz_csv;
use wager_frontier::io::write_report_csv;
use wager_frontier::portfolio::AllocationConfig;
use wager_frontier::portfolio::AllocationEngine;
use wager_frontier::report::ChartData;
use wager_frontier::report::asset_table;
use wager_frontier::report::markowitz_table;
use wager_frontier::report::summary_table;
use wager_frontier::visualization::FrontierPlotter;

// Usage: wager-frontier [bets.csv] [output dir] [config.toml]
fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  let mut args = env::args().skip(1);
  let input = PathBuf::from(args.next().unwrap_or_else(|| "./data/bets.csv".to_string()));
  let output = PathBuf::from(args.next().unwrap_or_else(|| "./output".to_string()));
  let config = match args.next() {
    Some(path) => load_config(path)?,
    None => AllocationConfig::default(),
  };

  let assets = read_assets_csv(&input)?;
  info!(input = %input.display(), bets = assets.len(), "loaded bets");

  for asset in &assets {
    info!(
      bet = %asset.description,
      odds = asset.odds,
      expected_value = asset.expected_value(),
      "single bet"
    );
  }

  let engine = AllocationEngine::new(config);
  let report = engine
    .recommend_profiles(&assets)
    .context("computing profile allocations")?;

  println!("\nAllocations (stakes of {:.2})", engine.config().total_budget);
  asset_table(&report).printstd();
  println!("\nProfiles");
  summary_table(&report).printstd();

  write_report_csv(&report, &output)?;
  FrontierPlotter::new()
    .title("Betting book: efficient frontier")
    .write_html(&ChartData::from_report(&report), output.join("frontier.html"))?;

  let markowitz = engine
    .recommend_markowitz(&assets)
    .context("computing the Markowitz allocation")?;
  println!(
    "\nMarkowitz allocation (risk aversion {})",
    markowitz.risk_aversion
  );
  markowitz_table(&markowitz).printstd();
  write_markowitz_csv(&markowitz, &output)?;

  info!(output = %output.display(), "reports written");
  Ok(())
}
