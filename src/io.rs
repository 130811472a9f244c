//! # I/O
//!
//! CSV input of wagers, CSV output of allocations, TOML configuration.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use csv::ReaderBuilder;
use csv::Trim;
use csv::WriterBuilder;
use serde::Serialize;
use tracing::debug;

use crate::portfolio::AllocationConfig;
use crate::portfolio::AllocationReport;
use crate::portfolio::Asset;
use crate::portfolio::MarkowitzAllocation;
use crate::report::asset_rows;
use crate::report::markowitz_rows;
use crate::report::summary_rows;

pub const ALLOCATIONS_FILE: &str = "allocations.csv";
pub const SUMMARY_FILE: &str = "summary.csv";
pub const MARKOWITZ_FILE: &str = "markowitz.csv";

/// Read wagers from any CSV source with a `description,odds[,probability]` header.
pub fn read_assets<R: Read>(reader: R) -> Result<Vec<Asset>> {
  let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
  let mut assets = Vec::new();
  for (i, record) in rdr.deserialize::<Asset>().enumerate() {
    let asset = record.with_context(|| format!("invalid wager on data row {}", i + 1))?;
    assets.push(asset);
  }
  Ok(assets)
}

/// Read wagers from a CSV file.
pub fn read_assets_csv(path: impl AsRef<Path>) -> Result<Vec<Asset>> {
  let path = path.as_ref();
  let file = fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
  let assets = read_assets(file).with_context(|| format!("reading {}", path.display()))?;
  debug!(path = %path.display(), assets = assets.len(), "loaded wagers");
  Ok(assets)
}

/// Load and validate an [`AllocationConfig`] from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<AllocationConfig> {
  let path = path.as_ref();
  let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
  let config =
    AllocationConfig::from_toml_str(&text).with_context(|| format!("parsing {}", path.display()))?;
  Ok(config)
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
  let mut wtr = WriterBuilder::new()
    .has_headers(true)
    .from_path(path)
    .with_context(|| format!("creating {}", path.display()))?;
  for row in rows {
    wtr.serialize(row)?;
  }
  wtr.flush()?;
  Ok(())
}

/// Write the per-asset and per-profile tables into `dir`.
pub fn write_report_csv(report: &AllocationReport, dir: impl AsRef<Path>) -> Result<()> {
  let dir = dir.as_ref();
  fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
  write_rows(&dir.join(ALLOCATIONS_FILE), &asset_rows(report))?;
  write_rows(&dir.join(SUMMARY_FILE), &summary_rows(report))?;
  debug!(dir = %dir.display(), "wrote allocation tables");
  Ok(())
}

/// Write the Markowitz recommendation into `dir`.
pub fn write_markowitz_csv(allocation: &MarkowitzAllocation, dir: impl AsRef<Path>) -> Result<()> {
  let dir = dir.as_ref();
  fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
  write_rows(&dir.join(MARKOWITZ_FILE), &markowitz_rows(allocation))
}
