//! # Visualization
//!
//! $$
//! \{(\sigma_k, r_k)\}_{k=1}^m \mapsto \text{risk/return scatter}
//! $$
//!
//! Random portfolio cloud colored by Sharpe ratio, the efficient frontier and
//! the three profile allocations on one chart.

use std::fs;
use std::path::Path;

use anyhow::Context;
use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;
use plotly::common::ColorScale;
use plotly::common::ColorScalePalette;
use plotly::common::Line;
use plotly::common::Marker;
use plotly::common::MarkerSymbol;
use plotly::common::Mode;
use plotly::common::Title;
use plotly::layout::Axis;
use plotly::layout::Margin;

use crate::report::ChartData;

pub struct FrontierPlotter {
  title: String,
  cloud_marker_size: usize,
  profile_marker_size: usize,
  line_width: f64,
  height: usize,
}

impl Default for FrontierPlotter {
  fn default() -> Self {
    Self::new()
  }
}

impl FrontierPlotter {
  pub fn new() -> Self {
    Self {
      title: "Efficient frontier".to_string(),
      cloud_marker_size: 5,
      profile_marker_size: 16,
      line_width: 2.5,
      height: 640,
    }
  }

  pub fn title(mut self, title: &str) -> Self {
    self.title = title.into();
    self
  }

  pub fn plot(&self, chart: &ChartData) -> Plot {
    let mut plot = Plot::new();
    plot.set_layout(
      Layout::new()
        .title(self.title.as_str())
        .auto_size(true)
        .height(self.height)
        .margin(Margin::new().left(64).right(24).top(72).bottom(56))
        .x_axis(Axis::new().title(Title::from("Risk (standard deviation)")))
        .y_axis(Axis::new().title(Title::from("Expected return"))),
    );

    if !chart.cloud_risks.is_empty() {
      plot.add_trace(
        Scatter::new(chart.cloud_risks.clone(), chart.cloud_returns.clone())
          .mode(Mode::Markers)
          .name("Random portfolios")
          .marker(
            Marker::new()
              .size(self.cloud_marker_size)
              .opacity(0.6)
              .color_array(chart.cloud_sharpes.clone())
              .color_scale(ColorScale::Palette(ColorScalePalette::Viridis))
              .show_scale(true),
          ),
      );
    }

    if !chart.frontier_risks.is_empty() {
      plot.add_trace(
        Scatter::new(chart.frontier_risks.clone(), chart.frontier_returns.clone())
          .mode(Mode::Lines)
          .name("Efficient frontier")
          .line(Line::new().width(self.line_width).color("black")),
      );
    }

    for profile in &chart.profiles {
      plot.add_trace(
        Scatter::new(vec![profile.risk], vec![profile.expected_return])
          .mode(Mode::Markers)
          .name(profile.name.as_str())
          .marker(
            Marker::new()
              .symbol(MarkerSymbol::Star)
              .size(self.profile_marker_size),
          ),
      );
    }

    plot
  }

  /// Render the chart to a standalone HTML file, creating parent directories.
  pub fn write_html(&self, chart: &ChartData, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let html = self.plot(chart).to_html();
    fs::write(path, html).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::report::ProfileMarker;

  fn chart() -> ChartData {
    ChartData {
      cloud_risks: vec![0.3, 0.4, 0.5],
      cloud_returns: vec![0.8, 1.1, 1.3],
      cloud_sharpes: vec![2.67, 2.75, 2.6],
      frontier_risks: vec![0.22, 0.35, 1.0],
      frontier_returns: vec![0.67, 1.2, 2.0],
      profiles: vec![ProfileMarker {
        name: "Balanced".to_string(),
        risk: 0.35,
        expected_return: 1.2,
      }],
    }
  }

  #[test]
  fn one_trace_per_series_and_profile() {
    let json = FrontierPlotter::new().plot(&chart()).to_json();
    assert_eq!(json.matches("\"type\":\"scatter\"").count(), 3);

    let empty = FrontierPlotter::new().plot(&ChartData::default()).to_json();
    assert_eq!(empty.matches("\"type\":\"scatter\"").count(), 0);
  }

  #[test]
  fn writes_html_into_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("charts").join("frontier.html");

    FrontierPlotter::new()
      .title("Test frontier")
      .write_html(&chart(), &path)
      .unwrap();

    let html = fs::read_to_string(&path).unwrap();
    assert!(html.contains("Efficient frontier"));
    assert!(html.contains("Balanced"));
  }
}
