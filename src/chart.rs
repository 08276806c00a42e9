//! Chart data preparation. The core builds the plottable lines; actually
//! rasterizing them is a collaborator concern behind [`ChartRenderer`].

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::aggregate::LedgerSeries;

pub const NET_EQUITY_LABEL: &str = "Net Equity";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    #[serde(with = "crate::models::ts_format")]
    pub timestamp: NaiveDateTime,
    pub value: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartLine {
    pub label: String,
    pub points: Vec<ChartPoint>,
}

/// One line per ledger category plus the net-equity line, every line's
/// points in timestamp order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartData {
    pub lines: Vec<ChartLine>,
}

impl ChartData {
    /// Liability-side values are stored positive in the ledger; the category
    /// whose name matches the secondary group is plotted negated so it pulls
    /// the picture down the way net equity does.
    pub fn from_series(series: &LedgerSeries, secondary_group: &str) -> Self {
        let mut lines: Vec<ChartLine> = series
            .categories
            .iter()
            .map(|category| {
                let negate = category.category.eq_ignore_ascii_case(secondary_group);
                ChartLine {
                    label: category.category.clone(),
                    points: category
                        .points
                        .iter()
                        .map(|(&timestamp, &value)| ChartPoint {
                            timestamp,
                            value: if negate { -value } else { value },
                        })
                        .collect(),
                }
            })
            .collect();

        lines.push(ChartLine {
            label: NET_EQUITY_LABEL.to_string(),
            points: series
                .net_equity
                .iter()
                .map(|(&timestamp, &value)| ChartPoint { timestamp, value })
                .collect(),
        });

        Self { lines }
    }
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to write chart to {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode chart data")]
    Encode(#[from] serde_json::Error),
}

/// Consumes prepared chart data and produces the chart file. The file is
/// regenerated (overwritten) every cycle from the full ledger history.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, data: &ChartData, path: &Path) -> Result<(), ChartError>;
}

/// Writes the lines as JSON for an external plotting frontend.
#[derive(Debug, Clone, Default)]
pub struct JsonChartRenderer;

impl ChartRenderer for JsonChartRenderer {
    fn render(&self, data: &ChartData, path: &Path) -> Result<(), ChartError> {
        let encoded = serde_json::to_string_pretty(data)?;
        std::fs::write(path, encoded).map_err(|source| ChartError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Renderer that produces nothing; for tests and chartless setups.
#[derive(Debug, Clone, Default)]
pub struct NoopChartRenderer;

impl ChartRenderer for NoopChartRenderer {
    fn render(&self, _data: &ChartData, _path: &Path) -> Result<(), ChartError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::build_series;
    use crate::models::LedgerRow;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    fn row(day: u32, group: &str, value: Decimal, category: &str) -> LedgerRow {
        LedgerRow {
            timestamp: at(day),
            group: group.into(),
            symbol: "X".into(),
            name: "X".into(),
            quantity: dec!(1),
            unit_price: value,
            value,
            category: category.into(),
        }
    }

    #[test]
    fn secondary_group_category_is_negated() {
        let rows = vec![
            row(1, "Assets", dec!(100), "Cash"),
            row(1, "Liabilities", dec!(30), "Liabilities"),
        ];
        let data = ChartData::from_series(&build_series(&rows, "Assets"), "Liabilities");

        let liabilities = data
            .lines
            .iter()
            .find(|line| line.label == "Liabilities")
            .unwrap();
        assert_eq!(liabilities.points[0].value, dec!(-30));

        let net = data
            .lines
            .iter()
            .find(|line| line.label == NET_EQUITY_LABEL)
            .unwrap();
        assert_eq!(net.points[0].value, dec!(70));
    }

    #[test]
    fn historical_capitalized_category_is_still_negated() {
        // Older ledger files capitalize the group label in the category
        // column; the definition key may be lowercase.
        let rows = vec![row(1, "Liabilities", dec!(30), "Liabilities")];
        let data = ChartData::from_series(&build_series(&rows, "assets"), "liabilities");

        let liabilities = data
            .lines
            .iter()
            .find(|line| line.label == "Liabilities")
            .unwrap();
        assert_eq!(liabilities.points[0].value, dec!(-30));
    }

    #[test]
    fn points_come_out_in_timestamp_order() {
        // Rows inserted newest-first still produce sorted lines.
        let rows = vec![
            row(2, "Assets", dec!(110), "Cash"),
            row(1, "Assets", dec!(100), "Cash"),
        ];
        let data = ChartData::from_series(&build_series(&rows, "Assets"), "Liabilities");
        let cash = &data.lines[0];
        assert_eq!(cash.points[0].timestamp, at(1));
        assert_eq!(cash.points[1].timestamp, at(2));
    }

    #[test]
    fn json_renderer_overwrites_the_chart_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chart.json");
        std::fs::write(&path, "stale").unwrap();

        let rows = vec![row(1, "Assets", dec!(100), "Cash")];
        let data = ChartData::from_series(&build_series(&rows, "Assets"), "Liabilities");
        JsonChartRenderer.render(&data, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Net Equity"));
        assert!(content.contains("2024-06-01 20:00:00"));
    }
}
