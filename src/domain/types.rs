//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built once at ingest and transformed in-memory per rendering pass
//! - exported to CSV with stable column names (`period`, `value`, `change`)
//! - rendered by both the CLI and the TUI without re-deriving anything

use std::collections::BTreeMap;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One observation in a time series.
///
/// A `None` value means the source reported the period without a usable
/// number. Missing is *not* zero; every downstream stage must preserve the
/// distinction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub period: NaiveDate,
    pub value: Option<f64>,
}

/// A per-entity time series (one country, one product, ...).
///
/// Invariants, enforced by [`Series::from_records`]:
/// - points are sorted ascending by `period`
/// - periods are unique (the first occurrence wins on duplicates)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub entity: String,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            points: Vec::new(),
        }
    }

    /// Build a series from records in arbitrary order.
    ///
    /// Sorting is stable, so for duplicate periods the record that appeared
    /// first in the input is the one that survives. Running this over an
    /// already-normalized series returns it unchanged.
    pub fn from_records(entity: impl Into<String>, mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by_key(|p| p.period);
        points.dedup_by_key(|p| p.period);
        Self {
            entity: entity.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Latest period present, regardless of whether its value is null.
    pub fn latest_period(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.period)
    }
}

/// A set of series keyed by entity name.
///
/// Backed by a `BTreeMap` so iteration order (and therefore every report and
/// ranking tie-break that falls back to it) is alphabetical and deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiSeries {
    pub by_entity: BTreeMap<String, Series>,
}

impl MultiSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: Series) {
        self.by_entity.insert(series.entity.clone(), series);
    }

    pub fn get(&self, entity: &str) -> Option<&Series> {
        self.by_entity.get(entity)
    }

    pub fn entities(&self) -> Vec<String> {
        self.by_entity.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.by_entity.is_empty()
    }

    /// Latest period across all entities (the anchor for relative windows).
    pub fn latest_period(&self) -> Option<NaiveDate> {
        self.by_entity
            .values()
            .filter_map(|s| s.latest_period())
            .max()
    }
}

/// One row of a fully derived series, as consumed by charts and exports.
///
/// Field names are part of the rendering contract and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedPoint {
    pub period: NaiveDate,
    pub value: Option<f64>,
    /// Period-over-period percent change, rounded to two decimals.
    pub change: Option<f64>,
    pub rolling_mean: Option<f64>,
    pub rolling_std: Option<f64>,
}

/// A series with its derived metric columns attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSeries {
    pub entity: String,
    pub points: Vec<DerivedPoint>,
}

impl DerivedSeries {
    /// The newest record, if any. KPIs read `value`/`change` off this row.
    pub fn latest(&self) -> Option<&DerivedPoint> {
        self.points.last()
    }
}

/// A raw import-flow observation: origin country -> quantity for a period.
///
/// Flow rows keep their file order (unlike `Series`) because node ordering in
/// the prepared graph follows first appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRecord {
    pub period: NaiveDate,
    pub origin: String,
    pub quantity: f64,
}

/// One aggregated edge of the prepared flow graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowEdge {
    pub origin: String,
    pub destination: String,
    pub quantity: f64,
}

/// Node list + aggregated edges, ready for a flow diagram.
///
/// `nodes` lists origins in first-appearance order with the destination
/// appended last (the destination is present even when there are no edges).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<FlowEdge>,
}

/// Total quantity shipped by one origin, used for rankings.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowTotal {
    pub origin: String,
    pub quantity: f64,
}

/// Relative time window applied before resampling.
///
/// Windows are anchored to the latest period *in the data*, never the wall
/// clock, so a stale file still renders sensibly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    W1,
    M1,
    M3,
    M6,
    Ytd,
    Y1,
    Y5,
    Y10,
    Max,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 9] = [
        TimeWindow::W1,
        TimeWindow::M1,
        TimeWindow::M3,
        TimeWindow::M6,
        TimeWindow::Ytd,
        TimeWindow::Y1,
        TimeWindow::Y5,
        TimeWindow::Y10,
        TimeWindow::Max,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeWindow::W1 => "1W",
            TimeWindow::M1 => "1M",
            TimeWindow::M3 => "3M",
            TimeWindow::M6 => "6M",
            TimeWindow::Ytd => "YTD",
            TimeWindow::Y1 => "1Y",
            TimeWindow::Y5 => "5Y",
            TimeWindow::Y10 => "10Y",
            TimeWindow::Max => "Max",
        }
    }

    pub fn next(self) -> TimeWindow {
        let idx = Self::ALL.iter().position(|w| *w == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Parse a UI token.
    ///
    /// Accepts the short chart-range spellings (`1W` ... `10Y`, `YTD`, `Max`)
    /// and the long monthly-page spellings (`Last 1 Year`, `Last 5 Years`,
    /// `Last 10 Years`, `All`), case-insensitively. Anything else is a hard
    /// error: a bad window is caller misconfiguration, not missing data.
    pub fn parse_token(token: &str) -> Result<TimeWindow, AppError> {
        let normalized = token.trim().to_ascii_lowercase();
        let window = match normalized.as_str() {
            "1w" => TimeWindow::W1,
            "1m" => TimeWindow::M1,
            "3m" => TimeWindow::M3,
            "6m" => TimeWindow::M6,
            "ytd" => TimeWindow::Ytd,
            "1y" | "last 1 year" => TimeWindow::Y1,
            "5y" | "last 5 years" => TimeWindow::Y5,
            "10y" | "last 10 years" => TimeWindow::Y10,
            "max" | "all" => TimeWindow::Max,
            _ => {
                return Err(AppError::new(
                    2,
                    format!("Unknown time window '{token}'. Expected one of: 1W, 1M, 3M, 6M, YTD, 1Y, 5Y, 10Y, Max."),
                ));
            }
        };
        Ok(window)
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Output granularity of the resampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Keep records as-is (identity).
    Daily,
    /// One record per week ending Friday.
    Weekly,
    /// One record per calendar month, labeled with the month-end date.
    Monthly,
}

impl Frequency {
    pub fn label(self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        }
    }

    pub fn next(self) -> Frequency {
        match self {
            Frequency::Daily => Frequency::Weekly,
            Frequency::Weekly => Frequency::Monthly,
            Frequency::Monthly => Frequency::Daily,
        }
    }

    pub fn parse_token(token: &str) -> Result<Frequency, AppError> {
        match token.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(AppError::new(
                2,
                format!("Unknown frequency '{token}'. Expected daily, weekly, or monthly."),
            )),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The flat files this tool fetches and reads.
///
/// Each dataset carries its own column layout; everything else in the crate
/// works off the normalized form and never sees these names again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Production,
    Consumption,
    Stocks,
    #[value(skip)]
    SpotPrices,
    #[value(skip)]
    ImportFlows,
}

impl Dataset {
    /// The international supply/demand datasets (one per EIA activity).
    pub const SUPPLY_DEMAND: [Dataset; 3] =
        [Dataset::Production, Dataset::Consumption, Dataset::Stocks];

    pub fn display_name(self) -> &'static str {
        match self {
            Dataset::Production => "Production",
            Dataset::Consumption => "Consumption",
            Dataset::Stocks => "Stocks",
            Dataset::SpotPrices => "Spot prices",
            Dataset::ImportFlows => "Import flows",
        }
    }

    /// File name under the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Dataset::Production => "production.csv",
            Dataset::Consumption => "consumption.csv",
            Dataset::Stocks => "stocks.csv",
            Dataset::SpotPrices => "spot_prices.csv",
            Dataset::ImportFlows => "imports.csv",
        }
    }

    /// CSV column holding the entity (series key) for this dataset.
    pub fn entity_column(self) -> &'static str {
        match self {
            Dataset::Production | Dataset::Consumption | Dataset::Stocks => "countryRegionName",
            Dataset::SpotPrices => "product",
            Dataset::ImportFlows => "originName",
        }
    }

    /// CSV column holding the numeric observation.
    pub fn value_column(self) -> &'static str {
        match self {
            Dataset::ImportFlows => "quantity",
            _ => "value",
        }
    }

    /// Short unit label for KPI and axis text.
    pub fn unit(self) -> &'static str {
        match self {
            Dataset::Production | Dataset::Consumption => "kb/d",
            Dataset::Stocks => "mmbbl",
            Dataset::SpotPrices => "$/bbl",
            Dataset::ImportFlows => "kbbl",
        }
    }

    /// Record-level predicate applied before coercion: `(column, required value)`.
    ///
    /// The international files mix products; the dashboard only tracks crude.
    pub fn product_filter(self) -> Option<(&'static str, &'static str)> {
        match self {
            Dataset::Production | Dataset::Consumption | Dataset::Stocks => {
                Some(("productName", "Crude oil including lease condensate"))
            }
            Dataset::SpotPrices | Dataset::ImportFlows => None,
        }
    }

    /// Whether rows with missing or non-positive values are unusable.
    ///
    /// The supply/demand feeds report zero/negative placeholders for entities
    /// with no activity; prices keep every period and preserve nulls.
    pub fn drop_nonpositive(self) -> bool {
        matches!(
            self,
            Dataset::Production | Dataset::Consumption | Dataset::Stocks
        )
    }

    /// EIA activity facet for the international endpoint.
    pub fn activity_id(self) -> Option<&'static str> {
        match self {
            Dataset::Production => Some("1"),
            Dataset::Consumption => Some("2"),
            Dataset::Stocks => Some("5"),
            Dataset::SpotPrices | Dataset::ImportFlows => None,
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
