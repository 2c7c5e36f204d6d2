//! Shared dashboard pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> window filter -> resample -> derive -> aggregate / flows
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! Every view builder takes an explicit params struct and reads only from
//! `DashboardData`, so the same inputs always produce the same view.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::data::{EiaClient, IMPORT_COLUMNS, INTERNATIONAL_COLUMNS, SPOT_COLUMNS};
use crate::domain::{
    Dataset, DerivedSeries, FlowGraph, FlowTotal, Frequency, MultiSeries, Series, TimeWindow,
};
use crate::error::AppError;
use crate::io::{IngestedFlows, IngestedTable, read_dataset, read_flows, write_dataset_csv};
use crate::series::{
    DEFAULT_DESTINATION, DEFAULT_TRAILING_MONTHS, EntityMean, MetricParams, available_years,
    build_flow_graph, derive_series, filter_multi, filter_origins, filter_series, filter_year,
    percent_change, rank_origin_totals, rank_trailing_means, resample_series, spread,
};

/// Spot product codes as they appear in the EIA data.
pub const BRENT_PRODUCT: &str = "EPCBRENT";
pub const WTI_PRODUCT: &str = "EPCWTI";

/// Countries shown when no explicit selection is given.
pub const DEFAULT_COUNTRIES: [&str; 2] = ["United States", "OPEC"];

/// Human label for a spot product code.
pub fn product_label(entity: &str) -> &str {
    match entity {
        BRENT_PRODUCT => "Brent",
        WTI_PRODUCT => "WTI",
        other => other,
    }
}

/// Everything the views read, ingested once per run.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub production: IngestedTable,
    pub consumption: IngestedTable,
    pub stocks: IngestedTable,
    pub spot: IngestedTable,
    pub flows: IngestedFlows,
}

impl DashboardData {
    /// Load all five datasets from the data directory.
    pub fn load(data_dir: &Path) -> Result<Self, AppError> {
        Ok(Self {
            production: read_dataset(data_dir, Dataset::Production)?,
            consumption: read_dataset(data_dir, Dataset::Consumption)?,
            stocks: read_dataset(data_dir, Dataset::Stocks)?,
            spot: read_dataset(data_dir, Dataset::SpotPrices)?,
            flows: read_flows(data_dir)?,
        })
    }

    pub fn supply_table(&self, dataset: Dataset) -> Result<&IngestedTable, AppError> {
        match dataset {
            Dataset::Production => Ok(&self.production),
            Dataset::Consumption => Ok(&self.consumption),
            Dataset::Stocks => Ok(&self.stocks),
            Dataset::SpotPrices | Dataset::ImportFlows => Err(AppError::new(
                2,
                format!("{} is not a supply/demand dataset.", dataset.display_name()),
            )),
        }
    }

    /// Total row-level anomalies across all datasets.
    pub fn issue_count(&self) -> usize {
        self.production.issues.len()
            + self.consumption.issues.len()
            + self.stocks.issues.len()
            + self.spot.issues.len()
            + self.flows.issues.len()
    }
}

/// Result of persisting one fetched dataset.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub dataset: Dataset,
    pub rows: usize,
    pub path: PathBuf,
}

/// Fetch all datasets from the EIA API and persist them as CSV.
pub fn run_fetch(data_dir: &Path) -> Result<Vec<FetchOutcome>, AppError> {
    fs::create_dir_all(data_dir).map_err(|e| {
        AppError::new(
            2,
            format!(
                "Failed to create data directory '{}': {e}",
                data_dir.display()
            ),
        )
    })?;

    let client = EiaClient::from_env()?;
    let mut outcomes = Vec::new();

    for dataset in Dataset::SUPPLY_DEMAND {
        let rows = client.fetch_supply_demand(dataset)?;
        outcomes.push(persist(data_dir, dataset, &INTERNATIONAL_COLUMNS, rows)?);
    }
    let rows = client.fetch_spot_prices()?;
    outcomes.push(persist(data_dir, Dataset::SpotPrices, &SPOT_COLUMNS, rows)?);
    let rows = client.fetch_imports()?;
    outcomes.push(persist(data_dir, Dataset::ImportFlows, &IMPORT_COLUMNS, rows)?);

    Ok(outcomes)
}

fn persist(
    data_dir: &Path,
    dataset: Dataset,
    headers: &[&str],
    rows: Vec<Vec<String>>,
) -> Result<FetchOutcome, AppError> {
    let path = data_dir.join(dataset.file_name());
    write_dataset_csv(&path, headers, &rows)?;
    Ok(FetchOutcome {
        dataset,
        rows: rows.len(),
        path,
    })
}

// ---------------------------------------------------------------------------
// Spot prices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SpotParams {
    pub window: TimeWindow,
    pub frequency: Frequency,
    pub mean_window: usize,
    pub vol_window: usize,
}

impl Default for SpotParams {
    fn default() -> Self {
        Self {
            window: TimeWindow::M6,
            frequency: Frequency::Daily,
            mean_window: 20,
            vol_window: 20,
        }
    }
}

/// Headline numbers for one spot series over the selected window.
#[derive(Debug, Clone)]
pub struct SpotKpi {
    pub label: String,
    pub last: Option<f64>,
    pub change: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    /// Latest rolling deviation of the change column, in percent points.
    pub vol: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SpotView {
    pub brent: DerivedSeries,
    pub wti: DerivedSeries,
    pub spread: DerivedSeries,
    pub kpis: Vec<SpotKpi>,
}

/// Build the spot-price view: both benchmarks, their spread, and KPIs.
///
/// Both legs go through the same window filter and resampler before the
/// spread is taken, so the subtraction always compares like with like.
pub fn spot_view(data: &DashboardData, params: &SpotParams) -> Result<SpotView, AppError> {
    let brent = prepared_product(&data.spot.multi, BRENT_PRODUCT, params);
    let wti = prepared_product(&data.spot.multi, WTI_PRODUCT, params);
    let diff = spread(&brent, &wti);

    let metric = MetricParams {
        mean_window: params.mean_window,
        vol_window: params.vol_window,
    };
    let brent = derive_series(&brent, &metric)?;
    let wti = derive_series(&wti, &metric)?;
    let diff = derive_series(&diff, &metric)?;

    let kpis = vec![
        spot_kpi(product_label(BRENT_PRODUCT), &brent),
        spot_kpi(product_label(WTI_PRODUCT), &wti),
        spot_kpi("Brent-WTI spread", &diff),
    ];

    Ok(SpotView {
        brent,
        wti,
        spread: diff,
        kpis,
    })
}

fn prepared_product(multi: &MultiSeries, product: &str, params: &SpotParams) -> Series {
    let series = multi
        .get(product)
        .cloned()
        .unwrap_or_else(|| Series::new(product));
    resample_series(&filter_series(&series, params.window), params.frequency)
}

fn spot_kpi(label: &str, derived: &DerivedSeries) -> SpotKpi {
    let last = derived.latest();
    let mut range: Option<(f64, f64)> = None;
    for v in derived.points.iter().filter_map(|p| p.value) {
        range = Some(match range {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        });
    }
    SpotKpi {
        label: label.to_string(),
        last: last.and_then(|p| p.value),
        change: last.and_then(|p| p.change),
        high: range.map(|(_, hi)| hi),
        low: range.map(|(lo, _)| lo),
        vol: derived.points.iter().rev().find_map(|p| p.rolling_std),
    }
}

// ---------------------------------------------------------------------------
// Supply / demand
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SupplyDemandParams {
    pub dataset: Dataset,
    pub window: TimeWindow,
    /// Explicit country selection; empty means the default pair.
    pub countries: Vec<String>,
    pub trailing_months: u32,
}

impl Default for SupplyDemandParams {
    fn default() -> Self {
        Self {
            dataset: Dataset::Production,
            window: TimeWindow::Y5,
            countries: Vec::new(),
            trailing_months: DEFAULT_TRAILING_MONTHS,
        }
    }
}

/// Latest reading for one selected country.
#[derive(Debug, Clone)]
pub struct CountryKpi {
    pub entity: String,
    pub period: Option<NaiveDate>,
    pub value: Option<f64>,
    pub change: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SupplyDemandView {
    pub dataset: Dataset,
    /// Windowed series for the selected countries (chart input).
    pub series: MultiSeries,
    /// Trailing-mean ranking over the full history, `None` when no selected
    /// entity has data in the trailing window.
    pub ranking: Option<Vec<EntityMean>>,
    /// Every entity present in the dataset, for selection UIs.
    pub available: Vec<String>,
    pub kpis: Vec<CountryKpi>,
}

/// Build the supply/demand view for one dataset.
pub fn supply_demand_view(
    data: &DashboardData,
    params: &SupplyDemandParams,
) -> Result<SupplyDemandView, AppError> {
    if params.trailing_months == 0 {
        return Err(AppError::new(2, "Trailing window must be at least 1 month."));
    }
    let table = data.supply_table(params.dataset)?;
    let available = table.multi.entities();

    let defaults: Vec<String> = DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect();
    let requested: &[String] = if params.countries.is_empty() {
        &defaults
    } else {
        &params.countries
    };
    let selected: Vec<String> = requested
        .iter()
        .filter(|c| available.contains(c))
        .cloned()
        .collect();

    // Window against the whole dataset so every entity shares one anchor,
    // then keep only the selected ones for the chart.
    let filtered = filter_multi(&table.multi, params.window);
    let mut series = MultiSeries::new();
    for entity in &selected {
        if let Some(s) = filtered.get(entity) {
            series.insert(s.clone());
        }
    }

    let ranking = rank_trailing_means(
        &table.multi,
        &params.countries,
        &defaults,
        params.trailing_months,
    );

    let kpis = selected
        .iter()
        .map(|entity| country_kpi(entity, series.get(entity)))
        .collect();

    Ok(SupplyDemandView {
        dataset: params.dataset,
        series,
        ranking,
        available,
        kpis,
    })
}

fn country_kpi(entity: &str, series: Option<&Series>) -> CountryKpi {
    let Some(series) = series else {
        return CountryKpi {
            entity: entity.to_string(),
            period: None,
            value: None,
            change: None,
        };
    };
    let change = percent_change(&series.points);
    let last = series.points.last();
    CountryKpi {
        entity: series.entity.clone(),
        period: last.map(|p| p.period),
        value: last.and_then(|p| p.value),
        change: change.last().copied().flatten(),
    }
}

// ---------------------------------------------------------------------------
// Import flows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct FlowsParams {
    /// Calendar year to show; `None` means the latest year present.
    pub year: Option<i32>,
    /// Origin filter; empty keeps every origin.
    pub origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FlowsView {
    /// Years present in the data, newest first.
    pub years: Vec<i32>,
    /// The year actually shown.
    pub year: Option<i32>,
    pub graph: FlowGraph,
    pub totals: Vec<FlowTotal>,
    pub top: Option<FlowTotal>,
    pub second: Option<FlowTotal>,
}

/// Build the import-flow view for one year.
pub fn flows_view(data: &DashboardData, params: &FlowsParams) -> FlowsView {
    let years = available_years(&data.flows.records);
    let year = params.year.or_else(|| years.first().copied());

    let scoped = match year {
        Some(y) => filter_year(&data.flows.records, y),
        None => Vec::new(),
    };
    let scoped = filter_origins(&scoped, &params.origins);

    let graph = build_flow_graph(&scoped, DEFAULT_DESTINATION);
    let totals = rank_origin_totals(&scoped);
    let top = totals.first().cloned();
    let second = totals.get(1).cloned();

    FlowsView {
        years,
        year,
        graph,
        totals,
        top,
        second,
    }
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct OverviewParams {
    pub country: String,
}

impl Default for OverviewParams {
    fn default() -> Self {
        Self {
            country: "United States".to_string(),
        }
    }
}

/// One headline metric row on the overview tab.
#[derive(Debug, Clone)]
pub struct MetricKpi {
    pub label: String,
    pub unit: &'static str,
    pub period: Option<NaiveDate>,
    pub value: Option<f64>,
    pub change: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct OverviewView {
    pub country: String,
    pub supply: Vec<MetricKpi>,
    pub spot: Vec<MetricKpi>,
}

/// Build the overview: latest supply/demand readings for one country plus
/// the spot benchmarks. Missing series degrade to empty KPI rows.
pub fn overview_view(data: &DashboardData, params: &OverviewParams) -> OverviewView {
    let mut supply = Vec::new();
    for dataset in Dataset::SUPPLY_DEMAND {
        let table = match dataset {
            Dataset::Consumption => &data.consumption,
            Dataset::Stocks => &data.stocks,
            _ => &data.production,
        };
        supply.push(metric_kpi(
            dataset.display_name(),
            dataset.unit(),
            table.multi.get(&params.country),
        ));
    }

    let brent = data.spot.multi.get(BRENT_PRODUCT);
    let wti = data.spot.multi.get(WTI_PRODUCT);
    let diff = spread(
        brent.unwrap_or(&Series::new(BRENT_PRODUCT)),
        wti.unwrap_or(&Series::new(WTI_PRODUCT)),
    );
    let spot = vec![
        metric_kpi(product_label(BRENT_PRODUCT), Dataset::SpotPrices.unit(), brent),
        metric_kpi(product_label(WTI_PRODUCT), Dataset::SpotPrices.unit(), wti),
        metric_kpi("Brent-WTI spread", Dataset::SpotPrices.unit(), Some(&diff)),
    ];

    OverviewView {
        country: params.country.clone(),
        supply,
        spot,
    }
}

fn metric_kpi(label: &str, unit: &'static str, series: Option<&Series>) -> MetricKpi {
    let kpi = country_kpi(label, series);
    MetricKpi {
        label: label.to_string(),
        unit,
        period: kpi.period,
        value: kpi.value,
        change: kpi.change,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeriesPoint;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn daily(entity: &str, from: NaiveDate, values: &[f64]) -> Series {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| SeriesPoint {
                period: from + chrono::Days::new(i as u64),
                value: Some(v),
            })
            .collect();
        Series::from_records(entity, points)
    }

    fn monthly(entity: &str, from: (i32, u32), values: &[f64]) -> Series {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let month0 = (from.1 - 1 + i as u32) % 12 + 1;
                let year = from.0 + ((from.1 - 1 + i as u32) / 12) as i32;
                SeriesPoint {
                    period: d(year, month0, 1),
                    value: Some(v),
                }
            })
            .collect();
        Series::from_records(entity, points)
    }

    fn table(dataset: Dataset, series: Vec<Series>) -> IngestedTable {
        let mut t = IngestedTable::empty(dataset);
        for s in series {
            t.multi.insert(s);
        }
        t
    }

    fn sample_data() -> DashboardData {
        let start = d(2024, 3, 11);
        DashboardData {
            production: table(
                Dataset::Production,
                vec![
                    monthly("United States", (2024, 1), &[13.0, 13.1, 13.2]),
                    monthly("OPEC", (2024, 1), &[27.0, 26.8, 26.9]),
                    monthly("Norway", (2024, 1), &[1.8, 1.8, 1.9]),
                ],
            ),
            consumption: table(
                Dataset::Consumption,
                vec![monthly("United States", (2024, 1), &[20.0, 20.2, 20.1])],
            ),
            stocks: table(
                Dataset::Stocks,
                vec![monthly("United States", (2024, 1), &[430.0, 428.0, 433.0])],
            ),
            spot: table(
                Dataset::SpotPrices,
                vec![
                    daily(BRENT_PRODUCT, start, &[80.0, 82.0, 81.0, 83.0]),
                    daily(WTI_PRODUCT, start, &[70.0, 71.0, 70.5, 72.0]),
                ],
            ),
            flows: IngestedFlows {
                records: vec![
                    crate::domain::FlowRecord {
                        period: d(2024, 1, 1),
                        origin: "Canada".to_string(),
                        quantity: 500.0,
                    },
                    crate::domain::FlowRecord {
                        period: d(2024, 2, 1),
                        origin: "Mexico".to_string(),
                        quantity: 200.0,
                    },
                    crate::domain::FlowRecord {
                        period: d(2023, 6, 1),
                        origin: "Iraq".to_string(),
                        quantity: 900.0,
                    },
                ],
                issues: Vec::new(),
                rows_read: 3,
                rows_used: 3,
            },
        }
    }

    #[test]
    fn spot_view_derives_both_legs_and_their_spread() {
        let data = sample_data();
        let params = SpotParams {
            window: TimeWindow::Max,
            frequency: Frequency::Daily,
            mean_window: 2,
            vol_window: 2,
        };
        let view = spot_view(&data, &params).unwrap();

        assert_eq!(view.brent.points.len(), 4);
        assert_eq!(view.spread.latest().unwrap().value, Some(11.0));

        let labels: Vec<&str> = view.kpis.iter().map(|k| k.label.as_str()).collect();
        assert_eq!(labels, vec!["Brent", "WTI", "Brent-WTI spread"]);
        assert_eq!(view.kpis[0].last, Some(83.0));
        assert_eq!(view.kpis[0].high, Some(83.0));
        assert_eq!(view.kpis[0].low, Some(80.0));
        // (83 - 81) / 81 * 100, rounded to two decimals.
        assert_eq!(view.kpis[0].change, Some(2.47));
    }

    #[test]
    fn spot_view_handles_a_missing_product() {
        let mut data = sample_data();
        data.spot = table(
            Dataset::SpotPrices,
            vec![daily(BRENT_PRODUCT, d(2024, 3, 11), &[80.0, 82.0])],
        );
        let view = spot_view(&data, &SpotParams::default()).unwrap();
        assert!(view.wti.points.is_empty());
        assert_eq!(view.kpis[1].last, None);
        // Spread stays null without a second leg.
        assert!(view.spread.points.iter().all(|p| p.value.is_none()));
    }

    #[test]
    fn supply_view_falls_back_to_default_countries() {
        let data = sample_data();
        let view = supply_demand_view(&data, &SupplyDemandParams::default()).unwrap();

        assert_eq!(view.dataset, Dataset::Production);
        assert!(view.available.contains(&"Norway".to_string()));
        assert_eq!(view.kpis.len(), 2);
        assert_eq!(view.kpis[0].entity, "United States");
        assert_eq!(view.kpis[0].value, Some(13.2));
        assert_eq!(view.kpis[0].period, Some(d(2024, 3, 1)));

        let ranking = view.ranking.unwrap();
        let order: Vec<&str> = ranking.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(order, vec!["OPEC", "United States"]);
    }

    #[test]
    fn supply_view_with_unknown_selection_degrades_to_empty() {
        let data = sample_data();
        let params = SupplyDemandParams {
            countries: vec!["Atlantis".to_string()],
            ..Default::default()
        };
        let view = supply_demand_view(&data, &params).unwrap();
        assert!(view.series.is_empty());
        assert!(view.kpis.is_empty());
        assert!(view.ranking.is_none());
    }

    #[test]
    fn supply_view_rejects_zero_trailing_months() {
        let data = sample_data();
        let params = SupplyDemandParams {
            trailing_months: 0,
            ..Default::default()
        };
        let err = supply_demand_view(&data, &params).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn flows_view_defaults_to_latest_year() {
        let data = sample_data();
        let view = flows_view(&data, &FlowsParams::default());

        assert_eq!(view.years, vec![2024, 2023]);
        assert_eq!(view.year, Some(2024));
        // 2023 Iraq shipment is outside the shown year.
        assert_eq!(view.graph.nodes, vec!["Canada", "Mexico", "USA"]);
        assert_eq!(view.top.as_ref().unwrap().origin, "Canada");
        assert_eq!(view.second.as_ref().unwrap().origin, "Mexico");
    }

    #[test]
    fn flows_view_honors_year_and_origin_filters() {
        let data = sample_data();
        let params = FlowsParams {
            year: Some(2023),
            origins: vec!["Iraq".to_string()],
        };
        let view = flows_view(&data, &params);
        assert_eq!(view.year, Some(2023));
        assert_eq!(view.totals.len(), 1);
        assert_eq!(view.top.as_ref().unwrap().quantity, 900.0);
        assert!(view.second.is_none());
    }

    #[test]
    fn overview_collects_supply_and_spot_headlines() {
        let data = sample_data();
        let view = overview_view(&data, &OverviewParams::default());

        assert_eq!(view.supply.len(), 3);
        assert_eq!(view.supply[0].label, "Production");
        assert_eq!(view.supply[0].value, Some(13.2));
        assert_eq!(view.supply[2].unit, "mmbbl");

        assert_eq!(view.spot.len(), 3);
        assert_eq!(view.spot[2].label, "Brent-WTI spread");
        assert_eq!(view.spot[2].value, Some(11.0));
    }
}
