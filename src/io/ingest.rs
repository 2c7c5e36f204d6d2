//! CSV ingest and normalization.
//!
//! This module turns the fetched EIA CSVs into clean `Series` keyed by entity
//! (country, product, or origin), ready for the pipeline.
//!
//! Design goals:
//! - **Row-level tolerance**: a bad row is skipped and reported, never fatal
//! - **Missing is not zero**: value gaps become null observations
//! - **Deterministic behavior**: first occurrence wins on duplicates
//! - **Separation of concerns**: no windowing or resampling logic here
//!
//! Only a missing *file* is an error (the fix is `crude fetch`); everything
//! inside a file degrades to issues that the health bundle can report.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{Dataset, FlowRecord, MultiSeries, Series, SeriesPoint};
use crate::error::AppError;

/// A row-level anomaly encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowIssue {
    pub line: usize,
    pub message: String,
}

/// Ingest output for a series dataset: normalized series + row issues.
#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub dataset: Dataset,
    pub multi: MultiSeries,
    pub issues: Vec<RowIssue>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl IngestedTable {
    pub fn empty(dataset: Dataset) -> Self {
        Self {
            dataset,
            multi: MultiSeries::new(),
            issues: Vec::new(),
            rows_read: 0,
            rows_used: 0,
        }
    }
}

/// Ingest output for the import-flow dataset.
///
/// Records keep file order so downstream first-seen ordering is stable.
#[derive(Debug, Clone)]
pub struct IngestedFlows {
    pub records: Vec<FlowRecord>,
    pub issues: Vec<RowIssue>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Open `<data_dir>/<dataset file>` and ingest it.
pub fn read_dataset(data_dir: &Path, dataset: Dataset) -> Result<IngestedTable, AppError> {
    let path = data_dir.join(dataset.file_name());
    let file = File::open(&path).map_err(|e| {
        AppError::new(
            3,
            format!(
                "Failed to open {} data '{}': {e}. Run `crude fetch` first.",
                dataset.display_name(),
                path.display()
            ),
        )
    })?;
    Ok(ingest_dataset(file, dataset))
}

/// Open the import-flow CSV and ingest it.
pub fn read_flows(data_dir: &Path) -> Result<IngestedFlows, AppError> {
    let path = data_dir.join(Dataset::ImportFlows.file_name());
    let file = File::open(&path).map_err(|e| {
        AppError::new(
            3,
            format!(
                "Failed to open import data '{}': {e}. Run `crude fetch` first.",
                path.display()
            ),
        )
    })?;
    Ok(ingest_flows(file))
}

/// Normalize a series CSV into per-entity `Series`.
///
/// Never fails: schema problems yield an empty table with one issue, row
/// problems yield issues for the affected rows.
pub fn ingest_dataset<R: Read>(reader: R, dataset: Dataset) -> IngestedTable {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut table = IngestedTable::empty(dataset);

    let header_map = match csv_reader.headers() {
        Ok(headers) => build_header_map(headers),
        Err(e) => {
            table.issues.push(RowIssue {
                line: 1,
                message: format!("Failed to read CSV headers: {e}"),
            });
            return table;
        }
    };

    let mut required = vec!["period", dataset.entity_column(), dataset.value_column()];
    if let Some((column, _)) = dataset.product_filter() {
        required.push(column);
    }
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| !header_map.contains_key(&normalize_header_name(name)))
        .collect();
    if !missing.is_empty() {
        table.issues.push(RowIssue {
            line: 1,
            message: format!("Missing required column(s): {}", missing.join(", ")),
        });
        return table;
    }

    let mut per_entity: BTreeMap<String, Vec<SeriesPoint>> = BTreeMap::new();
    let mut seen: HashSet<(String, NaiveDate)> = HashSet::new();

    for (idx, result) in csv_reader.records().enumerate() {
        // +2: records() starts after the header row, CSV lines are 1-based.
        let line = idx + 2;
        table.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                table.issues.push(RowIssue {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        // Off-topic rows (other products) are expected, not anomalies.
        if let Some((column, wanted)) = dataset.product_filter() {
            let actual = get_field(&record, &header_map, column).unwrap_or("");
            if actual != wanted {
                continue;
            }
        }

        let period = match get_field(&record, &header_map, "period").and_then(parse_period) {
            Some(d) => d,
            None => {
                table.issues.push(RowIssue {
                    line,
                    message: format!(
                        "Invalid or missing period '{}'",
                        get_field(&record, &header_map, "period").unwrap_or("")
                    ),
                });
                continue;
            }
        };

        let Some(entity) = get_field(&record, &header_map, dataset.entity_column()) else {
            table.issues.push(RowIssue {
                line,
                message: format!("Missing `{}` value", dataset.entity_column()),
            });
            continue;
        };
        let entity = entity.to_string();

        let value = parse_opt_value(get_field(&record, &header_map, dataset.value_column()));
        if dataset.drop_nonpositive() && !matches!(value, Some(v) if v > 0.0) {
            continue;
        }

        if !seen.insert((entity.clone(), period)) {
            table.issues.push(RowIssue {
                line,
                message: format!("Duplicate period {period} for `{entity}`, keeping the first"),
            });
            continue;
        }

        per_entity
            .entry(entity)
            .or_default()
            .push(SeriesPoint { period, value });
        table.rows_used += 1;
    }

    for (entity, points) in per_entity {
        table.multi.insert(Series::from_records(&entity, points));
    }
    table
}

/// Normalize the import-flow CSV into `FlowRecord`s, file order preserved.
///
/// Flow edges are summed, so a row without a usable quantity is malformed and
/// skipped (unlike series ingest, where a gap is a legitimate null).
pub fn ingest_flows<R: Read>(reader: R) -> IngestedFlows {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut flows = IngestedFlows {
        records: Vec::new(),
        issues: Vec::new(),
        rows_read: 0,
        rows_used: 0,
    };

    let header_map = match csv_reader.headers() {
        Ok(headers) => build_header_map(headers),
        Err(e) => {
            flows.issues.push(RowIssue {
                line: 1,
                message: format!("Failed to read CSV headers: {e}"),
            });
            return flows;
        }
    };

    let missing: Vec<&str> = ["period", "originName", "quantity"]
        .into_iter()
        .filter(|name| !header_map.contains_key(&normalize_header_name(name)))
        .collect();
    if !missing.is_empty() {
        flows.issues.push(RowIssue {
            line: 1,
            message: format!("Missing required column(s): {}", missing.join(", ")),
        });
        return flows;
    }

    for (idx, result) in csv_reader.records().enumerate() {
        let line = idx + 2;
        flows.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                flows.issues.push(RowIssue {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let period = match get_field(&record, &header_map, "period").and_then(parse_period) {
            Some(d) => d,
            None => {
                flows.issues.push(RowIssue {
                    line,
                    message: format!(
                        "Invalid or missing period '{}'",
                        get_field(&record, &header_map, "period").unwrap_or("")
                    ),
                });
                continue;
            }
        };

        let Some(origin) = get_field(&record, &header_map, "originName") else {
            flows.issues.push(RowIssue {
                line,
                message: "Missing `originName` value".to_string(),
            });
            continue;
        };

        let Some(quantity) = parse_opt_value(get_field(&record, &header_map, "quantity")) else {
            flows.issues.push(RowIssue {
                line,
                message: format!("Invalid or missing quantity for `{origin}`"),
            });
            continue;
        };

        flows.records.push(FlowRecord {
            period,
            origin: origin.to_string(),
            quantity,
        });
        flows.rows_used += 1;
    }

    flows
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿period"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_field<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(&normalize_header_name(name))?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_period(s: &str) -> Option<NaiveDate> {
    // EIA period strings vary by frequency: `2024-03-15` (daily),
    // `2024-03` (monthly), `2024` (annual).
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01-01"), "%Y-%m-%d") {
        return Some(d);
    }
    None
}

fn parse_opt_value(s: Option<&str>) -> Option<f64> {
    // Missing is not zero: sentinels and garbage both become null, and the
    // resampler/metrics stages treat null explicitly.
    let s = s?;
    if matches!(s, "." | "--") || s.eq_ignore_ascii_case("na") || s.eq_ignore_ascii_case("null") {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn production_csv_filters_product_and_drops_nonpositive() {
        let csv = "\
period,countryRegionName,activityId,productName,value
2024-01,Canada,1,Crude oil including lease condensate,500
2024-01,Canada,1,Natural gas liquids,9999
2024-02,Canada,1,Crude oil including lease condensate,0
2024-03,Canada,1,Crude oil including lease condensate,520
";
        let table = ingest_dataset(csv.as_bytes(), Dataset::Production);
        assert!(table.issues.is_empty());
        assert_eq!(table.rows_read, 4);
        assert_eq!(table.rows_used, 2);

        let series = table.multi.get("Canada").unwrap();
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].period, d(2024, 1, 1));
        assert_eq!(series.points[0].value, Some(500.0));
        assert_eq!(series.points[1].period, d(2024, 3, 1));
    }

    #[test]
    fn spot_csv_keeps_sentinel_values_as_nulls() {
        let csv = "\
period,product,value
2024-03-14,EPCBRENT,84.12
2024-03-15,EPCBRENT,.
2024-03-18,EPCBRENT,notanumber
2024-03-19,EPCBRENT,85.40
";
        let table = ingest_dataset(csv.as_bytes(), Dataset::SpotPrices);
        assert!(table.issues.is_empty());
        assert_eq!(table.rows_used, 4);

        let series = table.multi.get("EPCBRENT").unwrap();
        let values: Vec<Option<f64>> = series.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![Some(84.12), None, None, Some(85.40)]);
    }

    #[test]
    fn bad_period_and_missing_entity_become_issues() {
        let csv = "\
period,product,value
not-a-date,EPCBRENT,84.12
2024-03-15,,84.50
2024-03-18,EPCWTI,80.00
";
        let table = ingest_dataset(csv.as_bytes(), Dataset::SpotPrices);
        assert_eq!(table.rows_read, 3);
        assert_eq!(table.rows_used, 1);
        assert_eq!(table.issues.len(), 2);
        assert_eq!(table.issues[0].line, 2);
        assert!(table.issues[0].message.contains("period"));
        assert_eq!(table.issues[1].line, 3);
        assert!(table.issues[1].message.contains("product"));
    }

    #[test]
    fn duplicate_periods_keep_the_first_and_report_the_rest() {
        let csv = "\
period,product,value
2024-03-15,EPCBRENT,84.12
2024-03-15,EPCBRENT,99.99
";
        let table = ingest_dataset(csv.as_bytes(), Dataset::SpotPrices);
        assert_eq!(table.rows_used, 1);
        assert_eq!(table.issues.len(), 1);
        assert!(table.issues[0].message.contains("Duplicate"));

        let series = table.multi.get("EPCBRENT").unwrap();
        assert_eq!(series.points[0].value, Some(84.12));
    }

    #[test]
    fn missing_columns_yield_an_empty_table_with_one_issue() {
        let csv = "period,value\n2024-01,5\n";
        let table = ingest_dataset(csv.as_bytes(), Dataset::Production);
        assert!(table.multi.is_empty());
        assert_eq!(table.issues.len(), 1);
        assert!(table.issues[0].message.contains("countryRegionName"));
        assert!(table.issues[0].message.contains("productName"));
    }

    #[test]
    fn monthly_and_annual_periods_parse_to_first_day() {
        assert_eq!(parse_period("2024-03-15"), Some(d(2024, 3, 15)));
        assert_eq!(parse_period("2024-03"), Some(d(2024, 3, 1)));
        assert_eq!(parse_period("2024"), Some(d(2024, 1, 1)));
        assert_eq!(parse_period("03/15/2024"), None);
    }

    #[test]
    fn flow_rows_without_quantity_are_skipped_with_issue() {
        let csv = "\
period,originName,quantity
2024-01,Canada,500
2024-01,Saudi Arabia,
2024-02,Canada,300
";
        let flows = ingest_flows(csv.as_bytes());
        assert_eq!(flows.rows_read, 3);
        assert_eq!(flows.rows_used, 2);
        assert_eq!(flows.issues.len(), 1);
        assert!(flows.issues[0].message.contains("Saudi Arabia"));
        assert_eq!(flows.records[0].origin, "Canada");
        assert_eq!(flows.records[0].period, d(2024, 1, 1));
    }

    #[test]
    fn flow_records_keep_file_order() {
        let csv = "\
period,originName,quantity
2024-02,Mexico,100
2024-01,Canada,500
2024-02,Canada,300
";
        let flows = ingest_flows(csv.as_bytes());
        let origins: Vec<&str> = flows.records.iter().map(|r| r.origin.as_str()).collect();
        assert_eq!(origins, vec!["Mexico", "Canada", "Canada"]);
    }
}
