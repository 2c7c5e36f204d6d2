//! Health bundle writer for inspecting ingest quality.
//!
//! `crude health` (and the `d` key in the TUI) writes a markdown snapshot of
//! what ingest actually produced: per-dataset row counts, per-entity coverage,
//! and the collected row issues. Useful when a chart looks wrong and the
//! question is "what did the CSV really contain?".

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::pipeline::DashboardData;
use crate::error::AppError;
use crate::io::{IngestedFlows, IngestedTable, RowIssue};

/// Issues listed per section before truncating.
const MAX_ISSUES: usize = 50;

pub fn write_health_bundle(out_dir: &Path, data: &DashboardData) -> Result<PathBuf, AppError> {
    fs::create_dir_all(out_dir).map_err(|e| {
        AppError::new(
            4,
            format!("Failed to create health dir '{}': {e}", out_dir.display()),
        )
    })?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = out_dir.join(format!("crude_health_{ts}.md"));

    fs::write(&path, render_health(data)).map_err(|e| {
        AppError::new(
            4,
            format!("Failed to write health bundle '{}': {e}", path.display()),
        )
    })?;

    Ok(path)
}

fn render_health(data: &DashboardData) -> String {
    let mut out = String::new();
    out.push_str("# crude health bundle\n");
    out.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    out.push_str(&format!("- total row issues: {}\n", data.issue_count()));

    for table in [&data.production, &data.consumption, &data.stocks, &data.spot] {
        push_table_section(&mut out, table);
    }
    push_flows_section(&mut out, &data.flows);
    out
}

fn push_table_section(out: &mut String, table: &IngestedTable) {
    out.push_str(&format!("\n## {}\n", table.dataset.display_name()));
    out.push_str(&format!(
        "- rows read: {}, rows used: {}, issues: {}\n",
        table.rows_read,
        table.rows_used,
        table.issues.len()
    ));

    if table.multi.is_empty() {
        out.push_str("- no series\n");
    } else {
        out.push_str("\n| entity | points | nulls | first | last |\n");
        out.push_str("| - | - | - | - | - |\n");
        for entity in table.multi.entities() {
            let Some(series) = table.multi.get(&entity) else {
                continue;
            };
            let nulls = series.points.iter().filter(|p| p.value.is_none()).count();
            let first = series
                .points
                .first()
                .map(|p| p.period.to_string())
                .unwrap_or_else(|| "-".to_string());
            let last = series
                .points
                .last()
                .map(|p| p.period.to_string())
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                entity,
                series.len(),
                nulls,
                first,
                last
            ));
        }
    }

    push_issues(out, &table.issues);
}

fn push_flows_section(out: &mut String, flows: &IngestedFlows) {
    out.push_str("\n## Import flows\n");
    out.push_str(&format!(
        "- rows read: {}, rows used: {}, issues: {}\n",
        flows.rows_read,
        flows.rows_used,
        flows.issues.len()
    ));

    if flows.records.is_empty() {
        out.push_str("- no records\n");
    } else {
        let origins: BTreeSet<&str> = flows.records.iter().map(|r| r.origin.as_str()).collect();
        out.push_str(&format!("- origins: {}\n", origins.len()));

        let first = flows.records.iter().map(|r| r.period).min();
        let last = flows.records.iter().map(|r| r.period).max();
        if let (Some(first), Some(last)) = (first, last) {
            out.push_str(&format!("- period range: {first}..{last}\n"));
        }
    }

    push_issues(out, &flows.issues);
}

fn push_issues(out: &mut String, issues: &[RowIssue]) {
    if issues.is_empty() {
        return;
    }
    out.push_str("\nIssues:\n");
    for issue in issues.iter().take(MAX_ISSUES) {
        out.push_str(&format!("- line {}: {}\n", issue.line, issue.message));
    }
    if issues.len() > MAX_ISSUES {
        out.push_str(&format!("- ... and {} more\n", issues.len() - MAX_ISSUES));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dataset, FlowRecord, Series, SeriesPoint};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn empty_flows() -> IngestedFlows {
        IngestedFlows {
            records: Vec::new(),
            issues: Vec::new(),
            rows_read: 0,
            rows_used: 0,
        }
    }

    #[test]
    fn report_lists_coverage_and_issues() {
        let mut production = IngestedTable::empty(Dataset::Production);
        production.rows_read = 3;
        production.rows_used = 2;
        production.issues.push(RowIssue {
            line: 4,
            message: "Missing value".to_string(),
        });
        production.multi.insert(Series {
            entity: "OPEC".to_string(),
            points: vec![
                SeriesPoint {
                    period: date(2024, 1, 1),
                    value: Some(27.0),
                },
                SeriesPoint {
                    period: date(2024, 2, 1),
                    value: None,
                },
            ],
        });

        let data = DashboardData {
            production,
            consumption: IngestedTable::empty(Dataset::Consumption),
            stocks: IngestedTable::empty(Dataset::Stocks),
            spot: IngestedTable::empty(Dataset::SpotPrices),
            flows: IngestedFlows {
                records: vec![FlowRecord {
                    period: date(2024, 1, 1),
                    origin: "Canada".to_string(),
                    quantity: 100.0,
                }],
                issues: Vec::new(),
                rows_read: 1,
                rows_used: 1,
            },
        };

        let report = render_health(&data);
        assert!(report.contains("## Production"));
        assert!(report.contains("- rows read: 3, rows used: 2, issues: 1"));
        assert!(report.contains("| OPEC | 2 | 1 | 2024-01-01 | 2024-02-01 |"));
        assert!(report.contains("- line 4: Missing value"));
        assert!(report.contains("## Import flows"));
        assert!(report.contains("- origins: 1"));
        assert!(report.contains("- period range: 2024-01-01..2024-01-01"));
    }

    #[test]
    fn long_issue_lists_truncate() {
        let mut spot = IngestedTable::empty(Dataset::SpotPrices);
        for i in 0..60 {
            spot.issues.push(RowIssue {
                line: i + 2,
                message: "bad period".to_string(),
            });
        }

        let data = DashboardData {
            production: IngestedTable::empty(Dataset::Production),
            consumption: IngestedTable::empty(Dataset::Consumption),
            stocks: IngestedTable::empty(Dataset::Stocks),
            spot,
            flows: empty_flows(),
        };

        let report = render_health(&data);
        assert!(report.contains("- line 2: bad period"));
        assert!(report.contains("- line 51: bad period"));
        assert!(report.contains("- ... and 10 more"));
        assert!(!report.contains("- line 52: bad period"));
    }
}
