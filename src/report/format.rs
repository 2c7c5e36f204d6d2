//! Formatted terminal output for the CLI reports.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized (important for future snapshot tests)
//!
//! All formatters return `String`; callers decide where it goes.

use crate::app::pipeline::{FlowsView, SpotParams, SpotView, SupplyDemandParams, SupplyDemandView};

/// Format the spot-price report: window header plus one KPI row per series.
pub fn format_spot_summary(view: &SpotView, params: &SpotParams) -> String {
    let mut out = String::new();

    out.push_str("=== crude - Spot Prices ===\n");
    out.push_str(&format!(
        "Window: {} | Frequency: {}\n",
        params.window.label(),
        params.frequency.label()
    ));
    if let Some(p) = view.spread.latest() {
        out.push_str(&format!("As-of: {}\n", p.period));
    }
    out.push('\n');

    let rows: Vec<Vec<String>> = view
        .kpis
        .iter()
        .map(|k| {
            vec![
                k.label.clone(),
                fmt_opt(k.last),
                fmt_change(k.change),
                fmt_opt(k.high),
                fmt_opt(k.low),
                fmt_opt(k.vol),
            ]
        })
        .collect();
    out.push_str(&format_table(
        &["series", "last $/bbl", "chg", "high", "low", "vol"],
        &rows,
    ));

    out
}

/// Format the supply/demand report: KPIs plus the trailing-mean ranking.
pub fn format_supply_summary(view: &SupplyDemandView, params: &SupplyDemandParams) -> String {
    let mut out = String::new();

    out.push_str("=== crude - Supply & Demand ===\n");
    out.push_str(&format!(
        "Dataset: {} ({}) | Window: {}\n",
        view.dataset.display_name(),
        view.dataset.unit(),
        params.window.label()
    ));
    out.push('\n');

    if view.kpis.is_empty() {
        out.push_str("No data for the selected countries.\n");
        out.push_str(&format!(
            "Available: {}\n",
            truncate(&view.available.join(", "), 76)
        ));
        return out;
    }

    let rows: Vec<Vec<String>> = view
        .kpis
        .iter()
        .map(|k| {
            vec![
                k.entity.clone(),
                k.period.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
                fmt_opt(k.value),
                fmt_change(k.change),
            ]
        })
        .collect();
    out.push_str(&format_table(&["country", "period", "last", "chg"], &rows));
    out.push('\n');

    match &view.ranking {
        Some(ranked) => {
            out.push_str(&format!(
                "Trailing {}-month mean ({}):\n",
                params.trailing_months,
                view.dataset.unit()
            ));
            let bars: Vec<(String, f64)> = ranked
                .iter()
                .map(|r| (r.entity.clone(), r.mean))
                .collect();
            out.push_str(&format_bars(&bars, 40));
        }
        None => out.push_str("No data in the trailing window.\n"),
    }

    out
}

/// Format the import-flow report: headline origins plus the per-origin totals.
pub fn format_flow_summary(view: &FlowsView) -> String {
    let mut out = String::new();

    out.push_str("=== crude - US Import Flows ===\n");
    let Some(year) = view.year else {
        out.push_str("No import data.\n");
        return out;
    };
    let years: Vec<String> = view.years.iter().map(|y| y.to_string()).collect();
    out.push_str(&format!(
        "Year: {year} (available: {})\n",
        truncate(&years.join(", "), 60)
    ));
    out.push('\n');

    // Headline metrics match the dashboard: totals in million barrels.
    if let Some(top) = &view.top {
        out.push_str(&format!(
            "Top origin   : {} ({:.0} million barrels)\n",
            top.origin,
            top.quantity / 1000.0
        ));
    }
    if let Some(second) = &view.second {
        out.push_str(&format!(
            "Second origin: {} ({:.0} million barrels)\n",
            second.origin,
            second.quantity / 1000.0
        ));
    }
    if view.totals.is_empty() {
        out.push_str("No shipments recorded for this selection.\n");
        return out;
    }
    out.push('\n');

    let bars: Vec<(String, f64)> = view
        .totals
        .iter()
        .map(|t| (t.origin.clone(), t.quantity))
        .collect();
    out.push_str(&format!("Imports by origin (kbbl), {} flows into {}:\n",
        view.graph.edges.len(),
        crate::series::DEFAULT_DESTINATION
    ));
    out.push_str(&format_bars(&bars, 40));

    out
}

/// Render a column-aligned table: first column left, the rest right.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();

    let mut line = String::new();
    for (i, h) in headers.iter().enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        if i == 0 {
            line.push_str(&format!("{h:<w$}", w = widths[i]));
        } else {
            line.push_str(&format!("{h:>w$}", w = widths[i]));
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    for row in rows {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            let w = widths.get(i).copied().unwrap_or(0);
            if i == 0 {
                line.push_str(&format!("{cell:<w$}"));
            } else {
                line.push_str(&format!("{cell:>w$}"));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Render labeled horizontal bars scaled to the largest magnitude.
pub fn format_bars(rows: &[(String, f64)], width: usize) -> String {
    let max = rows.iter().map(|(_, v)| v.abs()).fold(0.0_f64, f64::max);
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for (label, value) in rows {
        let bar_len = if max > 0.0 {
            ((value.abs() / max) * width as f64).round() as usize
        } else {
            0
        };
        let line = format!(
            "{label:<label_width$} {} {value:.1}",
            "\u{2588}".repeat(bar_len)
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

fn fmt_change(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:+.2}%"),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
