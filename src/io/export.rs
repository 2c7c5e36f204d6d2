//! CSV persistence: fetched datasets in, prepared spot series out.
//!
//! Fetched data goes through the `csv` crate because entity names can carry
//! commas ("Korea, South"); the spot export is a fixed numeric layout meant
//! to be easy to consume in spreadsheets or downstream scripts.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;

use crate::domain::DerivedSeries;
use crate::error::AppError;

/// Write one fetched dataset as CSV. Used by `crude fetch`.
pub fn write_dataset_csv(
    path: &Path,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::new(
            4,
            format!("Failed to create data file '{}': {e}", path.display()),
        )
    })?;

    writer
        .write_record(headers)
        .map_err(|e| AppError::new(4, format!("Failed to write CSV header: {e}")))?;
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| AppError::new(4, format!("Failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush '{}': {e}", path.display())))?;
    Ok(())
}

/// Write the prepared spot legs and their spread side by side for `--export`.
///
/// The spread drives the rows: it is built on the outer join of both legs,
/// so its periods already cover every date either leg has.
pub fn write_spot_csv(
    path: &Path,
    brent: &DerivedSeries,
    wti: &DerivedSeries,
    spread: &DerivedSeries,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            4,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;
    write_spot(file, brent, wti, spread)
}

fn write_spot<W: Write>(
    mut out: W,
    brent: &DerivedSeries,
    wti: &DerivedSeries,
    spread: &DerivedSeries,
) -> Result<(), AppError> {
    let brent_values = value_map(brent);
    let wti_values = value_map(wti);

    writeln!(out, "period,brent,wti,spread")
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    for p in &spread.points {
        writeln!(
            out,
            "{},{},{},{}",
            p.period,
            fmt_field(brent_values.get(&p.period).copied().flatten()),
            fmt_field(wti_values.get(&p.period).copied().flatten()),
            fmt_field(p.value),
        )
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }
    Ok(())
}

fn value_map(series: &DerivedSeries) -> BTreeMap<NaiveDate, Option<f64>> {
    series.points.iter().map(|p| (p.period, p.value)).collect()
}

/// Nulls export as empty fields, not as 0 or a sentinel.
fn fmt_field(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}
