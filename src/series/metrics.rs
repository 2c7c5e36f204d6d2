//! Derived metrics: percent change, cross-series spreads, rolling statistics.
//!
//! Division hazards never escape this module: a zero or missing denominator,
//! a window touching a null, or a non-finite intermediate all produce `None`.
//! The only hard error is a structurally invalid parameter (a zero-length
//! window), which fails fast instead of silently yielding an empty column.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{DerivedPoint, DerivedSeries, Series, SeriesPoint};
use crate::error::AppError;

/// Window lengths (in records, not calendar time) for the derived columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricParams {
    /// Trailing window for the rolling mean over values.
    pub mean_window: usize,
    /// Trailing window for the rolling standard deviation over changes.
    pub vol_window: usize,
}

/// Period-over-period percent change, rounded to two decimals.
///
/// The first record, a null on either side of the step, and a zero
/// predecessor all yield `None`.
pub fn percent_change(points: &[SeriesPoint]) -> Vec<Option<f64>> {
    let mut out = vec![None; points.len()];
    for i in 1..points.len() {
        let (Some(prev), Some(cur)) = (points[i - 1].value, points[i].value) else {
            continue;
        };
        if prev == 0.0 {
            continue;
        }
        let pct = (cur - prev) / prev * 100.0;
        if pct.is_finite() {
            out[i] = Some(round2(pct));
        }
    }
    out
}

/// Trailing mean over the previous `window` records (inclusive).
///
/// Any null inside the window nulls the output; equivalently, the first
/// `window - 1` records of a contiguous non-null run have no mean.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>, AppError> {
    if window == 0 {
        return Err(AppError::new(2, "Rolling window must be at least 1."));
    }

    let mut out = vec![None; values.len()];
    for i in 0..values.len() {
        let Some(vals) = trailing_window(values, i, window) else {
            continue;
        };
        let mean = vals.iter().sum::<f64>() / window as f64;
        if mean.is_finite() {
            out[i] = Some(mean);
        }
    }
    Ok(out)
}

/// Trailing sample standard deviation (n-1 denominator) over `window` records.
///
/// A window of 1 has no sample deviation, so every output is `None` rather
/// than a division by zero.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>, AppError> {
    if window == 0 {
        return Err(AppError::new(2, "Rolling window must be at least 1."));
    }
    if window == 1 {
        return Ok(vec![None; values.len()]);
    }

    let mut out = vec![None; values.len()];
    for i in 0..values.len() {
        let Some(vals) = trailing_window(values, i, window) else {
            continue;
        };
        let n = window as f64;
        let mean = vals.iter().sum::<f64>() / n;
        let variance = vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let std = variance.sqrt();
        if std.is_finite() {
            out[i] = Some(std);
        }
    }
    Ok(out)
}

/// The window of values ending at `end`, or `None` if it is short or holed.
fn trailing_window(values: &[Option<f64>], end: usize, window: usize) -> Option<Vec<f64>> {
    if end + 1 < window {
        return None;
    }
    let mut vals = Vec::with_capacity(window);
    for v in &values[end + 1 - window..=end] {
        vals.push((*v)?);
    }
    Some(vals)
}

/// Difference `a - b` on the outer join of both period sets.
///
/// Each leg is forward-filled from its own most recent non-null observation
/// before subtracting, so mismatched calendars still line up. Until both legs
/// have history the spread is null. A null observation does not reset the
/// fill.
pub fn spread(a: &Series, b: &Series) -> Series {
    let a_map: BTreeMap<NaiveDate, Option<f64>> =
        a.points.iter().map(|p| (p.period, p.value)).collect();
    let b_map: BTreeMap<NaiveDate, Option<f64>> =
        b.points.iter().map(|p| (p.period, p.value)).collect();

    let mut periods: Vec<NaiveDate> = a_map.keys().chain(b_map.keys()).copied().collect();
    periods.sort();
    periods.dedup();

    let mut last_a = None;
    let mut last_b = None;
    let mut points = Vec::with_capacity(periods.len());
    for period in periods {
        if let Some(&Some(v)) = a_map.get(&period) {
            last_a = Some(v);
        }
        if let Some(&Some(v)) = b_map.get(&period) {
            last_b = Some(v);
        }
        let value = match (last_a, last_b) {
            (Some(x), Some(y)) => Some(x - y),
            _ => None,
        };
        points.push(SeriesPoint { period, value });
    }

    Series {
        entity: format!("{}-minus-{}", a.entity, b.entity),
        points,
    }
}

/// Attach all derived columns to a series.
///
/// The rolling mean runs over values (price trend); the rolling deviation
/// runs over the change column (volatility of returns).
pub fn derive_series(series: &Series, params: &MetricParams) -> Result<DerivedSeries, AppError> {
    let values: Vec<Option<f64>> = series.points.iter().map(|p| p.value).collect();
    let change = percent_change(&series.points);
    let mean = rolling_mean(&values, params.mean_window)?;
    let std = rolling_std(&change, params.vol_window)?;

    let points = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| DerivedPoint {
            period: p.period,
            value: p.value,
            change: change[i],
            rolling_mean: mean[i],
            rolling_std: std[i],
        })
        .collect();

    Ok(DerivedSeries {
        entity: series.entity.clone(),
        points,
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(entity: &str, values: &[Option<f64>]) -> Series {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| SeriesPoint {
                period: d(2024, 1, 1) + chrono::Days::new(i as u64),
                value,
            })
            .collect();
        Series::from_records(entity, points)
    }

    #[test]
    fn percent_change_basic() {
        let s = series("Brent", &[Some(100.0), Some(110.0), Some(99.0)]);
        assert_eq!(
            percent_change(&s.points),
            vec![None, Some(10.0), Some(-10.0)]
        );
    }

    #[test]
    fn percent_change_rounds_to_two_decimals() {
        let s = series("Brent", &[Some(3.0), Some(4.0)]);
        assert_eq!(percent_change(&s.points), vec![None, Some(33.33)]);
    }

    #[test]
    fn zero_and_null_denominators_yield_null() {
        let s = series("Brent", &[Some(0.0), Some(5.0), None, Some(6.0)]);
        let change = percent_change(&s.points);
        assert_eq!(change, vec![None, None, None, None]);
        for c in change {
            if let Some(v) = c {
                assert!(v.is_finite());
            }
        }
    }

    #[test]
    fn spread_subtracts_aligned_periods() {
        let a = series("EPCBRENT", &[Some(80.0), Some(82.0)]);
        let b = series("EPCWTI", &[Some(75.0), Some(77.0)]);
        let sp = spread(&a, &b);
        assert_eq!(sp.entity, "EPCBRENT-minus-EPCWTI");
        let values: Vec<Option<f64>> = sp.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![Some(5.0), Some(5.0)]);
    }

    #[test]
    fn spread_forward_fills_each_leg_independently() {
        let a = Series::from_records(
            "A",
            vec![
                SeriesPoint { period: d(2024, 1, 1), value: Some(10.0) },
                SeriesPoint { period: d(2024, 1, 3), value: Some(12.0) },
            ],
        );
        let b = Series::from_records(
            "B",
            vec![
                SeriesPoint { period: d(2024, 1, 2), value: Some(4.0) },
                SeriesPoint { period: d(2024, 1, 3), value: None },
            ],
        );
        let sp = spread(&a, &b);
        let values: Vec<Option<f64>> = sp.points.iter().map(|p| p.value).collect();
        // Jan 1: B has no history yet. Jan 2: A fills forward (10 - 4).
        // Jan 3: B's null does not reset its fill (12 - 4).
        assert_eq!(values, vec![None, Some(6.0), Some(8.0)]);
    }

    #[test]
    fn rolling_mean_needs_a_full_window() {
        let values = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        assert_eq!(
            rolling_mean(&values, 3).unwrap(),
            vec![None, None, Some(2.0), Some(3.0)]
        );
    }

    #[test]
    fn rolling_mean_nulls_on_holes() {
        let values = vec![Some(1.0), None, Some(3.0), Some(5.0), Some(7.0)];
        assert_eq!(
            rolling_mean(&values, 2).unwrap(),
            vec![None, None, None, Some(4.0), Some(6.0)]
        );
    }

    #[test]
    fn rolling_std_is_the_sample_deviation() {
        let values = vec![Some(2.0), Some(4.0)];
        let std = rolling_std(&values, 2).unwrap();
        assert!(std[0].is_none());
        assert!((std[1].unwrap() - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn window_of_one_has_no_deviation() {
        let values = vec![Some(2.0), Some(4.0)];
        assert_eq!(rolling_std(&values, 1).unwrap(), vec![None, None]);
        assert_eq!(
            rolling_mean(&values, 1).unwrap(),
            vec![Some(2.0), Some(4.0)]
        );
    }

    #[test]
    fn zero_window_fails_fast() {
        assert_eq!(rolling_mean(&[], 0).unwrap_err().exit_code(), 2);
        assert_eq!(rolling_std(&[], 0).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn derive_series_attaches_all_columns() {
        let s = series("Brent", &[Some(100.0), Some(110.0), Some(99.0)]);
        let derived = derive_series(
            &s,
            &MetricParams {
                mean_window: 2,
                vol_window: 2,
            },
        )
        .unwrap();

        assert_eq!(derived.points.len(), 3);
        assert_eq!(derived.points[1].change, Some(10.0));
        assert_eq!(derived.points[1].rolling_mean, Some(105.0));
        // Vol runs over changes: the first two changes are [None, 10.0].
        assert!(derived.points[1].rolling_std.is_none());
        let last_std = derived.points[2].rolling_std.unwrap();
        // Sample std of [10.0, -10.0].
        assert!((last_std - 200.0_f64.sqrt()).abs() < 1e-9);
    }
}
