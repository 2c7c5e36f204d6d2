//! Grouped trailing-window aggregation for the supply/demand ranking.
//!
//! The bar-chart view wants one scalar per entity: the mean of its non-null
//! values over a trailing window of months, ranked descending. "No data" is a
//! normal outcome here (empty selection, nothing inside the window) and is
//! reported as `None`, never an error; the caller decides how to present it.

use chrono::{Months, NaiveDate};

use crate::domain::MultiSeries;

pub const DEFAULT_TRAILING_MONTHS: u32 = 12;

/// One entity's trailing-window mean.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMean {
    pub entity: String,
    pub mean: f64,
}

/// Rank the selected entities by trailing mean, descending.
///
/// - An empty `selection` falls back to `fallback`; entities that are not in
///   the data are silently ignored (a partial default still works).
/// - The window anchor is the latest period across the selected entities;
///   records strictly after `anchor - trailing_months` count.
/// - Entities with no non-null record inside the window are excluded rather
///   than reported as zero.
/// - Exact ties keep alphabetical order (the sort is stable and candidates
///   arrive in map order).
pub fn rank_trailing_means(
    multi: &MultiSeries,
    selection: &[String],
    fallback: &[String],
    trailing_months: u32,
) -> Option<Vec<EntityMean>> {
    let requested: &[String] = if selection.is_empty() {
        fallback
    } else {
        selection
    };

    let candidates: Vec<_> = multi
        .by_entity
        .values()
        .filter(|s| requested.iter().any(|r| r == &s.entity))
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let anchor = candidates.iter().filter_map(|s| s.latest_period()).max()?;
    let cutoff = anchor
        .checked_sub_months(Months::new(trailing_months))
        .unwrap_or(NaiveDate::MIN);

    let mut ranked = Vec::new();
    for series in candidates {
        let values: Vec<f64> = series
            .points
            .iter()
            .filter(|p| p.period > cutoff)
            .filter_map(|p| p.value)
            .collect();
        if values.is_empty() {
            continue;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        if mean.is_finite() {
            ranked.push(EntityMean {
                entity: series.entity.clone(),
                mean,
            });
        }
    }

    if ranked.is_empty() {
        return None;
    }
    ranked.sort_by(|a, b| b.mean.partial_cmp(&a.mean).unwrap_or(std::cmp::Ordering::Equal));
    Some(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Series, SeriesPoint};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn monthly(entity: &str, from: (i32, u32), values: &[Option<f64>]) -> Series {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let month0 = (from.1 - 1 + i as u32) % 12 + 1;
                let year = from.0 + ((from.1 - 1 + i as u32) / 12) as i32;
                SeriesPoint {
                    period: d(year, month0, 1),
                    value,
                }
            })
            .collect();
        Series::from_records(entity, points)
    }

    fn owned(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn ranks_descending_by_trailing_mean() {
        let mut multi = MultiSeries::new();
        multi.insert(monthly("USA", (2024, 1), &[Some(11.0), Some(13.0)]));
        multi.insert(monthly("SAU", (2024, 1), &[Some(10.0), Some(10.0)]));
        multi.insert(monthly("RUS", (2024, 1), &[Some(9.0), Some(11.0)]));

        let ranked = rank_trailing_means(
            &multi,
            &owned(&["USA", "SAU", "RUS"]),
            &[],
            DEFAULT_TRAILING_MONTHS,
        )
        .unwrap();
        let order: Vec<&str> = ranked.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(order, vec!["USA", "SAU", "RUS"]);
        assert!((ranked[0].mean - 12.0).abs() < 1e-12);
    }

    #[test]
    fn empty_selection_uses_the_fallback_entities_present_in_the_data() {
        let mut multi = MultiSeries::new();
        multi.insert(monthly("USA", (2024, 1), &[Some(11.0)]));
        multi.insert(monthly("OPEC", (2024, 1), &[Some(28.0)]));
        multi.insert(monthly("NOR", (2024, 1), &[Some(2.0)]));

        let fallback = owned(&["USA", "OPEC", "ATLANTIS"]);
        let ranked = rank_trailing_means(&multi, &[], &fallback, 12).unwrap();
        let order: Vec<&str> = ranked.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(order, vec!["OPEC", "USA"]);
    }

    #[test]
    fn records_outside_the_window_are_ignored() {
        let mut multi = MultiSeries::new();
        // 24 months: the first 12 are huge, the last 12 are small; only the
        // trailing year should count.
        let mut values: Vec<Option<f64>> = vec![Some(1000.0); 12];
        values.extend(vec![Some(1.0); 12]);
        multi.insert(monthly("USA", (2023, 1), &values));

        let ranked = rank_trailing_means(&multi, &owned(&["USA"]), &[], 12).unwrap();
        assert!((ranked[0].mean - 1.0).abs() < 1e-12);
    }

    #[test]
    fn entities_without_window_data_are_excluded_not_zeroed() {
        let mut multi = MultiSeries::new();
        multi.insert(monthly("USA", (2024, 1), &[Some(11.0), Some(12.0)]));
        // Stale entity: all data far before the shared anchor's window.
        multi.insert(monthly("VEN", (2010, 1), &[Some(3.0)]));
        // Present but value-less inside the window.
        multi.insert(monthly("GAB", (2024, 1), &[None, None]));

        let ranked = rank_trailing_means(&multi, &owned(&["USA", "VEN", "GAB"]), &[], 12).unwrap();
        let order: Vec<&str> = ranked.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(order, vec!["USA"]);
    }

    #[test]
    fn no_usable_selection_signals_no_data() {
        let mut multi = MultiSeries::new();
        multi.insert(monthly("USA", (2024, 1), &[Some(11.0)]));

        assert!(rank_trailing_means(&multi, &owned(&["ATLANTIS"]), &[], 12).is_none());
        assert!(rank_trailing_means(&multi, &[], &[], 12).is_none());
        assert!(rank_trailing_means(&MultiSeries::new(), &[], &owned(&["USA"]), 12).is_none());
    }

    #[test]
    fn exact_ties_keep_alphabetical_order() {
        let mut multi = MultiSeries::new();
        multi.insert(monthly("NOR", (2024, 1), &[Some(5.0)]));
        multi.insert(monthly("CAN", (2024, 1), &[Some(5.0)]));
        multi.insert(monthly("MEX", (2024, 1), &[Some(5.0)]));

        let ranked =
            rank_trailing_means(&multi, &owned(&["NOR", "CAN", "MEX"]), &[], 12).unwrap();
        let order: Vec<&str> = ranked.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(order, vec!["CAN", "MEX", "NOR"]);
    }
}
