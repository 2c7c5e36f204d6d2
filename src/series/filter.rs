//! Relative time-window filtering.
//!
//! Cutoffs are computed from the latest period present in the data being
//! filtered (never "today"), so re-running over a stale file yields the same
//! slice. The cutoff itself is kept: `period >= cutoff`.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::domain::{MultiSeries, Series, TimeWindow};

/// Inclusive lower bound for a window anchored at `latest`.
///
/// `None` means unbounded (`Max`). Month-based windows use calendar
/// arithmetic, clamping at month ends (Mar 31 minus one month is Feb 28/29).
pub fn window_cutoff(latest: NaiveDate, window: TimeWindow) -> Option<NaiveDate> {
    let months_back = |n: u32| {
        latest
            .checked_sub_months(Months::new(n))
            .unwrap_or(NaiveDate::MIN)
    };

    match window {
        TimeWindow::W1 => Some(
            latest
                .checked_sub_days(Days::new(7))
                .unwrap_or(NaiveDate::MIN),
        ),
        TimeWindow::M1 => Some(months_back(1)),
        TimeWindow::M3 => Some(months_back(3)),
        TimeWindow::M6 => Some(months_back(6)),
        TimeWindow::Ytd => Some(NaiveDate::from_ymd_opt(latest.year(), 1, 1).unwrap_or(NaiveDate::MIN)),
        TimeWindow::Y1 => Some(months_back(12)),
        TimeWindow::Y5 => Some(months_back(60)),
        TimeWindow::Y10 => Some(months_back(120)),
        TimeWindow::Max => None,
    }
}

/// Filter a single series against its own latest period.
pub fn filter_series(series: &Series, window: TimeWindow) -> Series {
    let Some(latest) = series.latest_period() else {
        return series.clone();
    };
    let Some(cutoff) = window_cutoff(latest, window) else {
        return series.clone();
    };

    Series {
        entity: series.entity.clone(),
        points: series
            .points
            .iter()
            .filter(|p| p.period >= cutoff)
            .copied()
            .collect(),
    }
}

/// Filter every entity against the *shared* latest period.
///
/// Anchoring on the global maximum keeps entities comparable: a country whose
/// reporting lags still gets the same window as everyone else. Entities left
/// with no points stay in the map as empty series.
pub fn filter_multi(multi: &MultiSeries, window: TimeWindow) -> MultiSeries {
    let Some(latest) = multi.latest_period() else {
        return multi.clone();
    };
    let Some(cutoff) = window_cutoff(latest, window) else {
        return multi.clone();
    };

    let mut out = MultiSeries::new();
    for series in multi.by_entity.values() {
        out.insert(Series {
            entity: series.entity.clone(),
            points: series
                .points
                .iter()
                .filter(|p| p.period >= cutoff)
                .copied()
                .collect(),
        });
    }
    out
}
