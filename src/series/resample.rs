//! Downsampling to weekly/monthly bins.
//!
//! Bins cover the observed span `[first, last]` completely; a bin with no
//! usable observation still emits a row, with a null value. Within a bin the
//! last non-null observation wins ("closing" value). Nothing is carried
//! across bin boundaries.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::domain::{Frequency, Series, SeriesPoint};

pub fn resample_series(series: &Series, frequency: Frequency) -> Series {
    match frequency {
        Frequency::Daily => series.clone(),
        Frequency::Weekly => binned(series, week_end, advance_week),
        Frequency::Monthly => binned(series, month_end, advance_month),
    }
}

fn binned(
    series: &Series,
    bin_of: fn(NaiveDate) -> NaiveDate,
    advance: fn(NaiveDate) -> Option<NaiveDate>,
) -> Series {
    let (Some(first), Some(last)) = (series.points.first(), series.points.last()) else {
        return Series::new(series.entity.clone());
    };

    // Last non-null observation per bin label.
    let mut closing: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for p in &series.points {
        if let Some(v) = p.value {
            closing.insert(bin_of(p.period), v);
        }
    }

    let stop = bin_of(last.period);
    let mut label = bin_of(first.period);
    let mut points = Vec::new();
    loop {
        points.push(SeriesPoint {
            period: label,
            value: closing.get(&label).copied(),
        });
        if label >= stop {
            break;
        }
        let Some(next) = advance(label) else { break };
        label = next;
    }

    Series {
        entity: series.entity.clone(),
        points,
    }
}

/// The Friday on or after `d` (weeks end on Friday, matching the price feeds).
fn week_end(d: NaiveDate) -> NaiveDate {
    let target = Weekday::Fri.num_days_from_monday();
    let ahead = (target + 7 - d.weekday().num_days_from_monday()) % 7;
    d.checked_add_days(Days::new(u64::from(ahead))).unwrap_or(d)
}

fn advance_week(label: NaiveDate) -> Option<NaiveDate> {
    label.checked_add_days(Days::new(7))
}

/// The last day of `d`'s calendar month.
fn month_end(d: NaiveDate) -> NaiveDate {
    let first_of_next = if d.month() == 12 {
        NaiveDate::from_ymd_opt(d.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(d.year(), d.month() + 1, 1)
    };
    first_of_next
        .and_then(|n| n.checked_sub_days(Days::new(1)))
        .unwrap_or(d)
}

fn advance_month(label: NaiveDate) -> Option<NaiveDate> {
    label.checked_add_days(Days::new(1)).map(month_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(entity: &str, points: &[(NaiveDate, Option<f64>)]) -> Series {
        Series::from_records(
            entity,
            points
                .iter()
                .map(|&(period, value)| SeriesPoint { period, value })
                .collect(),
        )
    }

    #[test]
    fn week_end_lands_on_friday() {
        assert_eq!(week_end(d(2024, 1, 1)), d(2024, 1, 5)); // Monday -> Friday
        assert_eq!(week_end(d(2024, 1, 5)), d(2024, 1, 5)); // Friday stays
        assert_eq!(week_end(d(2024, 1, 6)), d(2024, 1, 12)); // Saturday -> next Friday
    }

    #[test]
    fn weekly_takes_the_last_value_of_each_week() {
        let s = series(
            "Brent",
            &[
                (d(2024, 1, 1), Some(80.0)),
                (d(2024, 1, 3), Some(81.0)),
                (d(2024, 1, 4), Some(82.5)),
                (d(2024, 1, 8), Some(83.0)),
            ],
        );
        let weekly = resample_series(&s, Frequency::Weekly);
        assert_eq!(weekly.points.len(), 2);
        assert_eq!(weekly.points[0].period, d(2024, 1, 5));
        assert_eq!(weekly.points[0].value, Some(82.5));
        assert_eq!(weekly.points[1].period, d(2024, 1, 12));
        assert_eq!(weekly.points[1].value, Some(83.0));
    }

    #[test]
    fn gap_weeks_emit_null_rows() {
        let s = series(
            "Brent",
            &[(d(2024, 1, 1), Some(80.0)), (d(2024, 1, 22), Some(85.0))],
        );
        let weekly = resample_series(&s, Frequency::Weekly);
        let values: Vec<Option<f64>> = weekly.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![Some(80.0), None, None, Some(85.0)]);
    }

    #[test]
    fn null_only_bins_stay_null() {
        let s = series(
            "Brent",
            &[
                (d(2024, 1, 4), Some(82.0)),
                (d(2024, 1, 5), None),
                (d(2024, 1, 10), None),
                (d(2024, 1, 17), Some(90.0)),
            ],
        );
        let weekly = resample_series(&s, Frequency::Weekly);
        // Jan 5 bin: the null close does not erase Jan 4's value.
        assert_eq!(weekly.points[0].value, Some(82.0));
        // Jan 12 bin has only a null observation.
        assert_eq!(weekly.points[1].value, None);
        assert_eq!(weekly.points[2].value, Some(90.0));
    }

    #[test]
    fn monthly_labels_are_month_ends() {
        let s = series(
            "WTI",
            &[
                (d(2024, 1, 10), Some(70.0)),
                (d(2024, 1, 25), Some(71.0)),
                (d(2024, 3, 2), Some(74.0)),
            ],
        );
        let monthly = resample_series(&s, Frequency::Monthly);
        let periods: Vec<NaiveDate> = monthly.points.iter().map(|p| p.period).collect();
        assert_eq!(periods, vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31)]);
        assert_eq!(monthly.points[0].value, Some(71.0));
        assert_eq!(monthly.points[1].value, None);
    }

    #[test]
    fn daily_is_identity_and_fabricates_nothing() {
        let s = series(
            "WTI",
            &[(d(2024, 1, 10), Some(70.0)), (d(2024, 2, 2), None)],
        );
        let monthly = resample_series(&s, Frequency::Monthly);
        let back = resample_series(&monthly, Frequency::Daily);
        assert_eq!(back, monthly);
    }

    #[test]
    fn empty_series_resamples_to_empty() {
        let weekly = resample_series(&Series::new("Brent"), Frequency::Weekly);
        assert!(weekly.is_empty());
    }
}
