use crate::detection::types::{DailyCount, StationSeries, TripRecord};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Collapses trip records into one [`DailyCount`] per (date, station).
///
/// Rows come back sorted by date, then station, so the result does not depend
/// on the order of `trips`.
pub fn aggregate_daily_counts(trips: &[TripRecord]) -> Vec<DailyCount> {
    let mut counts: BTreeMap<(NaiveDate, &str), u64> = BTreeMap::new();

    for trip in trips {
        *counts.entry((trip.date, trip.station.as_str())).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((date, station), count)| DailyCount {
            date,
            station: station.to_string(),
            count,
        })
        .collect()
}

/// Normalizes already-aggregated rows: duplicate (date, station) pairs are
/// summed and the output is sorted the same way as [`aggregate_daily_counts`].
pub fn merge_daily_counts(rows: Vec<DailyCount>) -> Vec<DailyCount> {
    let mut counts: BTreeMap<(NaiveDate, String), u64> = BTreeMap::new();

    for row in rows {
        *counts.entry((row.date, row.station)).or_default() += row.count;
    }

    counts
        .into_iter()
        .map(|((date, station), count)| DailyCount {
            date,
            station,
            count,
        })
        .collect()
}

/// Splits daily counts into one date-sorted series per station.
pub fn group_by_station(daily: &[DailyCount]) -> BTreeMap<String, StationSeries> {
    let mut grouped: BTreeMap<&str, Vec<(NaiveDate, u64)>> = BTreeMap::new();

    for row in daily {
        grouped
            .entry(row.station.as_str())
            .or_default()
            .push((row.date, row.count));
    }

    grouped
        .into_iter()
        .map(|(station, points)| (station.to_string(), StationSeries::new(station, points)))
        .collect()
}

/// Series for a single station; empty when the station never appears.
pub fn station_series(daily: &[DailyCount], station: &str) -> StationSeries {
    StationSeries::new(
        station,
        daily
            .iter()
            .filter(|row| row.station == station)
            .map(|row| (row.date, row.count)),
    )
}
