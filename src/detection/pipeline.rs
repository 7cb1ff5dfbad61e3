use crate::calendar::{HolidayCalendar, exclude_weekends_and_holidays, is_business_day};
use crate::config::DetectorConfig;
use crate::detection::aggregate::{group_by_station, station_series};
use crate::detection::baseline::compute_baseline;
use crate::detection::consensus::select_consensus;
use crate::detection::detector::detect_series;
use crate::detection::types::{BaselinePoint, CeremonyReport, DailyCount, Prediction, Resolution, StationSeries};
use crate::error::{CeremonyError, Result};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Filters the daily table and runs detection for every target station.
///
/// `calendar` is only consulted when `config.exclude_weekend_holiday` is set.
///
/// # Errors
///
/// Returns [`CeremonyError::InvalidConfig`] if `config` fails validation.
pub fn run<C>(
    daily: Vec<DailyCount>,
    targets: &[String],
    config: &DetectorConfig,
    calendar: &C,
) -> Result<CeremonyReport>
where
    C: HolidayCalendar + ?Sized,
{
    let daily = filter_for_detection(daily, config, calendar);
    detect_all(&daily, targets, config)
}

/// Applies the weekend/holiday filter when enabled; otherwise a no-op.
pub fn filter_for_detection<C>(daily: Vec<DailyCount>, config: &DetectorConfig, calendar: &C) -> Vec<DailyCount>
where
    C: HolidayCalendar + ?Sized,
{
    if !config.exclude_weekend_holiday {
        return daily;
    }

    let before = daily.len();
    let kept = exclude_weekends_and_holidays(daily, calendar);
    info!(before, after = kept.len(), "Excluded weekend and holiday rows");
    kept
}

/// Predicts one date per target station and reduces them to a consensus.
///
/// A station without observations gets an undefined prediction; it never
/// stops the other stations from being processed. Repeated target names
/// yield a single prediction, in first-seen order.
#[tracing::instrument(skip_all, fields(rows = daily.len(), targets = targets.len()))]
pub fn detect_all(daily: &[DailyCount], targets: &[String], config: &DetectorConfig) -> Result<CeremonyReport> {
    config.validate()?;

    let mut by_station = group_by_station(daily);
    let mut seen = BTreeSet::new();

    let predictions: Vec<Prediction> = targets
        .iter()
        .filter(|station| seen.insert(station.as_str()))
        .map(|station| {
            let series = by_station
                .remove(station)
                .unwrap_or_else(|| StationSeries::new(station.as_str(), Vec::new()));

            match detect_series(&series, config) {
                Ok(prediction) => prediction,
                Err(CeremonyError::EmptySeries { station }) => {
                    warn!(station = %station, "No observations for target station");
                    Prediction::unresolved(station, Resolution::NoData)
                }
                Err(e) => {
                    warn!(station = %station, error = %e, "Detection failed for station");
                    Prediction::unresolved(station.as_str(), Resolution::Unresolved)
                }
            }
        })
        .collect();

    let consensus = select_consensus(&predictions);

    info!(
        stations = predictions.len(),
        resolved = predictions.iter().filter(|p| p.predicted_date.is_some()).count(),
        overall = ?consensus.overall_date,
        "Detection complete"
    );

    Ok(CeremonyReport {
        predictions,
        consensus,
    })
}

/// Baseline series for one station over the same observations [`run`]
/// detects on, for timeline exports.
pub fn station_timeline<C>(
    daily: &[DailyCount],
    station: &str,
    config: &DetectorConfig,
    calendar: &C,
) -> Vec<BaselinePoint>
where
    C: HolidayCalendar + ?Sized,
{
    let series = station_series(daily, station);
    let series = if config.exclude_weekend_holiday {
        StationSeries::new(
            station,
            series
                .points()
                .iter()
                .copied()
                .filter(|(date, _)| is_business_day(*date, calendar)),
        )
    } else {
        series
    };

    compute_baseline(&series, config.window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{HolidayList, NoHolidays};
    use crate::config::DetectionPolicy;
    use chrono::{Days, NaiveDate};

    fn start() -> NaiveDate {
        // Tuesday
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    }

    fn rows(station: &str, counts: &[u64]) -> Vec<DailyCount> {
        counts
            .iter()
            .enumerate()
            .map(|(i, c)| DailyCount {
                date: start() + Days::new(i as u64),
                station: station.to_string(),
                count: *c,
            })
            .collect()
    }

    fn targets(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_target_gets_no_data() {
        let daily = rows("A", &[100, 100, 100, 100, 100, 100, 100, 300]);
        let report = run(daily, &targets(&["A", "Ghost"]), &DetectorConfig::default(), &NoHolidays).unwrap();

        assert_eq!(report.predictions.len(), 2);
        assert_eq!(report.predictions[0].predicted_date, Some(start() + Days::new(7)));
        assert_eq!(report.predictions[1].station, "Ghost");
        assert_eq!(report.predictions[1].predicted_date, None);
        assert_eq!(report.predictions[1].resolution, Resolution::NoData);
        assert_eq!(report.consensus.overall_date, Some(start() + Days::new(7)));
    }

    #[test]
    fn test_non_target_stations_are_ignored() {
        let mut daily = rows("A", &[100, 100, 100, 100, 100, 100, 100, 300]);
        daily.extend(rows("B", &[100, 100, 100, 100, 100, 100, 300, 100]));
        let report = run(daily, &targets(&["A"]), &DetectorConfig::default(), &NoHolidays).unwrap();

        assert_eq!(report.predictions.len(), 1);
        assert_eq!(report.consensus.groups.len(), 1);
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let cfg = DetectorConfig {
            window: 0,
            ..Default::default()
        };
        let result = run(Vec::new(), &targets(&["A"]), &cfg, &NoHolidays);
        assert!(matches!(result, Err(CeremonyError::InvalidConfig { .. })));
    }

    #[test]
    fn test_window_slides_over_filtered_rows() {
        // Weekend spikes on the 5th/6th and 12th/13th; unfiltered, the 12th wins.
        let counts = [100, 100, 100, 100, 500, 500, 100, 100, 100, 100, 100, 400, 400, 260];
        let daily = rows("A", &counts);
        let cfg = DetectorConfig {
            exclude_weekend_holiday: true,
            guarantee_fallback: false,
            policy: DetectionPolicy::ThresholdFirst,
            ..Default::default()
        };
        let report = run(daily, &targets(&["A"]), &cfg, &NoHolidays).unwrap();

        assert_eq!(report.predictions[0].predicted_date, Some(start() + Days::new(13)));
    }

    #[test]
    fn test_calendar_ignored_when_filter_disabled() {
        let daily = rows("A", &[100, 100, 100, 100, 100, 100, 100, 300]);
        let spike = start() + Days::new(7);
        let holidays = HolidayList::from_dates([spike]);
        let report = run(daily, &targets(&["A"]), &DetectorConfig::default(), &holidays).unwrap();

        assert_eq!(report.predictions[0].predicted_date, Some(spike));
    }

    #[test]
    fn test_repeated_target_yields_one_prediction() {
        let daily = rows("A", &[100, 100, 100, 100, 100, 100, 100, 300]);
        let report = run(daily, &targets(&["A", "B", "A"]), &DetectorConfig::default(), &NoHolidays).unwrap();

        assert_eq!(report.predictions.len(), 2);
        assert_eq!(report.predictions[0].station, "A");
        assert_eq!(report.predictions[0].predicted_date, Some(start() + Days::new(7)));
        assert_eq!(report.predictions[0].resolution, Resolution::Threshold);
        assert_eq!(report.predictions[1].station, "B");
        assert_eq!(report.consensus.groups[&(start() + Days::new(7))].len(), 1);
    }

    #[test]
    fn test_station_timeline_matches_filtered_detection() {
        let counts = [100, 100, 100, 100, 500, 500, 100, 100, 100, 100, 100, 400, 400, 260];
        let daily = rows("A", &counts);
        let cfg = DetectorConfig {
            exclude_weekend_holiday: true,
            ..Default::default()
        };

        let points = station_timeline(&daily, "A", &cfg, &NoHolidays);
        assert_eq!(points.len(), 10);
        assert!(points.iter().all(|p| p.count != 500 && p.count != 400));
        assert_eq!(points[9].ratio, Some(2.6));

        let unfiltered = station_timeline(&daily, "A", &DetectorConfig::default(), &NoHolidays);
        assert_eq!(unfiltered.len(), counts.len());
    }
}
