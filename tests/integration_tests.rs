use ceremony_rater::calendar::{JapaneseHolidays, NoHolidays};
use ceremony_rater::columns::ColumnAliases;
use ceremony_rater::config::{DetectionPolicy, DetectorConfig};
use ceremony_rater::detection::aggregate::aggregate_daily_counts;
use ceremony_rater::detection::pipeline::run;
use ceremony_rater::detection::types::{DailyCount, Resolution, TripRecord};
use ceremony_rater::parser::{load_rides, load_target_stations};
use chrono::NaiveDate;
use std::path::Path;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn april(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
}

fn load_fixture() -> (Vec<DailyCount>, Vec<String>) {
    let aliases = ColumnAliases::default();
    let daily = load_rides(&fixture("daily_counts.csv"), &aliases)
        .expect("Failed to load rides")
        .into_daily_counts();
    let targets = load_target_stations(&fixture("stations.csv"), &aliases).expect("Failed to load stations");
    (daily, targets)
}

fn expand_to_trips(daily: &[DailyCount]) -> Vec<TripRecord> {
    daily
        .iter()
        .flat_map(|row| {
            (0..row.count).map(move |_| TripRecord {
                date: row.date,
                station: row.station.clone(),
            })
        })
        .collect()
}

#[test]
fn test_full_pipeline() {
    let (daily, targets) = load_fixture();
    assert_eq!(daily.len(), 51);
    assert_eq!(targets.len(), 4);

    let report = run(daily, &targets, &DetectorConfig::default(), &NoHolidays).unwrap();
    let by_station = |name: &str| {
        report
            .predictions
            .iter()
            .find(|p| p.station == name)
            .unwrap()
            .clone()
    };

    assert_eq!(by_station("なかもず").predicted_date, Some(april(7)));
    assert_eq!(by_station("なかもず").resolution, Resolution::Threshold);
    assert_eq!(by_station("白鷺").predicted_date, Some(april(8)));
    assert_eq!(by_station("初芝").predicted_date, Some(april(7)));
    assert_eq!(by_station("幽霊駅").predicted_date, None);
    assert_eq!(by_station("幽霊駅").resolution, Resolution::NoData);

    assert_eq!(report.consensus.overall_date, Some(april(7)));

    let summary = report.consensus.summary();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].date, april(7));
    assert_eq!(summary[0].count, 2);
    assert_eq!(summary[1].stations, "白鷺");
}

#[test]
fn test_row_order_does_not_change_results() {
    let (daily, targets) = load_fixture();
    let trips = expand_to_trips(&daily);

    let mut permuted = trips.clone();
    permuted.reverse();
    let half = permuted.len() / 2;
    permuted.rotate_left(half);

    let forward = aggregate_daily_counts(&trips);
    let shuffled = aggregate_daily_counts(&permuted);
    assert_eq!(forward, daily);
    assert_eq!(forward, shuffled);

    let config = DetectorConfig::default();
    let a = run(forward, &targets, &config, &NoHolidays).unwrap();
    let b = run(shuffled, &targets, &config, &NoHolidays).unwrap();
    assert_eq!(a.predictions, b.predictions);
    assert_eq!(a.consensus, b.consensus);
}

#[test]
fn test_max_ratio_policy_on_fixture() {
    let (daily, targets) = load_fixture();
    let config = DetectorConfig {
        policy: DetectionPolicy::MaxRatio,
        ..Default::default()
    };
    let report = run(daily, &targets, &config, &NoHolidays).unwrap();

    // Equal ratios on consecutive surge days resolve to the first one.
    assert_eq!(report.consensus.overall_date, Some(april(7)));
    assert!(
        report
            .predictions
            .iter()
            .filter(|p| p.predicted_date.is_some())
            .all(|p| p.resolution == Resolution::MaxRatio)
    );
}

#[test]
fn test_weekend_holiday_exclusion_keeps_weekday_onset() {
    let (daily, targets) = load_fixture();
    let config = DetectorConfig {
        exclude_weekend_holiday: true,
        ..Default::default()
    };
    let report = run(daily, &targets, &config, &JapaneseHolidays).unwrap();

    assert_eq!(report.consensus.overall_date, Some(april(7)));
}

#[test]
fn test_rerun_is_identical() {
    let (daily, targets) = load_fixture();
    let config = DetectorConfig::default();

    let first = run(daily.clone(), &targets, &config, &NoHolidays).unwrap();
    let second = run(daily, &targets, &config, &NoHolidays).unwrap();
    assert_eq!(first.predictions, second.predictions);
    assert_eq!(first.consensus, second.consensus);
}

#[test]
fn test_short_history_without_fallback_is_undefined() {
    let (daily, targets) = load_fixture();
    let short: Vec<DailyCount> = daily.into_iter().filter(|r| r.date >= april(8)).collect();
    let config = DetectorConfig {
        guarantee_fallback: false,
        ..Default::default()
    };
    let report = run(short, &targets, &config, &NoHolidays).unwrap();

    assert!(report.predictions.iter().all(|p| p.predicted_date.is_none()));
    assert_eq!(report.consensus.overall_date, None);
}
