//! Spike detection: one ceremony date per station.
//!
//! | Policy          | Step 1                                  | Fallback (`guarantee_fallback`) |
//! |-----------------|-----------------------------------------|---------------------------------|
//! | threshold-first | first point with `baseline >= min_baseline` and `ratio >= ratio_threshold` | max ratio, then max count |
//! | max-ratio       | max ratio                               | max count                       |
//!
//! Ties always go to the earliest date.

use crate::config::{DetectionPolicy, DetectorConfig};
use crate::detection::baseline::compute_baseline;
use crate::detection::types::{BaselinePoint, Prediction, Resolution, StationSeries};
use crate::error::{CeremonyError, Result};
use chrono::NaiveDate;
use tracing::debug;

/// Runs the baseline estimator and the configured policy over one station.
///
/// # Errors
///
/// Returns [`CeremonyError::EmptySeries`] when the series has no observations.
pub fn detect_series(series: &StationSeries, config: &DetectorConfig) -> Result<Prediction> {
    if series.is_empty() {
        return Err(CeremonyError::EmptySeries {
            station: series.station.clone(),
        });
    }

    let points = compute_baseline(series, config.window);
    Ok(detect(&series.station, &points, config))
}

/// Picks the ceremony date for `station` from its annotated series.
pub fn detect(station: &str, points: &[BaselinePoint], config: &DetectorConfig) -> Prediction {
    if points.is_empty() {
        return Prediction::unresolved(station, Resolution::NoData);
    }

    let picked = match config.policy {
        DetectionPolicy::ThresholdFirst => first_qualifying(points, config)
            .map(|date| (date, Resolution::Threshold))
            .or_else(|| fallback_ladder(points, config.guarantee_fallback)),
        DetectionPolicy::MaxRatio => max_ratio_date(points)
            .map(|date| (date, Resolution::MaxRatio))
            .or_else(|| fallback_count(points, config.guarantee_fallback)),
    };

    let prediction = match picked {
        Some((date, resolution)) => Prediction::resolved(station, date, resolution),
        None => Prediction::unresolved(station, Resolution::Unresolved),
    };

    debug!(
        station,
        date = ?prediction.predicted_date,
        resolution = ?prediction.resolution,
        "Station resolved"
    );

    prediction
}

/// Earliest point clearing both the ratio threshold and the baseline floor.
fn first_qualifying(points: &[BaselinePoint], config: &DetectorConfig) -> Option<NaiveDate> {
    let floor = config.min_baseline as f64;

    points
        .iter()
        .find(|p| match (p.baseline, p.ratio) {
            (Some(baseline), Some(ratio)) => baseline >= floor && ratio >= config.ratio_threshold,
            _ => false,
        })
        .map(|p| p.date)
}

fn fallback_ladder(points: &[BaselinePoint], guarantee: bool) -> Option<(NaiveDate, Resolution)> {
    if !guarantee {
        return None;
    }

    max_ratio_date(points)
        .map(|date| (date, Resolution::MaxRatio))
        .or_else(|| fallback_count(points, guarantee))
}

fn fallback_count(points: &[BaselinePoint], guarantee: bool) -> Option<(NaiveDate, Resolution)> {
    if !guarantee {
        return None;
    }

    max_count_date(points).map(|date| (date, Resolution::MaxCount))
}

/// Date of the largest defined ratio; earliest wins on ties.
fn max_ratio_date(points: &[BaselinePoint]) -> Option<NaiveDate> {
    points
        .iter()
        .filter_map(|p| p.ratio.map(|r| (p.date, r)))
        .fold(None, |best: Option<(NaiveDate, f64)>, (date, ratio)| match best {
            Some((_, best_ratio)) if ratio <= best_ratio => best,
            _ => Some((date, ratio)),
        })
        .map(|(date, _)| date)
}

/// Date of the largest raw count; earliest wins on ties.
fn max_count_date(points: &[BaselinePoint]) -> Option<NaiveDate> {
    points
        .iter()
        .fold(None, |best: Option<&BaselinePoint>, p| match best {
            Some(b) if p.count <= b.count => best,
            _ => Some(p),
        })
        .map(|p| p.date)
}
