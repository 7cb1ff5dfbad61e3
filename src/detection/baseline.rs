use crate::detection::types::{BaselinePoint, StationSeries};
use crate::detection::utility::median;

/// Annotates each point of `series` with a trailing median baseline and the
/// observed-to-baseline ratio.
///
/// The window counts observations, not calendar days, and includes the
/// current point. The first `window - 1` points have no baseline. A zero
/// baseline leaves the ratio undefined.
pub fn compute_baseline(series: &StationSeries, window: usize) -> Vec<BaselinePoint> {
    let counts: Vec<u64> = series.points().iter().map(|(_, count)| *count).collect();

    series
        .points()
        .iter()
        .enumerate()
        .map(|(i, &(date, count))| {
            let baseline = if window > 0 && i + 1 >= window {
                median(&counts[i + 1 - window..=i])
            } else {
                None
            };

            let ratio = match baseline {
                Some(b) if b > 0.0 => Some(count as f64 / b),
                _ => None,
            };

            BaselinePoint {
                date,
                count,
                baseline,
                ratio,
            }
        })
        .collect()
}
