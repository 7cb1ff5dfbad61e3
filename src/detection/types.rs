//! Data types used by the detection pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One departure recorded at a station on a given day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRecord {
    pub date: NaiveDate,
    pub station: String,
}

/// Number of departures for one (date, station) pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub station: String,
    pub count: u64,
}

/// Date-ordered daily counts for a single station. Dates are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationSeries {
    pub station: String,
    pub(crate) points: Vec<(NaiveDate, u64)>,
}

impl StationSeries {
    /// Builds a series from unordered observations, sorting by date and
    /// summing any repeated dates.
    pub fn new(station: impl Into<String>, observations: impl IntoIterator<Item = (NaiveDate, u64)>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for (date, count) in observations {
            *by_date.entry(date).or_default() += count;
        }

        Self {
            station: station.into(),
            points: by_date.into_iter().collect(),
        }
    }

    pub fn points(&self) -> &[(NaiveDate, u64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A series point annotated with its trailing baseline and spike ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaselinePoint {
    pub date: NaiveDate,
    pub count: u64,
    pub baseline: Option<f64>,
    pub ratio: Option<f64>,
}

/// How a station's prediction was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// First point clearing both the ratio threshold and the baseline floor.
    Threshold,
    /// Date of the largest defined ratio.
    MaxRatio,
    /// No ratio was ever defined; date of the largest raw count.
    MaxCount,
    /// Nothing qualified and fallback was disabled.
    Unresolved,
    /// The station had no observations at all.
    NoData,
}

/// The inferred ceremony date for one station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub station: String,
    pub predicted_date: Option<NaiveDate>,
    pub resolution: Resolution,
}

impl Prediction {
    pub fn resolved(station: impl Into<String>, date: NaiveDate, resolution: Resolution) -> Self {
        Self {
            station: station.into(),
            predicted_date: Some(date),
            resolution,
        }
    }

    pub fn unresolved(station: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            station: station.into(),
            predicted_date: None,
            resolution,
        }
    }
}

/// Consensus over all station predictions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsensusResult {
    pub overall_date: Option<NaiveDate>,
    pub groups: BTreeMap<NaiveDate, BTreeSet<String>>,
}

/// One row of the grouped summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSummary {
    #[serde(rename = "pred_ceremony_date")]
    pub date: NaiveDate,
    pub stations: String,
    pub count: usize,
}

/// Complete result of a detection run.
#[derive(Debug, Clone, Serialize)]
pub struct CeremonyReport {
    pub predictions: Vec<Prediction>,
    pub consensus: ConsensusResult,
}
