use crate::detection::types::{ConsensusResult, DateSummary, Prediction};
use chrono::{Days, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

/// Reduces per-station predictions to the most common date.
///
/// Undefined predictions are ignored. When several dates share the highest
/// frequency the earliest one is chosen, so the result does not depend on the
/// order of `predictions`.
pub fn select_consensus(predictions: &[Prediction]) -> ConsensusResult {
    let mut groups: BTreeMap<NaiveDate, BTreeSet<String>> = BTreeMap::new();

    for prediction in predictions {
        if let Some(date) = prediction.predicted_date {
            groups
                .entry(date)
                .or_default()
                .insert(prediction.station.clone());
        }
    }

    // BTreeMap iterates ascending, so the first maximum is the earliest date.
    let overall_date = groups
        .iter()
        .fold(None, |best: Option<(NaiveDate, usize)>, (date, stations)| match best {
            Some((_, n)) if stations.len() <= n => best,
            _ => Some((*date, stations.len())),
        })
        .map(|(date, _)| date);

    ConsensusResult {
        overall_date,
        groups,
    }
}

impl ConsensusResult {
    /// Rows of `(date, "A, B", count)` sorted by date.
    pub fn summary(&self) -> Vec<DateSummary> {
        self.groups
            .iter()
            .map(|(date, stations)| DateSummary {
                date: *date,
                stations: stations.iter().map(String::as_str).collect::<Vec<_>>().join(", "),
                count: stations.len(),
            })
            .collect()
    }

    /// Station count for every calendar day between the earliest and latest
    /// predicted dates, zero-filled. Empty when nothing was predicted.
    pub fn distribution(&self) -> Vec<(NaiveDate, usize)> {
        let (Some((first, _)), Some((last, _))) =
            (self.groups.first_key_value(), self.groups.last_key_value())
        else {
            return Vec::new();
        };

        let mut out = Vec::new();
        let mut day = *first;
        while day <= *last {
            out.push((day, self.groups.get(&day).map_or(0, BTreeSet::len)));
            match day.checked_add_days(Days::new(1)) {
                Some(next) => day = next,
                None => break,
            }
        }
        out
    }
}
