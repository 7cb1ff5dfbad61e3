//! CSV loading for ride records and target stations.
//!
//! Files ending in `.gz` are decompressed on the fly. Header names are
//! resolved through [`ColumnAliases`]; a missing required column aborts the
//! load, while individual malformed rows are skipped and counted.

use crate::columns::{ColumnAliases, find_column, require_column};
use crate::detection::aggregate::{aggregate_daily_counts, merge_daily_counts};
use crate::detection::types::{DailyCount, TripRecord};
use crate::error::CeremonyError;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use flate2::read::GzDecoder;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Rides as loaded from disk: one row per trip, or already counted per day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RideTable {
    Trips(Vec<TripRecord>),
    Daily(Vec<DailyCount>),
}

impl RideTable {
    /// Collapses the table into unique, sorted (date, station) counts.
    pub fn into_daily_counts(self) -> Vec<DailyCount> {
        match self {
            RideTable::Trips(trips) => aggregate_daily_counts(&trips),
            RideTable::Daily(rows) => merge_daily_counts(rows),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RideTable::Trips(trips) => trips.len(),
            RideTable::Daily(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trims surrounding whitespace and removes ideographic spaces (U+3000).
pub fn normalize_station(raw: &str) -> String {
    raw.trim().replace('\u{3000}', "")
}

/// Parses `YYYY-MM-DD`, `YYYY/MM/DD` or `YYYYMMDD`, ignoring any time part.
pub fn parse_date(raw: &str) -> crate::error::Result<NaiveDate> {
    let token = raw
        .trim()
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()
        .unwrap_or_default();

    let parsed = if token.len() == 8 && token.bytes().all(|b| b.is_ascii_digit()) {
        let year = token[..4].parse().ok();
        let month = token[4..6].parse().ok();
        let day = token[6..].parse().ok();
        match (year, month, day) {
            (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d),
            _ => None,
        }
    } else {
        ["%Y-%m-%d", "%Y/%m/%d"]
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
    };

    parsed.ok_or_else(|| CeremonyError::InvalidDate {
        value: raw.to_string(),
    })
}

/// Opens `path` for reading, transparently gunzipping `.gz` files.
pub fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
    let reader = BufReader::new(file);

    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        debug!(path = %path.display(), "Reading gzip-compressed input");
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Loads the ride table at `path`.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_rides(path: &Path, aliases: &ColumnAliases) -> Result<RideTable> {
    let reader = open_input(path)?;
    read_rides(reader, &path.display().to_string(), aliases)
}

/// Reads ride rows from any CSV source.
///
/// When a count column is present every row carries its own count and the
/// table is treated as pre-aggregated; otherwise each row is one trip.
pub fn read_rides<R: Read>(reader: R, source_name: &str, aliases: &ColumnAliases) -> Result<RideTable> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let date_idx = require_column(&headers, "date", &aliases.date, source_name)?;
    let station_idx = require_column(&headers, "station", &aliases.station, source_name)?;
    let count_idx = find_column(&headers, &aliases.count);

    let mut trips = Vec::new();
    let mut daily = Vec::new();
    let mut skipped = 0usize;

    for (line, result) in rdr.records().enumerate() {
        let record = result?;

        let date = match record.get(date_idx).map(parse_date) {
            Some(Ok(date)) => date,
            Some(Err(e)) => {
                warn!(source = source_name, line = line + 2, error = %e, "Skipping row with bad date");
                skipped += 1;
                continue;
            }
            None => {
                warn!(source = source_name, line = line + 2, "Skipping row with missing date field");
                skipped += 1;
                continue;
            }
        };

        let station = normalize_station(record.get(station_idx).unwrap_or_default());
        if station.is_empty() {
            warn!(source = source_name, line = line + 2, "Skipping row with empty station");
            skipped += 1;
            continue;
        }

        match count_idx {
            Some(idx) => {
                let raw = record.get(idx).unwrap_or_default().trim();
                match raw.parse::<u64>() {
                    Ok(count) => daily.push(DailyCount { date, station, count }),
                    Err(_) => {
                        warn!(source = source_name, line = line + 2, value = raw, "Skipping row with bad count");
                        skipped += 1;
                    }
                }
            }
            None => trips.push(TripRecord { date, station }),
        }
    }

    let table = if count_idx.is_some() {
        RideTable::Daily(daily)
    } else {
        RideTable::Trips(trips)
    };

    info!(source = source_name, rows = table.len(), skipped, "Loaded ride records");
    Ok(table)
}

/// Loads the unique, normalized target station names at `path`, sorted.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_target_stations(path: &Path, aliases: &ColumnAliases) -> Result<Vec<String>> {
    let reader = open_input(path)?;
    read_target_stations(reader, &path.display().to_string(), aliases)
}

pub fn read_target_stations<R: Read>(
    reader: R,
    source_name: &str,
    aliases: &ColumnAliases,
) -> Result<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let station_idx = require_column(&headers, "station", &aliases.target_station, source_name)?;

    let mut stations = BTreeSet::new();
    for result in rdr.records() {
        let record = result?;
        let station = normalize_station(record.get(station_idx).unwrap_or_default());
        if !station.is_empty() {
            stations.insert(station);
        }
    }

    info!(source = source_name, stations = stations.len(), "Loaded target stations");
    Ok(stations.into_iter().collect())
}
