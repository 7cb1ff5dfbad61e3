//! Output formatting and persistence for detection results.
//!
//! Supports a plain-text report, JSON serialization, and the CSV exports
//! (grouped summary, per-station predictions, timelines, distribution).

use anyhow::Result;
use chrono::NaiveDate;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::detection::types::{BaselinePoint, CeremonyReport, ConsensusResult, DailyCount, Prediction};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes the human-readable report: stations by predicted date (undefined
/// last), then the overall date.
pub fn write_report<W: Write>(out: &mut W, report: &CeremonyReport) -> Result<()> {
    let mut sorted: Vec<&Prediction> = report.predictions.iter().collect();
    sorted.sort_by(|a, b| match (a.predicted_date, b.predicted_date) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.station.cmp(&b.station)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.station.cmp(&b.station),
    });

    writeln!(out, "Predicted ceremony date by station:")?;
    writeln!(out)?;
    for p in sorted {
        let date = p
            .predicted_date
            .map_or_else(|| "-".to_string(), |d| d.to_string());
        writeln!(out, "{:<24} {:<10} ({:?})", p.station, date, p.resolution)?;
    }

    writeln!(out)?;
    writeln!(out, "--------------------------------------")?;
    match report.consensus.overall_date {
        Some(date) => writeln!(out, "Overall predicted start-of-term ceremony date: {date}")?,
        None => writeln!(out, "Unable to determine an overall common date.")?,
    }

    Ok(())
}

/// Logs the report as pretty-printed JSON.
pub fn print_json(report: &CeremonyReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

pub fn write_json(path: &Path, report: &CeremonyReport) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    info!(path = %path.display(), "Saved JSON report");
    Ok(())
}

/// Writes `pred_ceremony_date,stations,count` rows, UTF-8 with a BOM so
/// spreadsheet tools pick up the encoding.
pub fn write_date_summary(path: &Path, consensus: &ConsensusResult) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
    let rows = consensus.summary();
    if rows.is_empty() {
        writer.write_record(["pred_ceremony_date", "stations", "count"])?;
    }
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), dates = rows.len(), "Saved date summary");
    Ok(())
}

pub fn write_predictions(path: &Path, predictions: &[Prediction]) -> Result<()> {
    write_rows(path, predictions)?;
    info!(path = %path.display(), stations = predictions.len(), "Saved predictions");
    Ok(())
}

pub fn write_daily_counts(path: &Path, daily: &[DailyCount]) -> Result<()> {
    write_rows(path, daily)?;
    info!(path = %path.display(), rows = daily.len(), "Saved daily counts");
    Ok(())
}

#[derive(Serialize)]
struct TimelineRow {
    date: NaiveDate,
    count: u64,
    baseline: Option<f64>,
    ratio: Option<f64>,
    predicted: bool,
}

/// Writes one station's count, baseline, and ratio series, flagging the
/// predicted date.
pub fn write_timeline(path: &Path, points: &[BaselinePoint], predicted: Option<NaiveDate>) -> Result<()> {
    let rows: Vec<TimelineRow> = points
        .iter()
        .map(|p| TimelineRow {
            date: p.date,
            count: p.count,
            baseline: p.baseline,
            ratio: p.ratio,
            predicted: Some(p.date) == predicted,
        })
        .collect();

    write_rows(path, &rows)?;
    debug!(path = %path.display(), points = rows.len(), "Saved timeline");
    Ok(())
}

#[derive(Serialize)]
struct DistributionRow {
    date: NaiveDate,
    stations: usize,
}

/// Writes the zero-filled station count per day.
pub fn write_distribution(path: &Path, distribution: &[(NaiveDate, usize)]) -> Result<()> {
    let rows: Vec<DistributionRow> = distribution
        .iter()
        .map(|&(date, stations)| DistributionRow { date, stations })
        .collect();

    write_rows(path, &rows)?;
    info!(path = %path.display(), days = rows.len(), "Saved distribution");
    Ok(())
}

/// File name for a station's timeline, with path separators replaced.
pub fn timeline_path(dir: &Path, station: &str) -> PathBuf {
    let safe: String = station
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    dir.join(format!("timeline_{safe}.csv"))
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
