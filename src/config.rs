//! Detection parameters and the optional JSON settings file.

use crate::calendar::{CalendarSet, HolidayList, JapaneseHolidays};
use crate::columns::ColumnAliases;
use crate::error::CeremonyError;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which rule the spike detector uses to pick a station's date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionPolicy {
    /// First date whose ratio and baseline clear the configured thresholds,
    /// then the fallback ladder.
    #[default]
    ThresholdFirst,
    /// Date of the maximum ratio, ignoring the thresholds.
    MaxRatio,
}

/// Holiday calendar used by the weekend/holiday filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalendarKind {
    #[default]
    Japan,
    /// Weekends only, plus any listed holidays.
    #[serde(rename = "none")]
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Trailing observations in the baseline window, current one included.
    pub window: usize,
    pub ratio_threshold: f64,
    /// Baseline floor below which a spike is not trusted.
    pub min_baseline: u64,
    pub guarantee_fallback: bool,
    pub exclude_weekend_holiday: bool,
    pub policy: DetectionPolicy,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window: 7,
            ratio_threshold: 1.5,
            min_baseline: 50,
            guarantee_fallback: true,
            exclude_weekend_holiday: false,
            policy: DetectionPolicy::ThresholdFirst,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.window < 2 {
            return Err(CeremonyError::InvalidConfig {
                name: "window".to_string(),
                reason: format!("must be at least 2, got {}", self.window),
            });
        }

        if !self.ratio_threshold.is_finite() || self.ratio_threshold <= 1.0 {
            return Err(CeremonyError::InvalidConfig {
                name: "ratio_threshold".to_string(),
                reason: format!("must be a finite value above 1, got {}", self.ratio_threshold),
            });
        }

        Ok(())
    }
}

/// Everything that can be set from a settings file.
///
/// Stored as JSON on disk; every key is optional:
/// ```json
/// {
///   "detector": { "window": 7, "ratio_threshold": 1.5, "policy": "threshold-first" },
///   "columns": { "date": ["data_date", "date"] },
///   "calendar": "japan",
///   "holidays": ["2025-04-07"]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub detector: DetectorConfig,
    pub columns: ColumnAliases,
    pub calendar: CalendarKind,
    /// Extra non-business days on top of the selected calendar.
    pub holidays: Vec<NaiveDate>,
}

impl Settings {
    /// Loads settings from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file '{path}'"))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file '{path}'"))?;
        Ok(settings)
    }

    /// Loads from `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Builds the holiday calendar described by these settings.
    pub fn calendar(&self) -> CalendarSet {
        let mut set = CalendarSet::default();
        if self.calendar == CalendarKind::Japan {
            set.push(JapaneseHolidays);
        }
        if !self.holidays.is_empty() {
            set.push(HolidayList::from_dates(self.holidays.iter().copied()));
        }
        set
    }
}
