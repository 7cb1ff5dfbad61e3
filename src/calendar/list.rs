use super::HolidayCalendar;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Explicit list of non-business days.
///
/// Stored as JSON on disk, either a plain array or a date-to-name object:
/// ```json
/// ["2025-04-07", "2025-04-08"]
/// ```
/// ```json
/// { "2025-04-07": "School closure" }
/// ```
#[derive(Debug, Clone, Default)]
pub struct HolidayList {
    entries: BTreeMap<NaiveDate, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HolidayFile {
    Dates(Vec<NaiveDate>),
    Named(BTreeMap<NaiveDate, String>),
}

impl HolidayList {
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            entries: dates
                .into_iter()
                .map(|d| (d, "Listed holiday".to_string()))
                .collect(),
        }
    }

    /// Loads the list from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read holiday list '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("Failed to parse holiday list '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let parsed: HolidayFile = serde_json::from_str(content)?;
        Ok(match parsed {
            HolidayFile::Dates(dates) => Self::from_dates(dates),
            HolidayFile::Named(entries) => Self { entries },
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HolidayCalendar for HolidayList {
    fn holiday_name(&self, date: NaiveDate) -> Option<String> {
        self.entries.get(&date).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_array() {
        let list = HolidayList::from_json(r#"["2025-04-07", "2025-04-08"]"#).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.is_holiday(NaiveDate::from_ymd_opt(2025, 4, 7).unwrap()));
    }

    #[test]
    fn test_from_json_named() {
        let list = HolidayList::from_json(r#"{"2025-04-07": "School closure"}"#).unwrap();
        assert_eq!(
            list.holiday_name(NaiveDate::from_ymd_opt(2025, 4, 7).unwrap()),
            Some("School closure".to_string())
        );
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(HolidayList::from_json(r#"{"not-a-date": 3}"#).is_err());
    }
}
