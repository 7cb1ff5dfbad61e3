//! Header alias resolution for input tables.
//!
//! Source files spell the same field several ways (including the original
//! `depature_station` typo). Each canonical field maps to a list of accepted
//! headers; the first alias present in the header wins.

use crate::error::{CeremonyError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    pub date: Vec<String>,
    pub station: Vec<String>,
    /// Optional; present only in pre-aggregated tables.
    pub count: Vec<String>,
    /// Station column of the target-station table.
    pub target_station: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        fn owned(names: &[&str]) -> Vec<String> {
            names.iter().map(|s| s.to_string()).collect()
        }

        Self {
            date: owned(&["data_date", "date", "日付"]),
            station: owned(&["depature_station", "departure_station", "station", "駅"]),
            count: owned(&["departures", "count"]),
            target_station: owned(&["station", "station_name", "駅"]),
        }
    }
}

/// Position of the first header matching any alias, compared after trimming
/// whitespace and a leading byte-order mark.
pub fn find_column(headers: &csv::StringRecord, aliases: &[String]) -> Option<usize> {
    let cleaned: Vec<&str> = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim())
        .collect();

    aliases
        .iter()
        .find_map(|alias| cleaned.iter().position(|h| h == alias))
}

/// Like [`find_column`], but a miss is a [`CeremonyError::MissingColumn`].
pub fn require_column(
    headers: &csv::StringRecord,
    field: &str,
    aliases: &[String],
    source_name: &str,
) -> Result<usize> {
    find_column(headers, aliases).ok_or_else(|| CeremonyError::MissingColumn {
        field: field.to_string(),
        aliases: aliases.to_vec(),
        source_name: source_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(names.to_vec())
    }

    #[test]
    fn test_find_first_alias_present() {
        let aliases = ColumnAliases::default();
        let h = headers(&["id", "departure_station", "data_date"]);

        assert_eq!(find_column(&h, &aliases.station), Some(1));
        assert_eq!(find_column(&h, &aliases.date), Some(2));
        assert_eq!(find_column(&h, &aliases.count), None);
    }

    #[test]
    fn test_alias_priority_follows_list_order() {
        let aliases = ColumnAliases::default();
        let h = headers(&["station", "depature_station"]);

        assert_eq!(find_column(&h, &aliases.station), Some(1));
    }

    #[test]
    fn test_bom_and_whitespace_ignored() {
        let aliases = ColumnAliases::default();
        let h = headers(&["\u{feff}data_date ", " 駅"]);

        assert_eq!(find_column(&h, &aliases.date), Some(0));
        assert_eq!(find_column(&h, &aliases.station), Some(1));
    }

    #[test]
    fn test_require_column_reports_missing() {
        let aliases = ColumnAliases::default();
        let err = require_column(&headers(&["foo"]), "date", &aliases.date, "rides.csv").unwrap_err();

        assert!(matches!(err, CeremonyError::MissingColumn { ref field, .. } if field == "date"));
    }
}
