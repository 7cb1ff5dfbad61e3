//! Error types shared by the loaders and the detection pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CeremonyError {
    /// A required field could not be resolved from the table header.
    #[error("Missing column: {field} (accepted: {}) in {source_name}", .aliases.join(", "))]
    MissingColumn {
        field: String,
        aliases: Vec<String>,
        source_name: String,
    },

    /// A target station had no observations. Non-fatal to the run.
    #[error("Empty series for station {station}")]
    EmptySeries { station: String },

    #[error("Invalid config: {name} - {reason}")]
    InvalidConfig { name: String, reason: String },

    #[error("Invalid date: {value}")]
    InvalidDate { value: String },
}

pub type Result<T> = std::result::Result<T, CeremonyError>;
