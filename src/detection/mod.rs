//! Ceremony-date detection over daily departure counts.
//!
//! Raw trip records are collapsed into one count per (date, station), each
//! station's series gets a trailing median baseline, a spike policy picks one
//! date per station, and the per-station dates are reduced to a consensus.

pub mod aggregate;
pub mod baseline;
pub mod consensus;
pub mod detector;
pub mod pipeline;
pub mod types;
pub mod utility;
