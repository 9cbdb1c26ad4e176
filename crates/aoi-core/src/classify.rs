//! Short/long partition by duration threshold.

use crate::record::GazeRecord;

/// The two duration classes. Only `short` records are eligible for merging;
/// `long` records pass through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub short: Vec<GazeRecord>,
    pub long: Vec<GazeRecord>,
}

/// Splits records at `threshold_ms` (inclusive: a duration exactly equal to
/// the threshold is short). Both halves preserve input order and all fields.
#[must_use]
pub fn partition_by_duration(records: Vec<GazeRecord>, threshold_ms: i64) -> Partition {
    let (short, long) = records
        .into_iter()
        .partition(|r| r.duration_ms <= threshold_ms);
    Partition { short, long }
}
