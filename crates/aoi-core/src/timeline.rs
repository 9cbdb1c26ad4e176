//! Chronological merge of sealed runs and pass-through long records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::{ContextKey, GazeRecord, Run};

/// Where a timeline row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineSource {
    /// A sealed run built from short records.
    Aggregated,
    /// A long record passed through unmodified.
    Raw,
}

impl TimelineSource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Aggregated => "aggregated",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for TimelineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the combined timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub context: ContextKey,
    pub aoi: Option<String>,
    pub start_ms: i64,
    pub stop_ms: i64,
    pub duration_ms: i64,
    /// Merged record count; absent for raw rows.
    pub count: Option<u32>,
    pub source: TimelineSource,
    /// Original input row (first member for runs); the tie-break for rows
    /// sharing a start timestamp.
    pub row: usize,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

/// Produces one chronologically merged sequence per context containing both
/// sealed runs and pass-through long records, ordered by `(context, start)`.
/// A run and a long record sharing the same start keep their original input
/// order. Long records are never merged into runs, even when label and
/// adjacency would match.
#[must_use]
pub fn combine_timeline(runs: &[Run], long: &[GazeRecord]) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = Vec::with_capacity(runs.len() + long.len());

    for run in runs {
        entries.push(TimelineEntry {
            context: run.context.clone(),
            aoi: run.aoi.clone(),
            start_ms: run.start_ms,
            stop_ms: run.stop_ms,
            duration_ms: run.duration_ms,
            count: Some(run.count),
            source: TimelineSource::Aggregated,
            row: run.first_row(),
            payload: run.payload.clone(),
        });
    }

    for record in long {
        entries.push(TimelineEntry {
            context: record.context.clone(),
            aoi: record.aoi.clone(),
            start_ms: record.start_ms,
            stop_ms: record.stop_ms(),
            duration_ms: record.duration_ms,
            count: None,
            source: TimelineSource::Raw,
            row: record.row,
            payload: record.payload.clone(),
        });
    }

    entries.sort_by(|a, b| {
        a.context
            .cmp(&b.context)
            .then(a.start_ms.cmp(&b.start_ms))
            .then(a.row.cmp(&b.row))
    });
    entries
}
