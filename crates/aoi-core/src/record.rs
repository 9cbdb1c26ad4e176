//! Input records and aggregated runs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Composite key identifying the recording slice a record belongs to.
///
/// Runs never span two contexts: continuity is only ever evaluated between
/// records that share all seven components.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContextKey {
    pub recording: String,
    pub participant: String,
    pub position: String,
    pub toi: String,
    pub interval: String,
    pub event_type: String,
    pub validity: String,
}

impl ContextKey {
    /// Component values in declaration order, for tabular output.
    #[must_use]
    pub fn fields(&self) -> [&str; 7] {
        [
            self.recording.as_str(),
            self.participant.as_str(),
            self.position.as_str(),
            self.toi.as_str(),
            self.interval.as_str(),
            self.event_type.as_str(),
            self.validity.as_str(),
        ]
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields().join("/"))
    }
}

/// One raw gaze sample, already labeled with an AOI upstream.
///
/// Timestamps are integer milliseconds relative to the recording start.
/// The continuity test is exact equality, so no floating point is involved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazeRecord {
    pub context: ContextKey,

    /// AOI label; `None` means the sample carries no label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aoi: Option<String>,

    pub start_ms: i64,

    pub duration_ms: i64,

    /// Source worksheet row, used in error reports and as the tie-break for
    /// equal timestamps.
    #[serde(default)]
    pub row: usize,

    /// Pass-through columns not interpreted by the aggregation (gaze
    /// coordinates, event indices, ...). Carried verbatim into output rows.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl GazeRecord {
    /// End of the sample: `start_ms + duration_ms`.
    #[must_use]
    pub const fn stop_ms(&self) -> i64 {
        self.start_ms + self.duration_ms
    }
}

/// A maximal sequence of time-contiguous, same-AOI short records merged into
/// one segment. Sealed on construction and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    pub context: ContextKey,

    /// Shared AOI label of all members (`None` for an unlabeled singleton).
    pub aoi: Option<String>,

    /// Start of the first member.
    pub start_ms: i64,

    /// Stop of the last member.
    pub stop_ms: i64,

    /// Sum of member durations. Differs from `stop_ms - start_ms` when the
    /// step fallback bridged a gap.
    pub duration_ms: i64,

    /// Number of merged records.
    pub count: u32,

    /// The source records, in merge order.
    pub members: Vec<GazeRecord>,

    /// Pass-through columns of the first member.
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl Run {
    /// Source row of the first member, the run's position in the original
    /// input order.
    #[must_use]
    pub fn first_row(&self) -> usize {
        self.members.first().map_or(0, |m| m.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(recording: &str) -> ContextKey {
        ContextKey {
            recording: recording.to_string(),
            participant: "P01".to_string(),
            position: "sitting".to_string(),
            toi: "full".to_string(),
            interval: "1".to_string(),
            event_type: "Fixation".to_string(),
            validity: "Whole".to_string(),
        }
    }

    #[test]
    fn stop_is_start_plus_duration() {
        let record = GazeRecord {
            context: context("rec1"),
            aoi: Some("Face".to_string()),
            start_ms: 120,
            duration_ms: 20,
            row: 2,
            payload: serde_json::Map::new(),
        };
        assert_eq!(record.stop_ms(), 140);
    }

    #[test]
    fn context_display_joins_fields() {
        let ctx = context("rec1");
        assert_eq!(ctx.to_string(), "rec1/P01/sitting/full/1/Fixation/Whole");
    }

    #[test]
    fn context_ordering_is_lexicographic_by_field() {
        let a = context("rec1");
        let b = context("rec2");
        assert!(a < b);
    }

    #[test]
    fn record_serde_roundtrip() {
        let mut payload = serde_json::Map::new();
        payload.insert("EventIndex".to_string(), serde_json::Value::from("17"));
        let record = GazeRecord {
            context: context("rec1"),
            aoi: None,
            start_ms: 0,
            duration_ms: 10,
            row: 3,
            payload,
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: GazeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
