//! Worksheet loader: CSV rows into gaze records.
//!
//! One worksheet per file; the header row names the columns. The schema
//! (column names, units) is owned here, not by the aggregation core.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use aoi_core::{ContextKey, GazeRecord};

use crate::csv;
use crate::error::WorksheetError;

/// Context columns, in output order.
pub const CONTEXT_COLUMNS: [&str; 7] = [
    "Recording",
    "Participant",
    "Position",
    "TOI",
    "Interval",
    "Event_type",
    "Validity",
];

pub const AOI_COLUMN: &str = "AOI";
pub const START_COLUMN: &str = "Start";
pub const STOP_COLUMN: &str = "Stop";
pub const DURATION_COLUMN: &str = "Duration";

/// Reads one worksheet file into records.
pub fn read_worksheet(path: &Path) -> Result<Vec<GazeRecord>, WorksheetError> {
    let content = fs::read_to_string(path)?;
    parse_worksheet(&content)
}

/// Parses worksheet content. Rows are numbered as in the sheet: the header
/// is row 1, the first data row is row 2. Blank rows are skipped; any other
/// defect fails the whole worksheet, identifying the offending row.
pub fn parse_worksheet(content: &str) -> Result<Vec<GazeRecord>, WorksheetError> {
    let mut rows = csv::parse(content).into_iter();
    let header = rows.next().ok_or(WorksheetError::EmptyWorksheet)?;

    let find = |name: &'static str| -> Result<usize, WorksheetError> {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(WorksheetError::MissingColumn(name))
    };

    let mut context_indices = [0usize; 7];
    for (slot, name) in context_indices.iter_mut().zip(CONTEXT_COLUMNS) {
        *slot = find(name)?;
    }
    let aoi_index = find(AOI_COLUMN)?;
    let start_index = find(START_COLUMN)?;
    let duration_index = find(DURATION_COLUMN)?;
    // Stop is accepted when present (validated, then dropped); the derived
    // stop is used everywhere downstream.
    let stop_index = header.iter().position(|h| h.trim() == STOP_COLUMN);

    let mut known: HashSet<usize> = context_indices.iter().copied().collect();
    known.extend([aoi_index, start_index, duration_index]);
    known.extend(stop_index);

    let mut records = Vec::new();
    for (offset, fields) in rows.enumerate() {
        let row = offset + 2;
        if fields.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let get = |index: usize| fields.get(index).map_or("", String::as_str);

        let [recording, participant, position, toi, interval, event_type, validity] =
            context_indices.map(|i| get(i).trim().to_string());
        let context = ContextKey {
            recording,
            participant,
            position,
            toi,
            interval,
            event_type,
            validity,
        };

        let aoi_raw = get(aoi_index).trim();
        let aoi = (!aoi_raw.is_empty()).then(|| aoi_raw.to_string());

        let start_ms = parse_millis(get(start_index)).ok_or_else(|| {
            WorksheetError::InvalidField {
                row,
                column: START_COLUMN,
                value: get(start_index).to_string(),
            }
        })?;
        let duration_ms = parse_millis(get(duration_index)).ok_or_else(|| {
            WorksheetError::InvalidField {
                row,
                column: DURATION_COLUMN,
                value: get(duration_index).to_string(),
            }
        })?;
        if let Some(index) = stop_index {
            let value = get(index).trim();
            if !value.is_empty() && parse_millis(value).is_none() {
                return Err(WorksheetError::InvalidField {
                    row,
                    column: STOP_COLUMN,
                    value: value.to_string(),
                });
            }
        }

        let mut payload = serde_json::Map::new();
        for (index, name) in header.iter().enumerate() {
            if known.contains(&index) {
                continue;
            }
            let name = name.trim();
            let value = get(index);
            if !name.is_empty() && !value.is_empty() {
                payload.insert(name.to_string(), serde_json::Value::from(value));
            }
        }

        records.push(GazeRecord {
            context,
            aoi,
            start_ms,
            duration_ms,
            row,
            payload,
        });
    }

    tracing::debug!(records = records.len(), "parsed worksheet");
    Ok(records)
}

/// Parses a millisecond timestamp or duration. Integer text is taken as-is;
/// float text is accepted only when it carries no fractional part (spreadsheet
/// exports often render integers as `120.0`).
#[expect(
    clippy::cast_possible_truncation,
    reason = "fract()==0 and magnitude-checked, so the cast is exact"
)]
fn parse_millis(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Some(parsed);
    }
    let parsed: f64 = trimmed.parse().ok()?;
    if parsed.is_finite() && parsed.fract() == 0.0 && parsed.abs() <= 9.0e15 {
        Some(parsed as i64)
    } else {
        None
    }
}
