//! Table writer: one directory of CSV tables per processed worksheet.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use aoi_core::{Aggregation, AoiSummary, GazeRecord, GroupSummary, Run, TimelineEntry};

use crate::csv;
use crate::error::WorksheetError;
use crate::reader::{AOI_COLUMN, CONTEXT_COLUMNS, DURATION_COLUMN, START_COLUMN, STOP_COLUMN};

pub const TIMELINE_TABLE: &str = "Timeline_Combined.csv";
pub const MERGED_RUNS_TABLE: &str = "MergedRuns.csv";
pub const AOI_SUMMARY_TABLE: &str = "AOI_Summary.csv";
pub const AOI_BY_GROUP_TABLE: &str = "AOI_ByGroup.csv";
pub const RAW_SHORT_TABLE: &str = "Raw_Short.csv";
pub const RAW_LONG_TABLE: &str = "Raw_Long.csv";

const SEGMENTS_COLUMN: &str = "SegmentsMerged";
const SOURCE_COLUMN: &str = "Source";

/// Writes all result tables into `dir` (created if needed): the combined
/// timeline, the merged runs, both AOI summaries, and the verbatim
/// short/long partitions. The long partition table is only written when
/// non-empty.
pub fn write_tables(dir: &Path, aggregation: &Aggregation) -> Result<(), WorksheetError> {
    fs::create_dir_all(dir)?;

    write_timeline(&dir.join(TIMELINE_TABLE), &aggregation.timeline)?;
    write_merged_runs(&dir.join(MERGED_RUNS_TABLE), &aggregation.runs)?;
    write_aoi_summary(&dir.join(AOI_SUMMARY_TABLE), &aggregation.aoi_summary)?;
    write_aoi_by_group(&dir.join(AOI_BY_GROUP_TABLE), &aggregation.aoi_by_group)?;
    write_records(&dir.join(RAW_SHORT_TABLE), &aggregation.short)?;
    if !aggregation.long.is_empty() {
        write_records(&dir.join(RAW_LONG_TABLE), &aggregation.long)?;
    }

    tracing::debug!(dir = %dir.display(), "wrote result tables");
    Ok(())
}

fn table_writer(path: &Path) -> Result<BufWriter<File>, WorksheetError> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Union of payload column names, sorted for a stable header.
fn payload_columns<'a, I>(payloads: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a serde_json::Map<String, serde_json::Value>>,
{
    let names: BTreeSet<String> = payloads
        .into_iter()
        .flat_map(|p| p.keys().cloned())
        .collect();
    names.into_iter().collect()
}

fn render(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn context_cells(fields: [&str; 7]) -> Vec<String> {
    fields.iter().map(|f| (*f).to_string()).collect()
}

fn write_timeline(path: &Path, entries: &[TimelineEntry]) -> Result<(), WorksheetError> {
    let extra = payload_columns(entries.iter().map(|e| &e.payload));

    let mut header: Vec<String> = CONTEXT_COLUMNS.iter().map(|c| (*c).to_string()).collect();
    header.extend(
        [
            AOI_COLUMN,
            START_COLUMN,
            STOP_COLUMN,
            DURATION_COLUMN,
            SEGMENTS_COLUMN,
            SOURCE_COLUMN,
        ]
        .map(String::from),
    );
    header.extend(extra.iter().cloned());

    let mut out = table_writer(path)?;
    csv::write_row(&mut out, &header)?;
    for entry in entries {
        let mut row = context_cells(entry.context.fields());
        row.push(entry.aoi.clone().unwrap_or_default());
        row.push(entry.start_ms.to_string());
        row.push(entry.stop_ms.to_string());
        row.push(entry.duration_ms.to_string());
        row.push(entry.count.map(|c| c.to_string()).unwrap_or_default());
        row.push(entry.source.as_str().to_string());
        for column in &extra {
            row.push(render(entry.payload.get(column)));
        }
        csv::write_row(&mut out, &row)?;
    }
    out.flush()?;
    Ok(())
}

fn write_merged_runs(path: &Path, runs: &[Run]) -> Result<(), WorksheetError> {
    let extra = payload_columns(runs.iter().map(|r| &r.payload));

    let mut header: Vec<String> = CONTEXT_COLUMNS.iter().map(|c| (*c).to_string()).collect();
    header.extend(
        [
            AOI_COLUMN,
            START_COLUMN,
            STOP_COLUMN,
            DURATION_COLUMN,
            SEGMENTS_COLUMN,
        ]
        .map(String::from),
    );
    header.extend(extra.iter().cloned());

    let mut out = table_writer(path)?;
    csv::write_row(&mut out, &header)?;
    for run in runs {
        let mut row = context_cells(run.context.fields());
        row.push(run.aoi.clone().unwrap_or_default());
        row.push(run.start_ms.to_string());
        row.push(run.stop_ms.to_string());
        row.push(run.duration_ms.to_string());
        row.push(run.count.to_string());
        for column in &extra {
            row.push(render(run.payload.get(column)));
        }
        csv::write_row(&mut out, &row)?;
    }
    out.flush()?;
    Ok(())
}

fn write_aoi_summary(path: &Path, summaries: &[AoiSummary]) -> Result<(), WorksheetError> {
    let header = ["AOI", "Rows", "TotalDuration", "FirstStart", "LastStop"].map(String::from);

    let mut out = table_writer(path)?;
    csv::write_row(&mut out, &header)?;
    for summary in summaries {
        csv::write_row(
            &mut out,
            &[
                summary.aoi.clone(),
                summary.rows.to_string(),
                summary.total_duration_ms.to_string(),
                summary.first_start_ms.to_string(),
                summary.last_stop_ms.to_string(),
            ],
        )?;
    }
    out.flush()?;
    Ok(())
}

fn write_aoi_by_group(path: &Path, summaries: &[GroupSummary]) -> Result<(), WorksheetError> {
    let mut header: Vec<String> = CONTEXT_COLUMNS.iter().map(|c| (*c).to_string()).collect();
    header.extend(["AOI", "Rows", "TotalDuration", "FirstStart", "LastStop"].map(String::from));

    let mut out = table_writer(path)?;
    csv::write_row(&mut out, &header)?;
    for summary in summaries {
        let mut row = context_cells(summary.context.fields());
        row.push(summary.aoi.clone());
        row.push(summary.rows.to_string());
        row.push(summary.total_duration_ms.to_string());
        row.push(summary.first_start_ms.to_string());
        row.push(summary.last_stop_ms.to_string());
        csv::write_row(&mut out, &row)?;
    }
    out.flush()?;
    Ok(())
}

/// Verbatim partition dump: the records as loaded, derived stop included.
fn write_records(path: &Path, records: &[GazeRecord]) -> Result<(), WorksheetError> {
    let extra = payload_columns(records.iter().map(|r| &r.payload));

    let mut header: Vec<String> = CONTEXT_COLUMNS.iter().map(|c| (*c).to_string()).collect();
    header.extend([AOI_COLUMN, START_COLUMN, STOP_COLUMN, DURATION_COLUMN].map(String::from));
    header.extend(extra.iter().cloned());

    let mut out = table_writer(path)?;
    csv::write_row(&mut out, &header)?;
    for record in records {
        let mut row = context_cells(record.context.fields());
        row.push(record.aoi.clone().unwrap_or_default());
        row.push(record.start_ms.to_string());
        row.push(record.stop_ms().to_string());
        row.push(record.duration_ms.to_string());
        for column in &extra {
            row.push(render(record.payload.get(column)));
        }
        csv::write_row(&mut out, &row)?;
    }
    out.flush()?;
    Ok(())
}
