//! The full batch transform: partition, build runs, combine, summarize.

use std::collections::HashSet;

use crate::classify::{Partition, partition_by_duration};
use crate::config::AggregateConfig;
use crate::error::{AggregateError, ContextFailure};
use crate::record::{ContextKey, GazeRecord, Run};
use crate::runs::build_runs;
use crate::summary::{AoiSummary, GroupSummary, summarize};
use crate::timeline::{TimelineEntry, combine_timeline};

/// Everything the transform produces for one record batch.
///
/// `short` and `long` are the verbatim partitions, kept for the debug tables.
/// `failures` lists contexts that could not be processed; their records
/// appear in the partitions but nowhere else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub runs: Vec<Run>,
    pub timeline: Vec<TimelineEntry>,
    pub aoi_summary: Vec<AoiSummary>,
    pub aoi_by_group: Vec<GroupSummary>,
    pub short: Vec<GazeRecord>,
    pub long: Vec<GazeRecord>,
    pub failures: Vec<ContextFailure>,
}

/// Runs the whole transform over an in-memory record batch.
///
/// Pure and synchronous: no I/O, no shared state across invocations. One
/// context's malformed data does not block the others; its failure is
/// reported in [`Aggregation::failures`] and its records are withheld from
/// the timeline and summaries.
///
/// An empty batch yields an empty result, or [`AggregateError::EmptyInput`]
/// under `strict_empty`.
pub fn aggregate(
    records: Vec<GazeRecord>,
    config: &AggregateConfig,
) -> Result<Aggregation, AggregateError> {
    if records.is_empty() {
        if config.strict_empty {
            return Err(AggregateError::EmptyInput);
        }
        tracing::debug!("empty record batch");
        return Ok(Aggregation::default());
    }

    let Partition { short, long } = partition_by_duration(records, config.duration_threshold_ms);
    tracing::debug!(
        short = short.len(),
        long = long.len(),
        threshold_ms = config.duration_threshold_ms,
        "partitioned records"
    );

    let (runs, failures) = build_runs(short.clone(), config);
    for failure in &failures {
        tracing::warn!(context = %failure.context, error = %failure.error, "context failed run construction");
    }

    let failed: HashSet<&ContextKey> = failures.iter().map(|f| &f.context).collect();
    let usable_long: Vec<GazeRecord> = long
        .iter()
        .filter(|r| !failed.contains(&r.context))
        .cloned()
        .collect();

    let timeline = combine_timeline(&runs, &usable_long);
    let (aoi_summary, aoi_by_group) = summarize(&runs, &usable_long, config);

    tracing::debug!(runs = runs.len(), timeline = timeline.len(), "aggregation complete");

    Ok(Aggregation {
        runs,
        timeline,
        aoi_summary,
        aoi_by_group,
        short,
        long,
        failures,
    })
}
