//! Run construction: merging time-contiguous, same-AOI short records.

use std::collections::BTreeMap;

use crate::config::AggregateConfig;
use crate::error::{AggregateError, ContextFailure};
use crate::record::{ContextKey, GazeRecord, Run};

/// Accumulator for the run currently being grown. Sealed into a [`Run`] the
/// moment continuity breaks or input ends.
#[derive(Debug)]
struct OpenRun {
    context: ContextKey,
    aoi: Option<String>,
    start_ms: i64,
    stop_ms: i64,
    duration_ms: i64,
    members: Vec<GazeRecord>,
}

impl OpenRun {
    fn open(record: GazeRecord) -> Self {
        Self {
            context: record.context.clone(),
            aoi: record.aoi.clone(),
            start_ms: record.start_ms,
            stop_ms: record.stop_ms(),
            duration_ms: record.duration_ms,
            members: vec![record],
        }
    }

    /// Whether `record` continues this run: same non-empty label, and its
    /// start hits the current stop exactly or exactly one step beyond it.
    /// Overlap, a larger gap, or a start regression all force a boundary.
    /// An unlabeled record never continues anything, not even another
    /// unlabeled record.
    fn continues(&self, record: &GazeRecord, step_ms: i64) -> bool {
        let same_label = matches!((&self.aoi, &record.aoi), (Some(a), Some(b)) if a == b);
        same_label
            && (record.start_ms == self.stop_ms || record.start_ms == self.stop_ms + step_ms)
    }

    fn extend(&mut self, record: GazeRecord) {
        self.stop_ms = record.stop_ms();
        self.duration_ms += record.duration_ms;
        self.members.push(record);
    }

    fn seal(self) -> Run {
        let payload = self
            .members
            .first()
            .map(|m| m.payload.clone())
            .unwrap_or_default();
        Run {
            context: self.context,
            aoi: self.aoi,
            start_ms: self.start_ms,
            stop_ms: self.stop_ms,
            duration_ms: self.duration_ms,
            count: u32::try_from(self.members.len()).unwrap_or(u32::MAX),
            members: self.members,
            payload,
        }
    }
}

/// Builds sealed runs from the short partition, each context independently.
///
/// A failing context is reported in the second return value and contributes
/// no runs; other contexts are unaffected. Runs come back ordered by
/// `(context, start)`.
#[must_use]
pub fn build_runs(
    short: Vec<GazeRecord>,
    config: &AggregateConfig,
) -> (Vec<Run>, Vec<ContextFailure>) {
    let mut by_context: BTreeMap<ContextKey, Vec<GazeRecord>> = BTreeMap::new();
    for record in short {
        by_context
            .entry(record.context.clone())
            .or_default()
            .push(record);
    }

    let mut runs = Vec::new();
    let mut failures = Vec::new();
    for (context, records) in by_context {
        match build_context_runs(records, config) {
            Ok(mut context_runs) => runs.append(&mut context_runs),
            Err(error) => failures.push(ContextFailure { context, error }),
        }
    }
    (runs, failures)
}

/// Run construction for a single context: sort-or-validate, then a fold with
/// an explicit open-run accumulator.
fn build_context_runs(
    mut records: Vec<GazeRecord>,
    config: &AggregateConfig,
) -> Result<Vec<Run>, AggregateError> {
    if let Some(bad) = records.iter().find(|r| r.duration_ms < 0) {
        return Err(AggregateError::MalformedRecord {
            row: bad.row,
            reason: format!("negative duration {}ms", bad.duration_ms),
        });
    }

    if config.auto_sort {
        // Stable sort: equal (start, stop) pairs keep their input order.
        records.sort_by_key(|r| (r.start_ms, r.stop_ms()));
    } else {
        validate_order(&records)?;
    }

    let mut runs = Vec::new();
    let mut open: Option<OpenRun> = None;
    for record in records {
        match open.take() {
            Some(mut current) if current.continues(&record, config.continuity_step_ms) => {
                current.extend(record);
                open = Some(current);
            }
            Some(current) => {
                runs.push(current.seal());
                open = Some(OpenRun::open(record));
            }
            None => open = Some(OpenRun::open(record)),
        }
    }
    if let Some(current) = open {
        runs.push(current.seal());
    }
    Ok(runs)
}

/// With sorting disabled the input order is load-bearing: starts must be
/// non-decreasing, and equal starts must agree on the label (otherwise the
/// run boundary would depend on incidental row order).
fn validate_order(records: &[GazeRecord]) -> Result<(), AggregateError> {
    for pair in records.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.start_ms < prev.start_ms {
            return Err(AggregateError::UnsortedInput {
                row: next.row,
                reason: format!(
                    "start {}ms precedes previous start {}ms",
                    next.start_ms, prev.start_ms
                ),
            });
        }
        if next.start_ms == prev.start_ms && next.aoi != prev.aoi {
            return Err(AggregateError::UnsortedInput {
                row: next.row,
                reason: format!("duplicate start {}ms with conflicting AOI labels", next.start_ms),
            });
        }
    }
    Ok(())
}
