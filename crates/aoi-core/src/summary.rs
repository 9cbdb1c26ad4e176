//! Per-AOI and per-group totals over sealed runs.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::AggregateConfig;
use crate::record::{ContextKey, GazeRecord, Run};

/// Overall totals for one AOI across all contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AoiSummary {
    pub aoi: String,
    /// Number of merged source records (not number of runs).
    pub rows: u32,
    pub total_duration_ms: i64,
    pub first_start_ms: i64,
    pub last_stop_ms: i64,
}

/// Totals for one `(context, AOI)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub context: ContextKey,
    pub aoi: String,
    pub rows: u32,
    pub total_duration_ms: i64,
    pub first_start_ms: i64,
    pub last_stop_ms: i64,
}

#[derive(Debug, Clone, Copy)]
struct Totals {
    rows: u32,
    duration_ms: i64,
    first_start_ms: i64,
    last_stop_ms: i64,
}

impl Totals {
    const fn new(rows: u32, duration_ms: i64, start_ms: i64, stop_ms: i64) -> Self {
        Self {
            rows,
            duration_ms,
            first_start_ms: start_ms,
            last_stop_ms: stop_ms,
        }
    }

    fn absorb(&mut self, rows: u32, duration_ms: i64, start_ms: i64, stop_ms: i64) {
        self.rows += rows;
        self.duration_ms += duration_ms;
        self.first_start_ms = self.first_start_ms.min(start_ms);
        self.last_stop_ms = self.last_stop_ms.max(stop_ms);
    }
}

/// Computes the overall per-AOI summary and the per-`(context, AOI)`
/// breakdown from sealed runs. Long records participate only when
/// `include_raw_in_summary` is set, counting one row each. Unlabeled runs are
/// excluded from both summaries (they still appear in the timeline and
/// merged-run tables).
///
/// Materialized order is fixed: overall rows by descending total duration
/// then AOI; grouped rows by context, then descending total duration, then
/// AOI.
#[must_use]
pub fn summarize(
    runs: &[Run],
    long: &[GazeRecord],
    config: &AggregateConfig,
) -> (Vec<AoiSummary>, Vec<GroupSummary>) {
    let mut overall: BTreeMap<String, Totals> = BTreeMap::new();
    let mut grouped: BTreeMap<(ContextKey, String), Totals> = BTreeMap::new();

    let mut absorb = |context: &ContextKey, aoi: &str, rows: u32, duration: i64, start: i64, stop: i64| {
        overall
            .entry(aoi.to_string())
            .and_modify(|t| t.absorb(rows, duration, start, stop))
            .or_insert_with(|| Totals::new(rows, duration, start, stop));
        grouped
            .entry((context.clone(), aoi.to_string()))
            .and_modify(|t| t.absorb(rows, duration, start, stop))
            .or_insert_with(|| Totals::new(rows, duration, start, stop));
    };

    for run in runs {
        if let Some(aoi) = &run.aoi {
            absorb(
                &run.context,
                aoi,
                run.count,
                run.duration_ms,
                run.start_ms,
                run.stop_ms,
            );
        }
    }

    if config.include_raw_in_summary {
        for record in long {
            if let Some(aoi) = &record.aoi {
                absorb(
                    &record.context,
                    aoi,
                    1,
                    record.duration_ms,
                    record.start_ms,
                    record.stop_ms(),
                );
            }
        }
    }

    let mut aoi_summary: Vec<AoiSummary> = overall
        .into_iter()
        .map(|(aoi, t)| AoiSummary {
            aoi,
            rows: t.rows,
            total_duration_ms: t.duration_ms,
            first_start_ms: t.first_start_ms,
            last_stop_ms: t.last_stop_ms,
        })
        .collect();
    aoi_summary.sort_by(|a, b| {
        b.total_duration_ms
            .cmp(&a.total_duration_ms)
            .then_with(|| a.aoi.cmp(&b.aoi))
    });

    let mut aoi_by_group: Vec<GroupSummary> = grouped
        .into_iter()
        .map(|((context, aoi), t)| GroupSummary {
            context,
            aoi,
            rows: t.rows,
            total_duration_ms: t.duration_ms,
            first_start_ms: t.first_start_ms,
            last_stop_ms: t.last_stop_ms,
        })
        .collect();
    aoi_by_group.sort_by(|a, b| {
        a.context
            .cmp(&b.context)
            .then_with(|| b.total_duration_ms.cmp(&a.total_duration_ms))
            .then_with(|| a.aoi.cmp(&b.aoi))
    });

    (aoi_summary, aoi_by_group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::partition_by_duration;
    use crate::runs::build_runs;

    fn ctx(recording: &str) -> ContextKey {
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

    fn rec(recording: &str, aoi: Option<&str>, start_ms: i64, duration_ms: i64) -> GazeRecord {
        GazeRecord {
            context: ctx(recording),
            aoi: aoi.map(String::from),
            start_ms,
            duration_ms,
            row: 0,
            payload: serde_json::Map::new(),
        }
    }

    fn summaries(
        records: Vec<GazeRecord>,
        config: &AggregateConfig,
    ) -> (Vec<AoiSummary>, Vec<GroupSummary>) {
        let partition = partition_by_duration(records, config.duration_threshold_ms);
        let (runs, failures) = build_runs(partition.short, config);
        assert!(failures.is_empty());
        summarize(&runs, &partition.long, config)
    }

    #[test]
    fn totals_match_run_durations_per_aoi() {
        let config = AggregateConfig::default();
        let (overall, _) = summaries(
            vec![
                rec("rec1", Some("A"), 0, 10),
                rec("rec1", Some("A"), 10, 10),
                rec("rec1", Some("B"), 30, 5),
                rec("rec2", Some("A"), 0, 20),
            ],
            &config,
        );

        assert_eq!(overall.len(), 2);
        // A: 10+10 in rec1 plus 20 in rec2.
        assert_eq!(overall[0].aoi, "A");
        assert_eq!(overall[0].total_duration_ms, 40);
        assert_eq!(overall[0].rows, 3);
        assert_eq!(overall[1].aoi, "B");
        assert_eq!(overall[1].total_duration_ms, 5);
    }

    #[test]
    fn overall_ordering_is_descending_duration_then_aoi() {
        let config = AggregateConfig::default();
        let (overall, _) = summaries(
            vec![
                rec("rec1", Some("C"), 0, 10),
                rec("rec1", Some("A"), 20, 10),
                rec("rec1", Some("B"), 40, 15),
            ],
            &config,
        );

        let order: Vec<_> = overall.iter().map(|s| s.aoi.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
    }

    #[test]
    fn grouped_rows_are_per_context_and_aoi() {
        let config = AggregateConfig::default();
        let (_, grouped) = summaries(
            vec![
                rec("rec1", Some("A"), 0, 10),
                rec("rec2", Some("A"), 0, 10),
                rec("rec2", Some("B"), 20, 15),
            ],
            &config,
        );

        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0].context, ctx("rec1"));
        // Within rec2: B (15ms) outranks A (10ms).
        assert_eq!(grouped[1].context, ctx("rec2"));
        assert_eq!(grouped[1].aoi, "B");
        assert_eq!(grouped[2].aoi, "A");
    }

    #[test]
    fn long_records_excluded_by_default() {
        let config = AggregateConfig::default();
        let (overall, _) = summaries(
            vec![rec("rec1", Some("A"), 0, 10), rec("rec1", Some("A"), 10, 25)],
            &config,
        );

        assert_eq!(overall.len(), 1);
        assert_eq!(overall[0].total_duration_ms, 10);
        assert_eq!(overall[0].rows, 1);
    }

    #[test]
    fn long_records_counted_when_configured() {
        let config = AggregateConfig {
            include_raw_in_summary: true,
            ..AggregateConfig::default()
        };
        let (overall, _) = summaries(
            vec![rec("rec1", Some("A"), 0, 10), rec("rec1", Some("A"), 10, 25)],
            &config,
        );

        assert_eq!(overall[0].total_duration_ms, 35);
        assert_eq!(overall[0].rows, 2);
        assert_eq!(overall[0].last_stop_ms, 35);
    }

    #[test]
    fn unlabeled_runs_are_excluded() {
        let config = AggregateConfig::default();
        let (overall, grouped) = summaries(
            vec![rec("rec1", None, 0, 10), rec("rec1", Some("A"), 20, 10)],
            &config,
        );

        assert_eq!(overall.len(), 1);
        assert_eq!(overall[0].aoi, "A");
        assert_eq!(grouped.len(), 1);
    }

    #[test]
    fn first_start_and_last_stop_span_all_runs() {
        let config = AggregateConfig::default();
        let (overall, _) = summaries(
            vec![
                rec("rec1", Some("A"), 100, 10),
                rec("rec1", Some("A"), 0, 10),
                rec("rec2", Some("A"), 300, 10),
            ],
            &config,
        );

        assert_eq!(overall[0].first_start_ms, 0);
        assert_eq!(overall[0].last_stop_ms, 310);
    }
}
