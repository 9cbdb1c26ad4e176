//! Aggregation tuning knobs.

use serde::{Deserialize, Serialize};

/// Configuration for the short/long split and the continuity test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateConfig {
    /// Records with `duration_ms` at or below this are eligible for merging.
    /// Default: 20.
    pub duration_threshold_ms: i64,

    /// Fallback gap tolerated as contiguous, compensating for the fixed
    /// timestamp granularity of the source. Default: 20.
    pub continuity_step_ms: i64,

    /// Whether long pass-through records count toward the AOI summaries.
    /// Default: false.
    pub include_raw_in_summary: bool,

    /// Sort each context's records by `(start, stop)` before run building.
    /// When disabled, out-of-order input is an error instead. Default: true.
    pub auto_sort: bool,

    /// Treat an empty record set as an error rather than an empty result.
    /// Default: false.
    pub strict_empty: bool,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            duration_threshold_ms: 20,
            continuity_step_ms: 20,
            include_raw_in_summary: false,
            auto_sort: true,
            strict_empty: false,
        }
    }
}
