//! Core aggregation logic for AOI-labeled gaze records.
//!
//! This crate contains the pure, I/O-free pipeline:
//! - Classification: short/long partition by duration threshold
//! - Run construction: merging contiguous same-AOI short records
//! - Timeline: chronological merge of runs and pass-through records
//! - Summaries: per-AOI and per-`(context, AOI)` totals

mod aggregate;
mod classify;
mod config;
mod error;
mod record;
mod runs;
mod summary;
mod timeline;

pub use aggregate::{Aggregation, aggregate};
pub use classify::{Partition, partition_by_duration};
pub use config::AggregateConfig;
pub use error::{AggregateError, ContextFailure};
pub use record::{ContextKey, GazeRecord, Run};
pub use runs::build_runs;
pub use summary::{AoiSummary, GroupSummary, summarize};
pub use timeline::{TimelineEntry, TimelineSource, combine_timeline};
