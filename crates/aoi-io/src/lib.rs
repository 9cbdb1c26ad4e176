//! Worksheet adapters for the AOI aggregation core.
//!
//! Thin I/O layer: a CSV worksheet loader producing [`aoi_core::GazeRecord`]s
//! and a table writer persisting the aggregation results. No algorithmic
//! content lives here.

mod csv;
mod error;
mod reader;
mod writer;

pub use error::WorksheetError;
pub use reader::{
    AOI_COLUMN, CONTEXT_COLUMNS, DURATION_COLUMN, START_COLUMN, STOP_COLUMN, parse_worksheet,
    read_worksheet,
};
pub use writer::{
    AOI_BY_GROUP_TABLE, AOI_SUMMARY_TABLE, MERGED_RUNS_TABLE, RAW_LONG_TABLE, RAW_SHORT_TABLE,
    TIMELINE_TABLE, write_tables,
};
