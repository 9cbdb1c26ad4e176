//! Implementation of the `aoi report` command.
//!
//! Aggregates a single worksheet and prints its per-AOI totals to stdout,
//! either as an aligned text table or as JSON.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use aoi_core::{AoiSummary, aggregate};
use aoi_io::read_worksheet;

use crate::Config;

pub fn run(config: &Config, file: &Path, json: bool) -> Result<()> {
    let records =
        read_worksheet(file).with_context(|| format!("failed to read {}", file.display()))?;
    let aggregation = aggregate(records, &config.aggregate)
        .with_context(|| format!("aggregation failed for {}", file.display()))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&aggregation.aoi_summary)
                .context("failed to serialize summary")?
        );
    } else {
        print!("{}", render_table(&aggregation.aoi_summary));
    }
    Ok(())
}

/// Renders per-AOI totals as an aligned text table.
fn render_table(summaries: &[AoiSummary]) -> String {
    let mut out = String::new();
    if summaries.is_empty() {
        out.push_str("no labeled runs\n");
        return out;
    }

    let width = summaries
        .iter()
        .map(|s| s.aoi.len())
        .max()
        .unwrap_or(0)
        .max("AOI".len());
    let _ = writeln!(out, "{:<width$}  {:>6}  {:>12}", "AOI", "Rows", "Duration");
    for summary in summaries {
        let _ = writeln!(
            out,
            "{:<width$}  {:>6}  {:>12}",
            summary.aoi,
            summary.rows,
            format_millis(summary.total_duration_ms)
        );
    }
    out
}

/// Formats milliseconds: sub-second totals as `NNNms`, larger as `S.mmms`.
fn format_millis(ms: i64) -> String {
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{}.{:03}s", ms / 1000, ms % 1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(aoi: &str, rows: u32, total: i64) -> AoiSummary {
        AoiSummary {
            aoi: aoi.to_string(),
            rows,
            total_duration_ms: total,
            first_start_ms: 0,
            last_stop_ms: total,
        }
    }

    #[test]
    fn format_millis_switches_units_at_one_second() {
        assert_eq!(format_millis(0), "0ms");
        assert_eq!(format_millis(999), "999ms");
        assert_eq!(format_millis(1000), "1.000s");
        assert_eq!(format_millis(12345), "12.345s");
    }

    #[test]
    fn table_lists_every_aoi() {
        let rendered = render_table(&[summary("Face", 12, 1240), summary("Hands", 3, 60)]);
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("AOI"));
        assert!(lines[1].contains("Face"));
        assert!(lines[1].contains("1.240s"));
        assert!(lines[2].contains("Hands"));
        assert!(lines[2].contains("60ms"));
    }

    #[test]
    fn empty_summary_renders_placeholder() {
        assert_eq!(render_table(&[]), "no labeled runs\n");
    }
}
