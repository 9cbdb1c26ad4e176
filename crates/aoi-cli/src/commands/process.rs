//! Implementation of the `aoi process` command.
//!
//! Discovers worksheets in the input directory and writes one directory of
//! result tables per worksheet. Files are independent, so they are processed
//! in parallel; a failing file is logged and skipped without aborting the
//! batch.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;

use aoi_core::aggregate;
use aoi_io::{read_worksheet, write_tables};

use crate::Config;

/// Runs the batch. Returns the number of successfully processed worksheets.
pub fn run(config: &Config, input: Option<&Path>, output: Option<&Path>) -> Result<usize> {
    let input_dir = input.unwrap_or(&config.input_dir);
    let output_dir = output.unwrap_or(&config.output_dir);

    let worksheets = discover_worksheets(input_dir)?;
    if worksheets.is_empty() {
        bail!("no .csv worksheets found in {}", input_dir.display());
    }
    tracing::info!(
        count = worksheets.len(),
        input = %input_dir.display(),
        "processing worksheets"
    );

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;

    let results: Vec<(&PathBuf, Result<()>)> = worksheets
        .par_iter()
        .map(|path| (path, process_worksheet(path, output_dir, config)))
        .collect();

    let mut processed = 0usize;
    for (path, result) in results {
        match result {
            Ok(()) => {
                processed += 1;
                tracing::info!(file = %path.display(), "worksheet processed");
            }
            Err(error) => {
                tracing::warn!(file = %path.display(), error = format!("{error:#}"), "worksheet skipped");
            }
        }
    }
    if processed == 0 {
        bail!("all {} worksheets failed", worksheets.len());
    }

    println!(
        "processed {processed}/{} worksheets into {}",
        worksheets.len(),
        output_dir.display()
    );
    Ok(processed)
}

/// Worksheets are `*.csv` files, sorted by name. Spreadsheet lock files
/// (`~$...`) and dotfiles are skipped.
fn discover_worksheets(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("input directory not found: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with("~$") || name.starts_with('.') {
            continue;
        }
        if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv")) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read, aggregate, write. Per-context failures inside a worksheet are
/// logged by the core and the remaining contexts still produce tables.
fn process_worksheet(path: &Path, output_dir: &Path, config: &Config) -> Result<()> {
    let records =
        read_worksheet(path).with_context(|| format!("failed to read {}", path.display()))?;
    let aggregation = aggregate(records, &config.aggregate)
        .with_context(|| format!("aggregation failed for {}", path.display()))?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("worksheet");
    let table_dir = output_dir.join(format!("{stem}_aggregated"));
    write_tables(&table_dir, &aggregation)
        .with_context(|| format!("failed to write tables to {}", table_dir.display()))?;

    tracing::debug!(
        runs = aggregation.runs.len(),
        skipped_contexts = aggregation.failures.len(),
        "worksheet aggregated"
    );
    Ok(())
}
