//! End-to-end tests for the batch processing flow.
//!
//! Drives the built binary over a temp directory: worksheet in, table
//! directory out.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn aoi_binary() -> String {
    env!("CARGO_BIN_EXE_aoi").to_string()
}

const SHEET: &str = "\
Recording,Participant,Position,TOI,Interval,Event_type,Validity,AOI,Start,Stop,Duration,EventIndex
rec1,P01,sitting,full,1,Fixation,Whole,Face,0,10,10,1
rec1,P01,sitting,full,1,Fixation,Whole,Face,10,20,10,2
rec1,P01,sitting,full,1,Fixation,Whole,Hands,20,50,30,3
rec1,P01,sitting,full,1,Fixation,Whole,Face,80,100,20,4
";

fn write_sheet(dir: &Path, name: &str) {
    fs::write(dir.join(name), SHEET).unwrap();
}

fn run_process(home: &Path, input: &Path, output: &Path) -> std::process::Output {
    Command::new(aoi_binary())
        .env("HOME", home)
        .arg("process")
        .arg("--input")
        .arg(input)
        .arg("--output")
        .arg(output)
        .output()
        .expect("failed to run aoi process")
}

#[test]
fn process_writes_one_table_directory_per_worksheet() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("sheets");
    let output = temp.path().join("out");
    fs::create_dir_all(&input).unwrap();
    write_sheet(&input, "session1.csv");
    write_sheet(&input, "session2.csv");

    let result = run_process(temp.path(), &input, &output);
    assert!(
        result.status.success(),
        "process should succeed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    for stem in ["session1", "session2"] {
        let table_dir = output.join(format!("{stem}_aggregated"));
        for table in [
            "Timeline_Combined.csv",
            "MergedRuns.csv",
            "AOI_Summary.csv",
            "AOI_ByGroup.csv",
            "Raw_Short.csv",
            "Raw_Long.csv",
        ] {
            assert!(table_dir.join(table).exists(), "missing {stem}/{table}");
        }
    }

    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("processed 2/2 worksheets"));
}

#[test]
fn merged_runs_reflect_continuity_rules() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("sheets");
    let output = temp.path().join("out");
    fs::create_dir_all(&input).unwrap();
    write_sheet(&input, "session1.csv");

    let result = run_process(temp.path(), &input, &output);
    assert!(result.status.success());

    let merged =
        fs::read_to_string(output.join("session1_aggregated").join("MergedRuns.csv")).unwrap();
    let lines: Vec<_> = merged.lines().collect();

    // Two Face runs: rows 2-3 merge by abutment; the Face sample at 80 is
    // past any tolerated gap and seals alone. The 30ms Hands row is long and
    // never becomes a run.
    assert_eq!(lines.len(), 3, "expected header + 2 runs:\n{merged}");
    assert!(lines[1].contains("Face,0,20,20,2"));
    assert!(lines[2].contains("Face,80,100,20,1"));
    assert!(!merged.contains("Hands"));
}

#[test]
fn timeline_keeps_long_rows_verbatim() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("sheets");
    let output = temp.path().join("out");
    fs::create_dir_all(&input).unwrap();
    write_sheet(&input, "session1.csv");

    let result = run_process(temp.path(), &input, &output);
    assert!(result.status.success());

    let timeline =
        fs::read_to_string(output.join("session1_aggregated").join("Timeline_Combined.csv"))
            .unwrap();
    assert!(timeline.contains("Hands,20,50,30,,raw"));
}

#[test]
fn lock_files_are_ignored() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("sheets");
    let output = temp.path().join("out");
    fs::create_dir_all(&input).unwrap();
    write_sheet(&input, "session1.csv");
    fs::write(input.join("~$session1.csv"), "garbage").unwrap();

    let result = run_process(temp.path(), &input, &output);
    assert!(result.status.success());
    assert!(String::from_utf8_lossy(&result.stdout).contains("processed 1/1 worksheets"));
}

#[test]
fn empty_input_directory_fails() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("sheets");
    let output = temp.path().join("out");
    fs::create_dir_all(&input).unwrap();

    let result = run_process(temp.path(), &input, &output);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("no .csv worksheets"));
}

#[test]
fn malformed_worksheet_is_skipped_but_batch_continues() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("sheets");
    let output = temp.path().join("out");
    fs::create_dir_all(&input).unwrap();
    write_sheet(&input, "good.csv");
    fs::write(
        input.join("bad.csv"),
        "Recording,Participant,Position,TOI,Interval,Event_type,Validity,AOI,Start,Stop,Duration\n\
         rec1,P01,sitting,full,1,Fixation,Whole,Face,oops,,10\n",
    )
    .unwrap();

    let result = run_process(temp.path(), &input, &output);
    assert!(result.status.success());
    assert!(String::from_utf8_lossy(&result.stdout).contains("processed 1/2 worksheets"));
    assert!(output.join("good_aggregated").exists());
    assert!(!output.join("bad_aggregated").exists());
}

#[test]
fn report_prints_per_aoi_totals() {
    let temp = TempDir::new().unwrap();
    let sheet = temp.path().join("session1.csv");
    fs::write(&sheet, SHEET).unwrap();

    let result = Command::new(aoi_binary())
        .env("HOME", temp.path())
        .arg("report")
        .arg(&sheet)
        .output()
        .expect("failed to run aoi report");

    assert!(
        result.status.success(),
        "report should succeed: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    let stdout = String::from_utf8_lossy(&result.stdout);
    // Face: 10+10+20 = 40ms across both runs; long Hands row excluded.
    assert!(stdout.contains("Face"));
    assert!(stdout.contains("40ms"));
    assert!(!stdout.contains("Hands"));
}

#[test]
fn report_json_is_machine_readable() {
    let temp = TempDir::new().unwrap();
    let sheet = temp.path().join("session1.csv");
    fs::write(&sheet, SHEET).unwrap();

    let result = Command::new(aoi_binary())
        .env("HOME", temp.path())
        .arg("report")
        .arg(&sheet)
        .arg("--json")
        .output()
        .expect("failed to run aoi report --json");

    assert!(result.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&result.stdout).expect("stdout should be JSON");
    let summaries = parsed.as_array().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0]["aoi"], "Face");
    assert_eq!(summaries[0]["total_duration_ms"], 40);
}
