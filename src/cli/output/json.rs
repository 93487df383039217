use serde::Serialize;

use crate::types::{PragmaFailure, RunSummary, ScanFailure, Violation};

#[derive(Serialize)]
struct JsonOutput<'a> {
    violations: &'a [Violation],
    pragma_failures: &'a [PragmaFailure],
    scan_failures: &'a [ScanFailure],
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonSummary {
    files_scanned: usize,
    violations: usize,
    pragma_failures: usize,
    failed_files: usize,
}

fn build_output(summary: &RunSummary) -> JsonOutput<'_> {
    JsonOutput {
        violations: &summary.violations,
        pragma_failures: &summary.pragma_failures,
        scan_failures: &summary.scan_failures,
        summary: JsonSummary {
            files_scanned: summary.files_scanned,
            violations: summary.violations.len(),
            pragma_failures: summary.pragma_failures.len(),
            failed_files: summary.failed_file_count(),
        },
    }
}

pub fn render(summary: &RunSummary) {
    let output = build_output(summary);
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize results: {e}"),
    }
}
