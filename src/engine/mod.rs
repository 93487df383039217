pub mod pipeline;
pub mod pragma;
pub mod scanner;

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::PathBuf;

use crate::config::Config;
use crate::parser::source::FileSourceProvider;
use crate::parser::MarkdownTokenizer;
use crate::plugins::manager::RuleSelection;
use crate::rules;
use crate::types::{RunSummary, ScanFailure};
use pipeline::Scanner;

/// Scans `files` in parallel. Each worker owns its own registry, tokenizer
/// and per-file state; outcomes are folded into the summary in file order.
pub fn run(files: &[PathBuf], config: &Config, selection: &RuleSelection) -> Result<RunSummary> {
    // Registry problems are fatal before any file is touched.
    rules::build_manager(config, selection)
        .context("BadPluginError encountered while loading plugins")?;

    let outcomes: Vec<_> = files
        .par_iter()
        .map_init(
            || {
                rules::build_manager(config, selection).map(|manager| {
                    Scanner::new(manager, MarkdownTokenizer::new(), FileSourceProvider)
                })
            },
            |scanner, file| match scanner {
                Ok(scanner) => scanner
                    .scan_file(file)
                    .map_err(|e| ScanFailure::new(file.clone(), e)),
                Err(e) => Err(ScanFailure::new(file.clone(), e)),
            },
        )
        .collect();

    let mut summary = RunSummary::default();
    for outcome in outcomes {
        match outcome {
            Ok(outcome) => summary.record(outcome),
            Err(failure) => {
                tracing::warn!(file = %failure.file.display(), "scan aborted");
                summary.record_failure(failure);
            }
        }
    }
    Ok(summary)
}
