use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub rule_id: String,
    pub rule_name: String,
    pub description: String,
    pub extra: Option<String>,
}

impl Violation {
    /// Writes `file:line:col: id: description [extra] (name)` with `id`
    /// standing in for the rule id, so callers can decorate it.
    pub fn write_line(&self, out: &mut impl fmt::Write, id: &dyn fmt::Display) -> fmt::Result {
        write!(
            out,
            "{}:{}:{}: {}: {}",
            self.file.display(),
            self.line,
            self.column,
            id,
            self.description
        )?;
        if let Some(extra) = &self.extra {
            write!(out, " [{extra}]")?;
        }
        write!(out, " ({})", self.rule_name)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_line(f, &self.rule_id)
    }
}

/// A directive comment that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PragmaFailure {
    pub file: PathBuf,
    pub line: usize,
    pub message: String,
}

impl fmt::Display for PragmaFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:1: INLINE: {}",
            self.file.display(),
            self.line,
            self.message
        )
    }
}

/// Result of one completed file scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileOutcome {
    pub file: PathBuf,
    pub line_count: usize,
    pub violations: Vec<Violation>,
    pub pragma_failures: Vec<PragmaFailure>,
}

/// A file whose scan was abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub file: PathBuf,
    pub message: String,
    /// The structured error, shown with `--stack-trace`.
    #[serde(skip)]
    pub detail: String,
}

impl ScanFailure {
    pub fn new<E: fmt::Display + fmt::Debug>(file: PathBuf, error: E) -> Self {
        Self {
            file,
            message: error.to_string(),
            detail: format!("{error:#?}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub files_scanned: usize,
    pub violations: Vec<Violation>,
    pub pragma_failures: Vec<PragmaFailure>,
    pub scan_failures: Vec<ScanFailure>,
    pub files_with_violations: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: FileOutcome) {
        self.files_scanned += 1;
        if !outcome.violations.is_empty() {
            self.files_with_violations += 1;
        }
        self.violations.extend(outcome.violations);
        self.pragma_failures.extend(outcome.pragma_failures);
    }

    pub fn record_failure(&mut self, failure: ScanFailure) {
        self.files_scanned += 1;
        self.scan_failures.push(failure);
    }

    /// Files that either reported a violation or could not be scanned.
    pub fn failed_file_count(&self) -> usize {
        self.files_with_violations + self.scan_failures.len()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_file_count() > 0
    }
}
