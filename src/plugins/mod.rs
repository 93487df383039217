pub mod manager;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::engine::pragma::DocumentPragmas;
use crate::parser::types::Token;
use crate::types::Violation;

pub use manager::{BadPluginError, FoundPlugin, PluginManager};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDetails {
    pub plugin_id: String,
    pub plugin_name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub enabled_by_default: bool,
    pub version: String,
}

/// A rule failing while handling an event. Fatal to the file being scanned.
#[derive(Debug, Error)]
#[error("Plugin id '{plugin_id}' had a critical failure during the '{hook}' action: {message}")]
pub struct PluginError {
    pub plugin_id: String,
    pub hook: &'static str,
    pub message: String,
}

/// A lint rule. Every hook is optional; the registry drives them in order:
/// `starting_new_file`, `next_line` for each physical line, `next_token` for
/// each token, then `completed_file`.
pub trait Plugin: Send {
    fn details(&self) -> PluginDetails;

    fn starting_new_file(&mut self) {}

    fn next_line(
        &mut self,
        _ctx: &mut RuleContext<'_>,
        _line_number: usize,
        _line: &str,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn next_token(&mut self, _ctx: &mut RuleContext<'_>, _token: &Token) -> anyhow::Result<()> {
        Ok(())
    }

    fn completed_file(&mut self, _ctx: &mut RuleContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A violation raised by a rule before suppression is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingReport {
    pub plugin_index: usize,
    pub line: usize,
    pub column: usize,
    pub extra: Option<String>,
}

/// Per-file state shared by every rule while one document is scanned.
#[derive(Debug)]
pub struct ScanContext {
    file: PathBuf,
    document_pragmas: DocumentPragmas,
    pending: Vec<PendingReport>,
    line_count: usize,
}

impl ScanContext {
    pub(crate) fn new(file: &Path) -> Self {
        Self {
            file: file.to_path_buf(),
            document_pragmas: DocumentPragmas::new(),
            pending: Vec::new(),
            line_count: 0,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn document_pragmas(&self) -> &DocumentPragmas {
        &self.document_pragmas
    }

    pub(crate) fn set_document_pragmas(&mut self, document_pragmas: DocumentPragmas) {
        self.document_pragmas = document_pragmas;
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub(crate) fn set_line_count(&mut self, line_count: usize) {
        self.line_count = line_count;
    }

    pub fn is_suppressed(&self, line: usize, plugin_id: &str) -> bool {
        self.document_pragmas
            .get(&line)
            .is_some_and(|ids| ids.contains(plugin_id))
    }

    pub(crate) fn take_pending(&mut self) -> Vec<PendingReport> {
        std::mem::take(&mut self.pending)
    }
}

/// The view of a [`ScanContext`] handed to one rule for one hook call.
pub struct RuleContext<'a> {
    scan: &'a mut ScanContext,
    plugin_index: usize,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(scan: &'a mut ScanContext, plugin_index: usize) -> Self {
        Self { scan, plugin_index }
    }

    pub fn file(&self) -> &Path {
        self.scan.file()
    }

    pub fn line_count(&self) -> usize {
        self.scan.line_count()
    }

    pub fn report_line_error(&mut self, line: usize, column: usize, extra: Option<String>) {
        self.scan.pending.push(PendingReport {
            plugin_index: self.plugin_index,
            line,
            column,
            extra,
        });
    }

    pub fn report_token_error(&mut self, token: &Token, extra: Option<String>) {
        self.report_line_error(token.line_number(), token.column_number(), extra);
    }
}

pub(crate) fn finalize_reports(
    scan: &ScanContext,
    plugins: &[FoundPlugin],
    pending: Vec<PendingReport>,
) -> Vec<Violation> {
    let mut violations: Vec<Violation> = pending
        .into_iter()
        .filter_map(|report| {
            let plugin = plugins.get(report.plugin_index)?;
            let details = plugin.details();
            if scan.is_suppressed(report.line, &details.plugin_id) {
                tracing::debug!(
                    line = report.line,
                    plugin = %details.plugin_id,
                    "violation suppressed"
                );
                return None;
            }
            Some(Violation {
                file: scan.file().to_path_buf(),
                line: report.line,
                column: report.column,
                rule_id: details.plugin_id.clone(),
                rule_name: details.plugin_name.clone(),
                description: details.description.clone(),
                extra: report.extra,
            })
        })
        .collect();
    violations.sort_by(|a, b| (a.line, a.column, &a.rule_id).cmp(&(b.line, b.column, &b.rule_id)));
    violations
}
