use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, debug_span};

use super::pragma::{compile_pragmas, look_for_pragmas, DocumentPragmas, PragmaLines};
use crate::parser::position::PositionTracker;
use crate::parser::source::SourceProvider;
use crate::parser::{TokenizeError, Tokenizer};
use crate::plugins::{PluginError, PluginManager};
use crate::types::{FileOutcome, PragmaFailure};

/// Stage of a single file scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    NotStarted,
    RawScan,
    Tokenizing,
    TokenScan,
    Completed,
    Aborted,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScanPhase::NotStarted => "not started",
            ScanPhase::RawScan => "raw scan",
            ScanPhase::Tokenizing => "tokenizing",
            ScanPhase::TokenScan => "token scan",
            ScanPhase::Completed => "completed",
            ScanPhase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// A file whose scan was aborted. The run moves on to the next file.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("FileAccessError encountered while scanning '{}':\n{source}", file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("BadTokenizationError encountered while scanning '{}':\n{source}", file.display())]
    Tokenization {
        file: PathBuf,
        #[source]
        source: TokenizeError,
    },

    #[error("BadPluginError encountered while scanning '{}':\n{source}", file.display())]
    Plugin {
        file: PathBuf,
        phase: ScanPhase,
        #[source]
        source: PluginError,
    },
}

impl ScanError {
    pub fn file(&self) -> &Path {
        match self {
            ScanError::Io { file, .. }
            | ScanError::Tokenization { file, .. }
            | ScanError::Plugin { file, .. } => file,
        }
    }
}

/// Drives one file at a time through the raw line pass, directive
/// compilation, tokenization and the token pass.
pub struct Scanner<P: SourceProvider, T: Tokenizer> {
    plugins: PluginManager,
    tokenizer: T,
    provider: P,
    phase: ScanPhase,
}

impl<P: SourceProvider, T: Tokenizer> Scanner<P, T> {
    pub fn new(plugins: PluginManager, tokenizer: T, provider: P) -> Self {
        Self {
            plugins,
            tokenizer,
            provider,
            phase: ScanPhase::NotStarted,
        }
    }

    pub fn plugins(&self) -> &PluginManager {
        &self.plugins
    }

    /// Phase the most recent scan finished in.
    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn number_of_scan_failures(&self) -> usize {
        self.plugins.number_of_scan_failures()
    }

    pub fn scan_file(&mut self, file: &Path) -> Result<FileOutcome, ScanError> {
        let span = debug_span!("scan_file", file = %file.display());
        let _guard = span.enter();

        self.phase = ScanPhase::NotStarted;
        let result = self.run_phases(file);
        self.phase = match result {
            Ok(_) => ScanPhase::Completed,
            Err(_) => ScanPhase::Aborted,
        };
        result
    }

    fn run_phases(&mut self, file: &Path) -> Result<FileOutcome, ScanError> {
        let mut source = self.provider.open(file).map_err(|source| ScanError::Io {
            file: file.to_path_buf(),
            source,
        })?;
        let mut context = self.plugins.starting_new_file(file);

        self.phase = ScanPhase::RawScan;
        let mut tracker = PositionTracker::new();
        let mut pragma_lines = PragmaLines::default();
        let mut line_count = 0;
        while let Some(line) = source.next_line() {
            line_count += 1;
            let marker = tracker.advance(&line);
            look_for_pragmas(
                &marker,
                &line,
                marker.container_depth,
                &marker.extracted_whitespace,
                &mut pragma_lines,
            );
            self.plugins
                .next_line(&mut context, line_count, &line)
                .map_err(|source| self.plugin_error(file, source))?;
        }
        debug!(lines = line_count, pragmas = pragma_lines.len(), "raw scan done");

        let mut pragma_failures = Vec::new();
        let mut document_pragmas = DocumentPragmas::new();
        compile_pragmas(
            file,
            &pragma_lines,
            self.plugins.id_map(),
            &mut document_pragmas,
            |file, line, message| {
                pragma_failures.push(PragmaFailure {
                    file: file.to_path_buf(),
                    line,
                    message,
                })
            },
        );
        context.set_document_pragmas(document_pragmas);

        self.phase = ScanPhase::Tokenizing;
        let mut source = self.provider.open(file).map_err(|source| ScanError::Io {
            file: file.to_path_buf(),
            source,
        })?;
        let tokens = self
            .tokenizer
            .tokenize(source.as_mut())
            .map_err(|source| ScanError::Tokenization {
                file: file.to_path_buf(),
                source,
            })?;

        self.phase = ScanPhase::TokenScan;
        for token in &tokens {
            self.plugins
                .next_token(&mut context, token)
                .map_err(|source| self.plugin_error(file, source))?;
        }

        let violations = self
            .plugins
            .completed_file(&mut context, line_count)
            .map_err(|source| self.plugin_error(file, source))?;
        debug!(violations = violations.len(), "scan completed");

        Ok(FileOutcome {
            file: file.to_path_buf(),
            line_count,
            violations,
            pragma_failures,
        })
    }

    fn plugin_error(&self, file: &Path, source: PluginError) -> ScanError {
        ScanError::Plugin {
            file: file.to_path_buf(),
            phase: self.phase,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::source::{LineSource, MemorySourceProvider};
    use crate::parser::types::{Token, TokenKind};
    use crate::parser::MarkdownTokenizer;
    use crate::plugins::{Plugin, PluginDetails, RuleContext};
    use std::sync::{Arc, Mutex};

    /// Flags every line containing "bad", and records what it was shown.
    struct RuleX {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl Plugin for RuleX {
        fn details(&self) -> PluginDetails {
            PluginDetails {
                plugin_id: "rule-x".to_string(),
                plugin_name: "rule-x".to_string(),
                aliases: vec!["rx".to_string()],
                description: "Lines must not be bad".to_string(),
                enabled_by_default: true,
                version: "0.1.0".to_string(),
            }
        }

        fn next_line(
            &mut self,
            ctx: &mut RuleContext<'_>,
            line_number: usize,
            line: &str,
        ) -> anyhow::Result<()> {
            self.seen.lock().unwrap().push(format!("line {line_number}"));
            if line.contains("bad") {
                ctx.report_line_error(line_number, 1, None);
            }
            Ok(())
        }

        fn next_token(&mut self, ctx: &mut RuleContext<'_>, token: &Token) -> anyhow::Result<()> {
            self.seen.lock().unwrap().push(token.to_string());
            if token.kind() == TokenKind::Text && token.extra_data() == "explode" {
                anyhow::bail!("token could not be handled");
            }
            if token.kind() == TokenKind::AtxHeading {
                ctx.report_token_error(token, Some("heading".to_string()));
            }
            Ok(())
        }
    }

    struct FailingTokenizer;

    impl Tokenizer for FailingTokenizer {
        fn tokenize(&self, _source: &mut dyn LineSource) -> Result<Vec<Token>, TokenizeError> {
            Err(TokenizeError::NestingTooDeep { line: 2, limit: 1 })
        }
    }

    fn scanner_with(
        content: &str,
    ) -> (
        Scanner<MemorySourceProvider, MarkdownTokenizer>,
        Arc<Mutex<Vec<String>>>,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut manager = PluginManager::new();
        manager
            .register(Box::new(RuleX { seen: seen.clone() }))
            .unwrap();
        let provider = MemorySourceProvider::new().with_document("doc.md", content);
        (
            Scanner::new(manager, MarkdownTokenizer::new(), provider),
            seen,
        )
    }

    #[test]
    fn test_directive_suppresses_next_line_only() {
        let (mut scanner, _) = scanner_with(
            "<!-- pyml disable-next-line rule-x -->\nbad line per rule-x\nbad line per rule-x",
        );
        let outcome = scanner.scan_file(Path::new("doc.md")).unwrap();
        let lines: Vec<usize> = outcome.violations.iter().map(|v| v.line).collect();
        assert_eq!(lines, vec![3]);
        assert!(outcome.pragma_failures.is_empty());
        assert_eq!(scanner.phase(), ScanPhase::Completed);
    }

    #[test]
    fn test_alias_in_directive() {
        let (mut scanner, _) =
            scanner_with("<!--- pyml disable-next-line RX -->\nbad\nbad\n");
        let outcome = scanner.scan_file(Path::new("doc.md")).unwrap();
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].line, 3);
    }

    #[test]
    fn test_unknown_id_reported_once() {
        let (mut scanner, _) =
            scanner_with("<!-- pyml disable-next-line zzz, rule-x -->\nbad\n");
        let outcome = scanner.scan_file(Path::new("doc.md")).unwrap();
        assert_eq!(outcome.pragma_failures.len(), 1);
        assert_eq!(outcome.pragma_failures[0].line, 1);
        assert!(outcome.pragma_failures[0].message.contains("'zzz'"));
        assert!(outcome.violations.is_empty());
    }

    #[test]
    fn test_only_unknown_id_creates_no_suppression() {
        let (mut scanner, _) = scanner_with("<!-- pyml disable-next-line zzz -->\nbad\n");
        let outcome = scanner.scan_file(Path::new("doc.md")).unwrap();
        assert_eq!(outcome.pragma_failures.len(), 1);
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].line, 2);
    }

    #[test]
    fn test_directive_after_reference_still_compiled() {
        let (mut scanner, _) =
            scanner_with("bad\n<!-- pyml disable-next-line rule-x -->\nbad\n");
        let outcome = scanner.scan_file(Path::new("doc.md")).unwrap();
        let lines: Vec<usize> = outcome.violations.iter().map(|v| v.line).collect();
        assert_eq!(lines, vec![1]);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let content = "<!-- pyml disable-next-line nope -->\nbad\n# Head\nbad\n";
        let (mut scanner, _) = scanner_with(content);
        let first = scanner.scan_file(Path::new("doc.md")).unwrap();
        let second = scanner.scan_file(Path::new("doc.md")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_lines_then_tokens_in_order() {
        let (mut scanner, seen) = scanner_with("# Head\n\ntext\n");
        scanner.scan_file(Path::new("doc.md")).unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(&seen[..4], &["line 1", "line 2", "line 3", "line 4"]);
        assert_eq!(seen[4], "[atx:1]");
        assert_eq!(seen.last().map(String::as_str), Some("[end-para:]"));
    }

    #[test]
    fn test_token_report_uses_token_position() {
        let (mut scanner, _) = scanner_with("text\n\n## Head\n");
        let outcome = scanner.scan_file(Path::new("doc.md")).unwrap();
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].line, 3);
        assert_eq!(outcome.violations[0].extra.as_deref(), Some("heading"));
    }

    #[test]
    fn test_tokenizer_failure_aborts_file() {
        let mut manager = PluginManager::new();
        manager
            .register(Box::new(RuleX {
                seen: Arc::default(),
            }))
            .unwrap();
        let provider = MemorySourceProvider::new().with_document("doc.md", "bad\n");
        let mut scanner = Scanner::new(manager, FailingTokenizer, provider);
        let err = scanner.scan_file(Path::new("doc.md")).unwrap_err();
        assert!(matches!(err, ScanError::Tokenization { .. }));
        assert!(err
            .to_string()
            .starts_with("BadTokenizationError encountered while scanning 'doc.md':\n"));
        assert_eq!(scanner.phase(), ScanPhase::Aborted);
    }

    #[test]
    fn test_plugin_failure_aborts_file() {
        let (mut scanner, _) = scanner_with("explode\n");
        let err = scanner.scan_file(Path::new("doc.md")).unwrap_err();
        match &err {
            ScanError::Plugin { phase, source, .. } => {
                assert_eq!(*phase, ScanPhase::TokenScan);
                assert_eq!(source.plugin_id, "rule-x");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.file(), Path::new("doc.md"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let (mut scanner, _) = scanner_with("");
        let err = scanner.scan_file(Path::new("other.md")).unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
    }

    #[test]
    fn test_failure_count_spans_files() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut manager = PluginManager::new();
        manager.register(Box::new(RuleX { seen })).unwrap();
        let provider = MemorySourceProvider::new()
            .with_document("a.md", "bad\n")
            .with_document("b.md", "good\n")
            .with_document("c.md", "bad\n");
        let mut scanner = Scanner::new(manager, MarkdownTokenizer::new(), provider);
        for file in ["a.md", "b.md", "c.md"] {
            scanner.scan_file(Path::new(file)).unwrap();
        }
        assert_eq!(scanner.number_of_scan_failures(), 2);
    }
}
