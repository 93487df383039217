use std::path::Path;

use crate::engine::pipeline::Scanner;
use crate::parser::source::MemorySourceProvider;
use crate::parser::MarkdownTokenizer;
use crate::plugins::{Plugin, PluginManager};
use crate::types::Violation;

pub(crate) fn run_rule(rule: Box<dyn Plugin>, content: &str) -> Vec<Violation> {
    let mut manager = PluginManager::new();
    manager.register(rule).unwrap();
    let provider = MemorySourceProvider::new().with_document("test.md", content);
    let mut scanner = Scanner::new(manager, MarkdownTokenizer::new(), provider);
    scanner.scan_file(Path::new("test.md")).unwrap().violations
}

pub(crate) fn lines_of(violations: &[Violation]) -> Vec<usize> {
    violations.iter().map(|v| v.line).collect()
}
