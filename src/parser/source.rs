use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// A pull-based sequence of physical lines. `None` marks the end of the
/// document; an empty string is a legitimate empty line.
pub trait LineSource {
    fn next_line(&mut self) -> Option<String>;
}

/// Opens a fresh [`LineSource`] for a file. Each call starts from the first
/// line, so two passes over one file never share cursor state.
pub trait SourceProvider: Send + Sync {
    fn open(&self, file: &Path) -> io::Result<Box<dyn LineSource>>;
}

/// Lines of an in-memory document, split on `\n` with a trailing `\r`
/// removed. A document ending in a newline yields a final empty line.
#[derive(Debug)]
pub struct TextSource {
    lines: std::vec::IntoIter<String>,
}

impl TextSource {
    pub fn new(content: &str) -> Self {
        let lines: Vec<String> = content
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        Self {
            lines: lines.into_iter(),
        }
    }
}

impl LineSource for TextSource {
    fn next_line(&mut self) -> Option<String> {
        self.lines.next()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FileSourceProvider;

impl SourceProvider for FileSourceProvider {
    fn open(&self, file: &Path) -> io::Result<Box<dyn LineSource>> {
        let content = std::fs::read_to_string(file)?;
        Ok(Box::new(TextSource::new(&content)))
    }
}

/// Serves documents registered by name, used where content never touches disk.
#[derive(Debug, Default, Clone)]
pub struct MemorySourceProvider {
    documents: HashMap<PathBuf, String>,
}

impl MemorySourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, file: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.documents.insert(file.into(), content.into());
        self
    }
}

impl SourceProvider for MemorySourceProvider {
    fn open(&self, file: &Path) -> io::Result<Box<dyn LineSource>> {
        self.documents
            .get(file)
            .map(|content| Box::new(TextSource::new(content)) as Box<dyn LineSource>)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no document named '{}'", file.display()),
                )
            })
    }
}

pub fn collect_lines(source: &mut dyn LineSource) -> Vec<String> {
    std::iter::from_fn(|| source.next_line()).collect()
}
