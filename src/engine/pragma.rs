//! Inline linter directives: `<!-- pyml disable-next-line md009, line-length -->`.
//!
//! Recognition runs line by line during the raw pass and only records
//! candidate lines. Compilation runs once the raw pass is over, when every
//! candidate line and every registered rule id are known.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use tracing::debug;

use crate::parser::position::PositionMarker;

pub const PRAGMA_PREFIX: &str = "<!--";
pub const PRAGMA_ALTERNATE_PREFIX: &str = "<!---";
pub const PRAGMA_TITLE: &str = "pyml ";
pub const PRAGMA_SUFFIX: &str = "-->";

const DISABLE_NEXT_LINE: &str = "disable-next-line";

/// Which comment opener introduced a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PragmaPrefix {
    Standard,
    Extended,
}

impl PragmaPrefix {
    pub fn text(self) -> &'static str {
        match self {
            PragmaPrefix::Standard => PRAGMA_PREFIX,
            PragmaPrefix::Extended => PRAGMA_ALTERNATE_PREFIX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PragmaLine {
    pub line_number: usize,
    pub prefix: PragmaPrefix,
    pub raw_text: String,
}

impl PragmaLine {
    /// `+line` for the standard opener, `-line` for the extended one.
    pub fn signed_key(&self) -> i64 {
        let line = i64::try_from(self.line_number).unwrap_or(i64::MAX);
        match self.prefix {
            PragmaPrefix::Standard => line,
            PragmaPrefix::Extended => -line,
        }
    }
}

/// Candidate directive lines of one document, ordered by `(line_number, prefix)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PragmaLines {
    lines: BTreeMap<(usize, PragmaPrefix), PragmaLine>,
}

impl PragmaLines {
    pub fn insert(&mut self, line: PragmaLine) {
        self.lines.insert((line.line_number, line.prefix), line);
    }

    pub fn iter(&self) -> impl Iterator<Item = &PragmaLine> {
        self.lines.values()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains_line(&self, line_number: usize) -> bool {
        self.lines.keys().any(|(line, _)| *line == line_number)
    }
}

/// Suppression table: 1-based line number to the canonical rule ids disabled on it.
pub type DocumentPragmas = BTreeMap<usize, BTreeSet<String>>;

/// Records `line_to_parse` as a directive if it is one. Only lines at
/// container depth zero with no leading whitespace qualify. Content is not
/// validated here.
pub fn look_for_pragmas(
    position_marker: &PositionMarker,
    line_to_parse: &str,
    container_depth: usize,
    extracted_whitespace: &str,
    pragma_lines: &mut PragmaLines,
) -> bool {
    if container_depth != 0 || !extracted_whitespace.is_empty() {
        return false;
    }

    let prefix = if line_to_parse.starts_with(PRAGMA_ALTERNATE_PREFIX) {
        PragmaPrefix::Extended
    } else if line_to_parse.starts_with(PRAGMA_PREFIX) {
        PragmaPrefix::Standard
    } else {
        return false;
    };

    let after_prefix = line_to_parse[prefix.text().len()..]
        .trim_start_matches(' ')
        .trim_end()
        .to_ascii_lowercase();
    if !after_prefix.starts_with(PRAGMA_TITLE) || !after_prefix.ends_with(PRAGMA_SUFFIX) {
        debug!(line = position_marker.line_number, "pragma not extracted");
        return false;
    }

    debug!(
        line = position_marker.line_number,
        ?prefix,
        "pragma extracted"
    );
    pragma_lines.insert(PragmaLine {
        line_number: position_marker.line_number,
        prefix,
        raw_text: line_to_parse.to_string(),
    });
    true
}

/// Compiles every recognized directive of a document into `document_pragmas`,
/// in `(line_number, prefix)` order.
pub fn compile_pragmas<F>(
    scan_file: &Path,
    pragma_lines: &PragmaLines,
    all_ids: &HashMap<String, String>,
    document_pragmas: &mut DocumentPragmas,
    mut log_pragma_failure: F,
) where
    F: FnMut(&Path, usize, String),
{
    for pragma in pragma_lines.iter() {
        compile_single_pragma(
            scan_file,
            pragma,
            all_ids,
            document_pragmas,
            &mut log_pragma_failure,
        );
    }
}

/// Validates one directive and adds its suppressions. Problems are handed to
/// `log_pragma_failure` as `(file, line, message)` and never abort the scan.
pub fn compile_single_pragma<F>(
    scan_file: &Path,
    pragma: &PragmaLine,
    all_ids: &HashMap<String, String>,
    document_pragmas: &mut DocumentPragmas,
    log_pragma_failure: &mut F,
) where
    F: FnMut(&Path, usize, String),
{
    let actual_line_number = pragma.line_number;
    let command_data = directive_body(pragma);

    let command_end = command_data.find(' ').unwrap_or(command_data.len());
    let command = command_data[..command_end].to_lowercase();

    if command.is_empty() {
        log_pragma_failure(
            scan_file,
            actual_line_number,
            "Inline configuration specified without command.".to_string(),
        );
    } else if command == DISABLE_NEXT_LINE {
        handle_disable_next_line(
            &command_data[command_end..],
            &command,
            scan_file,
            actual_line_number,
            all_ids,
            document_pragmas,
            log_pragma_failure,
        );
    } else {
        log_pragma_failure(
            scan_file,
            actual_line_number,
            format!("Inline configuration command '{command}' not understood."),
        );
    }
}

/// The text between the title token and the closing `-->`.
fn directive_body(pragma: &PragmaLine) -> &str {
    let after_prefix = pragma
        .raw_text
        .get(pragma.prefix.text().len()..)
        .unwrap_or_default()
        .trim_end();
    let after_whitespace = after_prefix.trim_start_matches(' ');
    let end = after_whitespace.len().saturating_sub(PRAGMA_SUFFIX.len());
    after_whitespace
        .get(PRAGMA_TITLE.len()..end)
        .unwrap_or_default()
}

fn handle_disable_next_line<F>(
    ids_to_disable: &str,
    command: &str,
    scan_file: &Path,
    actual_line_number: usize,
    all_ids: &HashMap<String, String>,
    document_pragmas: &mut DocumentPragmas,
    log_pragma_failure: &mut F,
) where
    F: FnMut(&Path, usize, String),
{
    let mut processed_ids = BTreeSet::new();
    for next_id in ids_to_disable.split(',') {
        let next_id = next_id.trim().to_lowercase();
        if next_id.is_empty() {
            log_pragma_failure(
                scan_file,
                actual_line_number,
                format!("Inline configuration command '{command}' specified a plugin with a blank id."),
            );
        } else if let Some(canonical) = all_ids.get(&next_id) {
            processed_ids.insert(canonical.clone());
        } else {
            log_pragma_failure(
                scan_file,
                actual_line_number,
                format!(
                    "Inline configuration command '{command}' unable to find a plugin with the id '{next_id}'."
                ),
            );
        }
    }

    if !processed_ids.is_empty() {
        debug!(
            target_line = actual_line_number + 1,
            ids = ?processed_ids,
            "disable-next-line compiled"
        );
        document_pragmas.insert(actual_line_number + 1, processed_ids);
    }
}
