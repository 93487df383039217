//! Line, column and container-depth bookkeeping for a single scan pass.

/// Cursor state for one physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionMarker {
    /// 1-based line number.
    pub line_number: usize,
    /// 0-based byte offset where content starts once container prefixes are consumed.
    pub index_number: usize,
    /// Number of block containers (list items, block quotes) open on this line.
    pub container_depth: usize,
    /// Whitespace that leads the content after container prefixes.
    pub extracted_whitespace: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    BlockQuote,
    ListItem { content_indent: usize },
}

/// Tracks open containers across the lines of one document.
///
/// One tracker belongs to one pass; the raw pass and the tokenizer each own
/// their own instance.
#[derive(Debug, Default)]
pub struct PositionTracker {
    line_number: usize,
    containers: Vec<Container>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container_depth(&self) -> usize {
        self.containers.len()
    }

    pub fn advance(&mut self, line: &str) -> PositionMarker {
        self.line_number += 1;

        if line.trim().is_empty() {
            self.containers
                .retain(|c| matches!(c, Container::ListItem { .. }));
            return PositionMarker {
                line_number: self.line_number,
                index_number: 0,
                container_depth: self.containers.len(),
                extracted_whitespace: line.to_string(),
            };
        }

        let bytes = line.as_bytes();
        let mut offset = 0;
        let mut matched = 0;

        for container in &self.containers {
            match *container {
                Container::BlockQuote => match quote_marker(bytes, offset) {
                    Some(next) => offset = next,
                    None => break,
                },
                Container::ListItem { content_indent } => {
                    if leading_spaces(bytes, offset) + offset < content_indent {
                        break;
                    }
                    offset = content_indent;
                }
            }
            matched += 1;
        }
        self.containers.truncate(matched);

        loop {
            if let Some(next) = quote_marker(bytes, offset) {
                self.containers.push(Container::BlockQuote);
                offset = next;
            } else if let Some((next, content_indent)) = list_marker(line, offset) {
                self.containers
                    .push(Container::ListItem { content_indent });
                offset = next;
            } else {
                break;
            }
        }

        let offset = offset.min(line.len());
        let content_start = offset + leading_spaces(bytes, offset);
        PositionMarker {
            line_number: self.line_number,
            index_number: offset,
            container_depth: self.containers.len(),
            extracted_whitespace: line[offset..content_start].to_string(),
        }
    }
}

fn leading_spaces(bytes: &[u8], from: usize) -> usize {
    bytes
        .get(from..)
        .map_or(0, |rest| rest.iter().take_while(|b| **b == b' ' || **b == b'\t').count())
}

/// Offset just past a `>` marker (and one optional space) if one starts within three spaces.
fn quote_marker(bytes: &[u8], from: usize) -> Option<usize> {
    let indent = leading_spaces(bytes, from);
    if indent > 3 || bytes.get(from + indent) != Some(&b'>') {
        return None;
    }
    let after = from + indent + 1;
    Some(if bytes.get(after) == Some(&b' ') {
        after + 1
    } else {
        after
    })
}

/// Returns the offset where the item's content begins and the indent
/// continuation lines need to stay inside the item.
fn list_marker(line: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = line.as_bytes();
    let indent = leading_spaces(bytes, from);
    if indent > 3 {
        return None;
    }
    let start = from + indent;
    let rest = &line[start..];
    if is_thematic_break(rest) {
        return None;
    }

    let marker_len = match rest.as_bytes().first()? {
        b'-' | b'+' | b'*' => 1,
        b'0'..=b'9' => {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            if digits > 9 || !matches!(rest.as_bytes().get(digits), Some(b'.' | b')')) {
                return None;
            }
            digits + 1
        }
        _ => return None,
    };

    let after_marker = start + marker_len;
    let padding = leading_spaces(bytes, after_marker);
    if after_marker < line.len() && padding == 0 {
        return None;
    }
    let padding = if padding == 0 || padding > 4 { 1 } else { padding };
    let content_indent = after_marker + padding;
    Some((content_indent.min(line.len()), content_indent))
}

fn is_thematic_break(text: &str) -> bool {
    let trimmed = text.trim_end();
    let Some(first) = trimmed.chars().next() else {
        return false;
    };
    if !matches!(first, '-' | '*' | '_') {
        return false;
    }
    trimmed.chars().all(|c| c == first || c == ' ' || c == '\t')
        && trimmed.chars().filter(|c| *c == first).count() >= 3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depths(lines: &[&str]) -> Vec<usize> {
        let mut tracker = PositionTracker::new();
        lines
            .iter()
            .map(|line| tracker.advance(line).container_depth)
            .collect()
    }

    #[test]
    fn test_line_numbers_increase_from_one() {
        let mut tracker = PositionTracker::new();
        assert_eq!(tracker.advance("a").line_number, 1);
        assert_eq!(tracker.advance("").line_number, 2);
        assert_eq!(tracker.advance("b").line_number, 3);
    }

    #[test]
    fn test_plain_lines_have_no_depth() {
        assert_eq!(depths(&["# Title", "", "text"]), vec![0, 0, 0]);
    }

    #[test]
    fn test_list_item_opens_container() {
        assert_eq!(depths(&["- item", "  continued", "after"]), vec![1, 1, 0]);
    }

    #[test]
    fn test_nested_list_items() {
        assert_eq!(depths(&["- outer", "  - inner", "    deep", "  back"]), vec![1, 2, 2, 1]);
    }

    #[test]
    fn test_ordered_list_marker() {
        assert_eq!(depths(&["1. first", "   more", "2) second"]), vec![1, 1, 1]);
    }

    #[test]
    fn test_block_quote_closed_by_blank_line() {
        assert_eq!(depths(&["> quote", "> more", "", "plain"]), vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_list_survives_blank_line() {
        assert_eq!(depths(&["- item", "", "  para in item"]), vec![1, 1, 1]);
    }

    #[test]
    fn test_quote_inside_list() {
        assert_eq!(depths(&["- > quoted item"]), vec![2]);
    }

    #[test]
    fn test_thematic_break_is_not_a_list() {
        assert_eq!(depths(&["---", "* * *", "- item"]), vec![0, 0, 1]);
    }

    #[test]
    fn test_marker_without_space_is_not_a_list() {
        assert_eq!(depths(&["-item", "1.5 apples"]), vec![0, 0]);
    }

    #[test]
    fn test_pragma_after_list_is_top_level() {
        let mut tracker = PositionTracker::new();
        tracker.advance("- item");
        let marker = tracker.advance("<!-- pyml disable-next-line md009 -->");
        assert_eq!(marker.container_depth, 0);
        assert_eq!(marker.index_number, 0);
        assert!(marker.extracted_whitespace.is_empty());
    }

    #[test]
    fn test_extracted_whitespace() {
        let mut tracker = PositionTracker::new();
        let marker = tracker.advance("   indented");
        assert_eq!(marker.container_depth, 0);
        assert_eq!(marker.extracted_whitespace, "   ");
    }

    #[test]
    fn test_index_number_after_quote_prefix() {
        let mut tracker = PositionTracker::new();
        let marker = tracker.advance("> text");
        assert_eq!(marker.index_number, 2);
        assert!(marker.extracted_whitespace.is_empty());
    }
}
