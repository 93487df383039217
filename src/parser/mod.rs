pub mod position;
pub mod source;
pub mod types;

use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena, Options};
use thiserror::Error;

use crate::engine::pragma::{look_for_pragmas, PragmaLines};
use position::PositionTracker;
use source::{collect_lines, LineSource};
use types::{PragmaToken, Token, TokenKind};

pub const MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("Document nesting exceeds the limit of {limit} levels at line {line}.")]
    NestingTooDeep { line: usize, limit: usize },
}

/// Turns a whole document into its ordered token stream.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, source: &mut dyn LineSource) -> Result<Vec<Token>, TokenizeError>;
}

/// Block and inline tokenizer backed by comrak.
#[derive(Debug, Clone)]
pub struct MarkdownTokenizer {
    max_depth: usize,
}

impl Default for MarkdownTokenizer {
    fn default() -> Self {
        Self {
            max_depth: MAX_NESTING_DEPTH,
        }
    }
}

impl MarkdownTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    fn walk<'a>(
        &self,
        node: &'a AstNode<'a>,
        depth: usize,
        line_map: &LineMap,
        tokens: &mut Vec<Token>,
    ) -> Result<(), TokenizeError> {
        let (emit, line, column) = {
            let data = node.data.borrow();
            (
                node_tokens(&data.value),
                line_map.source_line(data.sourcepos.start.line),
                data.sourcepos.start.column,
            )
        };

        if depth > self.max_depth {
            return Err(TokenizeError::NestingTooDeep {
                line,
                limit: self.max_depth,
            });
        }

        let place = |token: Token| {
            if line > 0 {
                token.at(line, column)
            } else {
                token
            }
        };

        let end = match emit {
            Some(emit) => {
                tokens.push(place(Token::new(emit.start, emit.extra)));
                if let Some(literal) = emit.literal {
                    tokens.push(Token::new(TokenKind::Text, literal));
                }
                emit.end
            }
            None => None,
        };

        for child in node.children() {
            self.walk(child, depth + 1, line_map, tokens)?;
        }

        if let Some(end) = end {
            tokens.push(Token::new(end, ""));
        }
        Ok(())
    }
}

impl Tokenizer for MarkdownTokenizer {
    fn tokenize(&self, source: &mut dyn LineSource) -> Result<Vec<Token>, TokenizeError> {
        let (content, line_map, pragma_lines) = lift_pragmas(collect_lines(source));

        let arena = Arena::new();
        let mut options = Options::default();
        options.extension.table = true;
        options.extension.strikethrough = true;
        // Inline nodes only track lines across code spans and raw HTML with this on.
        options.render.sourcepos = true;
        let root = parse_document(&arena, &content, &options);

        let mut tokens = Vec::new();
        self.walk(root, 0, &line_map, &mut tokens)?;

        if !pragma_lines.is_empty() {
            tokens.push(PragmaToken::new(pragma_lines).into());
        }
        Ok(tokens)
    }
}

/// Maps line numbers of the text handed to comrak back to source lines.
#[derive(Debug, Default)]
struct LineMap {
    source_lines: Vec<usize>,
}

impl LineMap {
    fn source_line(&self, parsed_line: usize) -> usize {
        match parsed_line.checked_sub(1) {
            Some(index) => self.source_lines.get(index).copied().unwrap_or(parsed_line),
            None => 0,
        }
    }
}

/// Pulls directive lines out of the document. The remaining lines are
/// parsed as if the directives were never there; the returned map restores
/// their original line numbers.
fn lift_pragmas(lines: Vec<String>) -> (String, LineMap, PragmaLines) {
    let mut tracker = PositionTracker::new();
    let mut pragma_lines = PragmaLines::default();
    let mut line_map = LineMap::default();
    let mut kept = Vec::with_capacity(lines.len());
    for line in lines {
        let marker = tracker.advance(&line);
        let is_pragma = look_for_pragmas(
            &marker,
            &line,
            marker.container_depth,
            &marker.extracted_whitespace,
            &mut pragma_lines,
        );
        if !is_pragma {
            line_map.source_lines.push(marker.line_number);
            kept.push(line);
        }
    }
    (kept.join("\n"), line_map, pragma_lines)
}

struct Emit {
    start: TokenKind,
    extra: String,
    literal: Option<String>,
    end: Option<TokenKind>,
}

impl Emit {
    fn pair(start: TokenKind, end: TokenKind) -> Self {
        Self::with_extra(start, String::new(), Some(end))
    }

    fn with_extra(start: TokenKind, extra: String, end: Option<TokenKind>) -> Self {
        Self {
            start,
            extra,
            literal: None,
            end,
        }
    }
}

fn node_tokens(value: &NodeValue) -> Option<Emit> {
    let emit = match value {
        NodeValue::BlockQuote => Emit::pair(TokenKind::BlockQuote, TokenKind::EndBlockQuote),
        NodeValue::List(list) => match list.list_type {
            ListType::Bullet => Emit::with_extra(
                TokenKind::UnorderedList,
                char::from(list.bullet_char).to_string(),
                Some(TokenKind::EndUnorderedList),
            ),
            ListType::Ordered => Emit::with_extra(
                TokenKind::OrderedList,
                list.start.to_string(),
                Some(TokenKind::EndOrderedList),
            ),
        },
        NodeValue::Item(_) => Emit::with_extra(TokenKind::ListItem, String::new(), None),
        NodeValue::Paragraph => Emit::pair(TokenKind::Paragraph, TokenKind::EndParagraph),
        NodeValue::Heading(heading) if heading.setext => Emit::with_extra(
            TokenKind::SetextHeading,
            heading.level.to_string(),
            Some(TokenKind::EndSetextHeading),
        ),
        NodeValue::Heading(heading) => Emit::with_extra(
            TokenKind::AtxHeading,
            heading.level.to_string(),
            Some(TokenKind::EndAtxHeading),
        ),
        NodeValue::ThematicBreak => {
            Emit::with_extra(TokenKind::ThematicBreak, String::new(), None)
        }
        NodeValue::CodeBlock(block) => {
            let mut emit = if block.fenced {
                Emit::with_extra(
                    TokenKind::FencedCodeBlock,
                    format!(
                        "{}:{}:{}",
                        char::from(block.fence_char),
                        block.fence_length,
                        block.info
                    ),
                    Some(TokenKind::EndFencedCodeBlock),
                )
            } else {
                Emit::pair(TokenKind::IndentedCodeBlock, TokenKind::EndIndentedCodeBlock)
            };
            emit.literal = Some(block.literal.trim_end_matches('\n').to_string());
            emit
        }
        NodeValue::HtmlBlock(html) => {
            let mut emit = Emit::pair(TokenKind::HtmlBlock, TokenKind::EndHtmlBlock);
            emit.literal = Some(html.literal.trim_end_matches('\n').to_string());
            emit
        }
        NodeValue::Table(..) => Emit::pair(TokenKind::Table, TokenKind::EndTable),
        NodeValue::TableRow(header) => Emit::with_extra(
            TokenKind::TableRow,
            if *header { "header" } else { "" }.to_string(),
            Some(TokenKind::EndTableRow),
        ),
        NodeValue::TableCell => Emit::pair(TokenKind::TableCell, TokenKind::EndTableCell),
        NodeValue::Text(text) => Emit::with_extra(TokenKind::Text, text.to_string(), None),
        NodeValue::SoftBreak => Emit::with_extra(TokenKind::SoftBreak, String::new(), None),
        NodeValue::LineBreak => Emit::with_extra(TokenKind::HardBreak, String::new(), None),
        NodeValue::Code(code) => {
            Emit::with_extra(TokenKind::CodeSpan, code.literal.to_string(), None)
        }
        NodeValue::HtmlInline(html) => {
            Emit::with_extra(TokenKind::RawHtml, html.to_string(), None)
        }
        NodeValue::Emph => Emit::pair(TokenKind::Emphasis, TokenKind::EndEmphasis),
        NodeValue::Strong => Emit::pair(TokenKind::Strong, TokenKind::EndStrong),
        NodeValue::Strikethrough => {
            Emit::pair(TokenKind::Strikethrough, TokenKind::EndStrikethrough)
        }
        NodeValue::Link(link) => Emit::with_extra(
            TokenKind::Link,
            link.url.to_string(),
            Some(TokenKind::EndLink),
        ),
        NodeValue::Image(link) => Emit::with_extra(
            TokenKind::Image,
            link.url.to_string(),
            Some(TokenKind::EndImage),
        ),
        _ => return None,
    };
    Some(emit)
}
