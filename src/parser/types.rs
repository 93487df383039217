use std::fmt;

use crate::engine::pragma::PragmaLines;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    ContainerBlock,
    LeafBlock,
    Inline,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    BlockQuote,
    EndBlockQuote,
    UnorderedList,
    EndUnorderedList,
    OrderedList,
    EndOrderedList,
    ListItem,
    Paragraph,
    EndParagraph,
    AtxHeading,
    EndAtxHeading,
    SetextHeading,
    EndSetextHeading,
    ThematicBreak,
    FencedCodeBlock,
    EndFencedCodeBlock,
    IndentedCodeBlock,
    EndIndentedCodeBlock,
    HtmlBlock,
    EndHtmlBlock,
    Table,
    EndTable,
    TableRow,
    EndTableRow,
    TableCell,
    EndTableCell,
    Text,
    SoftBreak,
    HardBreak,
    CodeSpan,
    RawHtml,
    Emphasis,
    EndEmphasis,
    Strong,
    EndStrong,
    Strikethrough,
    EndStrikethrough,
    Link,
    EndLink,
    Image,
    EndImage,
    Pragma,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::BlockQuote => "block-quote",
            TokenKind::EndBlockQuote => "end-block-quote",
            TokenKind::UnorderedList => "ulist",
            TokenKind::EndUnorderedList => "end-ulist",
            TokenKind::OrderedList => "olist",
            TokenKind::EndOrderedList => "end-olist",
            TokenKind::ListItem => "li",
            TokenKind::Paragraph => "para",
            TokenKind::EndParagraph => "end-para",
            TokenKind::AtxHeading => "atx",
            TokenKind::EndAtxHeading => "end-atx",
            TokenKind::SetextHeading => "setext",
            TokenKind::EndSetextHeading => "end-setext",
            TokenKind::ThematicBreak => "tbreak",
            TokenKind::FencedCodeBlock => "fcode-block",
            TokenKind::EndFencedCodeBlock => "end-fcode-block",
            TokenKind::IndentedCodeBlock => "icode-block",
            TokenKind::EndIndentedCodeBlock => "end-icode-block",
            TokenKind::HtmlBlock => "html-block",
            TokenKind::EndHtmlBlock => "end-html-block",
            TokenKind::Table => "table",
            TokenKind::EndTable => "end-table",
            TokenKind::TableRow => "table-row",
            TokenKind::EndTableRow => "end-table-row",
            TokenKind::TableCell => "table-cell",
            TokenKind::EndTableCell => "end-table-cell",
            TokenKind::Text => "text",
            TokenKind::SoftBreak => "soft-break",
            TokenKind::HardBreak => "hard-break",
            TokenKind::CodeSpan => "icode-span",
            TokenKind::RawHtml => "raw-html",
            TokenKind::Emphasis => "emphasis",
            TokenKind::EndEmphasis => "end-emphasis",
            TokenKind::Strong => "strong",
            TokenKind::EndStrong => "end-strong",
            TokenKind::Strikethrough => "strikethrough",
            TokenKind::EndStrikethrough => "end-strikethrough",
            TokenKind::Link => "link",
            TokenKind::EndLink => "end-link",
            TokenKind::Image => "image",
            TokenKind::EndImage => "end-image",
            TokenKind::Pragma => "pragma",
        }
    }

    pub fn class(self) -> TokenClass {
        match self {
            TokenKind::BlockQuote
            | TokenKind::EndBlockQuote
            | TokenKind::UnorderedList
            | TokenKind::EndUnorderedList
            | TokenKind::OrderedList
            | TokenKind::EndOrderedList
            | TokenKind::ListItem => TokenClass::ContainerBlock,
            TokenKind::Paragraph
            | TokenKind::EndParagraph
            | TokenKind::AtxHeading
            | TokenKind::EndAtxHeading
            | TokenKind::SetextHeading
            | TokenKind::EndSetextHeading
            | TokenKind::ThematicBreak
            | TokenKind::FencedCodeBlock
            | TokenKind::EndFencedCodeBlock
            | TokenKind::IndentedCodeBlock
            | TokenKind::EndIndentedCodeBlock
            | TokenKind::HtmlBlock
            | TokenKind::EndHtmlBlock
            | TokenKind::Table
            | TokenKind::EndTable
            | TokenKind::TableRow
            | TokenKind::EndTableRow
            | TokenKind::TableCell
            | TokenKind::EndTableCell => TokenClass::LeafBlock,
            TokenKind::Pragma => TokenClass::Special,
            _ => TokenClass::Inline,
        }
    }

    pub fn is_extension(self) -> bool {
        matches!(
            self,
            TokenKind::Table
                | TokenKind::EndTable
                | TokenKind::TableRow
                | TokenKind::EndTableRow
                | TokenKind::TableCell
                | TokenKind::EndTableCell
                | TokenKind::Strikethrough
                | TokenKind::EndStrikethrough
                | TokenKind::Pragma
        )
    }

    pub fn is_heading(self) -> bool {
        matches!(self, TokenKind::AtxHeading | TokenKind::SetextHeading)
    }

    pub fn is_heading_end(self) -> bool {
        matches!(self, TokenKind::EndAtxHeading | TokenKind::EndSetextHeading)
    }
}

/// 1-based source location of the first character a token covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line_number: usize,
    pub column_number: usize,
}

/// One structural unit of a parsed document.
///
/// Identity is `kind`, `token_class`, `is_extension` and `extra_data`; the
/// optional position is reporting metadata and takes no part in equality or
/// serialization.
#[derive(Debug, Clone)]
pub struct Token {
    kind: TokenKind,
    token_class: TokenClass,
    is_extension: bool,
    extra_data: String,
    position: Option<Position>,
}

impl Token {
    pub fn new(kind: TokenKind, extra_data: impl Into<String>) -> Self {
        Self {
            kind,
            token_class: kind.class(),
            is_extension: kind.is_extension(),
            extra_data: extra_data.into(),
            position: None,
        }
    }

    pub fn at(mut self, line_number: usize, column_number: usize) -> Self {
        self.position = Some(Position {
            line_number,
            column_number,
        });
        self
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn token_class(&self) -> TokenClass {
        self.token_class
    }

    pub fn is_extension(&self) -> bool {
        self.is_extension
    }

    pub fn extra_data(&self) -> &str {
        &self.extra_data
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn line_number(&self) -> usize {
        self.position.map_or(0, |p| p.line_number)
    }

    pub fn column_number(&self) -> usize {
        self.position.map_or(0, |p| p.column_number)
    }

    /// Level of a heading start token, read from its payload.
    pub fn heading_level(&self) -> Option<u8> {
        if !self.kind.is_heading() {
            return None;
        }
        self.extra_data.parse().ok()
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.token_class == other.token_class
            && self.is_extension == other.is_extension
            && self.extra_data == other.extra_data
    }
}

impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.kind.name(), self.extra_data)
    }
}

/// The compiled set of pragma lines for a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PragmaToken {
    pragma_lines: PragmaLines,
}

impl PragmaToken {
    pub fn new(pragma_lines: PragmaLines) -> Self {
        Self { pragma_lines }
    }

    pub fn pragma_lines(&self) -> &PragmaLines {
        &self.pragma_lines
    }

    pub fn extra_data(&self) -> String {
        let serialized: String = self
            .pragma_lines
            .iter()
            .map(|line| format!(";{}:{}", line.signed_key(), line.raw_text))
            .collect();
        serialized.get(1..).unwrap_or_default().to_string()
    }

    pub fn to_token(&self) -> Token {
        Token::new(TokenKind::Pragma, self.extra_data())
    }
}

impl From<PragmaToken> for Token {
    fn from(pragma: PragmaToken) -> Self {
        pragma.to_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::pragma::{PragmaLine, PragmaPrefix};

    #[test]
    fn test_equality_ignores_position() {
        let a = Token::new(TokenKind::AtxHeading, "1").at(1, 1);
        let b = Token::new(TokenKind::AtxHeading, "1").at(7, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_compares_payload() {
        let a = Token::new(TokenKind::AtxHeading, "1");
        let b = Token::new(TokenKind::AtxHeading, "2");
        assert_ne!(a, b);
        assert_ne!(
            Token::new(TokenKind::Text, "x"),
            Token::new(TokenKind::CodeSpan, "x")
        );
    }

    #[test]
    fn test_serialization_is_stable() {
        let token = Token::new(TokenKind::Text, "Hello world").at(3, 5);
        assert_eq!(token.to_string(), "[text:Hello world]");
        assert_eq!(token.to_string(), token.clone().to_string());
        assert_eq!(Token::new(TokenKind::EndParagraph, "").to_string(), "[end-para:]");
    }

    #[test]
    fn test_class_and_extension_derived_from_kind() {
        let quote = Token::new(TokenKind::BlockQuote, "");
        assert_eq!(quote.token_class(), TokenClass::ContainerBlock);
        assert!(!quote.is_extension());

        let table = Token::new(TokenKind::Table, "");
        assert_eq!(table.token_class(), TokenClass::LeafBlock);
        assert!(table.is_extension());

        let text = Token::new(TokenKind::Text, "a");
        assert_eq!(text.token_class(), TokenClass::Inline);

        let pragma = Token::new(TokenKind::Pragma, "");
        assert_eq!(pragma.token_class(), TokenClass::Special);
        assert!(pragma.is_extension());
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(Token::new(TokenKind::AtxHeading, "3").heading_level(), Some(3));
        assert_eq!(Token::new(TokenKind::Paragraph, "3").heading_level(), None);
    }

    #[test]
    fn test_position_defaults_to_zero() {
        let token = Token::new(TokenKind::Text, "a");
        assert_eq!(token.line_number(), 0);
        assert_eq!(token.column_number(), 0);
    }

    #[test]
    fn test_pragma_token_serialization() {
        let mut lines = PragmaLines::default();
        lines.insert(PragmaLine {
            line_number: 1,
            prefix: PragmaPrefix::Standard,
            raw_text: "<!-- pyml disable-next-line no-trailing-spaces -->".to_string(),
        });
        let token = PragmaToken::new(lines);
        assert_eq!(
            token.extra_data(),
            "1:<!-- pyml disable-next-line no-trailing-spaces -->"
        );
        assert_eq!(
            token.to_token().to_string(),
            "[pragma:1:<!-- pyml disable-next-line no-trailing-spaces -->]"
        );
    }

    #[test]
    fn test_pragma_token_serialization_mixed_prefixes() {
        let mut lines = PragmaLines::default();
        lines.insert(PragmaLine {
            line_number: 4,
            prefix: PragmaPrefix::Standard,
            raw_text: "<!-- pyml disable-next-line md013 -->".to_string(),
        });
        lines.insert(PragmaLine {
            line_number: 2,
            prefix: PragmaPrefix::Extended,
            raw_text: "<!--- pyml disable-next-line md009 -->".to_string(),
        });
        let token = PragmaToken::new(lines);
        assert_eq!(
            token.extra_data(),
            "-2:<!--- pyml disable-next-line md009 -->;4:<!-- pyml disable-next-line md013 -->"
        );
    }

    #[test]
    fn test_empty_pragma_token() {
        let token = PragmaToken::new(PragmaLines::default());
        assert_eq!(token.extra_data(), "");
    }
}
