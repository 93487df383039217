use std::sync::LazyLock;

use regex::Regex;

use crate::parser::types::{Token, TokenKind};
use crate::plugins::{Plugin, PluginDetails, RuleContext};
use crate::report;

static ATX_WITHOUT_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}#{1,6}\S").unwrap());
static CLOSING_HASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\s*$").unwrap());

/// The source line the paragraph has reached and where it started.
#[derive(Debug, Clone, Copy)]
struct ParagraphCursor {
    line: usize,
    column: usize,
    at_line_start: bool,
}

/// Flags paragraph lines that look like an atx heading missing the space
/// after its hashes, e.g. `#Heading`.
#[derive(Default)]
pub struct NoMissingSpaceAtx {
    paragraph: Option<ParagraphCursor>,
}

impl Plugin for NoMissingSpaceAtx {
    fn details(&self) -> PluginDetails {
        PluginDetails {
            plugin_id: "MD018".to_string(),
            plugin_name: "no-missing-space-atx".to_string(),
            aliases: Vec::new(),
            description: "No space after hash on atx style heading".to_string(),
            enabled_by_default: true,
            version: "0.5.0".to_string(),
        }
    }

    fn starting_new_file(&mut self) {
        self.paragraph = None;
    }

    fn next_token(&mut self, ctx: &mut RuleContext<'_>, token: &Token) -> anyhow::Result<()> {
        match token.kind() {
            TokenKind::Paragraph => {
                self.paragraph = Some(ParagraphCursor {
                    line: token.line_number(),
                    column: token.column_number(),
                    at_line_start: true,
                });
                return Ok(());
            }
            TokenKind::EndParagraph => {
                self.paragraph = None;
                return Ok(());
            }
            _ => {}
        }

        let Some(cursor) = self.paragraph.as_mut() else {
            return Ok(());
        };
        // Code spans and inline HTML may span lines without a break token.
        cursor.line = cursor.line.max(token.line_number());
        match token.kind() {
            TokenKind::SoftBreak | TokenKind::HardBreak => {
                cursor.line += 1;
                cursor.at_line_start = true;
            }
            TokenKind::RawHtml => {
                cursor.line += token.extra_data().matches('\n').count();
                cursor.at_line_start = false;
            }
            TokenKind::Text if cursor.at_line_start => {
                let text = token.extra_data();
                if ATX_WITHOUT_SPACE.is_match(text) && !CLOSING_HASHES.is_match(text) {
                    report!(ctx, cursor.line, cursor.column);
                }
                cursor.at_line_start = false;
            }
            _ => cursor.at_line_start = false,
        }
        Ok(())
    }
}
