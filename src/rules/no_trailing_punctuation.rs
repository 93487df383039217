use crate::config::NoTrailingPunctuationConfig;
use crate::parser::types::{Token, TokenKind};
use crate::plugins::{Plugin, PluginDetails, RuleContext};

pub struct NoTrailingPunctuation {
    punctuation: String,
    heading: Option<Token>,
    last_text: Option<String>,
}

impl NoTrailingPunctuation {
    pub fn new(config: &NoTrailingPunctuationConfig) -> Self {
        Self {
            punctuation: config.punctuation.clone(),
            heading: None,
            last_text: None,
        }
    }
}

impl Plugin for NoTrailingPunctuation {
    fn details(&self) -> PluginDetails {
        PluginDetails {
            plugin_id: "MD026".to_string(),
            plugin_name: "no-trailing-punctuation".to_string(),
            aliases: Vec::new(),
            description: "Trailing punctuation present in heading text.".to_string(),
            enabled_by_default: true,
            version: "0.5.0".to_string(),
        }
    }

    fn starting_new_file(&mut self) {
        self.heading = None;
        self.last_text = None;
    }

    fn next_token(&mut self, ctx: &mut RuleContext<'_>, token: &Token) -> anyhow::Result<()> {
        if token.kind().is_heading() {
            self.heading = Some(token.clone());
            self.last_text = None;
            return Ok(());
        }

        if token.kind().is_heading_end() {
            let heading = self.heading.take();
            let last = self
                .last_text
                .take()
                .and_then(|text| text.trim_end().chars().last());
            if let (Some(heading), Some(last)) = (heading, last) {
                if self.punctuation.contains(last) {
                    ctx.report_token_error(&heading, Some(format!("Punctuation: '{last}'")));
                }
            }
            return Ok(());
        }

        if self.heading.is_some() {
            self.last_text = match token.kind() {
                TokenKind::Text => Some(token.extra_data().to_string()),
                _ => None,
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{lines_of, run_rule};

    fn run_check(content: &str) -> Vec<crate::types::Violation> {
        run_rule(
            Box::new(NoTrailingPunctuation::new(
                &NoTrailingPunctuationConfig::default(),
            )),
            content,
        )
    }

    #[test]
    fn test_trailing_period_detected() {
        let violations = run_check("# Heading.\n");
        assert_eq!(lines_of(&violations), vec![1]);
        assert_eq!(violations[0].extra.as_deref(), Some("Punctuation: '.'"));
    }

    #[test]
    fn test_question_mark_allowed() {
        assert!(run_check("# Why?\n").is_empty());
    }

    #[test]
    fn test_setext_heading_detected() {
        let violations = run_check("Text\n\nHeading!\n========\n");
        assert_eq!(lines_of(&violations), vec![3]);
        assert_eq!(violations[0].extra.as_deref(), Some("Punctuation: '!'"));
    }

    #[test]
    fn test_full_width_punctuation_detected() {
        let violations = run_check("# 見出し。\n");
        assert_eq!(violations[0].extra.as_deref(), Some("Punctuation: '。'"));
    }

    #[test]
    fn test_trailing_code_span_not_checked() {
        assert!(run_check("# Run `make.`\n").is_empty());
    }

    #[test]
    fn test_paragraph_punctuation_ignored() {
        assert!(run_check("Just a sentence.\n").is_empty());
    }

    #[test]
    fn test_custom_punctuation() {
        let config = NoTrailingPunctuationConfig {
            punctuation: "?".to_string(),
        };
        let violations = run_rule(Box::new(NoTrailingPunctuation::new(&config)), "# Why?\n# Done.\n");
        assert_eq!(lines_of(&violations), vec![1]);
    }
}
