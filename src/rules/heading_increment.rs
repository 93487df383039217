use crate::parser::types::Token;
use crate::plugins::{Plugin, PluginDetails, RuleContext};

#[derive(Default)]
pub struct HeadingIncrement {
    last_level: Option<u8>,
}

impl Plugin for HeadingIncrement {
    fn details(&self) -> PluginDetails {
        PluginDetails {
            plugin_id: "MD001".to_string(),
            plugin_name: "heading-increment".to_string(),
            aliases: vec!["header-increment".to_string()],
            description: "Heading levels should only increment by one level at a time.".to_string(),
            enabled_by_default: true,
            version: "0.5.0".to_string(),
        }
    }

    fn starting_new_file(&mut self) {
        self.last_level = None;
    }

    fn next_token(&mut self, ctx: &mut RuleContext<'_>, token: &Token) -> anyhow::Result<()> {
        let Some(level) = token.heading_level() else {
            return Ok(());
        };
        if let Some(prev) = self.last_level {
            if level > prev + 1 {
                ctx.report_token_error(
                    token,
                    Some(format!("Expected: h{}; Actual: h{level}", prev + 1)),
                );
            }
        }
        self.last_level = Some(level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{lines_of, run_rule};

    fn run_check(content: &str) -> Vec<crate::types::Violation> {
        run_rule(Box::new(HeadingIncrement::default()), content)
    }

    #[test]
    fn test_skipped_level_detected() {
        let violations = run_check("# Title\n\n### Sub\n");
        assert_eq!(lines_of(&violations), vec![3]);
        assert_eq!(violations[0].extra.as_deref(), Some("Expected: h2; Actual: h3"));
    }

    #[test]
    fn test_proper_hierarchy_no_violation() {
        assert!(run_check("# Title\n\n## Sub\n\n### SubSub\n").is_empty());
    }

    #[test]
    fn test_going_back_up_no_violation() {
        assert!(run_check("# Title\n\n## Sub\n\n# Another\n").is_empty());
    }

    #[test]
    fn test_starting_at_h2_no_violation() {
        assert!(run_check("## Sub\n\n### SubSub\n").is_empty());
    }

    #[test]
    fn test_setext_headings_count() {
        let violations = run_check("Title\n=====\n\n#### Deep\n");
        assert_eq!(lines_of(&violations), vec![4]);
    }

    #[test]
    fn test_multiple_skips_detected() {
        let violations = run_check("# Title\n\n#### Deep\n\n## Normal\n\n##### Deeper\n");
        assert_eq!(lines_of(&violations), vec![3, 7]);
    }

    #[test]
    fn test_state_reset_between_files() {
        let mut rule = HeadingIncrement::default();
        rule.last_level = Some(1);
        rule.starting_new_file();
        assert_eq!(rule.last_level, None);
    }
}
