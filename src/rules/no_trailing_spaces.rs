use crate::config::NoTrailingSpacesConfig;
use crate::plugins::{Plugin, PluginDetails, RuleContext};
use crate::report;

pub struct NoTrailingSpaces {
    br_spaces: usize,
    strict: bool,
}

impl NoTrailingSpaces {
    pub fn new(config: &NoTrailingSpacesConfig) -> Self {
        Self {
            br_spaces: config.br_spaces,
            strict: config.strict,
        }
    }
}

impl Plugin for NoTrailingSpaces {
    fn details(&self) -> PluginDetails {
        PluginDetails {
            plugin_id: "MD009".to_string(),
            plugin_name: "no-trailing-spaces".to_string(),
            aliases: Vec::new(),
            description: "Trailing spaces".to_string(),
            enabled_by_default: true,
            version: "0.5.0".to_string(),
        }
    }

    fn next_line(
        &mut self,
        ctx: &mut RuleContext<'_>,
        line_number: usize,
        line: &str,
    ) -> anyhow::Result<()> {
        let trimmed = line.trim_end_matches(' ');
        let trailing = line.len() - trimmed.len();
        if trailing == 0 {
            return Ok(());
        }

        if self.strict {
            report!(ctx, line_number, trimmed.len() + 1, "Expected: 0; Actual: {trailing}");
        } else if trailing != self.br_spaces {
            report!(
                ctx,
                line_number,
                trimmed.len() + 1,
                "Expected: 0 or {}; Actual: {trailing}",
                self.br_spaces
            );
        }
        Ok(())
    }
}
