use crate::plugins::{Plugin, PluginDetails, RuleContext};
use crate::report;

/// Reports files whose last physical line is not empty. A file ending in a
/// newline yields an empty final line from the line source.
#[derive(Default)]
pub struct SingleTrailingNewline {
    last_line: Option<(usize, usize)>,
}

impl Plugin for SingleTrailingNewline {
    fn details(&self) -> PluginDetails {
        PluginDetails {
            plugin_id: "MD047".to_string(),
            plugin_name: "single-trailing-newline".to_string(),
            aliases: Vec::new(),
            description: "Each file should end with a single newline character.".to_string(),
            enabled_by_default: true,
            version: "0.5.0".to_string(),
        }
    }

    fn starting_new_file(&mut self) {
        self.last_line = None;
    }

    fn next_line(
        &mut self,
        _ctx: &mut RuleContext<'_>,
        line_number: usize,
        line: &str,
    ) -> anyhow::Result<()> {
        self.last_line = Some((line_number, line.chars().count()));
        Ok(())
    }

    fn completed_file(&mut self, ctx: &mut RuleContext<'_>) -> anyhow::Result<()> {
        if let Some((line_number, width)) = self.last_line {
            if width > 0 {
                report!(ctx, line_number, width + 1);
            }
        }
        Ok(())
    }
}
