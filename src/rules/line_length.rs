use crate::config::LineLengthConfig;
use crate::plugins::{Plugin, PluginDetails, RuleContext};
use crate::report;

pub struct LineLength {
    line_length: usize,
}

impl LineLength {
    pub fn new(config: &LineLengthConfig) -> Self {
        Self {
            line_length: config.line_length,
        }
    }
}

impl Plugin for LineLength {
    fn details(&self) -> PluginDetails {
        PluginDetails {
            plugin_id: "MD013".to_string(),
            plugin_name: "line-length".to_string(),
            aliases: Vec::new(),
            description: "Line length".to_string(),
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
        let actual = line.chars().count();
        if actual > self.line_length {
            report!(
                ctx,
                line_number,
                1,
                "Expected: {}, Actual: {actual}",
                self.line_length
            );
        }
        Ok(())
    }
}
