pub mod heading_increment;
pub mod line_length;
pub mod macros;
pub mod no_missing_space_atx;
pub mod no_trailing_punctuation;
pub mod no_trailing_spaces;
pub mod single_trailing_newline;

#[cfg(test)]
pub(crate) mod test_support;

use crate::config::Config;
use crate::plugins::manager::{BadPluginError, PluginManager, RuleSelection};
use crate::plugins::Plugin;

pub fn all_rules(config: &Config) -> Vec<Box<dyn Plugin>> {
    let rules = &config.rules;
    vec![
        Box::new(heading_increment::HeadingIncrement::default()),
        Box::new(no_trailing_spaces::NoTrailingSpaces::new(
            &rules.no_trailing_spaces,
        )),
        Box::new(line_length::LineLength::new(&rules.line_length)),
        Box::new(no_missing_space_atx::NoMissingSpaceAtx::default()),
        Box::new(no_trailing_punctuation::NoTrailingPunctuation::new(
            &rules.no_trailing_punctuation,
        )),
        Box::new(single_trailing_newline::SingleTrailingNewline::default()),
    ]
}

/// Registers every built-in rule and applies the configured and
/// command-line selections, in that order of precedence.
pub fn build_manager(
    config: &Config,
    command_line: &RuleSelection,
) -> Result<PluginManager, BadPluginError> {
    let mut manager = PluginManager::new();
    for rule in all_rules(config) {
        manager.register(rule)?;
    }
    manager.apply_selections(&[&config.rules.selection(), command_line]);
    Ok(manager)
}
