use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use super::{finalize_reports, Plugin, PluginDetails, PluginError, RuleContext, ScanContext};
use crate::parser::types::Token;
use crate::types::Violation;

/// Registering a plugin failed. Fatal to the whole run.
#[derive(Debug, Error)]
pub enum BadPluginError {
    #[error("Plugin {field} '{value}' is not valid: ids may only contain ASCII letters, digits and '-'.")]
    Malformed { field: &'static str, value: String },

    #[error("Unable to register plugin '{plugin_id}': id '{id}' is already registered by plugin '{existing}'.")]
    Duplicate {
        plugin_id: String,
        id: String,
        existing: String,
    },
}

/// Ids to force on or off. Disabling wins within one selection.
#[derive(Debug, Clone, Default)]
pub struct RuleSelection {
    pub enable: Vec<String>,
    pub disable: Vec<String>,
}

impl RuleSelection {
    /// Parses comma separated `--enable-rules`/`--disable-rules` values.
    pub fn from_lists(enable: &str, disable: &str) -> Self {
        let split = |list: &str| -> Vec<String> {
            list.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect()
        };
        Self {
            enable: split(enable),
            disable: split(disable),
        }
    }
}

pub struct FoundPlugin {
    details: PluginDetails,
    enabled: bool,
    violation_count: usize,
    instance: Box<dyn Plugin>,
}

impl FoundPlugin {
    pub fn details(&self) -> &PluginDetails {
        &self.details
    }

    pub fn plugin_id(&self) -> &str {
        &self.details.plugin_id
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn violation_count(&self) -> usize {
        self.violation_count
    }

    fn all_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.details.plugin_id.as_str())
            .chain(std::iter::once(self.details.plugin_name.as_str()))
            .chain(self.details.aliases.iter().map(String::as_str))
    }
}

impl std::fmt::Debug for FoundPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoundPlugin")
            .field("details", &self.details)
            .field("enabled", &self.enabled)
            .field("violation_count", &self.violation_count)
            .finish_non_exhaustive()
    }
}

/// The set of loaded rules and the driver of their per-file hooks.
#[derive(Debug, Default)]
pub struct PluginManager {
    plugins: Vec<FoundPlugin>,
    id_map: HashMap<String, String>,
    index_map: HashMap<String, usize>,
    number_of_scan_failures: usize,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, instance: Box<dyn Plugin>) -> Result<(), BadPluginError> {
        let details = instance.details();
        validate_id("id", &details.plugin_id)?;
        validate_id("name", &details.plugin_name)?;
        for alias in &details.aliases {
            validate_id("alias", alias)?;
        }

        let plugin = FoundPlugin {
            enabled: details.enabled_by_default,
            details,
            violation_count: 0,
            instance,
        };

        let mut keys: Vec<String> = plugin.all_ids().map(str::to_lowercase).collect();
        keys.sort();
        keys.dedup();
        for key in &keys {
            if let Some(existing) = self.id_map.get(key) {
                return Err(BadPluginError::Duplicate {
                    plugin_id: plugin.details.plugin_id.clone(),
                    id: key.clone(),
                    existing: existing.clone(),
                });
            }
        }

        let index = self.plugins.len();
        for key in keys {
            self.id_map
                .insert(key.clone(), plugin.details.plugin_id.clone());
            self.index_map.insert(key, index);
        }
        debug!(plugin = %plugin.details.plugin_id, "plugin registered");
        self.plugins.push(plugin);
        Ok(())
    }

    /// Applies selections from lowest to highest precedence.
    pub fn apply_selections(&mut self, selections: &[&RuleSelection]) {
        for plugin in &mut self.plugins {
            plugin.enabled = plugin.details.enabled_by_default;
        }
        for selection in selections {
            for id in selection.enable.iter() {
                self.set_enabled(id, true);
            }
            for id in selection.disable.iter() {
                self.set_enabled(id, false);
            }
        }
    }

    fn set_enabled(&mut self, id: &str, enabled: bool) {
        match self.index_map.get(&id.to_lowercase()) {
            Some(&index) => self.plugins[index].enabled = enabled,
            None => warn!(id, "unknown rule id in rule selection"),
        }
    }

    /// Looks a rule up by id, name or alias, ignoring case.
    pub fn find(&self, id: &str) -> Option<&FoundPlugin> {
        self.index_map
            .get(&id.to_lowercase())
            .and_then(|&index| self.plugins.get(index))
    }

    /// Lowercase id, name and alias to canonical id.
    pub fn id_map(&self) -> &HashMap<String, String> {
        &self.id_map
    }

    pub fn plugins(&self) -> &[FoundPlugin] {
        &self.plugins
    }

    pub fn enabled_plugins(&self) -> impl Iterator<Item = &FoundPlugin> {
        self.plugins.iter().filter(|p| p.enabled)
    }

    /// Files that finished with at least one violation.
    pub fn number_of_scan_failures(&self) -> usize {
        self.number_of_scan_failures
    }

    pub fn starting_new_file(&mut self, file: &Path) -> ScanContext {
        for plugin in self.plugins.iter_mut().filter(|p| p.enabled) {
            plugin.instance.starting_new_file();
        }
        ScanContext::new(file)
    }

    pub fn next_line(
        &mut self,
        context: &mut ScanContext,
        line_number: usize,
        line: &str,
    ) -> Result<(), PluginError> {
        for (index, plugin) in self.plugins.iter_mut().enumerate() {
            if !plugin.enabled {
                continue;
            }
            let mut rule_ctx = RuleContext::new(context, index);
            plugin
                .instance
                .next_line(&mut rule_ctx, line_number, line)
                .map_err(|e| hook_failure(&plugin.details, "next_line", e))?;
        }
        Ok(())
    }

    pub fn next_token(&mut self, context: &mut ScanContext, token: &Token) -> Result<(), PluginError> {
        for (index, plugin) in self.plugins.iter_mut().enumerate() {
            if !plugin.enabled {
                continue;
            }
            let mut rule_ctx = RuleContext::new(context, index);
            plugin
                .instance
                .next_token(&mut rule_ctx, token)
                .map_err(|e| hook_failure(&plugin.details, "next_token", e))?;
        }
        Ok(())
    }

    /// Runs the end-of-file hooks, then drops suppressed reports and returns
    /// the surviving violations in line order.
    pub fn completed_file(
        &mut self,
        context: &mut ScanContext,
        line_count: usize,
    ) -> Result<Vec<Violation>, PluginError> {
        context.set_line_count(line_count);
        for (index, plugin) in self.plugins.iter_mut().enumerate() {
            if !plugin.enabled {
                continue;
            }
            let mut rule_ctx = RuleContext::new(context, index);
            plugin
                .instance
                .completed_file(&mut rule_ctx)
                .map_err(|e| hook_failure(&plugin.details, "completed_file", e))?;
        }

        let pending = context.take_pending();
        let violations = finalize_reports(context, &self.plugins, pending);
        for violation in &violations {
            if let Some(&index) = self.index_map.get(&violation.rule_id.to_lowercase()) {
                self.plugins[index].violation_count += 1;
            }
        }
        if !violations.is_empty() {
            self.number_of_scan_failures += 1;
        }
        Ok(violations)
    }
}

fn hook_failure(details: &PluginDetails, hook: &'static str, error: anyhow::Error) -> PluginError {
    PluginError {
        plugin_id: details.plugin_id.clone(),
        hook,
        message: format!("{error:#}"),
    }
}

fn validate_id(field: &'static str, value: &str) -> Result<(), BadPluginError> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(BadPluginError::Malformed {
            field,
            value: value.to_string(),
        })
    }
}
