use std::fmt::Write;

use strsim::jaro_winkler;

use crate::plugins::{FoundPlugin, PluginManager};

const SUGGESTION_THRESHOLD: f64 = 0.8;

pub fn list_plugins(manager: &PluginManager) -> String {
    let mut out = String::from("Available rules:\n\n");
    let _ = writeln!(
        out,
        "  {:<7} {:<26} {:<8} {:<8} DESCRIPTION",
        "ID", "NAME", "ENABLED", "VERSION"
    );
    for plugin in manager.plugins() {
        let details = plugin.details();
        let _ = writeln!(
            out,
            "  {:<7} {:<26} {:<8} {:<8} {}",
            details.plugin_id,
            details.plugin_name,
            if plugin.is_enabled() { "yes" } else { "no" },
            details.version,
            details.description
        );
    }
    out.push_str("\nRun `pymlint plugins <id>` for details.");
    out
}

pub fn describe(plugin: &FoundPlugin) -> String {
    let details = plugin.details();
    let mut out = format!("{}: {}\n\n", details.plugin_id, details.description);
    let _ = writeln!(out, "  Name:     {}", details.plugin_name);
    if !details.aliases.is_empty() {
        let _ = writeln!(out, "  Aliases:  {}", details.aliases.join(", "));
    }
    let _ = writeln!(
        out,
        "  Enabled:  {}",
        if details.enabled_by_default { "by default" } else { "on request" }
    );
    let _ = write!(out, "  Version:  {}", details.version);
    out
}

/// The closest known id, name or alias to an unknown one.
pub fn suggest(manager: &PluginManager, unknown: &str) -> Option<String> {
    let unknown = unknown.to_lowercase();
    manager
        .id_map()
        .keys()
        .map(|known| (jaro_winkler(&unknown, known), known))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0).then_with(|| b.1.cmp(a.1)))
        .map(|(_, known)| known.clone())
}
