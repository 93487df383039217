use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::plugins::manager::RuleSelection;

pub const CONFIG_FILE_NAME: &str = ".pymlintrc.toml";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip)]
    pub format: OutputFormat,
    pub ignore: Vec<String>,
    pub rules: RulesConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    #[serde(rename = "no-trailing-spaces")]
    pub no_trailing_spaces: NoTrailingSpacesConfig,
    #[serde(rename = "line-length")]
    pub line_length: LineLengthConfig,
    #[serde(rename = "no-trailing-punctuation")]
    pub no_trailing_punctuation: NoTrailingPunctuationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NoTrailingSpacesConfig {
    pub br_spaces: usize,
    pub strict: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LineLengthConfig {
    pub line_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NoTrailingPunctuationConfig {
    pub punctuation: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            ignore: vec!["node_modules".into(), ".git".into(), "target".into()],
            rules: RulesConfig::default(),
        }
    }
}

impl Default for NoTrailingSpacesConfig {
    fn default() -> Self {
        Self {
            br_spaces: 2,
            strict: false,
        }
    }
}

impl Default for LineLengthConfig {
    fn default() -> Self {
        Self { line_length: 80 }
    }
}

impl Default for NoTrailingPunctuationConfig {
    fn default() -> Self {
        Self {
            punctuation: ".,;:!。，；：！".to_string(),
        }
    }
}

impl RulesConfig {
    pub fn selection(&self) -> RuleSelection {
        RuleSelection {
            enable: self.enable.clone(),
            disable: self.disable.clone(),
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        let path = config_path.map(Path::to_path_buf).or_else(|| {
            let default = project_root.join(CONFIG_FILE_NAME);
            default.exists().then_some(default)
        });

        match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                let content = std::fs::read_to_string(&path)?;
                toml::from_str(&content).map_err(|e| anyhow::anyhow!("Config parse error: {e}"))
            }
            None => Ok(Config::default()),
        }
    }

    pub const fn default_toml() -> &'static str {
        r#"# pymlint configuration

# Directories and files to skip when walking directories (glob patterns)
ignore = ["node_modules", ".git", "target"]

[rules]
# Rule ids, names or aliases to force on or off.
# Command-line --enable-rules/--disable-rules take precedence.
enable = []
disable = []

[rules.no-trailing-spaces]
# Trailing spaces accepted as a hard line break.
br_spaces = 2
strict = false

[rules.line-length]
line_length = 80

[rules.no-trailing-punctuation]
punctuation = ".,;:!。，；：！"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ignore.len(), 3);
        assert!(config.rules.enable.is_empty());
        assert!(config.rules.disable.is_empty());
        assert_eq!(config.rules.no_trailing_spaces.br_spaces, 2);
        assert!(!config.rules.no_trailing_spaces.strict);
        assert_eq!(config.rules.line_length.line_length, 80);
        assert!(config.rules.no_trailing_punctuation.punctuation.contains('!'));
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
ignore = [".git"]

[rules]
disable = ["md013"]

[rules.no-trailing-spaces]
strict = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ignore, vec![".git"]);
        assert_eq!(config.rules.disable, vec!["md013"]);
        assert!(config.rules.no_trailing_spaces.strict);
        assert_eq!(config.rules.no_trailing_spaces.br_spaces, 2);
    }

    #[test]
    fn test_parse_line_length() {
        let toml_str = r#"
[rules.line-length]
line_length = 120
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.rules.line_length.line_length, 120);
    }

    #[test]
    fn test_selection_from_rules() {
        let toml_str = r#"
[rules]
enable = ["md001"]
disable = ["line-length"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        let selection = config.rules.selection();
        assert_eq!(selection.enable, vec!["md001"]);
        assert_eq!(selection.disable, vec!["line-length"]);
    }

    #[test]
    fn test_config_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "invalid toml [[[").unwrap();

        let result = Config::load(Some(&path), dir.path());
        assert!(result.is_err(), "Invalid TOML should return Err");
        assert!(
            result.unwrap_err().to_string().contains("parse error"),
            "Error should mention parse error"
        );
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let result = Config::load(
            Some(Path::new("/nonexistent/config.toml")),
            Path::new("/tmp"),
        );
        assert!(result.is_err(), "Non-existent config path should return Err");
    }

    #[test]
    fn test_config_load_no_config_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.ignore, Config::default().ignore);
        assert_eq!(config.rules.line_length.line_length, 80);
    }

    #[test]
    fn test_config_discovered_in_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[rules.line-length]\nline_length = 40\n",
        )
        .unwrap();
        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.rules.line_length.line_length, 40);
    }

    #[test]
    fn test_default_toml_template_is_parseable() {
        let config: Config = toml::from_str(Config::default_toml()).unwrap();
        assert_eq!(config.rules.no_trailing_spaces.br_spaces, 2);
        assert_eq!(
            config.rules.no_trailing_punctuation.punctuation,
            NoTrailingPunctuationConfig::default().punctuation
        );
    }
}
