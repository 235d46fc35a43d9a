//! Configuration management
//!
//! Stands in for the persistence layer: which bots exist, which actions each
//! bot runs, and how their results are formatted.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::errors::ConfigError;
use crate::domain::entities::{OutputFormat, DEFAULT_NAMESPACE};

/// Service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub bots: Vec<BotConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServiceConfig {
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "anthill-bot".to_string(),
            namespace: default_namespace(),
        }
    }
}

/// One bot and the actions it runs
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub automation: AutomationConfig,
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

impl BotConfig {
    /// Groups the bot should join after connecting, in configured order
    pub fn connect_groups(&self) -> Vec<String> {
        self.automation
            .connect
            .iter()
            .map(|c| c.group.clone())
            .collect()
    }

    pub fn enabled_actions(&self) -> impl Iterator<Item = &ActionConfig> {
        self.actions.iter().filter(|a| a.enabled)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AutomationConfig {
    #[serde(default)]
    pub connect: Vec<ConnectGroup>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConnectGroup {
    pub group: String,
}

/// One action attached to a bot
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ActionConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Identifier looked up in the action resolver
    pub value: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub formatter: Option<FormatterConfig>,
}

impl ActionConfig {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            value: value.into(),
            enabled: true,
            formatter: None,
        }
    }

    /// The formatter's output format, if one is attached and enabled
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.formatter
            .as_ref()
            .filter(|f| f.enabled)
            .map(|f| OutputFormat::template(f.template.clone(), f.content_type.clone()))
    }
}

/// Result formatter attached to an action
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FormatterConfig {
    pub template: String,
    #[serde(default = "default_formatter_content_type")]
    pub content_type: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_formatter_content_type() -> String {
    "text/plain".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            bots: vec![BotConfig {
                name: "anthill".to_string(),
                description: "Default messenger bot".to_string(),
                enabled: true,
                automation: AutomationConfig::default(),
                actions: vec![ActionConfig {
                    name: "commands".to_string(),
                    description: "Built-in commands".to_string(),
                    value: "commands".to_string(),
                    enabled: true,
                    formatter: None,
                }],
            }],
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();

        if let Ok(namespace) = std::env::var("BOT_NAMESPACE") {
            config.service.namespace = namespace;
        }

        if let Ok(name) = std::env::var("BOT_SERVICE_NAME") {
            config.service.name = name;
        }

        config
    }

    pub fn enabled_bots(&self) -> impl Iterator<Item = &BotConfig> {
        self.bots.iter().filter(|b| b.enabled)
    }

    pub fn bot(&self, name: &str) -> Option<&BotConfig> {
        self.bots.iter().find(|b| b.name == name)
    }

    /// Bot names must be unique
    fn validate(&self) -> Result<(), ConfigError> {
        for (i, bot) in self.bots.iter().enumerate() {
            if bot.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue("bot name must not be empty".to_string()));
            }
            if self.bots[..i].iter().any(|b| b.name == bot.name) {
                return Err(ConfigError::InvalidValue(format!(
                    "duplicate bot name: {}",
                    bot.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
service:
  name: messenger-bots
bots:
  - name: helper
    description: Answers commands
    automation:
      connect:
        - group: lobby
        - group: support
    actions:
      - name: commands
        value: commands
        formatter:
          template: "Result: {{ help }}"
      - name: disabled
        value: commands
        enabled: false
  - name: sleeper
    enabled: false
"#;

    #[test]
    fn test_parse_sample() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.service.name, "messenger-bots");
        assert_eq!(config.service.namespace, "/messenger");

        let helper = config.bot("helper").unwrap();
        assert_eq!(helper.connect_groups(), vec!["lobby", "support"]);
        assert_eq!(helper.enabled_actions().count(), 1);

        let format = helper.actions[0].output_format().unwrap();
        assert_eq!(format.template.as_deref(), Some("Result: {{ help }}"));
        assert_eq!(format.content_type, "text/plain");

        let enabled: Vec<_> = config.enabled_bots().map(|b| b.name.as_str()).collect();
        assert_eq!(enabled, vec!["helper"]);
    }

    #[test]
    fn test_disabled_formatter_is_ignored() {
        let mut action = ActionConfig::new("commands", "commands");
        action.formatter = Some(FormatterConfig {
            template: "x".into(),
            content_type: "text/plain".into(),
            enabled: false,
        });
        assert!(action.output_format().is_none());
    }

    #[test]
    fn test_default_round_trips_through_yaml() {
        let yaml = Config::default().to_yaml().unwrap();
        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.bots.len(), 1);
        assert_eq!(parsed.bots[0].actions[0].value, "commands");
        assert!(parsed.bots[0].connect_groups().is_empty());
    }

    #[test]
    fn test_duplicate_bot_names_rejected() {
        let yaml = "bots:\n  - name: a\n  - name: a\n";
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            Config::from_yaml("bots: [name"),
            Err(ConfigError::Parse(_))
        ));
    }
}
