//! Configuration loading for a town run.
//!
//! Run settings come from a TOML file; each agent is described by its own
//! JSON profile file listed in `agent_files`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use town_events::AgentProfile;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "town.toml";

/// Complete run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TownConfig {
    /// Orchestration settings
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Settings for the built-in scripted agents
    #[serde(default)]
    pub scripted: ScriptedConfig,
}

impl TownConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: TownConfig = toml::from_str(content).map_err(ConfigError::TomlError)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, TomlSerializeError> {
        toml::to_string_pretty(self).map_err(TomlSerializeError)
    }

    /// Checks values that would only fail later, at init.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.timewindow_size == 0 {
            return Err(ConfigError::Invalid(
                "simulation.timewindow_size must be at least 1".to_string(),
            ));
        }
        if self.simulation.max_conversation_turns == 0 {
            return Err(ConfigError::Invalid(
                "simulation.max_conversation_turns must be at least 1".to_string(),
            ));
        }
        if self.simulation.exit_token.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "simulation.exit_token must not be blank".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.scripted.chattiness) {
            return Err(ConfigError::Invalid(
                "scripted.chattiness must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Reads every agent file, resolving relative paths against `base_dir`.
    pub fn load_profiles(&self, base_dir: &Path) -> Result<Vec<AgentProfile>, ConfigError> {
        self.simulation
            .agent_files
            .iter()
            .map(|file| {
                let path = if file.is_absolute() {
                    file.clone()
                } else {
                    base_dir.join(file)
                };
                let content = fs::read_to_string(&path)
                    .map_err(|e| ConfigError::IoError(path.clone(), e))?;
                AgentProfile::from_json(&content, Some(&path))
                    .map_err(|e| ConfigError::JsonError(path.clone(), e))
            })
            .collect()
    }
}

/// Orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ticks of observations kept in the shared log
    pub timewindow_size: usize,
    /// Index into `agent_files` of the human-controlled agent
    pub user_role: usize,
    /// Restore agent memory from checkpoints instead of seeding it
    pub from_checkpoint: bool,
    /// Maximum replies in one agent-to-agent conversation
    pub max_conversation_turns: usize,
    /// Line that ends a conversation on text transports
    pub exit_token: String,
    /// Agent profile files, in roster order
    pub agent_files: Vec<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timewindow_size: 5,
            user_role: 0,
            from_checkpoint: false,
            max_conversation_turns: 8,
            exit_token: "exit".to_string(),
            agent_files: Vec::new(),
        }
    }
}

/// Settings for [`ScriptedAgent`](crate::scripted::ScriptedAgent).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptedConfig {
    /// Run seed; each agent derives its own
    pub seed: u64,
    /// Probability an agent speaks up when probed
    pub chattiness: f32,
    /// Expected number of replies before an agent says goodbye
    pub patience: u32,
}

impl Default for ScriptedConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            chattiness: 0.35,
            patience: 4,
        }
    }
}

/// Returns the default configuration as a TOML string.
pub fn default_config_toml() -> Result<String, TomlSerializeError> {
    TownConfig::default().to_toml()
}

/// Errors that can occur during configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading a config or agent file
    IoError(PathBuf, std::io::Error),
    /// Error parsing TOML config
    TomlError(toml::de::Error),
    /// Error parsing an agent profile
    JsonError(PathBuf, serde_json::Error),
    /// A value is out of range
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => write!(f, "IO error reading {:?}: {}", path, e),
            ConfigError::TomlError(e) => write!(f, "TOML parse error: {}", e),
            ConfigError::JsonError(path, e) => write!(f, "Agent file {:?}: {}", path, e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(_, e) => Some(e),
            ConfigError::TomlError(e) => Some(e),
            ConfigError::JsonError(_, e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

/// Error that can occur during TOML serialization.
#[derive(Debug)]
pub struct TomlSerializeError(pub toml::ser::Error);

impl std::fmt::Display for TomlSerializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TOML serialize error: {}", self.0)
    }
}

impl std::error::Error for TomlSerializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = TownConfig::default();
        assert_eq!(config.simulation.timewindow_size, 5);
        assert_eq!(config.simulation.exit_token, "exit");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = TownConfig::from_str(
            r#"
            [simulation]
            timewindow_size = 2
            user_role = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.simulation.timewindow_size, 2);
        assert_eq!(config.simulation.user_role, 1);
        assert_eq!(config.simulation.max_conversation_turns, 8);
        assert_eq!(config.scripted.seed, 42);
    }

    #[test]
    fn test_rejects_zero_window() {
        let result = TownConfig::from_str("[simulation]\ntimewindow_size = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_default_toml_round_trips() {
        let toml = default_config_toml().unwrap();
        let parsed = TownConfig::from_str(&toml).unwrap();
        assert_eq!(parsed.simulation.timewindow_size, 5);
        assert_eq!(parsed.scripted.patience, 4);
    }

    #[test]
    fn test_load_profiles_relative_to_base() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("alice.json"),
            r#"{"name":"Alice","age":31,"personality":"curious","current_status":"Alice is baking","memories":["a"]}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("bob.json"),
            r#"{"name":"Bob","age":40,"personality":"calm","current_status":"Bob is fishing"}"#,
        )
        .unwrap();

        let mut config = TownConfig::default();
        config.simulation.agent_files = vec!["alice.json".into(), "bob.json".into()];
        let profiles = config.load_profiles(dir.path()).unwrap();

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "Alice");
        assert_eq!(profiles[1].path.as_deref(), Some(dir.path().join("bob.json").as_path()));
    }

    #[test]
    fn test_missing_agent_file() {
        let dir = tempdir().unwrap();
        let mut config = TownConfig::default();
        config.simulation.agent_files = vec!["ghost.json".into()];
        assert!(matches!(
            config.load_profiles(dir.path()),
            Err(ConfigError::IoError(_, _))
        ));
    }
}
