//! Registry Customization
//!
//! Serializable override lists that rebuild the registry with user-chosen
//! classifications. A version tag accompanies saved configurations so older
//! files can be migrated before being applied; migrations are additive and
//! never silently drop a user's customization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fragments::Classification;
use crate::registry::ResolvedCommand;

/// Current configuration schema version.
///
/// v1 predates the direction-qualifier slot of `\param`; migrating a v1
/// file inserts the default qualifier classification so the parameter list
/// lines up with the current shape.
pub const CONFIG_VERSION: u32 = 2;

/// One user override: the command keeps its default shape, but the command
/// token and each parameter capture get the chosen classifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOverride {
    pub command: String,
    pub classification: Classification,
    #[serde(default)]
    pub parameters: Vec<Classification>,
}

/// A versioned override list, the unit of (de)serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    pub version: u32,
    pub commands: Vec<CommandOverride>,
}

impl CommandConfig {
    pub fn new(commands: Vec<CommandOverride>) -> Self {
        Self {
            version: CONFIG_VERSION,
            commands,
        }
    }

    /// Parse a saved configuration and migrate it to the current schema.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CommandConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Format(e.to_string()))?;
        config.migrate()
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Format(e.to_string()))
    }

    /// Bring an older configuration up to [`CONFIG_VERSION`]. Versions newer
    /// than this build understands are rejected rather than guessed at.
    pub fn migrate(mut self) -> Result<Self, ConfigError> {
        if self.version > CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(self.version));
        }
        if self.version < 2 {
            // v1 stored `param` with a single parameter classification; the
            // current shape captures the direction qualifier first.
            for command in &mut self.commands {
                if command.command == "param" && command.parameters.len() == 1 {
                    command.parameters.insert(0, Classification::Parameter2);
                }
            }
        }
        self.version = CONFIG_VERSION;
        Ok(self)
    }
}

/// Errors from loading or applying a configuration. Configuration failures
/// are atomic: the previous registry snapshot stays active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Override names a command the default table does not know.
    UnknownCommand(String),
    /// Override's parameter list length does not match the command's shape.
    ParameterCountMismatch {
        command: String,
        expected: usize,
        actual: usize,
    },
    /// Saved configuration uses a schema newer than this build.
    UnsupportedVersion(u32),
    /// Saved configuration is not valid JSON for the schema.
    Format(String),
    /// A rebuilt rule failed to compile.
    Pattern(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownCommand(command) => {
                write!(f, "unknown command '{}'", command)
            }
            ConfigError::ParameterCountMismatch {
                command,
                expected,
                actual,
            } => write!(
                f,
                "command '{}' takes {} parameter classification(s), got {}",
                command, expected, actual
            ),
            ConfigError::UnsupportedVersion(version) => {
                write!(f, "unsupported configuration version {}", version)
            }
            ConfigError::Format(detail) => write!(f, "malformed configuration: {}", detail),
            ConfigError::Pattern(detail) => write!(f, "rule construction failed: {}", detail),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Apply overrides to the resolved default commands. Every override must
/// name a known command and supply exactly as many parameter
/// classifications as the command's shape captures.
pub fn apply_overrides(
    mut commands: Vec<ResolvedCommand>,
    config: &CommandConfig,
) -> Result<Vec<ResolvedCommand>, ConfigError> {
    for override_ in &config.commands {
        let command = commands
            .iter_mut()
            .find(|c| c.name == override_.command)
            .ok_or_else(|| ConfigError::UnknownCommand(override_.command.clone()))?;
        let expected = command.shape.parameter_captures();
        if override_.parameters.len() != expected {
            return Err(ConfigError::ParameterCountMismatch {
                command: override_.command.clone(),
                expected,
                actual: override_.parameters.len(),
            });
        }
        let mut classifications = Vec::with_capacity(1 + expected);
        classifications.push(override_.classification);
        classifications.extend_from_slice(&override_.parameters);
        command.classifications = classifications;
    }
    Ok(commands)
}

/// The configuration-list representation of resolved commands, suitable for
/// persisting and for round-tripping back through [`apply_overrides`].
pub fn to_config(commands: &[ResolvedCommand]) -> CommandConfig {
    CommandConfig::new(
        commands
            .iter()
            .map(|command| CommandOverride {
                command: command.name.clone(),
                classification: command.classifications[0],
                parameters: command.classifications[1..].to_vec(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{default_commands, Registry};

    #[test]
    fn test_unknown_command_rejected() {
        let config = CommandConfig::new(vec![CommandOverride {
            command: "nosuch".to_string(),
            classification: Classification::Command2,
            parameters: vec![],
        }]);
        assert_eq!(
            apply_overrides(default_commands(), &config),
            Err(ConfigError::UnknownCommand("nosuch".to_string()))
        );
    }

    #[test]
    fn test_parameter_count_mismatch_rejected() {
        let config = CommandConfig::new(vec![CommandOverride {
            command: "retval".to_string(),
            classification: Classification::Command2,
            parameters: vec![],
        }]);
        assert_eq!(
            apply_overrides(default_commands(), &config),
            Err(ConfigError::ParameterCountMismatch {
                command: "retval".to_string(),
                expected: 1,
                actual: 0,
            })
        );
    }

    #[test]
    fn test_override_changes_classification() {
        let config = CommandConfig::new(vec![CommandOverride {
            command: "brief".to_string(),
            classification: Classification::Command2,
            parameters: vec![],
        }]);
        let registry = Registry::with_overrides(&config).unwrap();
        assert_eq!(
            registry.classification_of("@brief"),
            Some(Classification::Command2)
        );
        // Untouched commands keep their defaults.
        assert_eq!(
            registry.classification_of("@details"),
            Some(Classification::Command1)
        );
    }

    #[test]
    fn test_round_trip_reproduces_registry() {
        let defaults = default_commands();
        let config = to_config(&defaults);
        let round_tripped = apply_overrides(default_commands(), &config).unwrap();
        assert_eq!(defaults, round_tripped);

        let rebuilt = Registry::from_commands(round_tripped).unwrap();
        let original = Registry::default_registry();
        for command in &defaults {
            assert_eq!(
                original.classification_of(&command.name),
                rebuilt.classification_of(&command.name),
                "classification drifted for '{}'",
                command.name
            );
        }
    }

    #[test]
    fn test_v1_migration_inserts_direction_slot() {
        let json = r#"{
            "version": 1,
            "commands": [
                { "command": "param", "classification": "Command2", "parameters": ["Parameter1"] }
            ]
        }"#;
        let config = CommandConfig::from_json(json).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(
            config.commands[0].parameters,
            vec![Classification::Parameter2, Classification::Parameter1]
        );
        // The migrated configuration applies cleanly.
        Registry::with_overrides(&config).unwrap();
    }

    #[test]
    fn test_future_version_rejected() {
        let json = r#"{ "version": 99, "commands": [] }"#;
        assert_eq!(
            CommandConfig::from_json(json),
            Err(ConfigError::UnsupportedVersion(99))
        );
    }

    #[test]
    fn test_json_round_trip() {
        let config = CommandConfig::new(vec![CommandOverride {
            command: "note".to_string(),
            classification: Classification::Note,
            parameters: vec![],
        }]);
        let json = config.to_json().unwrap();
        assert_eq!(CommandConfig::from_json(&json).unwrap(), config);
    }
}
