//! Command Registry
//!
//! The registry owns the full set of known commands, the matchers derived
//! from them, and an eagerly built token index for classification lookups
//! outside a full parse. Registries are immutable snapshots: customization
//! builds a new registry from the default table plus overrides and swaps it
//! in atomically (see [`lookup`]).

pub mod config;
pub mod defaults;
pub mod lookup;

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::fragments::Classification;
use crate::matchers::{RuleMatcher, ValidatorKind};
use crate::patterns::Shape;

use config::{CommandConfig, ConfigError};
use defaults::DEFAULT_GROUPS;

/// A single command with its fully resolved shape and classifications, the
/// unit the grouping step works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub name: String,
    pub shape: Shape,
    pub classifications: Vec<Classification>,
    pub validator: Option<ValidatorKind>,
}

/// Commands merged into one matching rule because they share an identical
/// (shape, classification list, validator) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGroup {
    pub commands: Vec<String>,
    pub shape: Shape,
    pub classifications: Vec<Classification>,
    pub validator: Option<ValidatorKind>,
}

/// An immutable registry snapshot.
#[derive(Debug)]
pub struct Registry {
    groups: Vec<CommandGroup>,
    matchers: Vec<RuleMatcher>,
    token_index: HashMap<String, Classification>,
}

/// Expand the default table into per-command resolved entries, preserving
/// table order.
pub fn default_commands() -> Vec<ResolvedCommand> {
    DEFAULT_GROUPS
        .iter()
        .flat_map(|group| {
            group.names.iter().map(|name| ResolvedCommand {
                name: (*name).to_string(),
                shape: group.shape,
                classifications: group.classifications.to_vec(),
                validator: group.validator,
            })
        })
        .collect()
}

static DEFAULT_REGISTRY: Lazy<Arc<Registry>> = Lazy::new(|| {
    Arc::new(Registry::from_commands(default_commands()).expect("default command table is valid"))
});

impl Registry {
    /// The registry built from the unmodified default table.
    pub fn default_registry() -> Arc<Registry> {
        Arc::clone(&DEFAULT_REGISTRY)
    }

    /// Build a registry from resolved commands. Commands sharing a (shape,
    /// classification list, validator) triple collapse into one group, kept
    /// in first-occurrence order so matcher registration order is stable.
    pub fn from_commands(commands: Vec<ResolvedCommand>) -> Result<Self, ConfigError> {
        let mut groups: Vec<CommandGroup> = Vec::new();
        for command in commands {
            if command.classifications.len() != 1 + command.shape.parameter_captures() {
                return Err(ConfigError::ParameterCountMismatch {
                    command: command.name,
                    expected: command.shape.parameter_captures(),
                    actual: command.classifications.len().saturating_sub(1),
                });
            }
            let existing = groups.iter().position(|g| {
                g.shape == command.shape
                    && g.classifications == command.classifications
                    && g.validator == command.validator
            });
            match existing {
                Some(index) => groups[index].commands.push(command.name),
                None => groups.push(CommandGroup {
                    commands: vec![command.name],
                    shape: command.shape,
                    classifications: command.classifications,
                    validator: command.validator,
                }),
            }
        }

        let mut matchers = Vec::with_capacity(groups.len());
        let mut token_index = HashMap::new();
        for group in &groups {
            let keywords: Vec<&str> = group.commands.iter().map(String::as_str).collect();
            let pattern = group.shape.build(&keywords);
            let matcher = RuleMatcher::new(
                group.commands.join(","),
                &pattern,
                group.classifications.clone(),
                group.validator,
            )
            .map_err(|e| ConfigError::Pattern(e.to_string()))?;
            matchers.push(matcher);
            for name in &group.commands {
                token_index.insert(name.clone(), group.classifications[0]);
            }
        }

        Ok(Self {
            groups,
            matchers,
            token_index,
        })
    }

    /// Build a registry from the default table with user overrides applied.
    /// Fails atomically: on any error no registry is produced and the caller
    /// keeps its current snapshot.
    pub fn with_overrides(config: &CommandConfig) -> Result<Self, ConfigError> {
        let commands = config::apply_overrides(default_commands(), config)?;
        Self::from_commands(commands)
    }

    pub fn groups(&self) -> &[CommandGroup] {
        &self.groups
    }

    /// Matchers in registration order, one per group.
    pub fn matchers(&self) -> &[RuleMatcher] {
        &self.matchers
    }

    /// Classification of a literal command token (sigil included), without
    /// a full parse. Exact name lookup first; tokens carrying attached
    /// suffix syntax the pattern consumed as part of the command (such as
    /// `\code{.py}`) fall back to the longest registered name that prefixes
    /// them.
    pub fn classification_of(&self, token: &str) -> Option<Classification> {
        let name = token.strip_prefix(['@', '\\']).unwrap_or(token);
        if let Some(&classification) = self.token_index.get(name) {
            return Some(classification);
        }
        self.token_index
            .iter()
            .filter(|(candidate, _)| name.starts_with(candidate.as_str()))
            .max_by_key(|(candidate, _)| candidate.len())
            .map(|(_, &classification)| classification)
    }
}
