//! Agent configuration records.
//!
//! One record per agent, consumed once when a run is initialized. Agent
//! files on disk are JSON:
//!
//! ```json
//! {
//!   "name": "Alice",
//!   "age": 31,
//!   "personality": "curious, stubborn",
//!   "current_status": "Alice is opening the bakery",
//!   "memories": ["Alice owes Bob a favour"]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Everything needed to construct one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Unique within a run
    pub name: String,
    pub age: u32,
    /// Free-form innate traits
    pub personality: String,
    /// First observation the agent contributes to the shared log
    pub current_status: String,
    /// Seed memories added when no checkpoint is loaded
    #[serde(default)]
    pub memories: Vec<String>,
    /// File the profile was read from; checkpoints live next to it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl AgentProfile {
    /// Creates a profile with no seed memories and no backing file.
    pub fn new(
        name: impl Into<String>,
        age: u32,
        personality: impl Into<String>,
        current_status: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            personality: personality.into(),
            current_status: current_status.into(),
            memories: Vec::new(),
            path: None,
        }
    }

    /// Adds a seed memory.
    pub fn with_memory(mut self, memory: impl Into<String>) -> Self {
        self.memories.push(memory.into());
        self
    }

    /// Sets the backing file path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Parses a profile from JSON and records where it came from.
    pub fn from_json(json: &str, path: Option<&Path>) -> Result<Self, serde_json::Error> {
        let mut profile: AgentProfile = serde_json::from_str(json)?;
        if let Some(path) = path {
            profile.path = Some(path.to_path_buf());
        }
        Ok(profile)
    }

    /// Directory holding this agent's memory checkpoint.
    ///
    /// `agents/bob.json` checkpoints into `agents/bob.checkpoint/`. Profiles
    /// built in memory have no checkpoint directory.
    pub fn checkpoint_dir(&self) -> Option<PathBuf> {
        self.path.as_ref().map(|p| p.with_extension("checkpoint"))
    }

    /// Checks the fields the orchestrator relies on.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::EmptyName);
        }
        if self.name.trim() != self.name {
            return Err(ProfileError::PaddedName(self.name.clone()));
        }
        if self.current_status.trim().is_empty() {
            return Err(ProfileError::EmptyStatus(self.name.clone()));
        }
        Ok(())
    }
}

/// Reasons a profile is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    EmptyName,
    PaddedName(String),
    EmptyStatus(String),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::EmptyName => write!(f, "agent name is empty"),
            ProfileError::PaddedName(name) => {
                write!(f, "agent name '{}' has leading or trailing whitespace", name)
            }
            ProfileError::EmptyStatus(name) => {
                write!(f, "agent '{}' has no current_status", name)
            }
        }
    }
}

impl std::error::Error for ProfileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_json() {
        let json = r#"{
            "name": "Alice",
            "age": 31,
            "personality": "curious, stubborn",
            "current_status": "Alice is opening the bakery",
            "memories": ["Alice owes Bob a favour", "Alice dislikes rain"]
        }"#;
        let profile = AgentProfile::from_json(json, Some(Path::new("agents/alice.json"))).unwrap();

        assert_eq!(profile.name, "Alice");
        assert_eq!(profile.memories.len(), 2);
        assert_eq!(
            profile.checkpoint_dir(),
            Some(PathBuf::from("agents/alice.checkpoint"))
        );
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_memories_default_to_empty() {
        let json = r#"{"name":"Bob","age":40,"personality":"calm","current_status":"Bob naps"}"#;
        let profile = AgentProfile::from_json(json, None).unwrap();
        assert!(profile.memories.is_empty());
        assert_eq!(profile.checkpoint_dir(), None);
    }

    #[test]
    fn test_validate_rejects_malformed() {
        let blank = AgentProfile::new("  ", 20, "quiet", "idle");
        assert_eq!(blank.validate(), Err(ProfileError::EmptyName));

        let padded = AgentProfile::new(" Eve", 20, "quiet", "idle");
        assert!(matches!(padded.validate(), Err(ProfileError::PaddedName(_))));

        let silent = AgentProfile::new("Eve", 20, "quiet", "");
        assert!(matches!(silent.validate(), Err(ProfileError::EmptyStatus(_))));
    }
}
