//! Scripted Agents
//!
//! A deterministic, offline stand-in for LLM-backed agents. Each agent draws
//! from its own seeded RNG, so a run with the same seed and the same
//! instructions replays identically.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use town_events::AgentProfile;

use crate::agent::{Agent, AgentFactory, Reply};
use crate::config::ScriptedConfig;
use crate::error::AgentError;

/// File name of a scripted agent's memory checkpoint.
pub const MEMORY_FILE: &str = "memory.json";

const OPENERS: [&str; 4] = [
    "have you heard?",
    "can I tell you something?",
    "I keep thinking about this:",
    "got a minute?",
];

const FAREWELLS: [&str; 3] = [
    "I should get going.",
    "Let's talk later.",
    "Anyway, see you around.",
];

/// Memory as written to a checkpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct MemoryCheckpoint {
    name: String,
    memories: Vec<String>,
}

/// Rule-based agent that gossips about its memories and recent observations.
#[derive(Debug)]
pub struct ScriptedAgent {
    profile: AgentProfile,
    memories: Vec<String>,
    rng: SmallRng,
    /// Probability of speaking up when probed
    chattiness: f32,
    /// Probability of ending a dialogue on any reply
    farewell_chance: f32,
}

impl ScriptedAgent {
    pub fn new(profile: AgentProfile, seed: u64, config: &ScriptedConfig) -> Self {
        Self {
            profile,
            memories: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
            chattiness: config.chattiness.clamp(0.0, 1.0),
            farewell_chance: 1.0 / config.patience.max(1) as f32,
        }
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn memories(&self) -> &[String] {
        &self.memories
    }

    /// Something to talk about: a memory, or failing that a recent observation.
    fn topic(&mut self, observations: &[String]) -> String {
        let recent = &observations[observations.len().saturating_sub(3)..];
        let total = self.memories.len() + recent.len();
        if total == 0 {
            return format!("{} is {}", self.profile.name, self.profile.personality);
        }
        let pick = self.rng.gen_range(0..total);
        if pick < self.memories.len() {
            self.memories[pick].clone()
        } else {
            recent[pick - self.memories.len()].clone()
        }
    }

    fn pick<'a>(&mut self, lines: &'a [&'a str]) -> &'a str {
        lines[self.rng.gen_range(0..lines.len())]
    }
}

impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.profile.name
    }

    fn probe(&mut self, to: &str, observations: &[String]) -> Result<Option<String>, AgentError> {
        if self.rng.gen::<f32>() >= self.chattiness {
            return Ok(None);
        }
        let opener = self.pick(&OPENERS);
        let topic = self.topic(observations);
        Ok(Some(format!("{}, {} {}", to, opener, topic)))
    }

    fn respond(
        &mut self,
        speaker: &str,
        message: &str,
        observations: &[String],
    ) -> Result<Reply, AgentError> {
        self.memories.push(format!("{} told {}: {}", speaker, self.profile.name, message));

        if self.rng.gen::<f32>() < self.farewell_chance {
            let farewell = self.pick(&FAREWELLS);
            return Ok(Reply::Farewell(farewell.to_string()));
        }
        let topic = self.topic(observations);
        Ok(Reply::Continue(format!("Interesting, {}. Also, {}", speaker, topic)))
    }

    fn add_memory(&mut self, memory: &str) -> Result<(), AgentError> {
        self.memories.push(memory.to_string());
        Ok(())
    }

    fn try_load_memory(&mut self, dir: &Path) -> bool {
        let path = dir.join(MEMORY_FILE);
        let Ok(content) = fs::read_to_string(&path) else {
            return false;
        };
        match serde_json::from_str::<MemoryCheckpoint>(&content) {
            Ok(checkpoint) if checkpoint.name == self.profile.name => {
                self.memories = checkpoint.memories;
                true
            }
            Ok(checkpoint) => {
                tracing::warn!(
                    "Checkpoint {:?} belongs to '{}', not '{}'",
                    path,
                    checkpoint.name,
                    self.profile.name
                );
                false
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable checkpoint {:?}: {}", path, e);
                false
            }
        }
    }

    fn dump_memory(&self, dir: &Path) -> Result<(), AgentError> {
        fs::create_dir_all(dir).map_err(|source| AgentError::Checkpoint {
            path: dir.to_path_buf(),
            source,
        })?;
        let checkpoint = MemoryCheckpoint {
            name: self.profile.name.clone(),
            memories: self.memories.clone(),
        };
        let json = serde_json::to_string_pretty(&checkpoint)?;
        let path = dir.join(MEMORY_FILE);
        fs::write(&path, json).map_err(|source| AgentError::Checkpoint { path, source })
    }
}

/// Builds [`ScriptedAgent`]s with per-agent seeds derived from one run seed.
#[derive(Debug, Clone)]
pub struct ScriptedAgentFactory {
    config: ScriptedConfig,
    created: u64,
}

impl ScriptedAgentFactory {
    pub fn new(config: ScriptedConfig) -> Self {
        Self { config, created: 0 }
    }
}

impl AgentFactory for ScriptedAgentFactory {
    fn create(&mut self, profile: &AgentProfile) -> Result<Box<dyn Agent>, AgentError> {
        let seed = self
            .config
            .seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(self.created);
        self.created += 1;
        Ok(Box::new(ScriptedAgent::new(profile.clone(), seed, &self.config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config(chattiness: f32, patience: u32) -> ScriptedConfig {
        ScriptedConfig {
            seed: 7,
            chattiness,
            patience,
        }
    }

    fn alice(config: &ScriptedConfig) -> ScriptedAgent {
        let profile = AgentProfile::new("Alice", 31, "curious", "Alice is baking");
        ScriptedAgent::new(profile, 99, config)
    }

    #[test]
    fn test_silent_agent_never_speaks() {
        let mut agent = alice(&config(0.0, 3));
        for _ in 0..50 {
            assert_eq!(agent.probe("Bob", &[]).unwrap(), None);
        }
    }

    #[test]
    fn test_chatty_agent_addresses_target() {
        let mut agent = alice(&config(1.0, 3));
        agent.add_memory("Alice found a lost cat").unwrap();
        let message = agent.probe("Bob", &[]).unwrap().unwrap();
        assert!(message.starts_with("Bob, "));
        assert!(message.ends_with("Alice found a lost cat"));
    }

    #[test]
    fn test_impatient_agent_says_goodbye() {
        let mut agent = alice(&config(1.0, 1));
        let reply = agent.respond("Bob", "hello", &[]).unwrap();
        assert!(reply.is_farewell());
        // What it heard is remembered
        assert_eq!(agent.memories(), &["Bob told Alice: hello"]);
    }

    #[test]
    fn test_same_seed_same_behavior() {
        let cfg = config(0.5, 3);
        let mut first = alice(&cfg);
        let mut second = alice(&cfg);
        let observations = vec!["Bob is fishing".to_string()];

        for _ in 0..20 {
            assert_eq!(
                first.probe("Bob", &observations).unwrap(),
                second.probe("Bob", &observations).unwrap()
            );
        }
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let dir = tempdir().unwrap();
        let cfg = config(0.5, 3);

        let mut original = alice(&cfg);
        original.add_memory("Alice owes Bob a favour").unwrap();
        original.dump_memory(dir.path()).unwrap();

        let mut restored = alice(&cfg);
        assert!(restored.try_load_memory(dir.path()));
        assert_eq!(restored.memories(), &["Alice owes Bob a favour"]);
    }

    #[test]
    fn test_checkpoint_for_other_agent_is_rejected() {
        let dir = tempdir().unwrap();
        let cfg = config(0.5, 3);
        alice(&cfg).dump_memory(dir.path()).unwrap();

        let profile = AgentProfile::new("Bob", 40, "calm", "Bob naps");
        let mut bob = ScriptedAgent::new(profile, 1, &cfg);
        assert!(!bob.try_load_memory(dir.path()));
        assert!(!bob.try_load_memory(&dir.path().join("missing")));
    }

    #[test]
    fn test_factory_gives_distinct_seeds() {
        let mut factory = ScriptedAgentFactory::new(config(0.5, 3));
        let a = factory
            .create(&AgentProfile::new("A", 1, "x", "A idles"))
            .unwrap();
        let b = factory
            .create(&AgentProfile::new("B", 1, "x", "B idles"))
            .unwrap();
        assert_eq!(a.name(), "A");
        assert_eq!(b.name(), "B");
    }
}
