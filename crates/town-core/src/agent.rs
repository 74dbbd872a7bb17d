//! Agent capability interface.
//!
//! Agents are opaque conversational actors. How an agent decides what to say
//! (prompting, memory retrieval, reflection) lives behind [`Agent`]; the
//! orchestrator only asks it to probe, respond and converse, and never looks
//! at which implementation it holds.

use std::fmt;
use std::path::Path;

use town_events::AgentProfile;

use crate::error::AgentError;
use crate::observation::ObservationLog;

/// One reply in a dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The speaker wants to keep talking
    Continue(String),
    /// The speaker ends the dialogue after this line
    Farewell(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Continue(text) | Reply::Farewell(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Reply::Continue(text) | Reply::Farewell(text) => text,
        }
    }

    pub fn is_farewell(&self) -> bool {
        matches!(self, Reply::Farewell(_))
    }
}

/// Core trait for a conversational actor.
///
/// Implemented by LLM-backed agents in a real deployment, by
/// [`ScriptedAgent`](crate::scripted::ScriptedAgent) for offline runs, and by
/// test doubles.
pub trait Agent {
    /// Stable name, unique within a run.
    fn name(&self) -> &str;

    /// Asks whether this agent wants to address `to` right now.
    fn probe(&mut self, to: &str, observations: &[String]) -> Result<Option<String>, AgentError>;

    /// Produces this agent's reply to `message` spoken by `speaker`.
    fn respond(
        &mut self,
        speaker: &str,
        message: &str,
        observations: &[String],
    ) -> Result<Reply, AgentError>;

    /// Runs a dialogue with `partner`, seeded by `opening`.
    ///
    /// The default alternates replies, partner first, until someone says
    /// farewell or `max_turns` replies have been made. Every line, including
    /// the opening, is written to `log`. Returns the number of replies.
    fn converse(
        &mut self,
        partner: &mut dyn Agent,
        opening: &str,
        log: &mut ObservationLog,
        max_turns: usize,
    ) -> Result<usize, AgentError> {
        let me = self.name().to_string();
        let them = partner.name().to_string();

        log.append(opening);
        let mut heard = opening.to_string();
        let mut turns = 0;

        while turns < max_turns {
            let reply = partner.respond(&me, &heard, log.entries())?;
            turns += 1;
            log.append(format!("{} said: {}", them, reply.text()));
            if reply.is_farewell() || turns >= max_turns {
                break;
            }
            heard = reply.into_text();

            let reply = self.respond(&them, &heard, log.entries())?;
            turns += 1;
            log.append(format!("{} said: {}", me, reply.text()));
            if reply.is_farewell() {
                break;
            }
            heard = reply.into_text();
        }

        Ok(turns)
    }

    /// Adds a seed memory.
    fn add_memory(&mut self, memory: &str) -> Result<(), AgentError>;

    /// Restores memory from a checkpoint directory. Returns false if nothing
    /// usable was found.
    fn try_load_memory(&mut self, _dir: &Path) -> bool {
        false
    }

    /// Writes memory to a checkpoint directory.
    fn dump_memory(&self, _dir: &Path) -> Result<(), AgentError> {
        Ok(())
    }
}

/// Builds agents from configuration records.
///
/// This is the boundary to the memory/LLM collaborator: everything an agent
/// needs beyond its profile (model clients, retrievers) is owned by the
/// factory.
pub trait AgentFactory {
    fn create(&mut self, profile: &AgentProfile) -> Result<Box<dyn Agent>, AgentError>;
}

impl<F> AgentFactory for F
where
    F: FnMut(&AgentProfile) -> Result<Box<dyn Agent>, AgentError>,
{
    fn create(&mut self, profile: &AgentProfile) -> Result<Box<dyn Agent>, AgentError> {
        self(profile)
    }
}

/// Who controls an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    Human,
    Simulated,
}

/// An agent owned by a simulation run.
pub struct AgentHandle {
    name: String,
    role: AgentRole,
    agent: Box<dyn Agent>,
}

impl AgentHandle {
    pub fn new(name: impl Into<String>, role: AgentRole, agent: Box<dyn Agent>) -> Self {
        Self {
            name: name.into(),
            role,
            agent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn is_human(&self) -> bool {
        self.role == AgentRole::Human
    }

    pub fn agent(&self) -> &dyn Agent {
        self.agent.as_ref()
    }

    pub fn agent_mut(&mut self) -> &mut dyn Agent {
        self.agent.as_mut()
    }
}

impl fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentHandle")
            .field("name", &self.name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}
