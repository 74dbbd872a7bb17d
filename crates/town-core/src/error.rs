//! Error types for the orchestrator and its collaborators.

use std::path::PathBuf;

use thiserror::Error;
use town_events::ProfileError;

/// Fatal problems found while assembling a run. No tick has run yet.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("at least 2 agents are required, got {count}")]
    TooFewAgents { count: usize },

    #[error("human agent index {index} is out of range for {count} agents")]
    HumanIndexOutOfRange { index: usize, count: usize },

    #[error("agent name '{0}' is used more than once")]
    DuplicateName(String),

    #[error("agent record {index} is malformed: {source}")]
    MalformedProfile {
        index: usize,
        #[source]
        source: ProfileError,
    },

    #[error("retention window must cover at least one tick")]
    InvalidWindow,

    #[error("could not create agent '{name}': {source}")]
    AgentCreation {
        name: String,
        #[source]
        source: AgentError,
    },

    #[error("could not write checkpoint for agent '{name}': {source}")]
    Checkpoint {
        name: String,
        #[source]
        source: AgentError,
    },
}

/// Failures of the memory/LLM collaborator behind an agent.
///
/// These abort only the probe, conversation or session they happen in.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("generation failed: {0}")]
    Generation(String),

    #[error("memory retrieval failed: {0}")]
    Memory(String),

    #[error("checkpoint {path:?}: {source}")]
    Checkpoint {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("checkpoint encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl AgentError {
    /// Generation and retrieval failures are transient; checkpoint I/O is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AgentError::Generation(_) | AgentError::Memory(_))
    }
}

/// Problems talking to the human over the attached transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no transport attached or peer disconnected")]
    Unavailable,

    #[error("transport I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Why an interactive session stopped early.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("agent '{name}' failed to respond: {source}")]
    Agent {
        name: String,
        #[source]
        source: AgentError,
    },
}

impl SessionError {
    /// Follows the agent failure; a lost transport is not retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            SessionError::Transport(_) => false,
            SessionError::Agent { source, .. } => source.is_retryable(),
        }
    }
}

/// Rejected `step` calls. The tick counter is never advanced when these occur.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("invalid instruction: {0}")]
    InvalidInstruction(String),

    #[error("no agent named '{0}' in this run")]
    UnknownAgent(String),

    #[error("'{0}' is the human-controlled agent and cannot be interviewed")]
    HumanTarget(String),

    #[error("the run has exited; no further ticks are accepted")]
    Terminated,
}

impl From<town_events::ParseInstructionError> for StepError {
    fn from(e: town_events::ParseInstructionError) -> Self {
        StepError::InvalidInstruction(e.to_string())
    }
}
