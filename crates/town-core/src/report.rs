//! Per-tick reports returned by the step controller.

use serde::Serialize;
use town_events::InstructionKind;

/// A finished agent-to-agent conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationRecord {
    /// Agent whose probe produced the opening line
    pub initiator: String,
    pub partner: String,
    /// Replies exchanged after the opening line
    pub turns: usize,
}

/// A finished exchange with the human.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub agent: String,
    /// Human lines the agent answered
    pub exchanges: usize,
}

/// A collaborator or transport failure that cut one interaction short.
///
/// `retryable` marks transient collaborator failures (generation, memory
/// retrieval) that are worth asking again on a later tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnFailure {
    Probe {
        agent: String,
        target: String,
        error: String,
        retryable: bool,
    },
    Conversation {
        initiator: String,
        partner: String,
        error: String,
        retryable: bool,
    },
    Session {
        agent: String,
        error: String,
        retryable: bool,
    },
}

impl TurnFailure {
    pub fn is_retryable(&self) -> bool {
        match self {
            TurnFailure::Probe { retryable, .. }
            | TurnFailure::Conversation { retryable, .. }
            | TurnFailure::Session { retryable, .. } => *retryable,
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub instruction: InstructionKind,
    /// Scheduler passes run (two for `continue`, none for `interview`)
    pub passes: usize,
    /// Simulated agents that addressed the human, in order
    pub whispers: Vec<String>,
    pub sessions: Vec<SessionSummary>,
    /// Unordered simulated pairs considered by the second pass
    pub pairs_evaluated: usize,
    pub conversations: Vec<ConversationRecord>,
    pub failures: Vec<TurnFailure>,
    /// Observations appended this tick
    pub observations_added: usize,
    /// Observations dropped by retention at the end of this tick
    pub evicted: usize,
}

impl TickReport {
    pub fn new(tick: u64, instruction: InstructionKind) -> Self {
        Self {
            tick,
            instruction,
            passes: 0,
            whispers: Vec::new(),
            sessions: Vec::new(),
            pairs_evaluated: 0,
            conversations: Vec::new(),
            failures: Vec::new(),
            observations_added: 0,
            evicted: 0,
        }
    }

    /// True if nobody spoke this tick.
    pub fn is_quiet(&self) -> bool {
        self.whispers.is_empty() && self.sessions.is_empty() && self.conversations.is_empty()
    }
}

/// Result of a `step` call.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// A tick ran and was committed
    Ticked(TickReport),
    /// The run ended; `ticks` is the number of ticks it produced
    Exited { ticks: u64 },
}

impl StepOutcome {
    /// The tick report, if a tick ran.
    pub fn report(&self) -> Option<&TickReport> {
        match self {
            StepOutcome::Ticked(report) => Some(report),
            StepOutcome::Exited { .. } => None,
        }
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, StepOutcome::Exited { .. })
    }
}
