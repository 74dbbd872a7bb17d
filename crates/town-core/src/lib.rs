//! Multi-agent turn orchestration for a town of generative agents.
//!
//! Agents hold memories and converse with each other and with one
//! human-controlled participant. This crate decides, tick by tick, who
//! speaks to whom, routes the human's exchanges through whatever transport
//! is attached, and keeps the shared observation log inside its retention
//! window.
//!
//! # Architecture
//!
//! ```text
//! instruction ──▶ StepController ──┬─▶ TurnScheduler ──┬─▶ Agent::probe / converse
//!                                  │                   └─▶ InteractiveSession
//!                                  └─▶ InteractiveSession ──▶ Sink ──▶ Transport
//!                     │
//!                     └─▶ ObservationLog::commit_tick
//! ```
//!
//! # Modules
//!
//! - [`observation`]: Time-windowed shared observation log
//! - [`agent`]: Agent capability trait, handles and factories
//! - [`context`]: Per-run state
//! - [`scheduler`]: Human-facing and pairwise passes
//! - [`session`]: Agent-to-human exchanges
//! - [`controller`]: Init and the per-tick state machine
//! - [`transport`]: Console, channel and one-shot transports
//! - [`scripted`]: Deterministic offline agents
//! - [`config`]: TOML run configuration

pub mod agent;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod observation;
pub mod report;
pub mod scheduler;
pub mod scripted;
pub mod session;
pub mod transport;

pub use agent::{Agent, AgentFactory, AgentHandle, AgentRole, Reply};
pub use config::{
    default_config_toml, ConfigError, ScriptedConfig, SimulationConfig, TomlSerializeError,
    TownConfig, DEFAULT_CONFIG_PATH,
};
pub use context::{Phase, SimulationContext};
pub use controller::StepController;
pub use error::{AgentError, ConfigurationError, SessionError, StepError, TransportError};
pub use observation::ObservationLog;
pub use report::{ConversationRecord, SessionSummary, StepOutcome, TickReport, TurnFailure};
pub use scheduler::TurnScheduler;
pub use scripted::{ScriptedAgent, ScriptedAgentFactory};
pub use session::InteractiveSession;
pub use transport::{
    channel_pair, ChannelPeer, ChannelTransport, ConsoleTransport, Inbound, OneShotTransport,
    ResponseHandle, Sink, Transport,
};

pub use town_events::{AgentProfile, Instruction, InstructionKind, Notification};
