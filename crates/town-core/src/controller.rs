//! Step Controller
//!
//! Top-level state machine of a run. `init` assembles the context from agent
//! profiles; `step` consumes one instruction per tick:
//!
//! - `continue` runs both [`TurnScheduler`] passes,
//! - `interview` runs one [`InteractiveSession`] with the chosen agent,
//! - `exit` moves the run to its terminal phase.
//!
//! Every tick that runs ends with observation-log retention.

use std::collections::HashSet;

use town_events::{AgentProfile, Instruction, InstructionKind};

use crate::agent::{AgentFactory, AgentHandle, AgentRole};
use crate::config::SimulationConfig;
use crate::context::{Phase, SimulationContext};
use crate::error::{ConfigurationError, StepError};
use crate::observation::ObservationLog;
use crate::report::{StepOutcome, TickReport, TurnFailure};
use crate::scheduler::TurnScheduler;
use crate::session::InteractiveSession;
use crate::transport::Sink;

/// Drives a run one instruction at a time.
#[derive(Debug, Clone)]
pub struct StepController {
    /// Retention window, in ticks
    window: usize,
    /// Restore agent memory from checkpoints at init
    from_checkpoint: bool,
    scheduler: TurnScheduler,
    session: InteractiveSession,
}

impl Default for StepController {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

impl StepController {
    /// Creates a controller from run settings.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            window: config.timewindow_size,
            from_checkpoint: config.from_checkpoint,
            scheduler: TurnScheduler::new(config.max_conversation_turns),
            session: InteractiveSession::new(config.exit_token.clone()),
        }
    }

    /// Sets the retention window.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Enables or disables checkpoint restore at init.
    pub fn with_checkpoints(mut self, from_checkpoint: bool) -> Self {
        self.from_checkpoint = from_checkpoint;
        self
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    pub fn session(&self) -> &InteractiveSession {
        &self.session
    }

    /// Builds every agent and assembles the run.
    ///
    /// Agents are created in profile order; the one at `human_index` is
    /// human-controlled. Each agent's `current_status` seeds the shared
    /// observation log. Memory is restored from the agent's checkpoint when
    /// enabled and available, otherwise seeded from the profile and dumped.
    pub fn init(
        &self,
        profiles: &[AgentProfile],
        human_index: usize,
        factory: &mut dyn AgentFactory,
        sink: Sink,
    ) -> Result<SimulationContext, ConfigurationError> {
        self.validate_roster(profiles, human_index)?;

        let mut sink = sink;
        let mut observations = ObservationLog::new(self.window);
        let mut agents = Vec::with_capacity(profiles.len());

        sink.inform("Creating all agents one by one...");
        for (idx, profile) in profiles.iter().enumerate() {
            let is_human = idx == human_index;
            let handle = self.create_agent(profile, is_human, factory)?;
            agents.push(handle);
            observations.seed(profile.current_status.clone());
            sink.inform(format!("Agent {} successfully created", profile.name));
            tracing::info!(agent = %profile.name, human = is_human, "Agent created");
        }

        let mut ctx = SimulationContext::new(agents, human_index, observations, sink);
        let human = ctx.human_name().to_string();
        ctx.sink.inform("Agent town started...");
        ctx.sink.inform(format!("You are going to behave as {}", human));
        tracing::info!(
            run_id = %ctx.run_id,
            agents = ctx.agents.len(),
            window = self.window,
            human = %human,
            "Run started"
        );
        Ok(ctx)
    }

    fn validate_roster(
        &self,
        profiles: &[AgentProfile],
        human_index: usize,
    ) -> Result<(), ConfigurationError> {
        if profiles.len() < 2 {
            return Err(ConfigurationError::TooFewAgents {
                count: profiles.len(),
            });
        }
        if human_index >= profiles.len() {
            return Err(ConfigurationError::HumanIndexOutOfRange {
                index: human_index,
                count: profiles.len(),
            });
        }
        if self.window == 0 {
            return Err(ConfigurationError::InvalidWindow);
        }

        let mut seen = HashSet::new();
        for (index, profile) in profiles.iter().enumerate() {
            profile
                .validate()
                .map_err(|source| ConfigurationError::MalformedProfile { index, source })?;
            if !seen.insert(profile.name.as_str()) {
                return Err(ConfigurationError::DuplicateName(profile.name.clone()));
            }
        }
        Ok(())
    }

    fn create_agent(
        &self,
        profile: &AgentProfile,
        is_human: bool,
        factory: &mut dyn AgentFactory,
    ) -> Result<AgentHandle, ConfigurationError> {
        let creation = |source| ConfigurationError::AgentCreation {
            name: profile.name.clone(),
            source,
        };
        let mut agent = factory.create(profile).map_err(creation)?;

        let checkpoint = profile.checkpoint_dir();
        let restored = match &checkpoint {
            Some(dir) if self.from_checkpoint => agent.try_load_memory(dir),
            _ => false,
        };

        if restored {
            tracing::info!(agent = %profile.name, "Memory restored from checkpoint");
        } else {
            for memory in &profile.memories {
                agent.add_memory(memory).map_err(creation)?;
            }
            if let Some(dir) = &checkpoint {
                agent
                    .dump_memory(dir)
                    .map_err(|source| ConfigurationError::Checkpoint {
                        name: profile.name.clone(),
                        source,
                    })?;
            }
        }

        let role = if is_human {
            AgentRole::Human
        } else {
            AgentRole::Simulated
        };
        Ok(AgentHandle::new(profile.name.clone(), role, agent))
    }

    /// Parses console text and runs it as one instruction.
    pub fn step_str(
        &self,
        ctx: &mut SimulationContext,
        text: &str,
    ) -> Result<StepOutcome, StepError> {
        let instruction: Instruction = text.parse()?;
        self.step(ctx, instruction)
    }

    /// Runs one instruction.
    ///
    /// Rejected instructions leave the context untouched, including the
    /// tick counter. `exit` does not produce a tick.
    pub fn step(
        &self,
        ctx: &mut SimulationContext,
        instruction: Instruction,
    ) -> Result<StepOutcome, StepError> {
        if ctx.phase == Phase::Terminated {
            return Err(StepError::Terminated);
        }

        let interview_target = match &instruction {
            Instruction::Interview { target } => {
                let idx = ctx
                    .find(target)
                    .ok_or_else(|| StepError::UnknownAgent(target.clone()))?;
                if idx == ctx.human {
                    return Err(StepError::HumanTarget(target.clone()));
                }
                Some(idx)
            }
            Instruction::Continue => None,
            Instruction::Exit => {
                ctx.sink.inform("Agent town exiting...");
                ctx.phase = Phase::Terminated;
                tracing::info!(run_id = %ctx.run_id, ticks = ctx.tick, "Run exited");
                return Ok(StepOutcome::Exited { ticks: ctx.tick });
            }
        };

        ctx.tick += 1;
        ctx.phase = Phase::Running;
        let mut report = TickReport::new(ctx.tick, instruction.kind());

        match interview_target {
            Some(idx) => self.interview(ctx, idx, &mut report),
            None => self.scheduler.run(ctx, &self.session, &mut report),
        }

        report.observations_added = ctx.observations.pending();
        report.evicted = ctx.observations.commit_tick();
        tracing::info!(
            tick = ctx.tick,
            instruction = %report.instruction,
            conversations = report.conversations.len(),
            sessions = report.sessions.len(),
            observations = ctx.observations.len(),
            evicted = report.evicted,
            "Tick committed"
        );
        Ok(StepOutcome::Ticked(report))
    }

    fn interview(&self, ctx: &mut SimulationContext, idx: usize, report: &mut TickReport) {
        match self.session.run(ctx, idx) {
            Ok(summary) => report.sessions.push(summary),
            Err(e) => {
                let agent = ctx.agents[idx].name().to_string();
                tracing::warn!(agent = %agent, "Interview ended early: {}", e);
                report.failures.push(TurnFailure::Session {
                    agent,
                    error: e.to_string(),
                    retryable: e.is_retryable(),
                });
            }
        }
    }

    /// The instruction tags offered to the human, for prompts.
    pub fn choices() -> Vec<&'static str> {
        InstructionKind::ALL.iter().map(|kind| kind.as_str()).collect()
    }
}
