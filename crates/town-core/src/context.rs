//! Simulation Context
//!
//! The mutable state of one run: clock, roster, shared observation log and
//! the channel to the human. Created once by
//! [`StepController::init`](crate::controller::StepController::init) and
//! passed by reference to every operation.

use uuid::Uuid;

use crate::agent::AgentHandle;
use crate::observation::ObservationLog;
use crate::transport::{Sink, Transport};

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Initialized, no tick yet
    Idle,
    /// Between or inside scheduler ticks
    Running,
    /// Blocked on an exchange with the human
    Interviewing,
    /// Exited; no further ticks
    Terminated,
}

/// Shared state of one simulation run.
pub struct SimulationContext {
    pub(crate) run_id: Uuid,
    pub(crate) tick: u64,
    /// Every agent in configuration order
    pub(crate) agents: Vec<AgentHandle>,
    /// Index of the human-controlled agent in `agents`
    pub(crate) human: usize,
    /// Indices of simulated agents in `agents`, ascending
    pub(crate) simulated: Vec<usize>,
    pub(crate) observations: ObservationLog,
    pub(crate) sink: Sink,
    pub(crate) phase: Phase,
}

impl SimulationContext {
    /// Assembles a context. The roster must already be validated: exactly
    /// one human agent at `human`.
    pub(crate) fn new(
        agents: Vec<AgentHandle>,
        human: usize,
        observations: ObservationLog,
        sink: Sink,
    ) -> Self {
        let simulated = (0..agents.len()).filter(|&idx| idx != human).collect();
        Self {
            run_id: Uuid::new_v4(),
            tick: 0,
            agents,
            human,
            simulated,
            observations,
            sink,
            phase: Phase::Idle,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Ticks run so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }

    /// All agents in roster order.
    pub fn agents(&self) -> &[AgentHandle] {
        &self.agents
    }

    /// The human-controlled agent.
    pub fn human(&self) -> &AgentHandle {
        &self.agents[self.human]
    }

    pub fn human_name(&self) -> &str {
        self.agents[self.human].name()
    }

    /// Simulated agents in roster order.
    pub fn simulated(&self) -> impl Iterator<Item = &AgentHandle> + '_ {
        self.simulated.iter().map(move |&idx| &self.agents[idx])
    }

    pub fn simulated_names(&self) -> Vec<&str> {
        self.simulated().map(|agent| agent.name()).collect()
    }

    /// Roster index of the agent called `name`.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.agents.iter().position(|agent| agent.name() == name)
    }

    pub fn observations(&self) -> &ObservationLog {
        &self.observations
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut Sink {
        &mut self.sink
    }

    /// Swaps the transport, e.g. when a websocket client reconnects.
    pub fn attach_transport(
        &mut self,
        transport: Box<dyn Transport>,
    ) -> Option<Box<dyn Transport>> {
        self.sink.attach(transport)
    }
}

/// Mutable references to two different agents.
pub(crate) fn pair_mut(
    agents: &mut [AgentHandle],
    first: usize,
    second: usize,
) -> (&mut AgentHandle, &mut AgentHandle) {
    assert_ne!(first, second, "an agent cannot pair with itself");
    if first < second {
        let (left, right) = agents.split_at_mut(second);
        (&mut left[first], &mut right[0])
    } else {
        let (left, right) = agents.split_at_mut(first);
        (&mut right[0], &mut left[second])
    }
}
