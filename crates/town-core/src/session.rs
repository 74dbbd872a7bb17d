//! Interactive Session
//!
//! One live exchange between a simulated agent and the human, over whatever
//! transport is attached to the context. The tick is suspended until the
//! transport signals end of conversation: an exit token, a closed channel,
//! or (for one-shot HTTP) the end of the single request.

use crate::context::{Phase, SimulationContext};
use crate::error::SessionError;
use crate::report::SessionSummary;

/// Mediates agent-to-human exchanges.
#[derive(Debug, Clone)]
pub struct InteractiveSession {
    /// Shown in the prompt so the human knows how to leave
    exit_token: String,
}

impl InteractiveSession {
    pub fn new(exit_token: impl Into<String>) -> Self {
        Self {
            exit_token: exit_token.into(),
        }
    }

    pub fn exit_token(&self) -> &str {
        &self.exit_token
    }

    /// Runs an exchange between the agent at roster index `agent` and the
    /// human, returning once the transport ends the conversation.
    ///
    /// Each human line and agent reply is recorded in the observation log.
    /// The context sits in [`Phase::Interviewing`] only while the exchange
    /// holds it; the previous phase is restored before returning, on
    /// success and on failure alike.
    pub fn run(
        &self,
        ctx: &mut SimulationContext,
        agent: usize,
    ) -> Result<SessionSummary, SessionError> {
        let previous = ctx.phase;
        ctx.phase = Phase::Interviewing;
        let result = self.exchange(ctx, agent);
        ctx.phase = previous;
        result
    }

    fn exchange(
        &self,
        ctx: &mut SimulationContext,
        agent: usize,
    ) -> Result<SessionSummary, SessionError> {
        let human = ctx.human_name().to_string();
        let name = ctx.agents[agent].name().to_string();
        let prompt = format!(
            "As {}, what do you say to {}? (type '{}' to finish)",
            human, name, self.exit_token
        );
        tracing::info!(agent = %name, human = %human, "Interactive session started");

        let mut exchanges = 0;
        while let Some(message) = ctx.sink.ask_human(&prompt, &[])?.into_message() {
            if message.is_empty() {
                continue;
            }
            ctx.observations.append(format!("{} said: {}", human, message));

            let reply = ctx.agents[agent]
                .agent_mut()
                .respond(&human, &message, ctx.observations.entries())
                .map_err(|source| SessionError::Agent {
                    name: name.clone(),
                    source,
                })?;
            exchanges += 1;

            ctx.observations.append(format!("{} said: {}", name, reply.text()));
            ctx.sink.say(format!("{}: {}", name, reply.text()));
            tracing::debug!(agent = %name, exchanges, "Agent replied");
        }

        tracing::info!(agent = %name, exchanges, "Interactive session finished");
        Ok(SessionSummary {
            agent: name,
            exchanges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, AgentHandle, AgentRole, Reply};
    use crate::error::{AgentError, TransportError};
    use crate::observation::ObservationLog;
    use crate::transport::{OneShotTransport, Sink};

    /// Echoes the human, or fails every reply.
    struct Echo {
        name: String,
        failing: bool,
    }

    impl Agent for Echo {
        fn name(&self) -> &str {
            &self.name
        }

        fn probe(&mut self, _to: &str, _obs: &[String]) -> Result<Option<String>, AgentError> {
            Ok(None)
        }

        fn respond(
            &mut self,
            _speaker: &str,
            message: &str,
            _obs: &[String],
        ) -> Result<Reply, AgentError> {
            if self.failing {
                return Err(AgentError::Generation("rate limited".into()));
            }
            Ok(Reply::Farewell(format!("you said {}", message)))
        }

        fn add_memory(&mut self, _memory: &str) -> Result<(), AgentError> {
            Ok(())
        }
    }

    fn context(failing: bool, sink: Sink) -> SimulationContext {
        let human = AgentHandle::new(
            "Alice",
            AgentRole::Human,
            Box::new(Echo {
                name: "Alice".into(),
                failing: false,
            }),
        );
        let bob = AgentHandle::new(
            "Bob",
            AgentRole::Simulated,
            Box::new(Echo {
                name: "Bob".into(),
                failing,
            }),
        );
        let mut ctx = SimulationContext::new(vec![human, bob], 0, ObservationLog::new(3), sink);
        ctx.phase = Phase::Running;
        ctx
    }

    #[test]
    fn test_exchange_logs_both_sides() {
        let (transport, response) = OneShotTransport::new("hello");
        let mut ctx = context(false, Sink::new(Box::new(transport)));

        let summary = InteractiveSession::new("exit")
            .run(&mut ctx, 1)
            .expect("session should finish");

        assert_eq!(summary.exchanges, 1);
        assert_eq!(
            ctx.observations.entries(),
            ["Alice said: hello", "Bob said: you said hello"]
        );
        assert_eq!(response.body(), "Bob: you said hello");
        assert_eq!(ctx.phase, Phase::Running);
    }

    #[test]
    fn test_phase_restored_after_failure() {
        let session = InteractiveSession::new("exit");

        let mut detached = context(false, Sink::detached());
        let err = session.run(&mut detached, 1).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Transport(TransportError::Unavailable)
        ));
        assert!(!err.is_retryable());
        assert_eq!(detached.phase, Phase::Running);

        let (transport, _response) = OneShotTransport::new("hello");
        let mut flaky = context(true, Sink::new(Box::new(transport)));
        let err = session.run(&mut flaky, 1).unwrap_err();
        assert!(matches!(err, SessionError::Agent { ref name, .. } if name == "Bob"));
        assert!(err.is_retryable());
        assert_eq!(flaky.phase, Phase::Running);
        assert_eq!(flaky.observations.entries(), ["Alice said: hello"]);
    }
}
