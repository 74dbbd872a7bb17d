//! Turn Scheduler
//!
//! Decides, once per `continue` tick, who talks to whom.
//!
//! 1. Human-facing pass: every simulated agent, in roster order, is asked
//!    whether it wants to address the human. Each one that does is announced
//!    and handed to an [`InteractiveSession`] before the pass moves on.
//! 2. Pairwise pass: every unordered pair of simulated agents `(i, j)` with
//!    `i` before `j` in the roster is probed `i → j`, then `j → i` only if
//!    `i` stayed silent. At most one conversation happens per pair.

use crate::context::{pair_mut, SimulationContext};
use crate::report::{ConversationRecord, TickReport, TurnFailure};
use crate::session::InteractiveSession;

/// Pairwise interaction scheduling for `continue` ticks.
#[derive(Debug, Clone)]
pub struct TurnScheduler {
    /// Cap on replies in one agent-to-agent conversation
    max_conversation_turns: usize,
}

impl TurnScheduler {
    pub fn new(max_conversation_turns: usize) -> Self {
        Self {
            max_conversation_turns: max_conversation_turns.max(1),
        }
    }

    pub fn max_conversation_turns(&self) -> usize {
        self.max_conversation_turns
    }

    /// Runs both passes.
    pub fn run(
        &self,
        ctx: &mut SimulationContext,
        session: &InteractiveSession,
        report: &mut TickReport,
    ) {
        self.human_pass(ctx, session, report);
        self.pairwise_pass(ctx, report);
    }

    /// Lets each simulated agent whisper to the human.
    pub fn human_pass(
        &self,
        ctx: &mut SimulationContext,
        session: &InteractiveSession,
        report: &mut TickReport,
    ) {
        report.passes += 1;
        let human = ctx.human_name().to_string();
        let mut someone_asked = false;

        for k in 0..ctx.simulated.len() {
            let idx = ctx.simulated[k];
            let name = ctx.agents[idx].name().to_string();

            let probe = ctx.agents[idx]
                .agent_mut()
                .probe(&human, ctx.observations.entries());
            let message = match probe {
                Ok(Some(message)) => message,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(agent = %name, "Probe toward the human failed: {}", e);
                    report.failures.push(TurnFailure::Probe {
                        agent: name,
                        target: human.clone(),
                        error: e.to_string(),
                        retryable: e.is_retryable(),
                    });
                    continue;
                }
            };

            let framing = if someone_asked {
                "also whispered to you"
            } else {
                "whispered to you"
            };
            ctx.sink.say(format!("{} {} ({}): {}", name, framing, human, message));
            someone_asked = true;
            report.whispers.push(name.clone());

            match session.run(ctx, idx) {
                Ok(summary) => report.sessions.push(summary),
                Err(e) => {
                    tracing::warn!(agent = %name, "Session with the human ended early: {}", e);
                    report.failures.push(TurnFailure::Session {
                        agent: name,
                        error: e.to_string(),
                        retryable: e.is_retryable(),
                    });
                }
            }
        }
    }

    /// Lets simulated agents talk among themselves.
    pub fn pairwise_pass(&self, ctx: &mut SimulationContext, report: &mut TickReport) {
        report.passes += 1;
        ctx.sink.inform("The world has something else happening...");

        let count = ctx.simulated.len();
        for a in 0..count {
            for b in (a + 1)..count {
                let (first, second) = (ctx.simulated[a], ctx.simulated[b]);
                report.pairs_evaluated += 1;

                if self.try_conversation(ctx, first, second, report) {
                    continue;
                }
                self.try_conversation(ctx, second, first, report);
            }
        }
    }

    /// Probes `speaker → listener` and, if it yields an opening line, runs
    /// the conversation. Returns true if the probe yielded a line, whether
    /// or not the conversation then completed.
    fn try_conversation(
        &self,
        ctx: &mut SimulationContext,
        speaker: usize,
        listener: usize,
        report: &mut TickReport,
    ) -> bool {
        let speaker_name = ctx.agents[speaker].name().to_string();
        let listener_name = ctx.agents[listener].name().to_string();

        let probe = ctx.agents[speaker]
            .agent_mut()
            .probe(&listener_name, ctx.observations.entries());
        let message = match probe {
            Ok(Some(message)) => message,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(
                    agent = %speaker_name,
                    listener = %listener_name,
                    "Probe failed: {}", e
                );
                report.failures.push(TurnFailure::Probe {
                    agent: speaker_name,
                    target: listener_name,
                    error: e.to_string(),
                    retryable: e.is_retryable(),
                });
                return false;
            }
        };

        ctx.sink
            .inform(format!("{} just whispered to {}...", speaker_name, listener_name));
        let opening = format!("{} said: {}", speaker_name, message);

        let (initiator, partner) = pair_mut(&mut ctx.agents, speaker, listener);
        let result = initiator.agent_mut().converse(
            partner.agent_mut(),
            &opening,
            &mut ctx.observations,
            self.max_conversation_turns,
        );

        match result {
            Ok(turns) => {
                tracing::debug!(
                    initiator = %speaker_name,
                    partner = %listener_name,
                    turns,
                    "Conversation finished"
                );
                ctx.sink.inform(format!(
                    "{} and {} finished their private conversation...",
                    speaker_name, listener_name
                ));
                report.conversations.push(ConversationRecord {
                    initiator: speaker_name,
                    partner: listener_name,
                    turns,
                });
            }
            Err(e) => {
                tracing::warn!(
                    initiator = %speaker_name,
                    partner = %listener_name,
                    "Conversation aborted: {}", e
                );
                report.failures.push(TurnFailure::Conversation {
                    initiator: speaker_name,
                    partner: listener_name,
                    error: e.to_string(),
                    retryable: e.is_retryable(),
                });
            }
        }
        true
    }
}
