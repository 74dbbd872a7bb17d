//! Transport boundary between the simulation and the human participant.
//!
//! The orchestrator only ever sees a synchronous `send`/`receive` pair.
//! Transports whose native model is asynchronous (a websocket bridge) adapt
//! to this blocking contract at their own edge, see [`ChannelTransport`].

mod channel;
mod console;
mod oneshot;

pub use channel::{channel_pair, ChannelPeer, ChannelTransport};
pub use console::ConsoleTransport;
pub use oneshot::{OneShotTransport, ResponseHandle};

use town_events::{MessageType, Notification, Role};

use crate::error::TransportError;

/// What the human sent back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A line of text from the human
    Message(String),
    /// The human (or the channel) ended the conversation
    End,
}

impl Inbound {
    /// Returns the message text, or `None` at end of conversation.
    pub fn into_message(self) -> Option<String> {
        match self {
            Inbound::Message(text) => Some(text),
            Inbound::End => None,
        }
    }
}

/// A channel to the human.
pub trait Transport {
    /// Delivers one notification.
    fn send(&mut self, notification: &Notification) -> Result<(), TransportError>;

    /// Blocks until the human replies or ends the conversation.
    fn receive(&mut self) -> Result<Inbound, TransportError>;
}

/// Formats an `ask_human` prompt, listing the accepted answers if any.
pub fn ask_human_prompt(message: &str, choices: &[&str]) -> String {
    if choices.is_empty() {
        format!("{}: ", message)
    } else {
        format!("{} ({}): ", message, choices.join("/"))
    }
}

/// The output/interaction slot of a simulation run.
///
/// Sends are best-effort: with no transport attached, or with a peer that
/// went away, a notification is dropped and the tick carries on. Receives
/// report [`TransportError::Unavailable`] instead, since nothing can stand in
/// for a missing human answer.
#[derive(Default)]
pub struct Sink {
    transport: Option<Box<dyn Transport>>,
    dropped: u64,
}

impl Sink {
    /// A sink with the given transport attached.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport: Some(transport),
            dropped: 0,
        }
    }

    /// A sink with nothing attached.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Attaches a transport, returning the previous one.
    pub fn attach(&mut self, transport: Box<dyn Transport>) -> Option<Box<dyn Transport>> {
        self.transport.replace(transport)
    }

    /// Detaches and returns the current transport.
    pub fn detach(&mut self) -> Option<Box<dyn Transport>> {
        self.transport.take()
    }

    pub fn is_attached(&self) -> bool {
        self.transport.is_some()
    }

    /// Number of notifications dropped so far.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Sends a notification. Returns false if it was dropped.
    pub fn send(&mut self, message: impl Into<String>, role: Role, msg_type: MessageType) -> bool {
        let notification = Notification::new(role, msg_type, message);
        let Some(transport) = self.transport.as_mut() else {
            self.dropped += 1;
            tracing::debug!("No transport attached, dropping: {}", notification.message);
            return false;
        };

        match transport.send(&notification) {
            Ok(()) => true,
            Err(TransportError::Unavailable) => {
                self.dropped += 1;
                tracing::debug!("Peer gone, dropping: {}", notification.message);
                false
            }
            Err(e) => {
                self.dropped += 1;
                tracing::warn!("Failed to deliver notification: {}", e);
                false
            }
        }
    }

    /// System narration.
    pub fn inform(&mut self, message: impl Into<String>) -> bool {
        self.send(message, Role::System, MessageType::Inform)
    }

    /// A line spoken by an agent.
    pub fn say(&mut self, message: impl Into<String>) -> bool {
        self.send(message, Role::Agent, MessageType::Inform)
    }

    /// Waits for the human.
    pub fn receive(&mut self) -> Result<Inbound, TransportError> {
        match self.transport.as_mut() {
            Some(transport) => transport.receive(),
            None => Err(TransportError::Unavailable),
        }
    }

    /// Prompts the human and waits for the answer.
    pub fn ask_human(
        &mut self,
        message: &str,
        choices: &[&str],
    ) -> Result<Inbound, TransportError> {
        if !self.is_attached() {
            return Err(TransportError::Unavailable);
        }
        self.send(
            ask_human_prompt(message, choices),
            Role::System,
            MessageType::AskHuman,
        );
        self.receive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_human_prompt_format() {
        assert_eq!(
            ask_human_prompt("Pick an action to perform?", &["continue", "interview", "exit"]),
            "Pick an action to perform? (continue/interview/exit): "
        );
        assert_eq!(ask_human_prompt("Say something", &[]), "Say something: ");
    }

    #[test]
    fn test_detached_sink_drops_sends() {
        let mut sink = Sink::detached();
        assert!(!sink.inform("nobody hears this"));
        assert!(!sink.say("or this"));
        assert_eq!(sink.dropped(), 2);
    }

    #[test]
    fn test_detached_sink_surfaces_receive_failure() {
        let mut sink = Sink::detached();
        assert!(matches!(sink.receive(), Err(TransportError::Unavailable)));
        assert!(matches!(
            sink.ask_human("Anyone?", &[]),
            Err(TransportError::Unavailable)
        ));
    }

    #[test]
    fn test_attach_and_detach() {
        let (transport, _peer) = channel_pair("exit");
        let mut sink = Sink::detached();
        assert!(sink.attach(Box::new(transport)).is_none());
        assert!(sink.is_attached());
        assert!(sink.detach().is_some());
        assert!(!sink.is_attached());
    }

    #[test]
    fn test_inbound_into_message() {
        assert_eq!(Inbound::Message("hi".into()).into_message(), Some("hi".to_string()));
        assert_eq!(Inbound::End.into_message(), None);
    }
}
