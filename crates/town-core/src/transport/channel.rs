//! Duplex channel transport for websocket bridges.
//!
//! The websocket task owns a [`ChannelPeer`]: it forwards `frames` to the
//! socket and pushes whatever the browser sends into `replies`. The
//! simulation thread owns the [`ChannelTransport`] and blocks on the next
//! reply, which keeps tick ordering intact. Run the simulation on a blocking
//! thread (`tokio::task::spawn_blocking`) since `blocking_recv` must not be
//! called from inside the async runtime.

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use town_events::{Envelope, Notification};

use super::{Inbound, Transport};
use crate::error::TransportError;

/// Simulation-side end of a duplex channel.
pub struct ChannelTransport {
    outbound: UnboundedSender<String>,
    inbound: UnboundedReceiver<String>,
    exit_token: String,
}

/// Socket-side end of a duplex channel.
pub struct ChannelPeer {
    /// JSON [`Envelope`] frames to push to the client
    pub frames: UnboundedReceiver<String>,
    /// Raw text received from the client
    pub replies: UnboundedSender<String>,
}

/// Creates a connected transport/peer pair.
pub fn channel_pair(exit_token: impl Into<String>) -> (ChannelTransport, ChannelPeer) {
    let (frame_tx, frame_rx) = mpsc::unbounded_channel();
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();
    let transport = ChannelTransport {
        outbound: frame_tx,
        inbound: reply_rx,
        exit_token: exit_token.into(),
    };
    let peer = ChannelPeer {
        frames: frame_rx,
        replies: reply_tx,
    };
    (transport, peer)
}

impl Transport for ChannelTransport {
    fn send(&mut self, notification: &Notification) -> Result<(), TransportError> {
        let frame = Envelope::wrap(notification.clone()).to_json()?;
        self.outbound
            .send(frame)
            .map_err(|_| TransportError::Unavailable)
    }

    fn receive(&mut self) -> Result<Inbound, TransportError> {
        match self.inbound.blocking_recv() {
            None => Ok(Inbound::End),
            Some(text) if text.trim().eq_ignore_ascii_case(&self.exit_token) => Ok(Inbound::End),
            Some(text) => Ok(Inbound::Message(text.trim().to_string())),
        }
    }
}

impl ChannelPeer {
    /// Queues a reply from the human. Returns false if the simulation side
    /// has gone away.
    pub fn reply(&self, text: impl Into<String>) -> bool {
        self.replies.send(text.into()).is_ok()
    }

    /// Takes every frame sent so far without waiting.
    ///
    /// Frames that fail to parse are skipped.
    pub fn drain(&mut self) -> Vec<Envelope> {
        let mut envelopes = Vec::new();
        loop {
            match self.frames.try_recv() {
                Ok(frame) => match Envelope::from_json(&frame) {
                    Ok(envelope) => envelopes.push(envelope),
                    Err(e) => tracing::warn!("Skipping malformed frame: {}", e),
                },
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        envelopes
    }

    /// Closes the reply direction; the simulation sees end of conversation
    /// once queued replies are consumed.
    pub fn hang_up(self) -> UnboundedReceiver<String> {
        self.frames
    }
}
