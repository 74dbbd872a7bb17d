//! Single request/response transport for HTTP handlers.
//!
//! An HTTP request carries exactly one human message. The session sees that
//! message, then end of conversation, so it returns after a single exchange
//! and the handler builds its response from the collected notifications.

use std::sync::{Arc, Mutex};

use town_events::{Notification, Role};

use super::{Inbound, Transport};
use crate::error::TransportError;

/// Yields one request body, then ends the conversation.
pub struct OneShotTransport {
    request: Option<String>,
    responses: ResponseHandle,
}

/// Shared view of what the session sent back.
#[derive(Debug, Clone, Default)]
pub struct ResponseHandle {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl OneShotTransport {
    /// Creates a transport for one request and the handle its response is
    /// collected in.
    pub fn new(request: impl Into<String>) -> (Self, ResponseHandle) {
        let responses = ResponseHandle::default();
        let transport = Self {
            request: Some(request.into()),
            responses: responses.clone(),
        };
        (transport, responses)
    }
}

impl Transport for OneShotTransport {
    fn send(&mut self, notification: &Notification) -> Result<(), TransportError> {
        let mut notifications = self
            .responses
            .notifications
            .lock()
            .map_err(|_| TransportError::Unavailable)?;
        notifications.push(notification.clone());
        Ok(())
    }

    fn receive(&mut self) -> Result<Inbound, TransportError> {
        Ok(match self.request.take() {
            Some(body) => Inbound::Message(body),
            None => Inbound::End,
        })
    }
}

impl ResponseHandle {
    /// Everything sent so far.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    /// Agent speech joined by newlines, suitable for a plain-text body.
    pub fn body(&self) -> String {
        self.notifications()
            .into_iter()
            .filter(|n| n.role == Role::Agent)
            .map(|n| n.message)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
