//! OutboundDispatcher: FIFO queue with a send cooldown.
//!
//! A message is transmitted immediately when the dispatcher is idle, the
//! session is connected and nothing is queued ahead of it.  Otherwise it
//! waits at the tail of the queue.  After every transmit the dispatcher is
//! "sending" until the cooldown timer fires, and then drains the queue head
//! first.  Messages enqueued while disconnected are kept and flushed, in
//! order, once the session connects.

use std::collections::VecDeque;
use std::time::Duration;

use sortviz_core::{encode_outbound, OutboundMessage, RequestId};
use tracing::{debug, trace, warn};

use crate::application::connection::ConnectionManager;
use crate::application::timers::{TimerKind, Timers};
use crate::domain::ClientError;

pub struct OutboundDispatcher {
    queue: VecDeque<OutboundMessage>,
    sending: bool,
    cooldown: Duration,
}

impl OutboundDispatcher {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            sending: false,
            cooldown,
        }
    }

    /// Submits `message` for transmission.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SendFailure`] if the message was transmitted
    /// immediately and the transport rejected it.  A queued message never
    /// fails here.
    pub fn enqueue(
        &mut self,
        message: OutboundMessage,
        connection: &mut ConnectionManager,
        timers: &mut Timers,
    ) -> Result<(), ClientError> {
        if !self.sending && connection.is_connected() && self.queue.is_empty() {
            return self.transmit(message, connection, timers);
        }
        trace!(
            request_id = %message.request_id(),
            queued = self.queue.len() + 1,
            "message queued"
        );
        self.queue.push_back(message);
        Ok(())
    }

    /// Runs when the send cooldown elapses.  Returns the failures of any
    /// queued messages transmitted now.
    pub fn on_cooldown_elapsed(
        &mut self,
        connection: &mut ConnectionManager,
        timers: &mut Timers,
    ) -> Vec<ClientError> {
        self.sending = false;
        self.pump(connection, timers)
    }

    /// Runs when the session becomes connected.
    pub fn on_connected(
        &mut self,
        connection: &mut ConnectionManager,
        timers: &mut Timers,
    ) -> Vec<ClientError> {
        if !self.queue.is_empty() {
            debug!(queued = self.queue.len(), "flushing queue after connect");
        }
        self.pump(connection, timers)
    }

    /// Removes every queued message carrying `request_id`.
    ///
    /// Returns `true` if anything was removed.
    pub fn retract(&mut self, request_id: &RequestId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|m| m.request_id() != request_id);
        before != self.queue.len()
    }

    /// Drops the queue and the cooldown.
    pub fn reset(&mut self, timers: &mut Timers) {
        self.queue.clear();
        self.sending = false;
        timers.disarm(TimerKind::SendCooldown);
    }

    /// Number of queued (not yet transmitted) messages.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn pump(&mut self, connection: &mut ConnectionManager, timers: &mut Timers) -> Vec<ClientError> {
        let mut failures = Vec::new();
        while !self.sending && connection.is_connected() {
            let Some(message) = self.queue.pop_front() else {
                break;
            };
            if let Err(e) = self.transmit(message, connection, timers) {
                failures.push(e);
            }
        }
        failures
    }

    fn transmit(
        &mut self,
        message: OutboundMessage,
        connection: &mut ConnectionManager,
        timers: &mut Timers,
    ) -> Result<(), ClientError> {
        let request_id = message.request_id().clone();
        let text = encode_outbound(&message).map_err(|e| ClientError::SendFailure {
            request_id: request_id.clone(),
            reason: e.to_string(),
        })?;

        connection.transmit(text).map_err(|e| {
            warn!(%request_id, "transmit failed: {e}");
            ClientError::SendFailure {
                request_id: request_id.clone(),
                reason: e.to_string(),
            }
        })?;

        debug!(%request_id, kind = message.kind_name(), "message sent");
        self.sending = true;
        timers.arm(TimerKind::SendCooldown, self.cooldown);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
