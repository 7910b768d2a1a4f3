//! ConnectionManager: owns the single transport session.
//!
//! # Responsibilities
//!
//! - Open and close the transport, one session at a time.
//! - Track the [`ConnectionStatus`] and notify every registered listener on
//!   each transition.
//! - Reconnect after an unexpected close with bounded linear backoff: the
//!   delay before attempt *k* is `base_delay * k`, and after `max_attempts`
//!   failed attempts the session gives up with a fatal connectivity error.
//!
//! # Generations
//!
//! Every call to [`Transport::open`] is tagged with a fresh generation
//! number.  Events carrying any other generation come from a session that
//! was already replaced or closed, and are ignored.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::application::ports::{Generation, Transport, TransportError};
use crate::application::timers::{TimerKind, Timers};
use crate::domain::{ClientError, ConnectionStatus, ReconnectPolicy};

/// Callback invoked on every status transition.
pub type StatusListener = Box<dyn FnMut(ConnectionStatus) + Send>;

/// What the manager decided after the session dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Disconnection {
    /// Connectivity error describing the drop.  Fatal once retries are
    /// exhausted.
    pub error: ClientError,
    /// `(attempt, delay)` of the scheduled reconnect, if any.
    pub retry: Option<(u32, Duration)>,
}

/// Manages the one logical session to the sorting service.
pub struct ConnectionManager {
    transport: Box<dyn Transport>,
    policy: ReconnectPolicy,
    status: ConnectionStatus,
    url: Option<String>,
    reconnect_attempts: u32,
    generation: Generation,
    listeners: Vec<StatusListener>,
}

impl ConnectionManager {
    pub fn new(transport: Box<dyn Transport>, policy: ReconnectPolicy) -> Self {
        Self {
            transport,
            policy,
            status: ConnectionStatus::Disconnected,
            url: None,
            reconnect_attempts: 0,
            generation: 0,
            listeners: Vec::new(),
        }
    }

    /// Registers a callback for status transitions.
    pub fn add_status_listener(&mut self, listener: StatusListener) {
        self.listeners.push(listener);
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Failed reconnect attempts since the session was last connected.
    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    /// Generation of the live session.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// URL of the current (or last) session.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Returns `true` if an event tagged `generation` belongs to the live
    /// session.
    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation && self.status != ConnectionStatus::Disconnected
    }

    /// Starts a fresh session to `url`.
    ///
    /// An open session is closed first and any pending reconnect is
    /// canceled.  The attempt counter starts again from zero.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connectivity`] if the transport cannot be
    /// constructed for `url`; the status is then `Disconnected`.
    pub fn connect(&mut self, url: &str, timers: &mut Timers) -> Result<(), ClientError> {
        if self.status != ConnectionStatus::Disconnected {
            debug!(generation = self.generation, "replacing open session");
            self.transport.close();
        }
        timers.disarm(TimerKind::Reconnect);
        self.reconnect_attempts = 0;
        self.url = Some(url.to_string());

        self.open_transport().map_err(|e| ClientError::Connectivity {
            url: url.to_string(),
            reason: e.to_string(),
            fatal: true,
        })
    }

    /// Handles [`TransportEvent::Opened`](crate::application::ports::TransportEvent::Opened).
    ///
    /// Returns `true` if the event belonged to the live session, which is
    /// now `Connected`.
    pub fn on_opened(&mut self, generation: Generation) -> bool {
        if generation != self.generation || self.status != ConnectionStatus::Connecting {
            debug!(generation, current = self.generation, "ignoring stale open");
            return false;
        }
        self.reconnect_attempts = 0;
        info!(url = self.url.as_deref().unwrap_or_default(), "connected");
        self.set_status(ConnectionStatus::Connected);
        true
    }

    /// Handles [`TransportEvent::Closed`](crate::application::ports::TransportEvent::Closed).
    ///
    /// Returns `None` for stale events.  Otherwise the session is now
    /// `Disconnected` and the returned [`Disconnection`] says whether a
    /// reconnect was scheduled.
    pub fn on_closed(
        &mut self,
        generation: Generation,
        reason: &str,
        timers: &mut Timers,
    ) -> Option<Disconnection> {
        if !self.is_current(generation) {
            debug!(generation, current = self.generation, "ignoring stale close");
            return None;
        }
        self.transport.close();
        Some(self.schedule_reconnect(reason, timers))
    }

    /// Runs when the reconnect timer fires.
    ///
    /// Returns a [`Disconnection`] if the transport could not even be
    /// constructed (treated like a failed attempt).
    pub fn on_reconnect_due(&mut self, timers: &mut Timers) -> Option<Disconnection> {
        if self.url.is_none() || self.status != ConnectionStatus::Disconnected {
            return None;
        }
        info!(attempt = self.reconnect_attempts, "reconnecting");
        match self.open_transport() {
            Ok(()) => None,
            Err(e) => Some(self.schedule_reconnect(&e.to_string(), timers)),
        }
    }

    /// Tears the session down.  Idempotent.
    ///
    /// The generation is bumped so events still in flight from the old
    /// session are ignored.
    pub fn close(&mut self, timers: &mut Timers) {
        timers.disarm(TimerKind::Reconnect);
        self.transport.close();
        self.generation += 1;
        self.reconnect_attempts = 0;
        self.set_status(ConnectionStatus::Disconnected);
    }

    /// Hands one serialized frame to the transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotOpen`] unless the session is connected.
    pub fn transmit(&mut self, text: String) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotOpen);
        }
        self.transport.send(text)
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn open_transport(&mut self) -> Result<(), TransportError> {
        let url = self.url.clone().unwrap_or_default();
        self.generation += 1;
        self.set_status(ConnectionStatus::Connecting);
        if let Err(e) = self.transport.open(&url, self.generation) {
            warn!(%url, "cannot open transport: {e}");
            self.set_status(ConnectionStatus::Disconnected);
            return Err(e);
        }
        Ok(())
    }

    fn schedule_reconnect(&mut self, reason: &str, timers: &mut Timers) -> Disconnection {
        self.set_status(ConnectionStatus::Disconnected);
        let url = self.url.clone().unwrap_or_default();

        if self.reconnect_attempts < self.policy.max_attempts {
            self.reconnect_attempts += 1;
            let delay = self.policy.delay_for(self.reconnect_attempts);
            timers.arm(TimerKind::Reconnect, delay);
            warn!(
                %url,
                attempt = self.reconnect_attempts,
                max = self.policy.max_attempts,
                ?delay,
                "connection lost ({reason}); reconnect scheduled"
            );
            Disconnection {
                error: ClientError::Connectivity {
                    url,
                    reason: reason.to_string(),
                    fatal: false,
                },
                retry: Some((self.reconnect_attempts, delay)),
            }
        } else {
            warn!(%url, "connection lost ({reason}); giving up after {} attempts", self.reconnect_attempts);
            Disconnection {
                error: ClientError::Connectivity {
                    url,
                    reason: format!("cannot connect after {} attempts: {reason}", self.reconnect_attempts),
                    fatal: true,
                },
                retry: None,
            }
        }
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        if self.status == status {
            return;
        }
        self.status = status;
        for listener in &mut self.listeners {
            listener(status);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
