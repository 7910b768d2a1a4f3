//! Tokio-backed [`Scheduler`]: one sleeping task per armed timer.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::application::timers::{Scheduler, TimerId, TimerKind};
use crate::application::ClientEvent;

/// Posts [`ClientEvent::TimerFired`] after each scheduled delay.
///
/// Must be used from within a tokio runtime.
pub struct TokioScheduler {
    events: mpsc::UnboundedSender<ClientEvent>,
    pending: HashMap<TimerKind, (TimerId, JoinHandle<()>)>,
}

impl TokioScheduler {
    pub fn new(events: mpsc::UnboundedSender<ClientEvent>) -> Self {
        Self {
            events,
            pending: HashMap::new(),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, kind: TimerKind, id: TimerId, delay: Duration) {
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The loop may have shut down in the meantime.
            let _ = events.send(ClientEvent::TimerFired { kind, id });
        });
        if let Some((_, previous)) = self.pending.insert(kind, (id, task)) {
            previous.abort();
        }
    }

    fn cancel(&mut self, kind: TimerKind, id: TimerId) {
        if self.pending.get(&kind).is_some_and(|(armed, _)| *armed == id) {
            if let Some((_, task)) = self.pending.remove(&kind) {
                task.abort();
                trace!(?kind, id = id.0, "timer task aborted");
            }
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, (_, task)) in self.pending.drain() {
            task.abort();
        }
    }
}
