//! In-memory collaborators for tests.
//!
//! None of these perform I/O or wait.  [`MockTransport`] and
//! [`ManualScheduler`] are cheap handles around shared state: give one clone
//! to the client and keep another to inspect and drive it.  The recording
//! sinks push every call into a `Mutex<Vec<...>>` field so assertions can see
//! exactly what was emitted and in what order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let transport = MockTransport::new();
//! let scheduler = ManualScheduler::new();
//! let client = SortClient::new(config, Collaborators {
//!     transport: Box::new(transport.clone()),
//!     scheduler: Box::new(scheduler.clone()),
//!     ..
//! });
//!
//! let (id, delay) = scheduler.take(TimerKind::SendCooldown).unwrap();
//! client.handle_event(ClientEvent::TimerFired { kind: TimerKind::SendCooldown, id });
//! assert_eq!(transport.sent().len(), 2);
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use sortviz_core::{Algorithm, DataValue, HighlightClass, PerformanceResult, RequestId};

use crate::application::ports::{
    Generation, Renderer, ResultRecorder, Transport, TransportError, UserNotifier,
};
use crate::application::timers::{Scheduler, TimerId, TimerKind};
use crate::domain::{ClientError, ConnectionStatus};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

// ── MockTransport ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct TransportState {
    opened: Vec<(String, Generation)>,
    sent: Vec<String>,
    closes: usize,
    open_failure: Option<String>,
    fail_sends: bool,
}

/// Records opens, sends and closes.  Never produces events by itself; tests
/// post `TransportEvent`s to the client directly.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<TransportState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `open` fail with `reason`.
    pub fn fail_next_open(&self, reason: &str) {
        lock(&self.state).open_failure = Some(reason.to_string());
    }

    /// Makes every `send` fail while `fail` is set.
    pub fn fail_sends(&self, fail: bool) {
        lock(&self.state).fail_sends = fail;
    }

    /// Every `(url, generation)` passed to `open`, in order.
    pub fn opened(&self) -> Vec<(String, Generation)> {
        lock(&self.state).opened.clone()
    }

    /// Every frame accepted by `send`, in order.
    pub fn sent(&self) -> Vec<String> {
        lock(&self.state).sent.clone()
    }

    pub fn close_count(&self) -> usize {
        lock(&self.state).closes
    }
}

impl Transport for MockTransport {
    fn open(&mut self, url: &str, generation: Generation) -> Result<(), TransportError> {
        let mut state = lock(&self.state);
        if let Some(reason) = state.open_failure.take() {
            return Err(TransportError::InvalidUrl {
                url: url.to_string(),
                reason,
            });
        }
        state.opened.push((url.to_string(), generation));
        Ok(())
    }

    fn send(&mut self, text: String) -> Result<(), TransportError> {
        let mut state = lock(&self.state);
        if state.fail_sends {
            return Err(TransportError::Io("simulated send failure".to_string()));
        }
        state.sent.push(text);
        Ok(())
    }

    fn close(&mut self) {
        lock(&self.state).closes += 1;
    }
}

// ── ManualScheduler ───────────────────────────────────────────────────────────

/// Keeps scheduled timers until a test takes them and fires them by hand.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    pending: Arc<Mutex<Vec<(TimerKind, TimerId, Duration)>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// All scheduled, not yet taken or canceled timers, in scheduling order.
    pub fn pending(&self) -> Vec<(TimerKind, TimerId, Duration)> {
        lock(&self.pending).clone()
    }

    /// The pending timers of `kind`.
    pub fn pending_of(&self, kind: TimerKind) -> Vec<(TimerId, Duration)> {
        lock(&self.pending)
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .map(|(_, id, delay)| (*id, *delay))
            .collect()
    }

    /// Removes and returns the oldest pending timer of `kind`.
    pub fn take(&self, kind: TimerKind) -> Option<(TimerId, Duration)> {
        let mut pending = lock(&self.pending);
        let index = pending.iter().position(|(k, _, _)| *k == kind)?;
        let (_, id, delay) = pending.remove(index);
        Some((id, delay))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, kind: TimerKind, id: TimerId, delay: Duration) {
        lock(&self.pending).push((kind, id, delay));
    }

    fn cancel(&mut self, kind: TimerKind, id: TimerId) {
        lock(&self.pending).retain(|(k, i, _)| !(*k == kind && *i == id));
    }
}

// ── Recording sinks ───────────────────────────────────────────────────────────

/// Records every rendered frame.
#[derive(Default)]
pub struct RecordingRenderer {
    pub frames: Mutex<Vec<(Vec<DataValue>, Vec<HighlightClass>)>>,
}

impl Renderer for RecordingRenderer {
    fn render(&self, values: &[DataValue], classes: &[HighlightClass]) {
        lock(&self.frames).push((values.to_vec(), classes.to_vec()));
    }
}

/// Records every benchmark result.
#[derive(Default)]
pub struct RecordingRecorder {
    pub records: Mutex<Vec<(Algorithm, PerformanceResult)>>,
}

impl RecordingRecorder {
    /// The recorded algorithms, in recording order.
    pub fn algorithms(&self) -> Vec<Algorithm> {
        lock(&self.records).iter().map(|(a, _)| *a).collect()
    }
}

impl ResultRecorder for RecordingRecorder {
    fn record(&self, algorithm: Algorithm, result: &PerformanceResult) {
        lock(&self.records).push((algorithm, result.clone()));
    }
}

/// Records every notification.
#[derive(Default)]
pub struct RecordingNotifier {
    pub statuses: Mutex<Vec<ConnectionStatus>>,
    pub errors: Mutex<Vec<ClientError>>,
    pub suites: Mutex<Vec<BTreeMap<Algorithm, PerformanceResult>>>,
    pub finished: Mutex<Vec<RequestId>>,
}

impl UserNotifier for RecordingNotifier {
    fn status_changed(&self, status: ConnectionStatus) {
        lock(&self.statuses).push(status);
    }

    fn error(&self, error: &ClientError) {
        lock(&self.errors).push(error.clone());
    }

    fn suite_completed(&self, results: &BTreeMap<Algorithm, PerformanceResult>) {
        lock(&self.suites).push(results.clone());
    }

    fn teaching_finished(&self, request_id: &RequestId) {
        lock(&self.finished).push(request_id.clone());
    }
}
