//! Shared harness for the client integration tests.
//!
//! Builds a [`SortClient`] from the in-memory collaborators and keeps a
//! handle to each of them, so a test can post events, fire timers by hand
//! and inspect everything the client emitted.

#![allow(dead_code)]

use std::sync::Arc;

use sortviz_client::application::ports::TransportEvent;
use sortviz_client::application::timers::TimerKind;
use sortviz_client::application::{ClientEvent, Collaborators, SortClient};
use sortviz_client::domain::ClientConfig;
use sortviz_client::infrastructure::mock::{
    ManualScheduler, MockTransport, RecordingNotifier, RecordingRecorder, RecordingRenderer,
};
use sortviz_core::RandomDatasetGenerator;

pub const URL: &str = "ws://sorter.test/websocket";

pub struct Harness {
    pub client: SortClient,
    pub transport: MockTransport,
    pub scheduler: ManualScheduler,
    pub renderer: Arc<RecordingRenderer>,
    pub recorder: Arc<RecordingRecorder>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let transport = MockTransport::new();
        let scheduler = ManualScheduler::new();
        let renderer = Arc::new(RecordingRenderer::default());
        let recorder = Arc::new(RecordingRecorder::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let client = SortClient::new(
            config,
            Collaborators {
                transport: Box::new(transport.clone()),
                scheduler: Box::new(scheduler.clone()),
                generator: Arc::new(RandomDatasetGenerator::seeded(42)),
                renderer: renderer.clone(),
                recorder: recorder.clone(),
                notifier: notifier.clone(),
            },
        );
        Self {
            client,
            transport,
            scheduler,
            renderer,
            recorder,
            notifier,
        }
    }

    /// A harness whose session to [`URL`] is already open.
    pub fn connected() -> Self {
        let mut h = Self::new();
        h.client.connect(URL).expect("connect");
        h.open();
        h
    }

    pub fn generation(&self) -> u64 {
        self.client.core().connection().generation()
    }

    /// Reports the current session's handshake as finished.
    pub fn open(&mut self) {
        let generation = self.generation();
        self.client
            .handle_event(ClientEvent::Transport(TransportEvent::Opened { generation }));
    }

    /// Reports the current session as closed by the network.
    pub fn drop_session(&mut self, reason: &str) {
        let generation = self.generation();
        self.client.handle_event(ClientEvent::Transport(TransportEvent::Closed {
            generation,
            reason: reason.to_string(),
        }));
    }

    /// Delivers one inbound frame on the current session.
    pub fn frame(&mut self, text: &str) {
        let generation = self.generation();
        self.client.handle_event(ClientEvent::Transport(TransportEvent::Frame {
            generation,
            text: text.to_string(),
        }));
    }

    /// Fires the oldest pending timer of `kind`.  Panics if none is pending.
    pub fn fire(&mut self, kind: TimerKind) {
        let (id, _) = self
            .scheduler
            .take(kind)
            .unwrap_or_else(|| panic!("no pending {kind:?} timer"));
        self.client.handle_event(ClientEvent::TimerFired { kind, id });
    }

    /// Fires the send cooldown if one is pending.  Returns whether it fired.
    pub fn fire_cooldown(&mut self) -> bool {
        match self.scheduler.take(TimerKind::SendCooldown) {
            Some((id, _)) => {
                self.client.handle_event(ClientEvent::TimerFired {
                    kind: TimerKind::SendCooldown,
                    id,
                });
                true
            }
            None => false,
        }
    }

    /// Every sent frame, parsed as JSON.
    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.transport
            .sent()
            .iter()
            .map(|text| serde_json::from_str(text).expect("client sent invalid JSON"))
            .collect()
    }
}
