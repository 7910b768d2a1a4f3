//! Integration tests for outbound ordering and send pacing.
//!
//! The dispatcher, the connection manager and the timer set are wired
//! together by hand here, the same way `ClientCore` wires them, so that
//! messages can be queued while the session is down and then watched as they
//! drain.  Two properties are checked:
//!
//! - **FIFO**: messages leave in the order they were enqueued, including
//!   across a disconnected → connected transition.
//! - **Single flight**: at most one transmit per cooldown window.  The next
//!   transmit only happens when the `SendCooldown` timer fires.

mod common;

use std::time::Duration;

use common::{Harness, URL};
use sortviz_client::application::connection::ConnectionManager;
use sortviz_client::application::dispatcher::OutboundDispatcher;
use sortviz_client::application::teaching::TeachingRequest;
use sortviz_client::application::timers::{TimerKind, Timers};
use sortviz_client::domain::{ClientError, ReconnectPolicy};
use sortviz_client::infrastructure::mock::{ManualScheduler, MockTransport};
use sortviz_core::{
    Algorithm, ControlAction, ControlRequest, DataType, DataValue, Distribution, OutboundMessage,
    RequestId,
};

const COOLDOWN: Duration = Duration::from_millis(100);

struct Wiring {
    transport: MockTransport,
    scheduler: ManualScheduler,
    connection: ConnectionManager,
    dispatcher: OutboundDispatcher,
    timers: Timers,
}

impl Wiring {
    fn new() -> Self {
        let transport = MockTransport::new();
        let scheduler = ManualScheduler::new();
        Self {
            connection: ConnectionManager::new(Box::new(transport.clone()), ReconnectPolicy::default()),
            dispatcher: OutboundDispatcher::new(COOLDOWN),
            timers: Timers::new(Box::new(scheduler.clone())),
            transport,
            scheduler,
        }
    }

    fn connect(&mut self) -> Vec<ClientError> {
        self.connection.connect(URL, &mut self.timers).unwrap();
        let generation = self.connection.generation();
        assert!(self.connection.on_opened(generation));
        self.dispatcher.on_connected(&mut self.connection, &mut self.timers)
    }

    fn enqueue(&mut self, id: &str) {
        self.dispatcher
            .enqueue(control(id), &mut self.connection, &mut self.timers)
            .unwrap();
    }

    /// Fires the pending cooldown, as the event loop would after 100 ms.
    fn elapse_cooldown(&mut self) -> bool {
        let Some((id, delay)) = self.scheduler.take(TimerKind::SendCooldown) else {
            return false;
        };
        assert_eq!(delay, COOLDOWN);
        assert!(self.timers.accept(TimerKind::SendCooldown, id));
        let failures = self
            .dispatcher
            .on_cooldown_elapsed(&mut self.connection, &mut self.timers);
        assert!(failures.is_empty());
        true
    }

    /// Request ids of every transmitted frame, in order.
    fn sent_ids(&self) -> Vec<String> {
        self.transport
            .sent()
            .iter()
            .map(|text| {
                let v: serde_json::Value = serde_json::from_str(text).unwrap();
                v["requestId"].as_str().unwrap().to_string()
            })
            .collect()
    }
}

fn control(id: &str) -> OutboundMessage {
    OutboundMessage::Control(ControlRequest {
        request_id: RequestId::from(id),
        action: ControlAction::Pause,
        timestamp: None,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_messages_queued_while_disconnected_flush_in_order() {
    // Arrange
    let mut w = Wiring::new();

    // Act: enqueue before any session exists
    for id in ["m1", "m2", "m3"] {
        w.enqueue(id);
    }
    assert!(w.transport.sent().is_empty());
    assert_eq!(w.dispatcher.len(), 3);

    let failures = w.connect();
    while w.elapse_cooldown() {}

    // Assert
    assert!(failures.is_empty());
    assert_eq!(w.sent_ids(), vec!["m1", "m2", "m3"]);
    assert!(w.dispatcher.is_empty());
}

#[test]
fn test_order_survives_a_drop_in_the_middle_of_draining() {
    // Arrange: connected, one message out, two waiting on the cooldown
    let mut w = Wiring::new();
    w.connect();
    for id in ["a", "b", "c"] {
        w.enqueue(id);
    }
    assert_eq!(w.sent_ids(), vec!["a"]);

    // Act: the session drops, more messages arrive, the session comes back
    let generation = w.connection.generation();
    assert!(w.connection.on_closed(generation, "reset", &mut w.timers).is_some());
    w.elapse_cooldown();
    w.enqueue("d");
    assert_eq!(w.sent_ids(), vec!["a"], "nothing leaves while disconnected");

    w.timers.disarm(TimerKind::Reconnect);
    w.connect();
    while w.elapse_cooldown() {}

    // Assert
    assert_eq!(w.sent_ids(), vec!["a", "b", "c", "d"]);
}

#[test]
fn test_at_most_one_transmit_per_cooldown_window() {
    // Arrange
    let mut w = Wiring::new();
    w.connect();

    // Act / Assert: each cooldown firing releases exactly one message
    for id in ["1", "2", "3", "4"] {
        w.enqueue(id);
    }
    for expected in 1..=4 {
        assert_eq!(w.transport.sent().len(), expected);
        assert!(w.dispatcher.is_sending());
        assert_eq!(w.scheduler.pending_of(TimerKind::SendCooldown).len(), 1);
        w.elapse_cooldown();
    }
    assert!(!w.dispatcher.is_sending());
    assert!(w.scheduler.pending_of(TimerKind::SendCooldown).is_empty());
}

#[test]
fn test_failed_transmits_are_dropped_without_blocking_the_queue() {
    // Arrange
    let mut w = Wiring::new();
    w.connect();
    w.enqueue("ok-1");
    w.enqueue("lost-1");
    w.enqueue("lost-2");

    // Act: the transport rejects everything while the queue drains
    w.transport.fail_sends(true);
    let (id, _) = w.scheduler.take(TimerKind::SendCooldown).unwrap();
    assert!(w.timers.accept(TimerKind::SendCooldown, id));
    let failures = w.dispatcher.on_cooldown_elapsed(&mut w.connection, &mut w.timers);
    w.transport.fail_sends(false);
    w.enqueue("ok-2");

    // Assert
    let failed: Vec<&str> = failures
        .iter()
        .map(|e| match e {
            ClientError::SendFailure { request_id, .. } => request_id.as_str(),
            other => panic!("unexpected error {other:?}"),
        })
        .collect();
    assert_eq!(failed, vec!["lost-1", "lost-2"]);
    assert!(w.dispatcher.is_empty());
    assert_eq!(w.sent_ids(), vec!["ok-1", "ok-2"]);
}

#[test]
fn test_client_paces_teaching_request_and_controls() {
    // Arrange
    let mut h = Harness::connected();
    let request = TeachingRequest {
        algorithm: Algorithm::Bubble,
        data: vec![DataValue::Int(2), DataValue::Int(1)],
        data_type: DataType::Integer,
        distribution: Distribution::Random,
        interval_ms: None,
        comparator: Default::default(),
    };

    // Act
    let request_id = h.client.start_teaching(request).unwrap();
    h.client.send_control(ControlAction::Pause).unwrap();
    h.client.send_control(ControlAction::Resume).unwrap();
    let after_commands = h.transport.sent().len();
    while h.fire_cooldown() {}

    // Assert
    assert_eq!(after_commands, 1, "controls wait for the cooldown");
    let sent = h.sent_json();
    let kinds: Vec<(&str, &str)> = sent
        .iter()
        .map(|v| (v["type"].as_str().unwrap(), v["action"].as_str().unwrap_or("")))
        .collect();
    assert_eq!(
        kinds,
        vec![("SORT_REQUEST", ""), ("CONTROL", "PAUSE"), ("CONTROL", "RESUME")]
    );
    assert!(sent.iter().all(|v| v["requestId"] == request_id.as_str()));
    assert_eq!(sent[0]["interval"], 500);
}
