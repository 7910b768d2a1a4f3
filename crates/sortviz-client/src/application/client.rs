//! The client: every component behind one event-driven facade.
//!
//! # Event flow
//!
//! ```text
//!  user command ─┐
//!  transport ────┼──▶ ClientEvent ──▶ SortClient::handle_event
//!  timer fired ──┘                          │
//!                ┌──────────────────────────┼──────────────────────────┐
//!                ▼                          ▼                          ▼
//!        ConnectionManager          InboundRouter ──▶ handlers    OutboundDispatcher
//!                                            (benchmark, teaching, error)
//! ```
//!
//! [`SortClient`] owns a [`ClientCore`] (the mutable state) and an
//! [`InboundRouter`] whose handlers receive `&mut ClientCore`.  Everything
//! runs on the caller's task, one event at a time; background tasks only
//! post [`ClientEvent`]s.
//!
//! Commands return their error to the caller.  Errors that arise while
//! handling transport and timer events are reported through the
//! [`UserNotifier`].

use std::sync::Arc;

use sortviz_core::{
    now_millis, Algorithm, ControlAction, ControlRequest, DatasetGenerator, DatasetParams,
    ErrorReport, InboundMessage, MessageKind, OutboundMessage, PerformanceResult, RequestId,
    StepUpdate,
};
use tracing::{debug, info, warn};

use crate::application::benchmark::{BenchmarkOrchestrator, BenchmarkProgress};
use crate::application::connection::ConnectionManager;
use crate::application::dispatcher::OutboundDispatcher;
use crate::application::ports::{
    Renderer, ResultRecorder, Transport, TransportEvent, UserNotifier,
};
use crate::application::router::InboundRouter;
use crate::application::teaching::{StepOutcome, TeachingRequest, TeachingRun};
use crate::application::timers::{Scheduler, TimerId, TimerKind, Timers};
use crate::domain::{ClientConfig, ClientError, ConnectionStatus};

/// Everything the client loop reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Transport(TransportEvent),
    TimerFired { kind: TimerKind, id: TimerId },
    Command(ClientCommand),
}

/// User-initiated actions.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    Connect(String),
    Close,
    StartBenchmark {
        params: DatasetParams,
        algorithms: Vec<Algorithm>,
    },
    StartTeaching(TeachingRequest),
    ResetTeaching,
    Control(ControlAction),
    /// Close the session and stop the event loop.
    Shutdown,
}

/// The collaborators a [`SortClient`] is built from.
pub struct Collaborators {
    pub transport: Box<dyn Transport>,
    pub scheduler: Box<dyn Scheduler>,
    pub generator: Arc<dyn DatasetGenerator>,
    pub renderer: Arc<dyn Renderer>,
    pub recorder: Arc<dyn ResultRecorder>,
    pub notifier: Arc<dyn UserNotifier>,
}

/// Mutable state of the client, handed to inbound handlers.
pub struct ClientCore {
    connection: ConnectionManager,
    dispatcher: OutboundDispatcher,
    benchmark: BenchmarkOrchestrator,
    teaching: TeachingRun,
    timers: Timers,
    notifier: Arc<dyn UserNotifier>,
}

impl ClientCore {
    pub fn status(&self) -> ConnectionStatus {
        self.connection.status()
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn dispatcher(&self) -> &OutboundDispatcher {
        &self.dispatcher
    }

    pub fn benchmark(&self) -> &BenchmarkOrchestrator {
        &self.benchmark
    }

    pub fn teaching(&self) -> &TeachingRun {
        &self.teaching
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    // ── Inbound handlers ──────────────────────────────────────────────────────

    fn on_step_update(&mut self, update: StepUpdate) {
        if let StepOutcome::Finished(request_id) = self.teaching.on_step(update) {
            self.notifier.teaching_finished(&request_id);
        }
    }

    fn on_performance_result(&mut self, result: PerformanceResult) {
        if let BenchmarkProgress::Completed(results) = self.benchmark.on_result(result, &mut self.timers) {
            self.notifier.suite_completed(&results);
        }
    }

    fn on_error_report(&mut self, report: ErrorReport) {
        warn!(code = ?report.code, request_id = ?report.request_id, "service error: {}", report.message);
        self.notifier.error(&ClientError::Application {
            message: report.message,
            code: report.code,
        });
        self.abort_runs();
    }

    // ── Shared helpers ────────────────────────────────────────────────────────

    fn require_connected(&self) -> Result<(), ClientError> {
        if self.connection.is_connected() {
            Ok(())
        } else {
            Err(ClientError::InvalidRequest("not connected".to_string()))
        }
    }

    fn submit(&mut self, message: OutboundMessage) -> Result<(), ClientError> {
        self.dispatcher.enqueue(message, &mut self.connection, &mut self.timers)
    }

    /// Aborts the benchmark job and the teaching run and withdraws their
    /// queued messages.
    fn abort_runs(&mut self) {
        if let Some(request_id) = self.benchmark.abort(&mut self.timers) {
            self.dispatcher.retract(&request_id);
        }
        if let Some(request_id) = self.teaching.abort() {
            self.dispatcher.retract(&request_id);
        }
    }

    /// Reports transmit failures and lets the owning run react: the
    /// benchmark retries its step, a teaching run is abandoned.
    fn handle_send_failures(&mut self, failures: Vec<ClientError>) {
        for failure in failures {
            self.notifier.error(&failure);
            let ClientError::SendFailure { request_id, .. } = &failure else {
                continue;
            };
            if self.benchmark.on_send_failed(request_id, &mut self.timers) {
                continue;
            }
            if self.teaching.active_request_id() == Some(request_id) {
                self.teaching.abort();
            }
        }
    }

    fn send_benchmark_request(&mut self) {
        let Some(message) = self.benchmark.build_current_request() else {
            return;
        };
        if let Err(e) = self.submit(message) {
            self.handle_send_failures(vec![e]);
        }
    }
}

/// Client for the remote sorting service.
pub struct SortClient {
    core: ClientCore,
    router: InboundRouter<ClientCore>,
}

impl SortClient {
    pub fn new(config: ClientConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            transport,
            scheduler,
            generator,
            renderer,
            recorder,
            notifier,
        } = collaborators;

        let mut connection = ConnectionManager::new(transport, config.reconnect);
        let status_notifier = Arc::clone(&notifier);
        connection.add_status_listener(Box::new(move |status| status_notifier.status_changed(status)));

        let core = ClientCore {
            connection,
            dispatcher: OutboundDispatcher::new(config.dispatch.send_cooldown()),
            benchmark: BenchmarkOrchestrator::new(generator, recorder, config.benchmark),
            teaching: TeachingRun::new(renderer, config.teaching),
            timers: Timers::new(scheduler),
            notifier,
        };

        let mut router = InboundRouter::new();
        router.register(MessageKind::StepUpdate, |core: &mut ClientCore, message| {
            if let InboundMessage::StepUpdate(update) = message {
                core.on_step_update(update);
            }
        });
        router.register(MessageKind::PerformanceResult, |core: &mut ClientCore, message| {
            if let InboundMessage::PerformanceResult(result) = message {
                core.on_performance_result(result);
            }
        });
        router.register(MessageKind::Error, |core: &mut ClientCore, message| {
            if let InboundMessage::Error(report) = message {
                core.on_error_report(report);
            }
        });

        Self { core, router }
    }

    pub fn core(&self) -> &ClientCore {
        &self.core
    }

    pub fn status(&self) -> ConnectionStatus {
        self.core.status()
    }

    pub fn is_connected(&self) -> bool {
        self.core.connection.is_connected()
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    /// Opens a fresh session to `url`, replacing any current one.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connectivity`] when the URL is unusable.
    pub fn connect(&mut self, url: &str) -> Result<(), ClientError> {
        let core = &mut self.core;
        if core.connection.status() != ConnectionStatus::Disconnected {
            core.abort_runs();
        }
        core.connection.connect(url, &mut core.timers)
    }

    /// Tears everything down: session, queue, runs and timers.  Idempotent.
    pub fn close(&mut self) {
        let core = &mut self.core;
        core.abort_runs();
        core.dispatcher.reset(&mut core.timers);
        core.connection.close(&mut core.timers);
        core.timers.disarm_all();
    }

    /// Starts a benchmark suite, replacing any suite in progress.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidRequest`] when not connected, for an
    /// empty algorithm list or for invalid dataset parameters.
    pub fn start_benchmark(
        &mut self,
        params: DatasetParams,
        algorithms: &[Algorithm],
    ) -> Result<(), ClientError> {
        let core = &mut self.core;
        core.require_connected()?;
        let previous = core.benchmark.current_request_id().cloned();
        core.benchmark.start(params, algorithms, &mut core.timers)?;
        if let Some(request_id) = previous {
            core.dispatcher.retract(&request_id);
        }
        Ok(())
    }

    /// Starts a teaching run and returns its request id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidRequest`] when not connected, while a
    /// run is active, or for an unusable dataset.  Returns
    /// [`ClientError::SendFailure`] if the request could not be sent; the run
    /// is not started then.
    pub fn start_teaching(&mut self, request: TeachingRequest) -> Result<RequestId, ClientError> {
        let core = &mut self.core;
        core.require_connected()?;
        let message = core.teaching.begin(request)?;
        let request_id = message.request_id().clone();
        if let Err(e) = core.submit(message) {
            core.teaching.abort();
            return Err(e);
        }
        Ok(request_id)
    }

    /// Clears the teaching view and redraws the last data unhighlighted.
    pub fn reset_teaching(&mut self) {
        let core = &mut self.core;
        if let Some(request_id) = core.teaching.active_request_id().cloned() {
            core.dispatcher.retract(&request_id);
        }
        core.teaching.reset();
    }

    /// Sends a flow-control action for the active teaching run.
    ///
    /// `Stop` also ends the run locally.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidRequest`] without an active run, or
    /// [`ClientError::SendFailure`] if the message could not be sent.
    pub fn send_control(&mut self, action: ControlAction) -> Result<(), ClientError> {
        let core = &mut self.core;
        let Some(request_id) = core.teaching.active_request_id().cloned() else {
            return Err(ClientError::InvalidRequest(
                "no teaching run to control".to_string(),
            ));
        };
        core.submit(OutboundMessage::Control(ControlRequest {
            request_id,
            action,
            timestamp: Some(now_millis()),
        }))?;
        if action == ControlAction::Stop {
            core.teaching.abort();
        }
        Ok(())
    }

    // ── Events ────────────────────────────────────────────────────────────────

    /// Handles one event.  Command errors are reported to the notifier.
    pub fn handle_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Transport(event) => self.handle_transport(event),
            ClientEvent::TimerFired { kind, id } => self.handle_timer(kind, id),
            ClientEvent::Command(command) => self.handle_command(command),
        }
    }

    fn handle_command(&mut self, command: ClientCommand) {
        let result = match command {
            ClientCommand::Connect(url) => self.connect(&url),
            ClientCommand::Close | ClientCommand::Shutdown => {
                self.close();
                Ok(())
            }
            ClientCommand::StartBenchmark { params, algorithms } => {
                self.start_benchmark(params, &algorithms)
            }
            ClientCommand::StartTeaching(request) => self.start_teaching(request).map(|_| ()),
            ClientCommand::ResetTeaching => {
                self.reset_teaching();
                Ok(())
            }
            ClientCommand::Control(action) => self.send_control(action),
        };
        if let Err(e) = result {
            warn!("command rejected: {e}");
            self.core.notifier.error(&e);
        }
    }

    fn handle_transport(&mut self, event: TransportEvent) {
        let core = &mut self.core;
        match event {
            TransportEvent::Opened { generation } => {
                if core.connection.on_opened(generation) {
                    let failures = core.dispatcher.on_connected(&mut core.connection, &mut core.timers);
                    core.handle_send_failures(failures);
                }
            }
            TransportEvent::Frame { generation, text } => {
                if !core.connection.is_current(generation) {
                    debug!(generation, "frame from a replaced session dropped");
                    return;
                }
                match self.router.dispatch(core, &text) {
                    Ok(Some(kind)) => debug!(%kind, "frame handled"),
                    Ok(None) => {}
                    Err(e) => warn!("inbound frame dropped: {e}"),
                }
            }
            TransportEvent::Closed { generation, reason } => {
                if let Some(disconnection) = core.connection.on_closed(generation, &reason, &mut core.timers) {
                    core.abort_runs();
                    core.notifier.error(&disconnection.error);
                }
            }
        }
    }

    fn handle_timer(&mut self, kind: TimerKind, id: TimerId) {
        let core = &mut self.core;
        if !core.timers.accept(kind, id) {
            debug!(?kind, id = id.0, "stale timer ignored");
            return;
        }
        match kind {
            TimerKind::Reconnect => {
                if let Some(disconnection) = core.connection.on_reconnect_due(&mut core.timers) {
                    core.notifier.error(&disconnection.error);
                }
            }
            TimerKind::SendCooldown => {
                let failures = core.dispatcher.on_cooldown_elapsed(&mut core.connection, &mut core.timers);
                core.handle_send_failures(failures);
            }
            TimerKind::BenchmarkSettle | TimerKind::BenchmarkRetry => core.send_benchmark_request(),
            TimerKind::BenchmarkAdvance => core.benchmark.on_advance_elapsed(&mut core.timers),
        }
    }
}

impl Drop for SortClient {
    fn drop(&mut self) {
        if self.core.status() != ConnectionStatus::Disconnected {
            info!("client dropped; closing session");
            self.close();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
