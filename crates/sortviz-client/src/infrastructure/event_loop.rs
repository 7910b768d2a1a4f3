//! The client event loop and the handle used to drive it.
//!
//! [`EventLoop::spawn`] builds a [`SortClient`] with the production
//! transport and scheduler, and runs it on a tokio task that consumes one
//! unbounded channel of [`ClientEvent`]s.  The transport, the scheduler and
//! every [`ClientHandle`] feed that same channel, so all client state is
//! mutated from exactly one task, in arrival order.

use std::sync::Arc;

use anyhow::Context;
use sortviz_core::{Algorithm, ControlAction, DatasetGenerator, DatasetParams};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::application::ports::{Renderer, ResultRecorder, UserNotifier};
use crate::application::teaching::TeachingRequest;
use crate::application::{ClientCommand, ClientEvent, Collaborators, SortClient};
use crate::domain::ClientConfig;
use crate::infrastructure::scheduler::TokioScheduler;
use crate::infrastructure::ws_transport::WsTransport;

/// Sinks and generator the production client is built with.
pub struct Sinks {
    pub generator: Arc<dyn DatasetGenerator>,
    pub renderer: Arc<dyn Renderer>,
    pub recorder: Arc<dyn ResultRecorder>,
    pub notifier: Arc<dyn UserNotifier>,
}

/// Owns the client and the receiving end of its event channel.
pub struct EventLoop {
    client: SortClient,
    events: mpsc::UnboundedReceiver<ClientEvent>,
}

impl EventLoop {
    /// Wraps an already built client.
    pub fn new(client: SortClient, events: mpsc::UnboundedReceiver<ClientEvent>) -> Self {
        Self { client, events }
    }

    /// Builds the production client and runs its loop on a new task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: ClientConfig, sinks: Sinks) -> (ClientHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = SortClient::new(
            config,
            Collaborators {
                transport: Box::new(WsTransport::new(tx.clone())),
                scheduler: Box::new(TokioScheduler::new(tx.clone())),
                generator: sinks.generator,
                renderer: sinks.renderer,
                recorder: sinks.recorder,
                notifier: sinks.notifier,
            },
        );
        let task = tokio::spawn(EventLoop::new(client, rx).run());
        (ClientHandle { events: tx }, task)
    }

    /// Handles events until [`ClientCommand::Shutdown`] arrives or every
    /// sender is gone.  The session is closed on the way out.
    pub async fn run(mut self) {
        debug!("client event loop started");
        while let Some(event) = self.events.recv().await {
            if matches!(event, ClientEvent::Command(ClientCommand::Shutdown)) {
                info!("shutdown requested");
                break;
            }
            self.client.handle_event(event);
        }
        self.client.close();
        debug!("client event loop stopped");
    }
}

/// Cloneable front door to a running [`EventLoop`].
#[derive(Clone)]
pub struct ClientHandle {
    events: mpsc::UnboundedSender<ClientEvent>,
}

impl ClientHandle {
    pub fn connect(&self, url: impl Into<String>) -> anyhow::Result<()> {
        self.command(ClientCommand::Connect(url.into()))
    }

    pub fn close(&self) -> anyhow::Result<()> {
        self.command(ClientCommand::Close)
    }

    pub fn start_benchmark(&self, params: DatasetParams, algorithms: Vec<Algorithm>) -> anyhow::Result<()> {
        self.command(ClientCommand::StartBenchmark { params, algorithms })
    }

    pub fn start_teaching(&self, request: TeachingRequest) -> anyhow::Result<()> {
        self.command(ClientCommand::StartTeaching(request))
    }

    pub fn reset_teaching(&self) -> anyhow::Result<()> {
        self.command(ClientCommand::ResetTeaching)
    }

    pub fn control(&self, action: ControlAction) -> anyhow::Result<()> {
        self.command(ClientCommand::Control(action))
    }

    /// Asks the loop to close the session and stop.
    pub fn shutdown(&self) -> anyhow::Result<()> {
        self.command(ClientCommand::Shutdown)
    }

    fn command(&self, command: ClientCommand) -> anyhow::Result<()> {
        self.events
            .send(ClientEvent::Command(command))
            .ok()
            .context("client event loop has stopped")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
