//! sortviz-client: command-line front end for a remote sorting service.
//!
//! # Usage
//!
//! ```text
//! sortviz-client [--url <URL>] [--config <FILE>] <COMMAND>
//!
//! Commands:
//!   benchmark  Run every selected algorithm on one dataset and print a table
//!   teach      Stream one algorithm's steps and draw each frame
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable         | Default                          | Description              |
//! |------------------|----------------------------------|--------------------------|
//! | `SORTVIZ_URL`    | `ws://localhost:8080/websocket`  | Sorting service endpoint |
//! | `SORTVIZ_CONFIG` | (none)                           | TOML configuration file  |
//! | `RUST_LOG`       | `info`                           | Log filter               |
//!
//! CLI args take precedence over environment variables, which take precedence
//! over the configuration file.
//!
//! # What happens on a run
//!
//! 1. The client event loop is spawned and told to connect.
//! 2. Once the session is connected the command is started.
//! 3. The binary waits for the command's outcome (suite complete, teaching
//!    run finished, or an error that ends it) or for Ctrl+C.
//! 4. The event loop is shut down, which closes the session.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use sortviz_core::{
    Algorithm, ComparatorSettings, ComparisonMethod, DataType, DatasetGenerator, DatasetParams,
    Distribution, PersonField, RandomDatasetGenerator, SortDirection,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sortviz_client::application::teaching::TeachingRequest;
use sortviz_client::domain::{ClientConfig, ClientError, DatasetPolicy};
use sortviz_client::infrastructure::sinks::format_summary;
use sortviz_client::infrastructure::{
    load_config, ClientHandle, EventLoop, SessionOutcome, Sinks, SummaryRecorder, TextRenderer,
    TracingNotifier,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Client for a remote sorting service.
#[derive(Debug, Parser)]
#[command(
    name = "sortviz-client",
    about = "Benchmark and step through sorting algorithms running on a remote service",
    version
)]
struct Cli {
    /// WebSocket endpoint of the sorting service.
    ///
    /// Overrides `server_url` from the configuration file.
    #[arg(long, env = "SORTVIZ_URL")]
    url: Option<String>,

    /// Optional TOML configuration file.
    #[arg(long, env = "SORTVIZ_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a performance benchmark suite.
    Benchmark(BenchmarkArgs),
    /// Run one teaching-mode visualisation.
    Teach(TeachArgs),
}

/// Shape of the generated dataset, shared by both commands.
#[derive(Debug, Args)]
struct DatasetArgs {
    /// Element type: int, double or person.
    #[arg(long, default_value = "int")]
    value_type: DataType,

    /// random, sorted, reverse, duplicate or normal.
    #[arg(long, default_value = "random")]
    distribution: Distribution,

    /// Smallest generated value.
    #[arg(long, default_value_t = 1.0)]
    min: f64,

    /// Upper bound of generated values.
    #[arg(long, default_value_t = 1000.0)]
    max: f64,

    /// Seed for reproducible datasets.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Args)]
struct BenchmarkArgs {
    /// Number of elements to sort.
    #[arg(long, default_value_t = 1000)]
    size: usize,

    #[command(flatten)]
    dataset: DatasetArgs,

    /// Comma-separated algorithms, run in the given order.
    #[arg(
        long,
        value_delimiter = ',',
        default_values = ["insertion", "shell", "bubble", "quick", "heap", "merge"]
    )]
    algorithms: Vec<Algorithm>,

    /// Dataset policy: `shared` or `regenerate`.  Overrides the config file.
    #[arg(long)]
    policy: Option<DatasetPolicy>,
}

#[derive(Debug, Args)]
struct TeachArgs {
    /// Algorithm to visualise.
    #[arg(long, default_value = "bubble")]
    algorithm: Algorithm,

    /// Number of elements (at most the configured teaching limit).
    #[arg(long, default_value_t = 20)]
    size: usize,

    #[command(flatten)]
    dataset: DatasetArgs,

    /// Milliseconds the service waits between steps.
    #[arg(long)]
    interval: Option<u32>,

    /// ascending or descending.
    #[arg(long, default_value = "ascending")]
    direction: SortDirection,

    /// numeric, absolute or reverse.
    #[arg(long, default_value = "numeric")]
    method: ComparisonMethod,

    /// Field person records are sorted by: score, age, id or name.
    #[arg(long, default_value = "score")]
    field: PersonField,
}

impl DatasetArgs {
    fn params(&self, size: usize) -> DatasetParams {
        DatasetParams {
            size,
            value_type: self.value_type,
            distribution: self.distribution,
            min: self.min,
            max: self.max,
        }
    }

    fn generator(&self) -> RandomDatasetGenerator {
        match self.seed {
            Some(seed) => RandomDatasetGenerator::seeded(seed),
            None => RandomDatasetGenerator::new(),
        }
    }
}

impl Cli {
    /// Builds the [`ClientConfig`]: the file (if any), then CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or parsed.
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => ClientConfig::default(),
        };
        if let Some(url) = &self.url {
            config.server_url = url.clone();
        }
        if let Command::Benchmark(BenchmarkArgs {
            policy: Some(policy),
            ..
        }) = &self.command
        {
            config.benchmark.dataset_policy = *policy;
        }
        Ok(config)
    }

    fn dataset(&self) -> &DatasetArgs {
        match &self.command {
            Command::Benchmark(args) => &args.dataset,
            Command::Teach(args) => &args.dataset,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.client_config()?;
    info!("sortviz-client starting, service={}", config.server_url);

    let generator: Arc<dyn DatasetGenerator> = Arc::new(cli.dataset().generator());
    let recorder = Arc::new(SummaryRecorder::new());
    let (outcome_tx, mut outcomes) = mpsc::unbounded_channel();
    let (client, task) = EventLoop::spawn(
        config.clone(),
        Sinks {
            generator: Arc::clone(&generator),
            renderer: Arc::new(TextRenderer::stdout()),
            recorder: recorder.clone(),
            notifier: Arc::new(TracingNotifier::with_outcomes(outcome_tx)),
        },
    );
    client.connect(config.server_url.clone())?;

    let result = tokio::select! {
        r = run_command(&cli.command, &client, &mut outcomes, generator.as_ref()) => r,
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("received Ctrl+C, shutting down"),
                Err(e) => warn!("failed to listen for Ctrl+C signal: {e}"),
            }
            Ok(())
        }
    };

    client.shutdown().ok();
    task.await.context("client event loop panicked")?;

    let recorded = recorder.results();
    if !recorded.is_empty() {
        println!("{}", format_summary(&recorded));
    }
    result
}

// ── Command drivers ───────────────────────────────────────────────────────────

async fn run_command(
    command: &Command,
    client: &ClientHandle,
    outcomes: &mut mpsc::UnboundedReceiver<SessionOutcome>,
    generator: &dyn DatasetGenerator,
) -> anyhow::Result<()> {
    wait_for_connection(outcomes).await?;

    match command {
        Command::Benchmark(args) => {
            client.start_benchmark(args.dataset.params(args.size), args.algorithms.clone())?;
            loop {
                match next_outcome(outcomes).await? {
                    SessionOutcome::SuiteCompleted(results) => {
                        info!(algorithms = results.len(), "benchmark finished");
                        return Ok(());
                    }
                    // The orchestrator retries the step itself.
                    SessionOutcome::Error(ClientError::SendFailure { .. }) => {}
                    SessionOutcome::Error(e) => bail!("benchmark aborted: {e}"),
                    SessionOutcome::Connected | SessionOutcome::TeachingFinished(_) => {}
                }
            }
        }
        Command::Teach(args) => {
            let params = args.dataset.params(args.size);
            params.validate().map_err(anyhow::Error::msg)?;
            let request = TeachingRequest {
                algorithm: args.algorithm,
                data: generator.generate(&params),
                data_type: params.value_type,
                distribution: params.distribution,
                interval_ms: args.interval,
                comparator: ComparatorSettings {
                    direction: args.direction,
                    method: args.method,
                    struct_field: args.field,
                },
            };
            client.start_teaching(request)?;
            loop {
                match next_outcome(outcomes).await? {
                    SessionOutcome::TeachingFinished(request_id) => {
                        info!(%request_id, "teaching run finished");
                        return Ok(());
                    }
                    SessionOutcome::Error(e) => bail!("teaching run aborted: {e}"),
                    SessionOutcome::Connected | SessionOutcome::SuiteCompleted(_) => {}
                }
            }
        }
    }
}

/// Waits until the session is connected.  Non-fatal connectivity errors
/// mean a reconnect is already scheduled.
async fn wait_for_connection(
    outcomes: &mut mpsc::UnboundedReceiver<SessionOutcome>,
) -> anyhow::Result<()> {
    loop {
        match next_outcome(outcomes).await? {
            SessionOutcome::Connected => return Ok(()),
            SessionOutcome::Error(e) if e.is_fatal() => bail!("{e}"),
            _ => {}
        }
    }
}

async fn next_outcome(
    outcomes: &mut mpsc::UnboundedReceiver<SessionOutcome>,
) -> anyhow::Result<SessionOutcome> {
    outcomes
        .recv()
        .await
        .context("client event loop stopped unexpectedly")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
