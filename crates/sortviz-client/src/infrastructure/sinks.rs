//! Default renderer, recorder and notifier for the command-line client.
//!
//! - [`TextRenderer`] writes one line per teaching frame.
//! - [`SummaryRecorder`] keeps every benchmark result for a final table.
//! - [`TracingNotifier`] logs user-facing events and can forward the ones
//!   that end a command to the binary as [`SessionOutcome`]s.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;
use std::sync::Mutex;

use sortviz_core::{Algorithm, DataValue, HighlightClass, PerformanceResult, RequestId};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::application::ports::{Renderer, ResultRecorder, UserNotifier};
use crate::domain::{ClientError, ConnectionStatus};

// ── TextRenderer ──────────────────────────────────────────────────────────────

/// Renders frames as text, marking each element by its highlight class.
///
/// | Class   | Marker  |
/// |---------|---------|
/// | swap    | `*7*`   |
/// | compare | `<7>`   |
/// | heap    | `{7}`   |
/// | pivot   | `\|7\|` |
/// | sorted  | `(7)`   |
/// | normal  | ` 7 `   |
pub struct TextRenderer {
    out: Mutex<Box<dyn Write + Send>>,
}

impl TextRenderer {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl Renderer for TextRenderer {
    fn render(&self, values: &[DataValue], classes: &[HighlightClass]) {
        let line = format_frame(values, classes);
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(out, "{line}") {
            debug!("frame not written: {e}");
        }
    }
}

/// Formats one frame.  Elements without a class are drawn as normal.
pub fn format_frame(values: &[DataValue], classes: &[HighlightClass]) -> String {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let class = classes.get(i).copied().unwrap_or(HighlightClass::Normal);
            let text = format_value(value);
            match class {
                HighlightClass::Swap => format!("*{text}*"),
                HighlightClass::Compare => format!("<{text}>"),
                HighlightClass::Heap => format!("{{{text}}}"),
                HighlightClass::Pivot => format!("|{text}|"),
                HighlightClass::Sorted => format!("({text})"),
                HighlightClass::Normal => format!(" {text} "),
            }
        })
        .collect::<Vec<_>>()
        .join("")
}

fn format_value(value: &DataValue) -> String {
    match value {
        DataValue::Int(v) => v.to_string(),
        DataValue::Float(v) => format!("{v:.2}"),
        DataValue::Record(p) => format!("{}:{:.1}", p.name, p.score),
    }
}

// ── SummaryRecorder ───────────────────────────────────────────────────────────

/// Keeps the latest result per algorithm.
#[derive(Default)]
pub struct SummaryRecorder {
    results: Mutex<BTreeMap<Algorithm, PerformanceResult>>,
}

impl SummaryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> BTreeMap<Algorithm, PerformanceResult> {
        self.results.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// A fixed-width table of the recorded results, in suite order.
    pub fn summary_table(&self) -> String {
        format_summary(&self.results())
    }
}

impl ResultRecorder for SummaryRecorder {
    fn record(&self, algorithm: Algorithm, result: &PerformanceResult) {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(algorithm, result.clone());
    }
}

/// Formats `results` as a table, fastest marked with `*`.
pub fn format_summary(results: &BTreeMap<Algorithm, PerformanceResult>) -> String {
    let fastest = results
        .iter()
        .min_by_key(|(_, r)| r.time)
        .map(|(algorithm, _)| *algorithm);

    let mut table = format!(
        "{:<11} {:>10} {:>14} {:>12}\n",
        "algorithm", "time (ms)", "comparisons", "swaps"
    );
    for (algorithm, r) in results {
        let marker = if Some(*algorithm) == fastest { "*" } else { "" };
        let _ = writeln!(
            table,
            "{:<11} {:>10} {:>14} {:>12}",
            format!("{algorithm}{marker}"),
            r.time,
            r.comparisons,
            r.swaps
        );
    }
    table
}

// ── TracingNotifier ───────────────────────────────────────────────────────────

/// Events that end (or unblock) a command of the binary.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Connected,
    SuiteCompleted(BTreeMap<Algorithm, PerformanceResult>),
    TeachingFinished(RequestId),
    Error(ClientError),
}

/// Logs user-facing events through `tracing`.
#[derive(Default)]
pub struct TracingNotifier {
    outcomes: Option<mpsc::UnboundedSender<SessionOutcome>>,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also forwards outcomes to `outcomes`.
    pub fn with_outcomes(outcomes: mpsc::UnboundedSender<SessionOutcome>) -> Self {
        Self {
            outcomes: Some(outcomes),
        }
    }

    fn forward(&self, outcome: SessionOutcome) {
        if let Some(tx) = &self.outcomes {
            // Nobody listening any more is fine.
            let _ = tx.send(outcome);
        }
    }
}

impl UserNotifier for TracingNotifier {
    fn status_changed(&self, status: ConnectionStatus) {
        info!(%status, "connection status");
        if status == ConnectionStatus::Connected {
            self.forward(SessionOutcome::Connected);
        }
    }

    fn error(&self, err: &ClientError) {
        if err.is_fatal() {
            error!("{err}");
        } else {
            warn!("{err}");
        }
        self.forward(SessionOutcome::Error(err.clone()));
    }

    fn suite_completed(&self, results: &BTreeMap<Algorithm, PerformanceResult>) {
        info!(algorithms = results.len(), "benchmark suite complete");
        self.forward(SessionOutcome::SuiteCompleted(results.clone()));
    }

    fn teaching_finished(&self, request_id: &RequestId) {
        info!(%request_id, "teaching run complete");
        self.forward(SessionOutcome::TeachingFinished(request_id.clone()));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
