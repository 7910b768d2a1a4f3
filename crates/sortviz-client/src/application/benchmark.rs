//! BenchmarkOrchestrator: runs a list of algorithms one after another.
//!
//! # State machine
//!
//! ```text
//!            start                 settle timer           result (more left)
//!   Idle ─────────────▶ Running ─────────────▶ request ─────────────▶ advance timer ─┐
//!    ▲                    ▲  │                   sent                                │
//!    │                    │  └──── send failed ──▶ retry timer ──▶ request again     │
//!    │                    └──────────────────────────────────────── step ◀───────────┘
//!    └──── last result (suite complete) / abort
//! ```
//!
//! The orchestrator never touches the dispatcher itself.  The client asks it
//! for the request to send ([`BenchmarkOrchestrator::build_current_request`])
//! whenever the settle or retry timer fires, and reports back transmit
//! failures and results.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use sortviz_core::{
    now_millis, Algorithm, DataValue, DatasetGenerator, DatasetParams, OutboundMessage,
    PerformanceResult, RequestId, SortMode, SortRequest,
};
use tracing::{debug, info, warn};

use crate::application::ports::ResultRecorder;
use crate::application::timers::{TimerKind, Timers};
use crate::domain::{BenchmarkConfig, ClientError, DatasetPolicy};

/// Benchmark timers, disarmed together on abort and completion.
const BENCHMARK_TIMERS: [TimerKind; 3] = [
    TimerKind::BenchmarkSettle,
    TimerKind::BenchmarkAdvance,
    TimerKind::BenchmarkRetry,
];

/// What happened to an inbound performance result.
#[derive(Debug, Clone, PartialEq)]
pub enum BenchmarkProgress {
    /// Not for the current step (idle, other algorithm, duplicate).
    Ignored,
    /// Recorded; the next algorithm follows after the advance delay.
    Recorded(Algorithm),
    /// The last algorithm finished.  Carries every result of the suite.
    Completed(BTreeMap<Algorithm, PerformanceResult>),
}

/// The suite currently in progress.
#[derive(Debug)]
struct BenchmarkJob {
    pending: VecDeque<Algorithm>,
    results: BTreeMap<Algorithm, PerformanceResult>,
    current: Option<Algorithm>,
    current_request_id: Option<RequestId>,
    params: DatasetParams,
    dataset: Vec<DataValue>,
}

pub struct BenchmarkOrchestrator {
    job: Option<BenchmarkJob>,
    generator: Arc<dyn DatasetGenerator>,
    recorder: Arc<dyn ResultRecorder>,
    config: BenchmarkConfig,
}

impl BenchmarkOrchestrator {
    pub fn new(
        generator: Arc<dyn DatasetGenerator>,
        recorder: Arc<dyn ResultRecorder>,
        config: BenchmarkConfig,
    ) -> Self {
        Self {
            job: None,
            generator,
            recorder,
            config,
        }
    }

    pub fn is_running(&self) -> bool {
        self.job.is_some()
    }

    /// The algorithm of the current step, if any.
    pub fn current_algorithm(&self) -> Option<Algorithm> {
        self.job.as_ref().and_then(|j| j.current)
    }

    /// Id of the last request built for the current step.
    pub fn current_request_id(&self) -> Option<&RequestId> {
        self.job.as_ref().and_then(|j| j.current_request_id.as_ref())
    }

    /// Algorithms not yet started.
    pub fn remaining(&self) -> usize {
        self.job.as_ref().map_or(0, |j| j.pending.len())
    }

    /// The dataset the next request will carry.
    pub fn dataset(&self) -> Option<&[DataValue]> {
        self.job.as_ref().map(|j| j.dataset.as_slice())
    }

    /// Starts a suite, replacing any suite in progress.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidRequest`] for an empty algorithm list, an
    /// algorithm listed twice or invalid dataset parameters.  The orchestrator
    /// is left untouched.
    pub fn start(
        &mut self,
        params: DatasetParams,
        algorithms: &[Algorithm],
        timers: &mut Timers,
    ) -> Result<(), ClientError> {
        if algorithms.is_empty() {
            return Err(ClientError::InvalidRequest(
                "a benchmark needs at least one algorithm".to_string(),
            ));
        }
        // Results are keyed by algorithm, so each one runs once per suite.
        if let Some(repeated) = algorithms
            .iter()
            .enumerate()
            .find_map(|(i, a)| algorithms[..i].contains(a).then_some(*a))
        {
            return Err(ClientError::InvalidRequest(format!(
                "{repeated} is listed more than once"
            )));
        }
        params.validate().map_err(ClientError::InvalidRequest)?;

        if self.abort(timers).is_some() {
            info!("previous benchmark replaced");
        }
        if self.config.dataset_policy == DatasetPolicy::RegeneratePerAlgorithm {
            warn!("dataset policy is {}: timings are not measured on identical input", self.config.dataset_policy);
        }

        let dataset = self.generator.generate(&params);
        info!(
            algorithms = algorithms.len(),
            size = dataset.len(),
            distribution = ?params.distribution,
            "benchmark started"
        );
        self.job = Some(BenchmarkJob {
            pending: algorithms.iter().copied().collect(),
            results: BTreeMap::new(),
            current: None,
            current_request_id: None,
            params,
            dataset,
        });
        self.step(timers);
        Ok(())
    }

    /// Runs when the advance timer fires.
    pub fn on_advance_elapsed(&mut self, timers: &mut Timers) {
        if self.is_running() {
            self.step(timers);
        }
    }

    /// Builds the `SORT_REQUEST` for the current step under a fresh id.
    ///
    /// Called when the settle or the retry timer fires.  Returns `None` when
    /// no step is current.
    pub fn build_current_request(&mut self) -> Option<OutboundMessage> {
        let job = self.job.as_mut()?;
        let algorithm = job.current?;
        let request_id = RequestId::new();
        job.current_request_id = Some(request_id.clone());
        debug!(%algorithm, %request_id, "benchmark request built");

        Some(OutboundMessage::SortRequest(SortRequest {
            request_id,
            mode: SortMode::Performance,
            algorithm,
            data: job.dataset.clone(),
            interval: None,
            data_type: job.params.value_type,
            distribution: job.params.distribution,
            ascending: None,
            comparator_info: None,
            timestamp: Some(now_millis()),
        }))
    }

    /// Handles a transmit failure.  If `request_id` is the current step's
    /// request, the step is retried after the retry delay.
    ///
    /// Returns `true` if a retry was scheduled.
    pub fn on_send_failed(&mut self, request_id: &RequestId, timers: &mut Timers) -> bool {
        let Some(job) = self.job.as_ref() else {
            return false;
        };
        if job.current_request_id.as_ref() != Some(request_id) {
            return false;
        }
        warn!(
            algorithm = ?job.current,
            delay = ?self.config.retry_delay(),
            "benchmark request not sent; retrying"
        );
        timers.arm(TimerKind::BenchmarkRetry, self.config.retry_delay());
        true
    }

    /// Handles a `PERFORMANCE_RESULT`.
    pub fn on_result(&mut self, result: PerformanceResult, timers: &mut Timers) -> BenchmarkProgress {
        let Some(job) = self.job.as_mut() else {
            debug!(algorithm = %result.algorithm, "result while idle ignored");
            return BenchmarkProgress::Ignored;
        };
        let Some(current) = job.current else {
            debug!(algorithm = %result.algorithm, "result between steps ignored");
            return BenchmarkProgress::Ignored;
        };

        let belongs = match (&result.request_id, &job.current_request_id) {
            (Some(echoed), Some(sent)) => echoed == sent,
            _ => current.matches(&result.algorithm),
        };
        if !belongs || job.results.contains_key(&current) {
            debug!(
                algorithm = %result.algorithm,
                expected = %current,
                "result for another step ignored"
            );
            return BenchmarkProgress::Ignored;
        }

        info!(
            algorithm = %current,
            time_ms = result.time,
            comparisons = result.comparisons,
            swaps = result.swaps,
            "benchmark result"
        );
        self.recorder.record(current, &result);
        job.results.insert(current, result);
        job.current = None;
        job.current_request_id = None;
        // A result can overtake a pending retry of the same step.
        timers.disarm(TimerKind::BenchmarkRetry);

        if job.pending.is_empty() {
            let results = std::mem::take(&mut job.results);
            self.job = None;
            info!(algorithms = results.len(), "benchmark suite completed");
            return BenchmarkProgress::Completed(results);
        }

        if self.config.dataset_policy == DatasetPolicy::RegeneratePerAlgorithm {
            job.dataset = self.generator.generate(&job.params);
        }
        timers.arm(TimerKind::BenchmarkAdvance, self.config.advance_delay());
        BenchmarkProgress::Recorded(current)
    }

    /// Abandons the suite in progress, discarding partial results.
    ///
    /// Returns the id of the request of the interrupted step, if one was
    /// built, so the caller can withdraw it from the outbound queue.
    pub fn abort(&mut self, timers: &mut Timers) -> Option<RequestId> {
        for kind in BENCHMARK_TIMERS {
            timers.disarm(kind);
        }
        let job = self.job.take()?;
        info!(
            completed = job.results.len(),
            current = ?job.current,
            "benchmark aborted"
        );
        job.current_request_id
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn step(&mut self, timers: &mut Timers) {
        let Some(job) = self.job.as_mut() else {
            return;
        };
        let Some(next) = job.pending.pop_front() else {
            return;
        };
        job.current = Some(next);
        job.current_request_id = None;
        debug!(algorithm = %next, remaining = job.pending.len(), "benchmark step");
        timers.arm(TimerKind::BenchmarkSettle, self.config.settle_delay());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
