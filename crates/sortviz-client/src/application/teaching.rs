//! TeachingRun: consumes the step stream of one teaching-mode request.
//!
//! Each `STEP_UPDATE` replaces the data snapshot, advances the cursor and is
//! drawn through the [`Renderer`] with one [`HighlightClass`] per element.
//! The run ends when the cursor reaches the last step; the final frame shows
//! every element as sorted.

use std::sync::Arc;

use sortviz_core::{
    classify, now_millis, Algorithm, ComparatorSettings, DataType, DataValue, Distribution,
    HighlightClass, OutboundMessage, RequestId, SortMode, SortRequest, StepStats, StepUpdate,
};
use tracing::{debug, info};

use crate::application::ports::Renderer;
use crate::domain::{ClientError, TeachingConfig};

/// What the user asked a teaching run to do.
#[derive(Debug, Clone, PartialEq)]
pub struct TeachingRequest {
    pub algorithm: Algorithm,
    pub data: Vec<DataValue>,
    pub data_type: DataType,
    pub distribution: Distribution,
    /// Delay between streamed steps.  `None` uses the configured default.
    pub interval_ms: Option<u32>,
    pub comparator: ComparatorSettings,
}

/// What happened to an inbound step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// No run is active, or the step belongs to another request.
    Ignored,
    /// The frame was drawn.
    Rendered { step: u32, total_steps: u32 },
    /// The last frame was drawn and the run is over.
    Finished(RequestId),
}

/// Position within the step stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepCursor {
    pub step: u32,
    pub total_steps: u32,
}

pub struct TeachingRun {
    active: Option<RequestId>,
    cursor: StepCursor,
    snapshot: Vec<DataValue>,
    stats: StepStats,
    renderer: Arc<dyn Renderer>,
    config: TeachingConfig,
}

impl TeachingRun {
    pub fn new(renderer: Arc<dyn Renderer>, config: TeachingConfig) -> Self {
        Self {
            active: None,
            cursor: StepCursor::default(),
            snapshot: Vec::new(),
            stats: StepStats::default(),
            renderer,
            config,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_request_id(&self) -> Option<&RequestId> {
        self.active.as_ref()
    }

    pub fn cursor(&self) -> StepCursor {
        self.cursor
    }

    pub fn stats(&self) -> StepStats {
        self.stats
    }

    /// The data as of the last rendered frame.
    pub fn snapshot(&self) -> &[DataValue] {
        &self.snapshot
    }

    /// Validates `request`, activates a run and builds its `SORT_REQUEST`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidRequest`] for an empty or oversized
    /// dataset, or while another run is active.
    pub fn begin(&mut self, request: TeachingRequest) -> Result<OutboundMessage, ClientError> {
        if self.is_active() {
            return Err(ClientError::InvalidRequest(
                "a teaching run is already in progress".to_string(),
            ));
        }
        if request.data.is_empty() {
            return Err(ClientError::InvalidRequest("no data to sort".to_string()));
        }
        if request.data.len() > self.config.max_elements {
            return Err(ClientError::InvalidRequest(format!(
                "teaching mode accepts at most {} elements, got {}",
                self.config.max_elements,
                request.data.len()
            )));
        }

        let request_id = RequestId::new();
        self.active = Some(request_id.clone());
        self.cursor = StepCursor::default();
        self.stats = StepStats::default();
        self.snapshot = request.data.clone();
        info!(
            algorithm = %request.algorithm,
            size = request.data.len(),
            comparator = %request.comparator.description(),
            %request_id,
            "teaching run started"
        );

        Ok(OutboundMessage::SortRequest(SortRequest {
            request_id,
            mode: SortMode::Teaching,
            algorithm: request.algorithm,
            data: request.data,
            interval: Some(request.interval_ms.unwrap_or(self.config.step_interval_ms)),
            data_type: request.data_type,
            distribution: request.distribution,
            ascending: Some(request.comparator.ascending()),
            comparator_info: Some(request.comparator.to_info(request.data_type)),
            timestamp: Some(now_millis()),
        }))
    }

    /// Handles one `STEP_UPDATE`.
    pub fn on_step(&mut self, update: StepUpdate) -> StepOutcome {
        let Some(active) = self.active.clone() else {
            debug!(step = update.step, "step without an active run ignored");
            return StepOutcome::Ignored;
        };
        if update.request_id.as_ref().is_some_and(|id| *id != active) {
            debug!(step = update.step, "step for another request ignored");
            return StepOutcome::Ignored;
        }

        self.cursor = StepCursor {
            step: update.step,
            total_steps: update.total_steps,
        };
        self.stats = update.stats;
        self.snapshot = update.data;

        if update.is_final || update.step >= update.total_steps {
            let classes = vec![HighlightClass::Sorted; self.snapshot.len()];
            self.renderer.render(&self.snapshot, &classes);
            self.active = None;
            info!(
                steps = update.total_steps,
                comparisons = self.stats.comparisons,
                swaps = self.stats.swaps,
                "teaching run finished"
            );
            return StepOutcome::Finished(active);
        }

        let classes = classify(self.snapshot.len(), &update.highlight);
        self.renderer.render(&self.snapshot, &classes);
        StepOutcome::Rendered {
            step: update.step,
            total_steps: update.total_steps,
        }
    }

    /// Abandons the active run, keeping nothing of it.
    ///
    /// Returns the id of the aborted run.
    pub fn abort(&mut self) -> Option<RequestId> {
        let aborted = self.active.take()?;
        self.cursor = StepCursor::default();
        self.stats = StepStats::default();
        self.snapshot.clear();
        info!(request_id = %aborted, "teaching run aborted");
        Some(aborted)
    }

    /// Clears the cursor and stats and redraws the last snapshot without
    /// highlights.  Any active run is aborted first.
    pub fn reset(&mut self) {
        let snapshot = std::mem::take(&mut self.snapshot);
        self.abort();
        self.cursor = StepCursor::default();
        self.stats = StepStats::default();
        self.snapshot = snapshot;
        let classes = vec![HighlightClass::Normal; self.snapshot.len()];
        self.renderer.render(&self.snapshot, &classes);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
