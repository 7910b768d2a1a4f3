//! Cancelable single-shot timers keyed by purpose.
//!
//! Every delay in the client (reconnect backoff, send cooldown, benchmark
//! settle/advance/retry) is a [`TimerKind`].  At most one timer of each kind
//! is armed at a time; arming again replaces the previous one.
//!
//! The [`Scheduler`] port does the actual waiting and later posts a
//! "timer fired" event carrying the [`TimerId`] it was armed with.  Because
//! that event may already be queued when the timer is canceled, [`Timers`]
//! only accepts a firing whose id is still the current one for its kind.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

/// What a timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    Reconnect,
    SendCooldown,
    BenchmarkSettle,
    BenchmarkAdvance,
    BenchmarkRetry,
}

/// Identity of one arming of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Does the waiting on behalf of [`Timers`].
pub trait Scheduler: Send {
    /// Arranges for `(kind, id)` to fire after `delay`.
    fn schedule(&mut self, kind: TimerKind, id: TimerId, delay: Duration);

    /// Best-effort cancellation of a scheduled firing.
    fn cancel(&mut self, kind: TimerKind, id: TimerId);
}

/// The set of currently armed timers.
pub struct Timers {
    scheduler: Box<dyn Scheduler>,
    armed: HashMap<TimerKind, TimerId>,
    next_id: u64,
}

impl Timers {
    pub fn new(scheduler: Box<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            armed: HashMap::new(),
            next_id: 1,
        }
    }

    /// Arms `kind` to fire after `delay`, replacing any armed timer of that kind.
    pub fn arm(&mut self, kind: TimerKind, delay: Duration) -> TimerId {
        self.disarm(kind);
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.armed.insert(kind, id);
        self.scheduler.schedule(kind, id, delay);
        debug!(?kind, id = id.0, ?delay, "timer armed");
        id
    }

    /// Cancels the armed timer of `kind`, if any.
    pub fn disarm(&mut self, kind: TimerKind) {
        if let Some(id) = self.armed.remove(&kind) {
            self.scheduler.cancel(kind, id);
        }
    }

    /// Cancels every armed timer.
    pub fn disarm_all(&mut self) {
        let armed: Vec<(TimerKind, TimerId)> = self.armed.drain().collect();
        for (kind, id) in armed {
            self.scheduler.cancel(kind, id);
        }
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.armed.contains_key(&kind)
    }

    /// Number of armed timers.
    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// Consumes a firing.
    ///
    /// Returns `true` (and disarms the kind) only if `id` is the current
    /// arming of `kind`; stale firings return `false`.
    pub fn accept(&mut self, kind: TimerKind, id: TimerId) -> bool {
        if self.armed.get(&kind) == Some(&id) {
            self.armed.remove(&kind);
            true
        } else {
            false
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct RecordingScheduler {
        scheduled: Arc<Mutex<Vec<(TimerKind, TimerId, Duration)>>>,
        canceled: Arc<Mutex<Vec<(TimerKind, TimerId)>>>,
    }

    impl Scheduler for RecordingScheduler {
        fn schedule(&mut self, kind: TimerKind, id: TimerId, delay: Duration) {
            self.scheduled.lock().unwrap().push((kind, id, delay));
        }

        fn cancel(&mut self, kind: TimerKind, id: TimerId) {
            self.canceled.lock().unwrap().push((kind, id));
        }
    }

    #[test]
    fn test_arm_schedules_with_fresh_id() {
        // Arrange
        let scheduler = RecordingScheduler::default();
        let mut timers = Timers::new(Box::new(scheduler.clone()));

        // Act
        let a = timers.arm(TimerKind::SendCooldown, Duration::from_millis(100));
        let b = timers.arm(TimerKind::Reconnect, Duration::from_secs(3));

        // Assert
        assert_ne!(a, b);
        assert_eq!(scheduler.scheduled.lock().unwrap().len(), 2);
        assert_eq!(timers.armed_count(), 2);
    }

    #[test]
    fn test_rearming_cancels_previous_and_stale_firing_is_rejected() {
        let scheduler = RecordingScheduler::default();
        let mut timers = Timers::new(Box::new(scheduler.clone()));

        let first = timers.arm(TimerKind::Reconnect, Duration::from_secs(3));
        let second = timers.arm(TimerKind::Reconnect, Duration::from_secs(6));

        assert_eq!(*scheduler.canceled.lock().unwrap(), vec![(TimerKind::Reconnect, first)]);
        assert!(!timers.accept(TimerKind::Reconnect, first), "replaced arming must be stale");
        assert!(timers.accept(TimerKind::Reconnect, second));
        assert!(!timers.is_armed(TimerKind::Reconnect));
    }

    #[test]
    fn test_firing_is_accepted_only_once() {
        let mut timers = Timers::new(Box::new(RecordingScheduler::default()));
        let id = timers.arm(TimerKind::BenchmarkSettle, Duration::from_millis(300));
        assert!(timers.accept(TimerKind::BenchmarkSettle, id));
        assert!(!timers.accept(TimerKind::BenchmarkSettle, id));
    }

    #[test]
    fn test_disarm_all_cancels_everything() {
        let scheduler = RecordingScheduler::default();
        let mut timers = Timers::new(Box::new(scheduler.clone()));
        let id = timers.arm(TimerKind::BenchmarkAdvance, Duration::from_secs(1));
        timers.arm(TimerKind::SendCooldown, Duration::from_millis(100));

        timers.disarm_all();

        assert_eq!(timers.armed_count(), 0);
        assert_eq!(scheduler.canceled.lock().unwrap().len(), 2);
        assert!(!timers.accept(TimerKind::BenchmarkAdvance, id));
    }

    #[test]
    fn test_disarm_of_unarmed_kind_is_a_no_op() {
        let scheduler = RecordingScheduler::default();
        let mut timers = Timers::new(Box::new(scheduler.clone()));
        timers.disarm(TimerKind::BenchmarkRetry);
        assert!(scheduler.canceled.lock().unwrap().is_empty());
    }
}
