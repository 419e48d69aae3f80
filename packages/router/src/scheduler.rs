//! The per-frame scheduler seam.
//!
//! The transition engine does no timing of its own; an external scheduler
//! invokes its frame callback with the current time ratio. The contract:
//! ratios are delivered in non-decreasing order, `on_frame(1.0)` is
//! delivered exactly once per run, and starting a run under an id that still
//! has one in flight first forces the old run to its final frame. That last
//! rule is what guarantees a router never leaves an orphaned container
//! behind when a navigation interrupts an animation.

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use tracing::trace;

/// Identifies the party on whose behalf a run executes. Each router instance
/// owns one id, so it can have at most one animation in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SchedulerId(
    /// The raw id.
    pub u64,
);

/// Invoked with the current ratio in `[0, 1]` as a run progresses.
pub type FrameCallback = Box<dyn FnMut(f64)>;

/// Drives animation frames.
pub trait FrameScheduler {
    /// Begin a run of `duration_seconds` under `id`, force-flushing any run
    /// already active under the same id to its final frame first.
    fn start(&self, id: SchedulerId, duration_seconds: f64, on_frame: FrameCallback);
}

struct ActiveRun {
    duration_seconds: f64,
    last_ratio: f64,
    on_frame: FrameCallback,
}

/// A [`FrameScheduler`] driven by hand.
///
/// Embedders without a native frame loop (and tests) advance runs explicitly
/// with [`advance`](ManualScheduler::advance) and
/// [`finish`](ManualScheduler::finish). The completion guarantee is upheld:
/// every run sees ratio `1.0` exactly once, whether it gets there by
/// `advance`, by `finish`, or by being flushed when a new run starts under
/// its id.
#[derive(Default)]
pub struct ManualScheduler {
    runs: RefCell<FxHashMap<SchedulerId, ActiveRun>>,
}

impl ManualScheduler {
    /// Create a scheduler with no active runs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a run is in flight under `id`.
    pub fn is_running(&self, id: SchedulerId) -> bool {
        self.runs.borrow().contains_key(&id)
    }

    /// The requested duration of the run under `id`, if one is in flight.
    /// A host driving this scheduler from a real clock maps elapsed wall
    /// time over this to produce ratios.
    pub fn duration_of(&self, id: SchedulerId) -> Option<f64> {
        self.runs.borrow().get(&id).map(|run| run.duration_seconds)
    }

    /// Deliver a frame at `ratio` to the run under `id`. Ratios below the
    /// last delivered one are ignored, ratios at or above `1.0` complete the
    /// run. Does nothing when no run is active.
    pub fn advance(&self, id: SchedulerId, ratio: f64) {
        // take the run out so the callback can re-enter the scheduler
        let Some(mut run) = self.runs.borrow_mut().remove(&id) else {
            return;
        };
        if ratio < run.last_ratio {
            self.runs.borrow_mut().insert(id, run);
            return;
        }
        let ratio = ratio.min(1.0);
        run.last_ratio = ratio;
        (run.on_frame)(ratio);
        if ratio < 1.0 {
            self.runs.borrow_mut().insert(id, run);
        }
    }

    /// Force the run under `id` to its final frame.
    pub fn finish(&self, id: SchedulerId) {
        self.advance(id, 1.0);
    }

    /// The ids with a run currently in flight.
    pub fn active_runs(&self) -> Vec<SchedulerId> {
        self.runs.borrow().keys().copied().collect()
    }

    /// Deliver a frame at `ratio` to every active run. Hosts driving the
    /// scheduler from a real clock use this per tick.
    pub fn advance_all(&self, ratio: f64) {
        for id in self.active_runs() {
            self.advance(id, ratio);
        }
    }

    /// Force every active run to its final frame.
    pub fn finish_all(&self) {
        self.advance_all(1.0);
    }
}

impl FrameScheduler for ManualScheduler {
    fn start(&self, id: SchedulerId, duration_seconds: f64, on_frame: FrameCallback) {
        // flush the interrupted run outside the borrow; its final frame may
        // call back into a renderer
        let interrupted = self.runs.borrow_mut().remove(&id);
        if let Some(mut run) = interrupted {
            trace!(?id, "flushing interrupted run to its final frame");
            (run.on_frame)(1.0);
        }
        self.runs.borrow_mut().insert(
            id,
            ActiveRun {
                duration_seconds,
                last_ratio: 0.0,
                on_frame,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn recording_run(scheduler: &ManualScheduler, id: SchedulerId) -> Rc<RefCell<Vec<f64>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        scheduler.start(
            id,
            0.5,
            Box::new(move |ratio| sink.borrow_mut().push(ratio)),
        );
        seen
    }

    #[test]
    fn frames_are_monotonic_and_end_exactly_once() {
        let scheduler = ManualScheduler::new();
        let id = SchedulerId(1);
        let seen = recording_run(&scheduler, id);
        assert_eq!(scheduler.duration_of(id), Some(0.5));

        scheduler.advance(id, 0.2);
        scheduler.advance(id, 0.1); // out of order, dropped
        scheduler.advance(id, 0.7);
        scheduler.finish(id);
        scheduler.finish(id); // run is gone, no second final frame

        assert_eq!(*seen.borrow(), vec![0.2, 0.7, 1.0]);
        assert!(!scheduler.is_running(id));
    }

    #[test]
    fn restarting_an_id_flushes_the_old_run() {
        let scheduler = ManualScheduler::new();
        let id = SchedulerId(7);
        let first = recording_run(&scheduler, id);
        scheduler.advance(id, 0.4);

        let second = recording_run(&scheduler, id);
        assert_eq!(*first.borrow(), vec![0.4, 1.0]);
        scheduler.finish(id);
        assert_eq!(*second.borrow(), vec![1.0]);
    }

    #[test]
    fn runs_under_different_ids_are_independent() {
        let scheduler = ManualScheduler::new();
        let a = recording_run(&scheduler, SchedulerId(1));
        let b = recording_run(&scheduler, SchedulerId(2));
        scheduler.advance(SchedulerId(1), 0.5);
        assert_eq!(*a.borrow(), vec![0.5]);
        assert!(b.borrow().is_empty());
    }

    #[test]
    fn ratios_past_one_are_clamped() {
        let scheduler = ManualScheduler::new();
        let id = SchedulerId(3);
        let seen = recording_run(&scheduler, id);
        scheduler.advance(id, 2.0);
        assert_eq!(*seen.borrow(), vec![1.0]);
        assert!(!scheduler.is_running(id));
    }
}
