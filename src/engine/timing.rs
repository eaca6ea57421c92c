//! Frame timing: fixed-step accumulator and the scheduled-callback owner
//!
//! The host paints whenever it likes; the simulation only ever advances in
//! whole `SIM_DT` steps. `TimingDriver` owns the single pending callback so a
//! torn-down view can never leave an orphaned tick behind.

use crate::consts::{MAX_FRAME_DELTA, MAX_SUBSTEPS, SIM_DT};

/// Converts wall-clock paint timestamps into a number of fixed steps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
    accumulator: f32,
    /// Paints observed since the last reset
    pub paints: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous timestamp (after a pause the gap must not count)
    pub fn reset(&mut self) {
        self.last_ms = None;
        self.accumulator = 0.0;
    }

    /// Feed a paint timestamp (ms) and get the number of steps to run
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let dt = match self.last_ms {
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DELTA),
            None => SIM_DT,
        };
        self.last_ms = Some(now_ms);
        self.paints += 1;
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        // Drop backlog we refused to simulate
        if steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        steps
    }
}

/// Opaque id of a host callback (e.g. a `requestAnimationFrame` id)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

/// Host port for "call me on the next paint"
pub trait FrameScheduler {
    fn request(&mut self) -> FrameHandle;
    fn cancel(&mut self, handle: FrameHandle);
}

/// Owns the pending paint callback and the fixed-step clock
///
/// At most one callback is pending at any time. `stop()` (and `Drop`) cancel
/// it, and a callback that still fires afterwards is ignored.
pub struct TimingDriver<S: FrameScheduler> {
    scheduler: S,
    pending: Option<FrameHandle>,
    clock: FrameClock,
}

impl<S: FrameScheduler> TimingDriver<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            pending: None,
            clock: FrameClock::new(),
        }
    }

    /// Begin (or restart) the loop; any previous pending callback is cancelled first
    pub fn start(&mut self) {
        self.stop();
        self.clock.reset();
        self.pending = Some(self.scheduler.request());
    }

    /// Cancel the pending callback
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Host callback entry point. Returns the steps to simulate, or `None`
    /// when the driver was stopped and this callback is stale.
    pub fn on_frame(&mut self, handle: FrameHandle, now_ms: f64) -> Option<u32> {
        if self.pending != Some(handle) {
            log::debug!("Ignoring stale frame callback {:?}", handle);
            return None;
        }
        let steps = self.clock.advance(now_ms);
        self.pending = Some(self.scheduler.request());
        Some(steps)
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl<S: FrameScheduler> Drop for TimingDriver<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
