//! Host integration
//!
//! `Host` is the glue every host shares: it feeds paint callbacks through the
//! timing driver, folds raw input into the adapter, wakes a stopped loop on
//! input and repaints after every update. The browser build wraps it in
//! `web`; the native build drives it with `ManualScheduler`.

#[cfg(target_arch = "wasm32")]
pub mod web;

use std::cell::Cell;
use std::rc::Rc;

use crate::engine::{
    Engine, FrameHandle, FrameScheduler, Game, GameEvent, GamePhase, InputAdapter, RawInput,
    Surface, TimingDriver, render_frame,
};
use crate::store::ScoreStore;

/// One mounted game: engine, loop driver, pending input and its surface
pub struct Host<G: Game, S: ScoreStore, F: FrameScheduler, D: Surface> {
    pub engine: Engine<G, S>,
    pub driver: TimingDriver<F>,
    pub input: InputAdapter,
    pub surface: D,
    events: Vec<GameEvent>,
    closing: Rc<Cell<bool>>,
}

impl<G: Game, S: ScoreStore, F: FrameScheduler, D: Surface> Host<G, S, F, D> {
    pub fn new(engine: Engine<G, S>, scheduler: F, surface: D) -> Self {
        let input = InputAdapter::new(engine.rules().bounds());
        Self {
            engine,
            driver: TimingDriver::new(scheduler),
            input,
            surface,
            events: Vec::new(),
            closing: Rc::new(Cell::new(false)),
        }
    }

    /// Paint callback; returns the number of fixed steps simulated
    pub fn on_frame(&mut self, handle: FrameHandle, now_ms: f64) -> u32 {
        let Some(steps) = self.driver.on_frame(handle, now_ms) else {
            return 0;
        };
        for _ in 0..steps {
            let input = self.input.poll();
            self.engine.tick(&input);
            if !self.engine.wants_frames() || self.is_closed() {
                break;
            }
        }
        self.after_update();
        if self.is_closed() {
            self.shutdown();
        } else if !self.engine.wants_frames() {
            log::debug!("Loop idle in {:?}", self.engine.phase());
            self.driver.stop();
        }
        steps
    }

    /// Raw host event; an idle loop handles it at once and restarts if needed
    pub fn on_input(&mut self, event: RawInput) {
        if self.is_closed() {
            return;
        }
        self.input.handle(event);
        if event == RawInput::Blur {
            self.auto_pause();
        }
        if !self.driver.is_running() {
            self.wake();
        }
    }

    fn wake(&mut self) {
        let input = self.input.poll();
        self.engine.tick(&input);
        self.after_update();
        if self.is_closed() {
            self.shutdown();
        } else if self.engine.wants_frames() {
            self.driver.start();
        }
    }

    /// Pause a pausable game that is mid-play
    pub fn auto_pause(&mut self) {
        if self.engine.phase() == GamePhase::Playing && self.engine.rules().pausable {
            self.engine.toggle_pause();
            log::info!("Auto-paused {}", self.engine.game().id());
            self.after_update();
        }
    }

    /// Page hidden: pause if possible and stop scheduling paints
    pub fn on_hidden(&mut self) {
        self.auto_pause();
        self.driver.stop();
    }

    /// Page visible again; resumes paints for games that were not paused
    pub fn on_visible(&mut self) {
        if self.engine.wants_frames() && !self.driver.is_running() && !self.is_closed() {
            self.driver.start();
        }
    }

    pub fn paint(&mut self) {
        render_frame(&mut self.surface, &self.engine);
    }

    fn after_update(&mut self) {
        for event in self.engine.drain_events() {
            log::trace!("{}: {:?}", self.engine.game().id(), event);
            self.events.push(event);
        }
        self.paint();
    }

    /// Events observed since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Unmount: cancel the pending paint and forget held input
    pub fn shutdown(&mut self) {
        self.closing.set(true);
        self.driver.stop();
        self.input.reset();
    }

    /// Flag that shuts the host down as soon as the current update returns.
    /// Lets a callback running inside `on_frame` (a game over handler, say)
    /// unmount a host it cannot borrow.
    pub fn close_signal(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.closing)
    }

    pub fn is_closed(&self) -> bool {
        self.closing.get()
    }
}

/// Scheduler whose callbacks are fired by hand (native demo and tests)
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: i32,
    pending: Option<FrameHandle>,
    /// Callbacks requested so far
    pub requested: u32,
    /// Callbacks cancelled so far
    pub cancelled: u32,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The callback the host would fire next, if any
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }
}

impl FrameScheduler for ManualScheduler {
    fn request(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
        self.cancelled += 1;
    }
}

impl<G: Game, S: ScoreStore, D: Surface> Host<G, S, ManualScheduler, D> {
    /// Fire the pending paint at `now_ms`; false when the loop is idle
    pub fn pump(&mut self, now_ms: f64) -> bool {
        match self.driver.scheduler_mut().pending() {
            Some(handle) => {
                self.on_frame(handle, now_ms);
                true
            }
            None => false,
        }
    }
}
