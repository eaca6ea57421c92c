//! Input normalization
//!
//! Raw pointer, touch, keyboard and tilt events are folded into an
//! `InputAdapter` as they arrive, then polled once per fixed step into a
//! `TickInput`. Games only ever see `TickInput`.

use glam::Vec2;

use super::entity::Bounds;

/// Logical keys after keymap lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    /// Space
    Action,
    Pause,
    Start,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "d" | "D" => Some(Key::Right),
            "ArrowUp" | "w" | "W" => Some(Key::Up),
            "ArrowDown" | "s" | "S" => Some(Key::Down),
            " " | "Spacebar" => Some(Key::Action),
            "Escape" | "p" | "P" => Some(Key::Pause),
            "Enter" => Some(Key::Start),
            _ => None,
        }
    }

    /// Keys whose default browser action (scrolling) must be suppressed
    pub fn blocks_default(self) -> bool {
        matches!(
            self,
            Key::Left | Key::Right | Key::Up | Key::Down | Key::Action
        )
    }
}

/// A host event before normalization
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    KeyDown { key: Key, repeat: bool },
    KeyUp(Key),
    /// Pointer or touch start, in playfield coordinates
    PointerDown(Vec2),
    PointerMove(Vec2),
    PointerUp(Vec2),
    /// Device left/right tilt in degrees (`DeviceOrientationEvent.gamma`)
    Tilt(f32),
    /// Window lost focus; held keys are released
    Blur,
}

/// Intents for a single fixed step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Jump pressed since the last step
    pub jump: bool,
    /// Duck held
    pub duck: bool,
    /// Pointer/touch start since the last step
    pub tap: Option<Vec2>,
    /// Absolute horizontal target from pointer or tilt
    pub axis: Option<f32>,
    /// Keyboard steering: -1, 0 or 1
    pub steer: f32,
    /// Pause toggle pressed since the last step
    pub pause: bool,
    /// Explicit start pressed since the last step
    pub start: bool,
    /// Last known pointer position
    pub pointer: Option<Vec2>,
}

impl TickInput {
    /// Any intent that starts a session from the splash
    pub fn any_action(&self) -> bool {
        self.start || self.jump || self.tap.is_some()
    }
}

/// Tilt range mapped onto the full playfield width
const TILT_RANGE_DEG: f32 = 30.0;

/// Accumulates raw events between steps
#[derive(Debug, Clone)]
pub struct InputAdapter {
    /// Held keys, oldest first
    held: Vec<Key>,
    jump: bool,
    pause: bool,
    start: bool,
    tap: Option<Vec2>,
    pointer: Option<Vec2>,
    axis: Option<f32>,
    bounds: Bounds,
}

impl InputAdapter {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            held: Vec::new(),
            jump: false,
            pause: false,
            start: false,
            tap: None,
            pointer: None,
            axis: None,
            bounds,
        }
    }

    fn clamp_point(&self, p: Vec2) -> Vec2 {
        p.clamp(Vec2::ZERO, Vec2::new(self.bounds.width, self.bounds.height))
    }

    /// Fold one raw event into the pending state
    pub fn handle(&mut self, event: RawInput) {
        match event {
            RawInput::KeyDown { repeat: true, .. } => {}
            RawInput::KeyDown { key, repeat: false } => {
                self.held.retain(|&k| k != key);
                self.held.push(key);
                match key {
                    Key::Up | Key::Action => self.jump = true,
                    Key::Pause => self.pause = true,
                    Key::Start => self.start = true,
                    Key::Left | Key::Right | Key::Down => {}
                }
            }
            RawInput::KeyUp(key) => {
                self.held.retain(|&k| k != key);
            }
            RawInput::PointerDown(p) => {
                let p = self.clamp_point(p);
                // First tap of the step wins
                self.tap.get_or_insert(p);
                self.pointer = Some(p);
                self.axis = Some(p.x);
            }
            RawInput::PointerMove(p) => {
                let p = self.clamp_point(p);
                self.pointer = Some(p);
                self.axis = Some(p.x);
            }
            RawInput::PointerUp(p) => {
                self.pointer = Some(self.clamp_point(p));
            }
            RawInput::Tilt(gamma) => {
                let t = (gamma.clamp(-TILT_RANGE_DEG, TILT_RANGE_DEG) / TILT_RANGE_DEG + 1.0) / 2.0;
                self.axis = Some(t * self.bounds.width);
            }
            RawInput::Blur => {
                self.held.clear();
            }
        }
    }

    fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Opposing keys resolve to whichever was pressed last
    fn steer(&self) -> f32 {
        self.held
            .iter()
            .rev()
            .find_map(|k| match k {
                Key::Left => Some(-1.0),
                Key::Right => Some(1.0),
                _ => None,
            })
            .unwrap_or(0.0)
    }

    /// Snapshot intents for one fixed step and clear the one-shot ones
    pub fn poll(&mut self) -> TickInput {
        let input = TickInput {
            jump: self.jump,
            duck: self.is_held(Key::Down),
            tap: self.tap,
            axis: self.axis,
            steer: self.steer(),
            pause: self.pause,
            start: self.start,
            pointer: self.pointer,
        };
        self.jump = false;
        self.pause = false;
        self.start = false;
        self.tap = None;
        input
    }

    /// Forget everything (new session or detach)
    pub fn reset(&mut self) {
        *self = Self::new(self.bounds);
    }
}

/// A host-side event source with an explicit mount lifecycle
pub trait InputSource {
    type Error;

    /// Start delivering events; a second attach is a no-op
    fn attach(&mut self) -> Result<(), Self::Error>;

    /// Stop delivering events and release every listener
    fn detach(&mut self);

    fn is_attached(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> InputAdapter {
        InputAdapter::new(Bounds::new(400.0, 300.0))
    }

    fn down(key: Key) -> RawInput {
        RawInput::KeyDown { key, repeat: false }
    }

    #[test]
    fn test_opposing_keys_last_writer_wins() {
        let mut input = adapter();
        input.handle(down(Key::Left));
        input.handle(down(Key::Right));
        assert_eq!(input.poll().steer, 1.0);

        input.handle(RawInput::KeyUp(Key::Right));
        assert_eq!(input.poll().steer, -1.0);

        input.handle(down(Key::Right));
        input.handle(down(Key::Left));
        assert_eq!(input.poll().steer, -1.0);
    }

    #[test]
    fn test_one_shot_intents_clear_after_poll() {
        let mut input = adapter();
        input.handle(down(Key::Action));
        input.handle(RawInput::PointerDown(Vec2::new(10.0, 20.0)));
        let first = input.poll();
        assert!(first.jump);
        assert_eq!(first.tap, Some(Vec2::new(10.0, 20.0)));

        let second = input.poll();
        assert!(!second.jump);
        assert_eq!(second.tap, None);
        assert_eq!(second.pointer, Some(Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn test_key_repeat_is_ignored() {
        let mut input = adapter();
        input.handle(down(Key::Action));
        input.poll();
        input.handle(RawInput::KeyDown {
            key: Key::Action,
            repeat: true,
        });
        assert!(!input.poll().jump);
    }

    #[test]
    fn test_duck_follows_held_state() {
        let mut input = adapter();
        input.handle(down(Key::Down));
        assert!(input.poll().duck);
        assert!(input.poll().duck);
        input.handle(RawInput::KeyUp(Key::Down));
        assert!(!input.poll().duck);
    }

    #[test]
    fn test_axis_is_clamped_to_bounds() {
        let mut input = adapter();
        input.handle(RawInput::PointerMove(Vec2::new(900.0, -5.0)));
        let tick = input.poll();
        assert_eq!(tick.axis, Some(400.0));
        assert_eq!(tick.pointer, Some(Vec2::new(400.0, 0.0)));

        input.handle(RawInput::Tilt(-90.0));
        assert_eq!(input.poll().axis, Some(0.0));
        input.handle(RawInput::Tilt(0.0));
        assert_eq!(input.poll().axis, Some(200.0));
    }

    #[test]
    fn test_blur_releases_held_keys() {
        let mut input = adapter();
        input.handle(down(Key::Left));
        input.handle(RawInput::Blur);
        assert_eq!(input.poll().steer, 0.0);
    }

    #[test]
    fn test_keymap() {
        assert_eq!(Key::from_dom("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_dom(" "), Some(Key::Action));
        assert_eq!(Key::from_dom("Escape"), Some(Key::Pause));
        assert_eq!(Key::from_dom("q"), None);
        assert!(Key::Action.blocks_default());
        assert!(!Key::Pause.blocks_default());
    }
}
