//! Wedding Arcade - canvas mini-games for the wedding site
//!
//! Core modules:
//! - `engine`: Shared game-loop engine (timing, entities, input, collision, scoring, rendering)
//! - `games`: The individual mini-games built on the engine
//! - `store`: Best-score and leaderboard persistence behind a key-value port
//! - `settings`: Player preferences (effects, reduced motion)
//! - `api`: RSVP and score HTTP API (native only) with a mock fallback
//! - `platform`: Browser integration (canvas, animation frames, DOM input)

#[cfg(not(target_arch = "wasm32"))]
pub mod api;
pub mod engine;
pub mod games;
pub mod highscores;
pub mod platform;
pub mod settings;
pub mod store;

pub use highscores::{HighScoreEntry, Leaderboard};
pub use settings::{QualityPreset, Settings};
pub use store::{KeyValueStore, MemoryStore, ScoreStore, StoreError};

/// Engine configuration constants
pub mod consts {
    /// Fixed simulation timestep (one display refresh at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per paint to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest wall-clock gap accepted between two paints (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.1;

    /// Fixed steps per second, for converting durations to frames
    pub const FRAMES_PER_SECOND: u32 = 60;
}

/// Convert a duration in seconds to whole simulation frames
#[inline]
pub fn secs_to_frames(secs: f32) -> u32 {
    (secs * consts::FRAMES_PER_SECOND as f32).round() as u32
}
