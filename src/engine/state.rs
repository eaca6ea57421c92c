//! Session state and phase machine types
//!
//! Everything a paint needs to read lives in `GameSession`, which is plain
//! data so a run can be snapshotted and compared.

use serde::{Deserialize, Serialize};

use super::game::GameRules;

/// Current phase of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Idle splash, waiting for the first input
    Start,
    /// Simulation active
    Playing,
    /// Frozen; only a pause intent resumes
    Paused,
    /// Short interlude between rounds
    RoundResult,
    /// Short interlude after the final round
    Celebration,
    /// Run ended; only an explicit start begins a new one
    GameOver,
}

impl GamePhase {
    /// Phases that need the timing driver running
    pub fn is_animated(self) -> bool {
        matches!(
            self,
            GamePhase::Playing | GamePhase::RoundResult | GamePhase::Celebration
        )
    }
}

/// One playthrough from start to game over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    /// Run seed for reproducibility
    pub seed: u64,
    pub score: u64,
    /// Stored best score read at session start
    pub best: u64,
    pub lives: u32,
    /// Consecutive scoring actions
    pub combo: u32,
    /// Highest combo reached this run
    pub best_combo: u32,
    /// Frames left before an idle combo lapses
    pub combo_timer: u32,
    /// Dropped good items counted toward the miss tolerance
    pub misses: u32,
    /// Frames left in frenzy mode (0 = inactive)
    pub frenzy_frames: u32,
    /// Post-hit invincibility frames
    pub invincible_frames: u32,
    /// Derived from score or elapsed time each step
    pub difficulty_level: f32,
    /// Simulation steps since the session started
    pub frame: u64,
    /// 1-based round counter
    pub round: u32,
    /// Countdown in frames for timed games
    pub time_left: Option<u32>,
    /// Frames left in a round-result or celebration interlude
    pub interlude_frames: u32,
    pub phase: GamePhase,
    pub width: f32,
    pub height: f32,
}

impl GameSession {
    pub fn new(rules: &GameRules, seed: u64, best: u64) -> Self {
        Self {
            seed,
            score: 0,
            best,
            lives: rules.lives,
            combo: 0,
            best_combo: 0,
            combo_timer: 0,
            misses: 0,
            frenzy_frames: 0,
            invincible_frames: 0,
            difficulty_level: 0.0,
            frame: 0,
            round: 1,
            time_left: rules.time_limit,
            interlude_frames: 0,
            phase: GamePhase::Start,
            width: rules.width,
            height: rules.height,
        }
    }

    pub fn is_frenzy(&self) -> bool {
        self.frenzy_frames > 0
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_frames > 0
    }

    /// Elapsed play time in seconds
    pub fn elapsed_secs(&self) -> f32 {
        self.frame as f32 * crate::consts::SIM_DT
    }

    /// Whole seconds left on the countdown, rounded up for display
    pub fn secs_left(&self) -> Option<u32> {
        self.time_left
            .map(|f| f.div_ceil(crate::consts::FRAMES_PER_SECOND))
    }
}

/// Notable things that happened during a tick, drained by the host
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Started { seed: u64 },
    Scored { points: u64, combo: u32 },
    ComboBroken,
    FrenzyStarted,
    FrenzyEnded,
    /// A miss absorbed by the tolerance counter
    Missed { misses: u32 },
    LifeLost { lives_left: u32 },
    Penalty { points: u64 },
    EffectStarted { effect: &'static str },
    EffectEnded { effect: &'static str },
    /// Belt, wave or threshold reached (index into the game's table)
    Milestone { index: usize },
    Paused,
    Resumed,
    RoundOver { round: u32 },
    RoundStarted { round: u32 },
    Celebration,
    GameOver { score: u64, best: u64, new_best: bool },
}

/// A game's verdict on where the session goes next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep playing
    Continue,
    /// Enter the round-result interlude
    RoundResult,
    /// Enter the celebration interlude
    Celebration,
    /// Leave an interlude into the next round
    NextRound,
    GameOver,
}
