//! Shared game-loop engine
//!
//! Every mini-game runs on this module. It must stay pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (entities keep spawn order)
//! - No platform dependencies (the host talks to it through `Surface`,
//!   `FrameScheduler`, `InputSource` and `ScoreStore`)

pub mod collision;
pub mod entity;
pub mod fx;
pub mod game;
pub mod input;
pub mod progression;
pub mod render;
pub mod scoring;
pub mod state;
pub mod timing;

pub use collision::{Shape, overlaps};
pub use entity::{Attractor, Bounds, Entity, EntityId, EntityRegistry, Motion, SpawnTimer, Status};
pub use fx::Feedback;
pub use game::{Ctx, Engine, Game, GameRules, RESTART_DELAY_FRAMES};
pub use input::{InputAdapter, InputSource, Key, RawInput, TickInput};
pub use progression::{
    DifficultyCurve, EffectKind, KindWeights, LevelBasis, Milestones, TimedEffects,
};
pub use render::{Color, Layer, RESTART_HINT, RecordingSurface, Surface, TextAlign, render_frame};
pub use scoring::{Award, HazardOutcome, ScoringRules};
pub use state::{Flow, GameEvent, GamePhase, GameSession};
pub use timing::{FrameClock, FrameHandle, FrameScheduler, TimingDriver};
