//! Aisle Walk: step down the aisle in time with the music
//!
//! Step prompts scroll toward a contact zone. Pressing while a prompt sits
//! in the perfect or good window scores it; pressing on an empty beat breaks
//! the combo; a prompt that slips past the zone is a miss. Three rounds of
//! sixteen steps, each faster with a tighter zone, end in a celebration.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::{
    Color, Ctx, EffectKind, Entity, EntityId, Flow, Game, GamePhase, GameRules, GameSession,
    LevelBasis, Motion, ScoringRules, Shape, SpawnTimer, Surface, TextAlign, TickInput,
};

pub const GAME_ID: &str = "aisleWalk";

pub const WIDTH: f32 = 800.0;
pub const HEIGHT: f32 = 300.0;
/// Center of the contact zone
pub const ZONE_X: f32 = 140.0;
pub const LANE_Y: f32 = 170.0;

pub const ROUNDS: u32 = 3;
pub const PROMPTS_PER_ROUND: u32 = 16;

pub const PERFECT_POINTS: u64 = 100;
pub const GOOD_POINTS: u64 = 50;

const PROMPT_RADIUS: f32 = 18.0;
/// Frames before the first prompt of a round
const LEAD_IN: u32 = 60;
const PETAL_EVERY: u32 = 24;

/// Per-round pace and timing windows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tempo {
    /// Frames between prompts
    pub interval: u32,
    /// Scroll speed (pixels/s)
    pub speed: f32,
    /// Max distance from the zone center for a perfect step
    pub perfect: f32,
    /// Max distance for a good step; beyond it the press is off-beat
    pub good: f32,
}

const TEMPOS: [Tempo; ROUNDS as usize] = [
    Tempo {
        interval: 48,
        speed: 240.0,
        perfect: 14.0,
        good: 34.0,
    },
    Tempo {
        interval: 40,
        speed: 290.0,
        perfect: 11.0,
        good: 28.0,
    },
    Tempo {
        interval: 32,
        speed: 340.0,
        perfect: 8.0,
        good: 22.0,
    },
];

/// Tempo of a 1-based round (later rounds reuse the last tempo)
pub fn tempo(round: u32) -> Tempo {
    let index = (round.max(1) as usize - 1).min(TEMPOS.len() - 1);
    TEMPOS[index]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    Perfect,
    Good,
    OffBeat,
}

impl Grade {
    /// Grade a press `distance` pixels from the zone center
    pub fn of(distance: f32, tempo: &Tempo) -> Self {
        if distance <= tempo.perfect {
            Grade::Perfect
        } else if distance <= tempo.good {
            Grade::Good
        } else {
            Grade::OffBeat
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AisleKind {
    LeftStep,
    RightStep,
    /// Falling petal, decoration only
    Petal,
}

impl AisleKind {
    pub fn is_prompt(self) -> bool {
        !matches!(self, AisleKind::Petal)
    }
}

/// Aisle Walk has no power-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AisleEffect {}

impl EffectKind for AisleEffect {
    fn name(self) -> &'static str {
        match self {}
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AisleWalk {
    pub tempo: Tempo,
    /// Prompts spawned this round
    pub spawned: u32,
    prompt_timer: SpawnTimer,
    petal_timer: SpawnTimer,
    round_done: bool,
    /// Last graded press, shown under the zone
    pub last_grade: Option<(Grade, u64)>,
}

impl Default for AisleWalk {
    fn default() -> Self {
        Self::new()
    }
}

impl AisleWalk {
    pub fn new() -> Self {
        Self {
            tempo: tempo(1),
            spawned: 0,
            prompt_timer: SpawnTimer::default(),
            petal_timer: SpawnTimer::default(),
            round_done: false,
            last_grade: None,
        }
    }

    fn begin_round(&mut self, round: u32) {
        self.tempo = tempo(round);
        self.spawned = 0;
        self.round_done = false;
        self.last_grade = None;
        self.prompt_timer.reset(LEAD_IN);
    }

    /// Send the next step prompt in from the right edge
    pub fn spawn_prompt(&mut self, ctx: &mut Ctx<AisleKind, AisleEffect>) -> EntityId {
        let kind = if self.spawned % 2 == 0 {
            AisleKind::LeftStep
        } else {
            AisleKind::RightStep
        };
        self.spawned += 1;
        let speed = self.tempo.speed;
        ctx.entities.spawn(
            kind,
            Vec2::new(WIDTH + PROMPT_RADIUS, LANE_Y),
            Shape::circle(PROMPT_RADIUS),
            |e| e.vel = Vec2::new(-speed, 0.0),
        )
    }

    fn spawn_petal(&mut self, ctx: &mut Ctx<AisleKind, AisleEffect>) {
        if !ctx.decorations() {
            return;
        }
        let x = ctx.rng.random_range(0.0..WIDTH);
        let fall: f32 = ctx.rng.random_range(30.0..60.0);
        ctx.entities
            .spawn(AisleKind::Petal, Vec2::new(x, -6.0), Shape::circle(4.0), |e| {
                e.vel = Vec2::new(-20.0, fall);
                e.motion = Motion::Wobble {
                    amplitude: 12.0,
                    frequency: 2.0,
                };
                e.solid = false;
            });
    }

    /// Live prompt closest to the zone center
    fn nearest_prompt(ctx: &Ctx<AisleKind, AisleEffect>) -> Option<(EntityId, f32)> {
        ctx.entities
            .live()
            .filter(|e| e.kind.is_prompt())
            .map(|e| (e.id, (e.pos.x - ZONE_X).abs()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

impl Game for AisleWalk {
    type Kind = AisleKind;
    type Effect = AisleEffect;

    fn id(&self) -> &'static str {
        GAME_ID
    }

    fn title(&self) -> &'static str {
        "Aisle Walk"
    }

    fn rules(&self) -> GameRules {
        GameRules {
            width: WIDTH,
            height: HEIGHT,
            lives: 3,
            tolerance: 0.0,
            cull_margin: 60.0,
            pausable: true,
            fade_frames: 14,
            time_limit: None,
            interlude_frames: 150,
            invincible_frames: 0,
            level_basis: LevelBasis::Score { per_level: 500 },
            scoring: ScoringRules {
                combo_step: 4,
                multiplier_cap: 4,
                combo_window: None,
                frenzy_threshold: None,
                frenzy_frames: 0,
                frenzy_factor: 1,
                miss_tolerance: Some(4),
            },
        }
    }

    fn reset(&mut self, ctx: &mut Ctx<AisleKind, AisleEffect>) {
        *self = Self::new();
        self.begin_round(ctx.session.round);
        self.petal_timer.reset(1);
    }

    fn step(&mut self, _ctx: &mut Ctx<AisleKind, AisleEffect>, _input: &TickInput) {}

    fn spawn(&mut self, ctx: &mut Ctx<AisleKind, AisleEffect>) {
        if self.spawned < PROMPTS_PER_ROUND && self.prompt_timer.tick() {
            self.spawn_prompt(ctx);
            self.prompt_timer.reset(self.tempo.interval);
        }
        if self.petal_timer.tick() {
            self.spawn_petal(ctx);
            self.petal_timer.reset(PETAL_EVERY);
        }
    }

    fn collide(&mut self, ctx: &mut Ctx<AisleKind, AisleEffect>, input: &TickInput) {
        if input.jump || input.tap.is_some() {
            let zone = Vec2::new(ZONE_X, LANE_Y);
            let grade = match Self::nearest_prompt(ctx) {
                Some((id, distance)) => match Grade::of(distance, &self.tempo) {
                    Grade::Perfect => {
                        ctx.collect(id, PERFECT_POINTS, Color::GOLD);
                        Grade::Perfect
                    }
                    Grade::Good => {
                        ctx.collect(id, GOOD_POINTS, Color::SAGE);
                        Grade::Good
                    }
                    Grade::OffBeat => Grade::OffBeat,
                },
                None => Grade::OffBeat,
            };
            if grade == Grade::OffBeat {
                ctx.break_combo();
                ctx.entities
                    .fx
                    .float_text("Off beat", zone + Vec2::new(0.0, 40.0), Color::GREY, 30);
            }
            self.last_grade = Some((grade, ctx.frame()));
        }

        let late = ZONE_X - self.tempo.good;
        let passed: Vec<EntityId> = ctx
            .entities
            .live()
            .filter(|e| e.kind.is_prompt() && e.pos.x < late)
            .map(|e| e.id)
            .collect();
        for id in passed {
            ctx.miss(id);
        }

        self.round_done = self.spawned == PROMPTS_PER_ROUND
            && !ctx.entities.live().any(|e| e.kind.is_prompt());
    }

    fn flow(&self, session: &GameSession) -> Flow {
        if !self.round_done {
            Flow::Continue
        } else if session.round < ROUNDS {
            Flow::RoundResult
        } else {
            Flow::Celebration
        }
    }

    fn after_interlude(&mut self, phase: GamePhase, _session: &GameSession) -> Flow {
        match phase {
            GamePhase::RoundResult => Flow::NextRound,
            _ => Flow::GameOver,
        }
    }

    fn start_round(&mut self, ctx: &mut Ctx<AisleKind, AisleEffect>) {
        log::info!("Aisle walk round {}", ctx.session.round);
        self.begin_round(ctx.session.round);
    }

    fn draw_background(&self, surface: &mut dyn Surface, _session: &GameSession) {
        surface.clear(Color::CREAM);
        // Aisle runner
        surface.fill_rect(Vec2::new(0.0, LANE_Y - 40.0), Vec2::new(WIDTH, 80.0), Color::WHITE);
    }

    fn draw_entity(&self, surface: &mut dyn Surface, entity: &Entity<AisleKind>) {
        let r = entity.shape.half_extents().x;
        match entity.kind {
            AisleKind::LeftStep => surface.fill_circle(entity.pos, r, Color::BLUSH),
            AisleKind::RightStep => surface.fill_circle(entity.pos, r, Color::SKY),
            AisleKind::Petal => surface.fill_circle(entity.pos, r, Color::BLUSH.fade(0.7)),
        }
    }

    fn draw_player(&self, surface: &mut dyn Surface, session: &GameSession) {
        let good = self.tempo.good;
        let perfect = self.tempo.perfect;
        surface.fill_rect(
            Vec2::new(ZONE_X - good, LANE_Y - 40.0),
            Vec2::new(good * 2.0, 80.0),
            Color::SAGE.fade(0.35),
        );
        surface.fill_rect(
            Vec2::new(ZONE_X - perfect, LANE_Y - 40.0),
            Vec2::new(perfect * 2.0, 80.0),
            Color::GOLD.fade(0.45),
        );
        if let Some((grade, frame)) = self.last_grade {
            if session.frame.saturating_sub(frame) < 30 && grade != Grade::OffBeat {
                let label = if grade == Grade::Perfect { "Perfect!" } else { "Good" };
                surface.text(
                    label,
                    Vec2::new(ZONE_X, LANE_Y + 70.0),
                    18.0,
                    Color::INK,
                    TextAlign::Center,
                );
            }
        }
    }

    fn draw_overlay(&self, surface: &mut dyn Surface, session: &GameSession) {
        surface.text(
            &format!("Round {}/{}  Step {}/{}", session.round, ROUNDS, self.spawned, PROMPTS_PER_ROUND),
            Vec2::new(WIDTH / 2.0, 24.0),
            16.0,
            Color::INK,
            TextAlign::Center,
        );
    }
}
