//! Cat Swat: tap the cats before they land on the wedding cake
//!
//! Cats are tossed up from below the table and fall back under gravity. A
//! tap on a cat scores, a tap on a flying slice of cake costs points. The
//! round lasts sixty seconds.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::{
    Color, Ctx, DifficultyCurve, EffectKind, Entity, EntityId, Game, GameRules, GameSession,
    KindWeights, LevelBasis, Motion, ScoringRules, Shape, SpawnTimer, Surface, TextAlign,
    TickInput,
};
use crate::secs_to_frames;

pub const GAME_ID: &str = "catSwat";

pub const WIDTH: f32 = 480.0;
pub const HEIGHT: f32 = 640.0;
/// Top of the cake table; cats leave play once they fall below it
pub const TABLE_Y: f32 = 560.0;

pub const ROUND_SECS: f32 = 60.0;
pub const CAT_POINTS: u64 = 10;
pub const FAST_CAT_POINTS: u64 = 25;
pub const CAKE_PENALTY: u64 = 30;

/// Gravity on tossed items (pixels/s^2)
const TOSS_GRAVITY: f32 = 700.0;
/// Taps this many pixels outside a target still count
const TAP_SLOP: f32 = 12.0;

const CURVE: DifficultyCurve = DifficultyCurve {
    base_interval: 55.0,
    interval_step: 6.0,
    min_interval: 18.0,
    speed_step: 0.02,
    max_speed: 1.1,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatKind {
    Cat,
    FastCat,
    Cake,
}

impl CatKind {
    fn radius(self) -> f32 {
        match self {
            CatKind::Cat => 28.0,
            CatKind::FastCat => 22.0,
            CatKind::Cake => 24.0,
        }
    }

    /// Upward launch speed range (pixels/s)
    fn launch(self) -> (f32, f32) {
        match self {
            CatKind::Cat | CatKind::Cake => (620.0, 760.0),
            CatKind::FastCat => (760.0, 880.0),
        }
    }
}

/// Cat Swat has no power-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CatEffect {}

impl EffectKind for CatEffect {
    fn name(self) -> &'static str {
        match self {}
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatSwat {
    spawn_timer: SpawnTimer,
    weights: KindWeights<CatKind>,
    /// Last tap, drawn as a paw print
    pub last_tap: Option<(Vec2, u64)>,
}

impl Default for CatSwat {
    fn default() -> Self {
        Self::new()
    }
}

impl CatSwat {
    pub fn new() -> Self {
        Self {
            spawn_timer: SpawnTimer::default(),
            weights: KindWeights::from_rows(&[
                (CatKind::Cat, 1.0, -0.05, 1.0),
                (CatKind::FastCat, 0.1, 0.06, 0.4),
                (CatKind::Cake, 0.12, 0.03, 0.3),
            ]),
            last_tap: None,
        }
    }

    /// Toss an item up from below the table at column `x`
    pub fn toss(&mut self, ctx: &mut Ctx<CatKind, CatEffect>, kind: CatKind, x: f32) -> EntityId {
        let (lo, hi) = kind.launch();
        let speed = ctx.rng.random_range(lo..hi) * CURVE.speed_multiplier(ctx.session.difficulty_level);
        let drift: f32 = ctx.rng.random_range(-80.0..80.0);
        ctx.entities.spawn(
            kind,
            Vec2::new(x, HEIGHT + kind.radius()),
            Shape::circle(kind.radius()),
            |e| {
                e.vel = Vec2::new(drift, -speed);
                e.motion = Motion::Falling {
                    gravity: TOSS_GRAVITY,
                };
            },
        )
    }

    /// Most recently tossed live target under the tap
    fn target_at(ctx: &Ctx<CatKind, CatEffect>, tap: Vec2) -> Option<EntityId> {
        ctx.entities.under_point(tap, -TAP_SLOP).into_iter().max()
    }
}

impl Game for CatSwat {
    type Kind = CatKind;
    type Effect = CatEffect;

    fn id(&self) -> &'static str {
        GAME_ID
    }

    fn title(&self) -> &'static str {
        "Cat Swat"
    }

    fn rules(&self) -> GameRules {
        GameRules {
            width: WIDTH,
            height: HEIGHT,
            lives: 1,
            tolerance: -TAP_SLOP,
            cull_margin: 80.0,
            pausable: true,
            fade_frames: 12,
            time_limit: Some(secs_to_frames(ROUND_SECS)),
            interlude_frames: 0,
            invincible_frames: 0,
            level_basis: LevelBasis::Time {
                secs_per_level: 10.0,
            },
            scoring: ScoringRules {
                combo_step: 5,
                multiplier_cap: 3,
                combo_window: None,
                frenzy_threshold: Some(5),
                frenzy_frames: secs_to_frames(5.0),
                frenzy_factor: 2,
                miss_tolerance: None,
            },
        }
    }

    fn reset(&mut self, _ctx: &mut Ctx<CatKind, CatEffect>) {
        *self = Self::new();
        self.spawn_timer.reset(30);
    }

    fn step(&mut self, ctx: &mut Ctx<CatKind, CatEffect>, input: &TickInput) {
        if let Some(tap) = input.tap {
            self.last_tap = Some((tap, ctx.frame()));
        }
    }

    fn spawn(&mut self, ctx: &mut Ctx<CatKind, CatEffect>) {
        if !self.spawn_timer.tick() {
            return;
        }
        let level = ctx.session.difficulty_level;
        let kind = self.weights.pick(level, ctx.rng).unwrap_or(CatKind::Cat);
        let x = ctx.rng.random_range(60.0..WIDTH - 60.0);
        self.toss(ctx, kind, x);
        self.spawn_timer.reset(CURVE.spawn_interval(level));
    }

    fn collide(&mut self, ctx: &mut Ctx<CatKind, CatEffect>, input: &TickInput) {
        if let Some(tap) = input.tap {
            match Self::target_at(ctx, tap).and_then(|id| Some((id, ctx.entities.get(id)?.kind))) {
                Some((id, CatKind::Cat)) => {
                    ctx.collect(id, CAT_POINTS, Color::BLUSH);
                }
                Some((id, CatKind::FastCat)) => {
                    ctx.collect(id, FAST_CAT_POINTS, Color::GOLD);
                }
                Some((id, CatKind::Cake)) => {
                    ctx.penalty(id, CAKE_PENALTY);
                }
                None => {}
            }
        }

        // Cats that fall back past the table got away
        let escaped: Vec<EntityId> = ctx
            .entities
            .live()
            .filter(|e| e.kind != CatKind::Cake && e.vel.y > 0.0 && e.pos.y > TABLE_Y + e.shape.half_extents().y)
            .map(|e| e.id)
            .collect();
        for id in escaped {
            ctx.miss(id);
        }
    }

    fn draw_background(&self, surface: &mut dyn Surface, _session: &GameSession) {
        surface.clear(Color::SKY);
        surface.fill_rect(
            Vec2::new(0.0, TABLE_Y),
            Vec2::new(WIDTH, HEIGHT - TABLE_Y),
            Color::CREAM,
        );
        // Cake on the table
        surface.fill_rect(Vec2::new(WIDTH / 2.0 - 50.0, TABLE_Y - 60.0), Vec2::new(100.0, 60.0), Color::WHITE);
        surface.fill_rect(Vec2::new(WIDTH / 2.0 - 30.0, TABLE_Y - 95.0), Vec2::new(60.0, 35.0), Color::WHITE);
    }

    fn draw_entity(&self, surface: &mut dyn Surface, entity: &Entity<CatKind>) {
        let r = entity.shape.half_extents().x;
        match entity.kind {
            CatKind::Cat | CatKind::FastCat => {
                let fur = if entity.kind == CatKind::Cat {
                    Color::rgb(230, 150, 70)
                } else {
                    Color::GREY
                };
                surface.fill_circle(entity.pos, r, fur);
                // Ears
                for side in [-1.0, 1.0] {
                    surface.fill_circle(entity.pos + Vec2::new(side * r * 0.6, -r * 0.8), r * 0.35, fur);
                }
            }
            CatKind::Cake => {
                surface.fill_rect(entity.pos - Vec2::splat(r), Vec2::splat(r * 2.0), Color::BLUSH);
                surface.text("cake", entity.pos, 12.0, Color::INK, TextAlign::Center);
            }
        }
    }

    fn draw_player(&self, surface: &mut dyn Surface, session: &GameSession) {
        if let Some((tap, frame)) = self.last_tap {
            if session.frame.saturating_sub(frame) < 15 {
                surface.fill_circle(tap, 10.0, Color::INK.fade(0.4));
            }
        }
    }
}
