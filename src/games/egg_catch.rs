//! Egg Catch: steer a basket under falling eggs
//!
//! Plain eggs are worth 10, golden eggs 50 and bounce off the walls, rotten
//! eggs cost a life. Every third good egg that hits the ground also costs a
//! life. Power-ups widen the basket or slow everything down.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::SIM_DT;
use crate::engine::{
    Color, Ctx, DifficultyCurve, EffectKind, Entity, EntityId, Game, GameRules, GameSession,
    KindWeights, LevelBasis, Motion, ScoringRules, Shape, SpawnTimer, Status, Surface, TickInput,
};
use crate::secs_to_frames;

pub const GAME_ID: &str = "eggCatch";

pub const WIDTH: f32 = 480.0;
pub const HEIGHT: f32 = 640.0;
/// Basket center height
pub const BASKET_Y: f32 = 580.0;
pub const BASKET_WIDTH: f32 = 90.0;
pub const WIDE_BASKET_WIDTH: f32 = 150.0;
const BASKET_HEIGHT: f32 = 30.0;
/// Keyboard steering speed (pixels/s)
const BASKET_SPEED: f32 = 520.0;
/// Max speed when chasing a pointer or tilt target
const BASKET_CHASE_SPEED: f32 = 1100.0;

/// Base fall speed (pixels/s)
pub const BASE_FALL: f32 = 170.0;
const SLOW_FACTOR: f32 = 0.5;

pub const EGG_POINTS: u64 = 10;
pub const GOLDEN_POINTS: u64 = 50;

pub const WIDE_SECS: f32 = 8.0;
pub const SLOW_SECS: f32 = 5.0;

const CURVE: DifficultyCurve = DifficultyCurve {
    base_interval: 70.0,
    interval_step: 5.0,
    min_interval: 24.0,
    speed_step: 0.1,
    max_speed: 2.4,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EggKind {
    Egg,
    Golden,
    Rotten,
    WideBasket,
    SlowMo,
}

impl EggKind {
    /// Good eggs count as a miss when dropped
    pub fn is_good(self) -> bool {
        matches!(self, EggKind::Egg | EggKind::Golden)
    }

    fn radius(self) -> f32 {
        match self {
            EggKind::Egg | EggKind::Rotten => 12.0,
            EggKind::Golden => 13.0,
            EggKind::WideBasket | EggKind::SlowMo => 14.0,
        }
    }

    fn fall_factor(self) -> f32 {
        match self {
            EggKind::Golden => 1.15,
            EggKind::WideBasket | EggKind::SlowMo => 0.8,
            EggKind::Egg | EggKind::Rotten => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EggEffect {
    WideBasket,
    SlowMo,
}

impl EffectKind for EggEffect {
    fn name(self) -> &'static str {
        match self {
            EggEffect::WideBasket => "wideBasket",
            EggEffect::SlowMo => "slowMo",
        }
    }
}

/// Egg Catch game state outside the entity registry
#[derive(Debug, Clone, PartialEq)]
pub struct EggCatch {
    /// Basket center x
    pub basket_x: f32,
    pub basket_width: f32,
    spawn_timer: SpawnTimer,
    weights: KindWeights<EggKind>,
    /// Current fall speed (pixels/s)
    pub fall_speed: f32,
}

impl Default for EggCatch {
    fn default() -> Self {
        Self::new()
    }
}

impl EggCatch {
    pub fn new() -> Self {
        Self {
            basket_x: WIDTH / 2.0,
            basket_width: BASKET_WIDTH,
            spawn_timer: SpawnTimer::default(),
            weights: KindWeights::from_rows(&[
                (EggKind::Egg, 1.0, -0.04, 1.0),
                (EggKind::Golden, 0.08, 0.01, 0.2),
                (EggKind::Rotten, 0.1, 0.05, 0.45),
                (EggKind::WideBasket, 0.03, 0.0, 0.03),
                (EggKind::SlowMo, 0.03, 0.0, 0.03),
            ]),
            fall_speed: BASE_FALL,
        }
    }

    pub fn basket_pos(&self) -> Vec2 {
        Vec2::new(self.basket_x, BASKET_Y)
    }

    pub fn basket_shape(&self) -> Shape {
        Shape::rect(self.basket_width, BASKET_HEIGHT)
    }

    /// Drop an item from above the top edge at column `x`
    pub fn spawn_item(
        &mut self,
        ctx: &mut Ctx<EggKind, EggEffect>,
        kind: EggKind,
        x: f32,
    ) -> EntityId {
        let fall = self.fall_speed * kind.fall_factor();
        let drift: f32 = if kind == EggKind::Golden {
            let dir = if ctx.rng.random_bool(0.5) { 1.0 } else { -1.0 };
            dir * ctx.rng.random_range(90.0..160.0)
        } else {
            0.0
        };
        ctx.entities.spawn(
            kind,
            Vec2::new(x, -kind.radius()),
            Shape::circle(kind.radius()),
            |e| {
                e.vel = Vec2::new(drift, fall);
                if kind == EggKind::Golden {
                    e.motion = Motion::Bouncing { gravity: 0.0 };
                }
            },
        )
    }
}

impl Game for EggCatch {
    type Kind = EggKind;
    type Effect = EggEffect;

    fn id(&self) -> &'static str {
        GAME_ID
    }

    fn title(&self) -> &'static str {
        "Egg Catch"
    }

    fn rules(&self) -> GameRules {
        GameRules {
            width: WIDTH,
            height: HEIGHT,
            lives: 3,
            tolerance: 0.0,
            cull_margin: 60.0,
            pausable: true,
            fade_frames: 10,
            time_limit: None,
            interlude_frames: 0,
            invincible_frames: 45,
            level_basis: LevelBasis::Score { per_level: 150 },
            scoring: ScoringRules {
                combo_step: 4,
                multiplier_cap: 4,
                combo_window: None,
                frenzy_threshold: Some(8),
                frenzy_frames: secs_to_frames(6.0),
                frenzy_factor: 2,
                miss_tolerance: Some(3),
            },
        }
    }

    fn reset(&mut self, _ctx: &mut Ctx<EggKind, EggEffect>) {
        *self = Self::new();
        self.spawn_timer.reset(40);
    }

    fn step(&mut self, ctx: &mut Ctx<EggKind, EggEffect>, input: &TickInput) {
        self.basket_width = if ctx.is_active(EggEffect::WideBasket) {
            WIDE_BASKET_WIDTH
        } else {
            BASKET_WIDTH
        };

        if input.steer != 0.0 {
            self.basket_x += input.steer * BASKET_SPEED * SIM_DT;
        } else if let Some(target) = input.axis {
            let max = BASKET_CHASE_SPEED * SIM_DT;
            self.basket_x += (target - self.basket_x).clamp(-max, max);
        }
        let half = self.basket_width / 2.0;
        self.basket_x = self.basket_x.clamp(half, WIDTH - half);

        let slow = if ctx.is_active(EggEffect::SlowMo) { SLOW_FACTOR } else { 1.0 };
        self.fall_speed = BASE_FALL * CURVE.speed_multiplier(ctx.session.difficulty_level) * slow;
        let fall = self.fall_speed;
        for e in ctx.entities.iter_mut() {
            if e.is_live() {
                e.vel.y = fall * e.kind.fall_factor();
            }
        }
    }

    fn spawn(&mut self, ctx: &mut Ctx<EggKind, EggEffect>) {
        if !self.spawn_timer.tick() {
            return;
        }
        let level = ctx.session.difficulty_level;
        let mut kind = self.weights.pick(level, ctx.rng).unwrap_or(EggKind::Egg);
        // One of each power-up at a time
        let busy = match kind {
            EggKind::WideBasket => Some(EggEffect::WideBasket),
            EggKind::SlowMo => Some(EggEffect::SlowMo),
            _ => None,
        };
        if busy.is_some_and(|effect| ctx.is_active(effect)) {
            kind = EggKind::Egg;
        }
        let margin = kind.radius() + 8.0;
        let x = ctx.rng.random_range(margin..WIDTH - margin);
        self.spawn_item(ctx, kind, x);
        self.spawn_timer.reset(CURVE.spawn_interval(level));
    }

    fn collide(&mut self, ctx: &mut Ctx<EggKind, EggEffect>, _input: &TickInput) {
        let basket = self.basket_pos();
        for id in ctx
            .entities
            .overlapping(basket, self.basket_shape(), ctx.rules.tolerance)
        {
            let Some(entity) = ctx.entities.get(id) else {
                continue;
            };
            // Only catch from above the rim
            if entity.pos.y > basket.y {
                continue;
            }
            match entity.kind {
                EggKind::Egg => {
                    ctx.collect(id, EGG_POINTS, Color::CREAM);
                }
                EggKind::Golden => {
                    ctx.collect(id, GOLDEN_POINTS, Color::GOLD);
                }
                EggKind::Rotten => {
                    ctx.hazard(id);
                }
                EggKind::WideBasket | EggKind::SlowMo => {
                    let (effect, secs) = if entity.kind == EggKind::WideBasket {
                        (EggEffect::WideBasket, WIDE_SECS)
                    } else {
                        (EggEffect::SlowMo, SLOW_SECS)
                    };
                    if ctx.entities.resolve(id, Status::Collected, ctx.rules.fade_frames) {
                        ctx.activate(effect, secs_to_frames(secs));
                    }
                }
            }
        }

        let dropped: Vec<EntityId> = ctx
            .entities
            .live()
            .filter(|e| e.kind.is_good() && e.pos.y - e.shape.half_extents().y > BASKET_Y + BASKET_HEIGHT)
            .map(|e| e.id)
            .collect();
        for id in dropped {
            ctx.miss(id);
        }
    }

    fn draw_background(&self, surface: &mut dyn Surface, _session: &GameSession) {
        surface.clear(Color::CREAM);
        surface.fill_rect(
            Vec2::new(0.0, BASKET_Y + BASKET_HEIGHT),
            Vec2::new(WIDTH, HEIGHT - BASKET_Y - BASKET_HEIGHT),
            Color::SAGE,
        );
    }

    fn draw_entity(&self, surface: &mut dyn Surface, entity: &Entity<EggKind>) {
        let color = match entity.kind {
            EggKind::Egg => Color::WHITE,
            EggKind::Golden => Color::GOLD,
            EggKind::Rotten => Color::rgb(120, 140, 80),
            EggKind::WideBasket => Color::BLUSH,
            EggKind::SlowMo => Color::SKY,
        };
        let r = entity.shape.half_extents().x;
        surface.fill_circle(entity.pos, r, color);
    }

    fn draw_player(&self, surface: &mut dyn Surface, session: &GameSession) {
        let size = Vec2::new(self.basket_width, BASKET_HEIGHT);
        let color = if session.is_invincible() && session.frame % 8 < 4 {
            Color::rgb(200, 160, 110).fade(0.4)
        } else {
            Color::rgb(200, 160, 110)
        };
        surface.fill_rect(self.basket_pos() - size / 2.0, size, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_good_eggs_count_as_misses() {
        assert!(EggKind::Egg.is_good());
        assert!(EggKind::Golden.is_good());
        assert!(!EggKind::Rotten.is_good());
        assert!(!EggKind::SlowMo.is_good());
    }

    #[test]
    fn test_effect_names() {
        assert_eq!(EggEffect::WideBasket.name(), "wideBasket");
        assert_eq!(EggEffect::SlowMo.name(), "slowMo");
    }

    #[test]
    fn test_basket_starts_centered() {
        let game = EggCatch::new();
        assert_eq!(game.basket_pos(), Vec2::new(WIDTH / 2.0, BASKET_Y));
        assert_eq!(game.basket_shape(), Shape::rect(BASKET_WIDTH, 30.0));
    }
}
