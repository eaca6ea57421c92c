//! Dog Dash: endless runner
//!
//! The dog holds a fixed lane while the world scrolls left. Hurdles and cones
//! are jumped, birds are ducked, treats and rings are collected. A magnet pulls
//! nearby treats in, and every 250 points a companion pup may join for a few
//! seconds and clear the way. One hit ends the run.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::entity::Attractor;
use crate::engine::{
    Color, Ctx, DifficultyCurve, EffectKind, Entity, EntityId, Game, GameRules, GameSession,
    KindWeights, LevelBasis, Milestones, ScoringRules, Shape, SpawnTimer, Status, Surface,
    TextAlign, TickInput, TimedEffects,
};
use crate::secs_to_frames;

pub const GAME_ID: &str = "dogRun";

pub const WIDTH: f32 = 800.0;
pub const HEIGHT: f32 = 300.0;
/// Top of the ground strip
pub const GROUND_Y: f32 = 250.0;
/// Fixed lane the dog runs in
pub const PLAYER_X: f32 = 120.0;

const DOG_SIZE: Vec2 = Vec2::new(44.0, 40.0);
const DOG_DUCK_HEIGHT: f32 = 24.0;

const GRAVITY: f32 = 2400.0;
const JUMP_VELOCITY: f32 = -760.0;
/// Second jump is a little weaker
const DOUBLE_JUMP_FACTOR: f32 = 0.85;
/// Extra pull when ducking mid-air
const FAST_FALL: f32 = 3600.0;
pub const MAX_JUMPS: u32 = 2;

/// Base scroll speed (pixels/s)
pub const BASE_SPEED: f32 = 320.0;
/// Minimum distance between consecutive obstacles
pub const MIN_GAP: f32 = 260.0;
/// Obstacles enter this far beyond the right edge
pub const SPAWN_OFFSET: f32 = 60.0;

pub const TREAT_POINTS: u64 = 10;
pub const RING_POINTS: u64 = 50;

pub const MAGNET_RANGE: f32 = 120.0;
const MAGNET_STRENGTH: f32 = 2400.0;
pub const MAGNET_SECS: f32 = 6.0;

pub const COMPANION_EVERY: u64 = 250;
pub const COMPANION_SECS: f32 = 5.0;
/// How far ahead of the dog the pup clears obstacles
const COMPANION_REACH: f32 = 220.0;

const CURVE: DifficultyCurve = DifficultyCurve {
    base_interval: 95.0,
    interval_step: 6.0,
    min_interval: 40.0,
    speed_step: 0.06,
    max_speed: 2.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunnerKind {
    Hurdle,
    Cone,
    /// Low flyer; duck under it
    Bird,
    Treat,
    Ring,
    Magnet,
    Cloud,
}

impl RunnerKind {
    pub fn is_obstacle(self) -> bool {
        matches!(self, RunnerKind::Hurdle | RunnerKind::Cone | RunnerKind::Bird)
    }

    fn shape(self) -> Shape {
        match self {
            RunnerKind::Hurdle => Shape::rect(30.0, 40.0),
            RunnerKind::Cone => Shape::rect(24.0, 30.0),
            RunnerKind::Bird => Shape::rect(40.0, 24.0),
            RunnerKind::Treat => Shape::circle(10.0),
            RunnerKind::Ring => Shape::circle(14.0),
            RunnerKind::Magnet => Shape::circle(14.0),
            RunnerKind::Cloud => Shape::rect(90.0, 30.0),
        }
    }

    /// Center height for obstacles
    fn lane_y(self) -> f32 {
        match self {
            // Low enough to hit a standing dog, high enough to clear a ducking one
            RunnerKind::Bird => 212.0,
            other => GROUND_Y - other.shape().half_extents().y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RunnerEffect {
    Magnet,
    Companion,
}

impl EffectKind for RunnerEffect {
    fn name(self) -> &'static str {
        match self {
            RunnerEffect::Magnet => "magnet",
            RunnerEffect::Companion => "companion",
        }
    }
}

/// The player actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    /// Hitbox center
    pub pos: Vec2,
    pub vel_y: f32,
    pub grounded: bool,
    pub jumps_left: u32,
    pub ducking: bool,
    /// Run-cycle frame index
    pub pose: u32,
    pose_timer: u32,
}

impl Default for Dog {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, GROUND_Y - DOG_SIZE.y / 2.0),
            vel_y: 0.0,
            grounded: true,
            jumps_left: MAX_JUMPS,
            ducking: false,
            pose: 0,
            pose_timer: 0,
        }
    }
}

impl Dog {
    pub fn height(&self) -> f32 {
        if self.ducking { DOG_DUCK_HEIGHT } else { DOG_SIZE.y }
    }

    pub fn hitbox(&self) -> Shape {
        Shape::rect(DOG_SIZE.x, self.height())
    }

    fn bottom(&self) -> f32 {
        self.pos.y + self.height() / 2.0
    }

    /// Returns true if a jump was performed
    pub fn jump(&mut self) -> bool {
        if self.jumps_left == 0 {
            return false;
        }
        let factor = if self.jumps_left == MAX_JUMPS { 1.0 } else { DOUBLE_JUMP_FACTOR };
        self.vel_y = JUMP_VELOCITY * factor;
        self.jumps_left -= 1;
        self.grounded = false;
        true
    }

    fn set_ducking(&mut self, ducking: bool) {
        if ducking == self.ducking {
            return;
        }
        // Keep the feet where they are
        let bottom = self.bottom();
        self.ducking = ducking;
        self.pos.y = bottom - self.height() / 2.0;
    }

    fn update(&mut self, dt: f32, duck: bool) {
        self.set_ducking(duck);
        if !self.grounded {
            let pull = if duck { GRAVITY + FAST_FALL } else { GRAVITY };
            self.vel_y += pull * dt;
            self.pos.y += self.vel_y * dt;
            if self.bottom() >= GROUND_Y {
                self.pos.y = GROUND_Y - self.height() / 2.0;
                self.vel_y = 0.0;
                self.grounded = true;
                self.jumps_left = MAX_JUMPS;
            }
        }

        self.pose_timer += 1;
        if self.grounded && self.pose_timer >= 6 {
            self.pose_timer = 0;
            self.pose = (self.pose + 1) % 4;
        }
    }
}

/// Dog Dash game state outside the entity registry
#[derive(Debug, Clone, PartialEq)]
pub struct DogRun {
    pub dog: Dog,
    obstacle_timer: SpawnTimer,
    pickup_timer: SpawnTimer,
    cloud_timer: SpawnTimer,
    companion_milestones: Milestones,
    obstacle_weights: KindWeights<RunnerKind>,
    /// Current scroll speed (pixels/s)
    pub speed: f32,
    /// Whether the companion is on screen (mirrors the timed effect)
    pub companion_active: bool,
}

impl Default for DogRun {
    fn default() -> Self {
        Self::new()
    }
}

impl DogRun {
    pub fn new() -> Self {
        Self {
            dog: Dog::default(),
            obstacle_timer: SpawnTimer::default(),
            pickup_timer: SpawnTimer::default(),
            cloud_timer: SpawnTimer::default(),
            companion_milestones: Milestones::every(COMPANION_EVERY, 400),
            obstacle_weights: KindWeights::from_rows(&[
                (RunnerKind::Hurdle, 1.0, -0.05, 1.0),
                (RunnerKind::Cone, 0.8, 0.0, 0.8),
                (RunnerKind::Bird, 0.0, 0.12, 0.9),
            ]),
            speed: BASE_SPEED,
            companion_active: false,
        }
    }

    /// Spawn an obstacle just beyond the right edge
    pub fn spawn_obstacle(
        &mut self,
        ctx: &mut Ctx<RunnerKind, RunnerEffect>,
        kind: RunnerKind,
    ) -> EntityId {
        let shape = kind.shape();
        let x = WIDTH + SPAWN_OFFSET + shape.half_extents().x;
        let speed = self.speed;
        ctx.entities
            .spawn(kind, Vec2::new(x, kind.lane_y()), shape, |e| {
                e.vel = Vec2::new(-speed, 0.0);
            })
    }

    fn spawn_pickup(&mut self, ctx: &mut Ctx<RunnerKind, RunnerEffect>) {
        let roll: f32 = ctx.rng.random();
        let kind = if roll < 0.04 && !ctx.is_active(RunnerEffect::Magnet) {
            RunnerKind::Magnet
        } else if roll < 0.18 {
            RunnerKind::Ring
        } else {
            RunnerKind::Treat
        };
        let on_ground = kind == RunnerKind::Treat && ctx.rng.random_bool(0.6);
        let y = if on_ground {
            GROUND_Y - 16.0
        } else {
            GROUND_Y - ctx.rng.random_range(80.0..130.0)
        };
        let speed = self.speed;
        ctx.entities.spawn(
            kind,
            Vec2::new(WIDTH + SPAWN_OFFSET, y),
            kind.shape(),
            |e| {
                e.vel = Vec2::new(-speed, 0.0);
                e.homing = kind == RunnerKind::Treat;
            },
        );
    }

    fn spawn_cloud(&mut self, ctx: &mut Ctx<RunnerKind, RunnerEffect>) {
        if !ctx.decorations() {
            return;
        }
        let y = ctx.rng.random_range(30.0..120.0);
        let speed = self.speed * 0.3;
        ctx.entities.spawn(
            RunnerKind::Cloud,
            Vec2::new(WIDTH + 100.0, y),
            RunnerKind::Cloud.shape(),
            |e| {
                e.vel = Vec2::new(-speed, 0.0);
                e.solid = false;
            },
        );
    }

    fn companion_pos(&self) -> Vec2 {
        Vec2::new(self.dog.pos.x + 60.0, GROUND_Y - 14.0)
    }
}

impl Game for DogRun {
    type Kind = RunnerKind;
    type Effect = RunnerEffect;

    fn id(&self) -> &'static str {
        GAME_ID
    }

    fn title(&self) -> &'static str {
        "Dog Dash"
    }

    fn rules(&self) -> GameRules {
        GameRules {
            width: WIDTH,
            height: HEIGHT,
            lives: 1,
            tolerance: 4.0,
            cull_margin: 120.0,
            pausable: false,
            fade_frames: 10,
            time_limit: None,
            interlude_frames: 0,
            invincible_frames: 0,
            level_basis: LevelBasis::Score { per_level: 100 },
            scoring: ScoringRules {
                combo_step: 3,
                multiplier_cap: 5,
                combo_window: Some(secs_to_frames(3.0)),
                frenzy_threshold: None,
                frenzy_frames: 0,
                frenzy_factor: 1,
                miss_tolerance: None,
            },
        }
    }

    fn reset(&mut self, ctx: &mut Ctx<RunnerKind, RunnerEffect>) {
        *self = Self::new();
        self.obstacle_timer.reset(90);
        self.pickup_timer.reset(45);
        self.cloud_timer.reset(1);
        self.spawn_cloud(ctx);
    }

    fn step(&mut self, ctx: &mut Ctx<RunnerKind, RunnerEffect>, input: &TickInput) {
        let level = ctx.session.difficulty_level;
        self.speed = BASE_SPEED * CURVE.speed_multiplier(level);

        if input.jump || input.tap.is_some() {
            self.dog.jump();
        }
        self.dog.update(crate::consts::SIM_DT, input.duck);

        // Obstacles ride the world scroll so their spacing holds
        let speed = self.speed;
        for e in ctx.entities.iter_mut() {
            if e.kind.is_obstacle() && e.is_live() {
                e.vel.x = -speed;
            }
        }
    }

    fn spawn(&mut self, ctx: &mut Ctx<RunnerKind, RunnerEffect>) {
        let level = ctx.session.difficulty_level;

        if self.obstacle_timer.tick() {
            let spawn_x = WIDTH + SPAWN_OFFSET;
            if ctx.entities.clearance(spawn_x, RunnerKind::is_obstacle) >= MIN_GAP {
                let kind = self
                    .obstacle_weights
                    .pick(level, ctx.rng)
                    .unwrap_or(RunnerKind::Hurdle);
                self.spawn_obstacle(ctx, kind);
                let jitter = ctx.rng.random_range(0..20);
                self.obstacle_timer
                    .reset(CURVE.spawn_interval(level) + jitter);
            }
        }

        if self.pickup_timer.tick() {
            self.spawn_pickup(ctx);
            let next = ctx.rng.random_range(50..80);
            self.pickup_timer.reset(next);
        }

        if self.cloud_timer.tick() {
            self.spawn_cloud(ctx);
            let next = ctx.rng.random_range(120..240);
            self.cloud_timer.reset(next);
        }
    }

    fn collide(&mut self, ctx: &mut Ctx<RunnerKind, RunnerEffect>, _input: &TickInput) {
        let tolerance = ctx.rules.tolerance;

        if ctx.is_active(RunnerEffect::Companion) {
            let ahead: Vec<EntityId> = ctx
                .entities
                .live()
                .filter(|e| {
                    e.kind.is_obstacle()
                        && e.pos.x > self.dog.pos.x
                        && e.pos.x < self.dog.pos.x + COMPANION_REACH
                })
                .map(|e| e.id)
                .collect();
            for id in ahead {
                ctx.destroy(id, Color::GOLD);
            }
        }

        for id in ctx
            .entities
            .overlapping(self.dog.pos, self.dog.hitbox(), tolerance)
        {
            let Some(kind) = ctx.entities.get(id).map(|e| e.kind) else {
                continue;
            };
            match kind {
                RunnerKind::Hurdle | RunnerKind::Cone | RunnerKind::Bird => {
                    ctx.hazard(id);
                }
                RunnerKind::Treat => {
                    ctx.collect(id, TREAT_POINTS, Color::rgb(196, 140, 80));
                }
                RunnerKind::Ring => {
                    ctx.collect(id, RING_POINTS, Color::GOLD);
                }
                RunnerKind::Magnet => {
                    if ctx.entities.resolve(id, Status::Collected, ctx.rules.fade_frames) {
                        ctx.activate(RunnerEffect::Magnet, secs_to_frames(MAGNET_SECS));
                    }
                }
                RunnerKind::Cloud => {}
            }
        }

        // Treats that scrolled past the dog break the combo
        let passed: Vec<EntityId> = ctx
            .entities
            .live()
            .filter(|e| {
                matches!(e.kind, RunnerKind::Treat | RunnerKind::Ring)
                    && e.pos.x < self.dog.pos.x - DOG_SIZE.x
            })
            .map(|e| e.id)
            .collect();
        for id in passed {
            ctx.miss(id);
        }

        for index in self.companion_milestones.update(ctx.session.score) {
            if !ctx.is_active(RunnerEffect::Companion) && ctx.rng.random_bool(0.5) {
                ctx.activate(RunnerEffect::Companion, secs_to_frames(COMPANION_SECS));
                self.companion_active = true;
                ctx.milestone(index, "Pup pal!");
            }
        }
    }

    fn attractor(
        &self,
        session: &GameSession,
        effects: &TimedEffects<RunnerEffect>,
    ) -> Option<Attractor> {
        effects
            .is_active(RunnerEffect::Magnet, session.frame)
            .then_some(Attractor {
                pos: self.dog.pos,
                radius: MAGNET_RANGE,
                strength: MAGNET_STRENGTH,
            })
    }

    fn on_effect_ended(&mut self, _ctx: &mut Ctx<RunnerKind, RunnerEffect>, effect: RunnerEffect) {
        if effect == RunnerEffect::Companion {
            self.companion_active = false;
        }
    }

    fn draw_background(&self, surface: &mut dyn Surface, _session: &GameSession) {
        surface.clear(Color::SKY);
        surface.fill_rect(
            Vec2::new(0.0, GROUND_Y),
            Vec2::new(WIDTH, HEIGHT - GROUND_Y),
            Color::SAGE,
        );
    }

    fn draw_entity(&self, surface: &mut dyn Surface, entity: &Entity<RunnerKind>) {
        let half = entity.shape.half_extents();
        let color = match entity.kind {
            RunnerKind::Hurdle => Color::rgb(200, 120, 90),
            RunnerKind::Cone => Color::rgb(240, 140, 50),
            RunnerKind::Bird => Color::INK,
            RunnerKind::Treat => Color::rgb(196, 140, 80),
            RunnerKind::Ring => Color::GOLD,
            RunnerKind::Magnet => Color::RED,
            RunnerKind::Cloud => Color::WHITE.fade(0.8),
        };
        match entity.shape {
            Shape::Circle { radius } => surface.fill_circle(entity.pos, radius, color),
            Shape::Rect { .. } => surface.fill_rect(entity.pos - half, half * 2.0, color),
        }
    }

    fn draw_player(&self, surface: &mut dyn Surface, _session: &GameSession) {
        let size = Vec2::new(DOG_SIZE.x, self.dog.height());
        let bob = if self.dog.grounded && self.dog.pose % 2 == 1 { 2.0 } else { 0.0 };
        surface.fill_rect(
            self.dog.pos - size / 2.0 - Vec2::Y * bob,
            size,
            Color::rgb(170, 120, 70),
        );
        // Ear
        surface.fill_circle(
            self.dog.pos + Vec2::new(size.x / 2.0 - 6.0, -size.y / 2.0 - bob),
            7.0,
            Color::rgb(120, 80, 50),
        );
        if self.companion_active {
            surface.fill_circle(self.companion_pos(), 14.0, Color::rgb(230, 200, 160));
        }
    }

    fn draw_overlay(&self, surface: &mut dyn Surface, _session: &GameSession) {
        if self.companion_active {
            surface.text(
                "Pup pal!",
                self.companion_pos() - Vec2::Y * 24.0,
                12.0,
                Color::INK,
                TextAlign::Center,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, overlaps};
    use crate::settings::Settings;
    use crate::store::MemoryStore;

    fn playing(seed: u64) -> Engine<DogRun, MemoryStore> {
        let mut engine = Engine::new(DogRun::new(), MemoryStore::new(), Settings::default());
        engine.start(seed);
        engine
    }

    /// Run one collision pass at `score`; true if the pup is out afterwards
    fn collide_at(engine: &mut Engine<DogRun, MemoryStore>, score: u64) -> bool {
        engine.with_ctx(|game, ctx| {
            ctx.session.score = score;
            game.collide(ctx, &TickInput::default());
            ctx.is_active(RunnerEffect::Companion)
        })
    }

    fn obstacles(engine: &Engine<DogRun, MemoryStore>) -> Vec<&Entity<RunnerKind>> {
        engine
            .entities()
            .live()
            .filter(|e| e.kind.is_obstacle())
            .collect()
    }

    #[test]
    fn test_companion_rolls_only_at_the_threshold() {
        let mut joined = 0;
        for seed in 0..64 {
            let mut engine = playing(seed);
            assert!(!collide_at(&mut engine, COMPANION_EVERY - 1));
            if collide_at(&mut engine, COMPANION_EVERY) {
                joined += 1;
                assert!(engine.game().companion_active);
            }
        }
        // A coin flip per threshold: some runs get the pup, some do not
        assert!(joined > 0 && joined < 64);
    }

    #[test]
    fn test_companion_never_doubles_up_or_retriggers_early() {
        let seed = (0..64)
            .find(|&seed| collide_at(&mut playing(seed), COMPANION_EVERY))
            .unwrap();
        let mut engine = playing(seed);
        assert!(collide_at(&mut engine, COMPANION_EVERY));
        let full = secs_to_frames(COMPANION_SECS);

        // Between thresholds nothing is rolled
        engine.with_ctx(|_, ctx| ctx.session.frame += 60);
        assert!(collide_at(&mut engine, COMPANION_EVERY + 150));

        // The next threshold while the pup is still out does not refresh it
        assert!(collide_at(&mut engine, COMPANION_EVERY * 2));
        let now = engine.session().frame;
        assert_eq!(
            engine.effects().remaining(RunnerEffect::Companion, now),
            full - 60
        );
        assert_eq!(engine.effects().active(now).count(), 1);
    }

    #[test]
    fn test_companion_clears_obstacles_within_reach() {
        let mut engine = playing(2);
        let (near, far) = engine.with_ctx(|game, ctx| {
            ctx.activate(RunnerEffect::Companion, secs_to_frames(COMPANION_SECS));
            let at = |dx: f32| Vec2::new(PLAYER_X + dx, RunnerKind::Hurdle.lane_y());
            let shape = RunnerKind::Hurdle.shape();
            let near = ctx
                .entities
                .spawn(RunnerKind::Hurdle, at(COMPANION_REACH - 20.0), shape, |_| {});
            let far = ctx
                .entities
                .spawn(RunnerKind::Hurdle, at(COMPANION_REACH + 80.0), shape, |_| {});
            game.collide(ctx, &TickInput::default());
            (near, far)
        });
        assert!(engine.entities().get(near).is_some_and(|e| !e.is_live()));
        assert!(engine.entities().get(far).is_some_and(|e| e.is_live()));
        assert_eq!(engine.session().lives, 1);
    }

    #[test]
    fn test_companion_leaves_after_five_seconds() {
        let mut engine = playing(3);
        let frames = secs_to_frames(COMPANION_SECS);
        engine.with_ctx(|game, ctx| {
            ctx.activate(RunnerEffect::Companion, frames);
            game.companion_active = true;
        });

        for _ in 0..frames - 1 {
            engine.tick(&TickInput::default());
        }
        assert!(engine.game().companion_active);

        engine.tick(&TickInput::default());
        engine.tick(&TickInput::default());
        assert!(!engine.game().companion_active);
        assert!(!engine.effects().is_active(RunnerEffect::Companion, engine.session().frame));
    }

    #[test]
    fn test_obstacles_keep_the_minimum_gap() {
        let mut engine = playing(4);
        engine.with_ctx(|game, ctx| {
            game.spawn_obstacle(ctx, RunnerKind::Cone);
            game.obstacle_timer.reset(1);
            game.spawn(ctx);
        });
        assert_eq!(obstacles(&engine).len(), 1);

        // Once its trailing edge is a full gap behind the spawn line the next may follow
        engine.with_ctx(|game, ctx| {
            for e in ctx.entities.iter_mut().filter(|e| e.kind.is_obstacle()) {
                e.pos.x -= MIN_GAP + 2.0 * e.shape.half_extents().x;
            }
            game.obstacle_timer.reset(1);
            game.spawn(ctx);
        });
        let mut placed = obstacles(&engine);
        assert_eq!(placed.len(), 2);
        placed.sort_by(|a, b| a.pos.x.total_cmp(&b.pos.x));
        let gap = (placed[1].pos.x - placed[1].shape.half_extents().x)
            - (placed[0].pos.x + placed[0].shape.half_extents().x);
        assert!(gap >= MIN_GAP, "gap {gap}");
    }

    #[test]
    fn test_obstacles_enter_off_screen_clear_of_the_dog() {
        let mut engine = playing(5);
        let dog = engine.game().dog.clone();
        for kind in [RunnerKind::Hurdle, RunnerKind::Cone, RunnerKind::Bird] {
            let id = engine.with_ctx(|game, ctx| game.spawn_obstacle(ctx, kind));
            let Some(e) = engine.entities().get(id) else {
                panic!("{kind:?} was not spawned");
            };
            assert!(e.pos.x - e.shape.half_extents().x >= WIDTH);
            assert!(!overlaps(dog.pos, dog.hitbox(), e.pos, e.shape, 4.0));
        }
    }

    #[test]
    fn test_double_jump_then_land() {
        let mut dog = Dog::default();
        assert!(dog.jump());
        assert!(dog.jump());
        assert!(!dog.jump());
        for _ in 0..200 {
            dog.update(crate::consts::SIM_DT, false);
        }
        assert!(dog.grounded);
        assert_eq!(dog.jumps_left, MAX_JUMPS);
        assert_eq!(dog.pos.y, GROUND_Y - DOG_SIZE.y / 2.0);
    }

    #[test]
    fn test_ducking_keeps_feet_on_ground() {
        let mut dog = Dog::default();
        dog.update(crate::consts::SIM_DT, true);
        assert!(dog.ducking);
        assert_eq!(dog.bottom(), GROUND_Y);
        assert_eq!(dog.hitbox(), Shape::rect(DOG_SIZE.x, DOG_DUCK_HEIGHT));
    }

    #[test]
    fn test_bird_hits_standing_dog_only() {
        let tolerance = 4.0;
        let bird_pos = Vec2::new(PLAYER_X, RunnerKind::Bird.lane_y());
        let bird = RunnerKind::Bird.shape();

        let standing = Dog::default();
        assert!(crate::engine::overlaps(
            standing.pos,
            standing.hitbox(),
            bird_pos,
            bird,
            tolerance
        ));

        let mut ducking = Dog::default();
        ducking.set_ducking(true);
        assert!(!crate::engine::overlaps(
            ducking.pos,
            ducking.hitbox(),
            bird_pos,
            bird,
            tolerance
        ));
    }

    #[test]
    fn test_ground_obstacles_sit_on_the_ground() {
        for kind in [RunnerKind::Hurdle, RunnerKind::Cone] {
            let bottom = kind.lane_y() + kind.shape().half_extents().y;
            assert_eq!(bottom, GROUND_Y);
        }
    }

    #[test]
    fn test_effect_names() {
        assert_eq!(RunnerEffect::Magnet.name(), "magnet");
        assert_eq!(RunnerEffect::Companion.name(), "companion");
    }
}
