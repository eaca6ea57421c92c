//! Entity registry: spawn, advance and cull of every simulated object
//!
//! Entities are generic over a per-game kind tag `K`. Iteration order is spawn
//! order, which keeps a seeded run reproducible.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{self, Shape};
use super::fx::Feedback;

/// Stable id of an entity within one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Resolution state. Leaves `Live` at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Live,
    /// Hazard contact (or cleared by a power-up)
    Hit,
    Collected,
    /// Good item that got away
    Missed,
}

/// Per-kind movement rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Constant velocity
    Linear,
    /// Velocity integrates a downward acceleration (pixels/s²)
    Falling { gravity: f32 },
    /// Falling, reflecting `vel.x` off the left/right bounds
    Bouncing { gravity: f32 },
    /// Linear, with a sideways sine sway around the spawn column
    Wobble { amplitude: f32, frequency: f32 },
}

/// Pulls homing entities toward a point (e.g. an active magnet power-up)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attractor {
    pub pos: Vec2,
    pub radius: f32,
    /// Acceleration toward `pos` (pixels/s²)
    pub strength: f32,
}

/// Playfield rectangle, origin at the top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether a shape at `pos` is entirely outside the bounds grown by `margin`
    pub fn is_outside(&self, pos: Vec2, half: Vec2, margin: f32) -> bool {
        pos.x + half.x < -margin
            || pos.x - half.x > self.width + margin
            || pos.y - half.y > self.height + margin
            // Tossed objects may fly well above the top edge and come back
            || pos.y + half.y < -margin - self.height
    }
}

/// A simulated object other than the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity<K> {
    pub id: EntityId,
    pub kind: K,
    pub pos: Vec2,
    pub vel: Vec2,
    pub shape: Shape,
    pub motion: Motion,
    /// Accelerates toward an active attractor
    pub homing: bool,
    /// Decorations are never collision-tested
    pub solid: bool,
    /// Remaining frames for ephemeral entities
    pub life: Option<u32>,
    /// Frames since spawn
    pub age: u32,
    /// Spawn column for wobble motion
    pub anchor_x: f32,
    pub status: Status,
    /// Frames left in the post-resolution fade
    pub fade_left: u32,
    pub fade_total: u32,
}

impl<K> Entity<K> {
    pub fn new(id: EntityId, kind: K, pos: Vec2, shape: Shape) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            shape,
            motion: Motion::Linear,
            homing: false,
            solid: true,
            life: None,
            age: 0,
            anchor_x: pos.x,
            status: Status::Live,
            fade_left: 0,
            fade_total: 0,
        }
    }

    pub fn is_live(&self) -> bool {
        self.status == Status::Live
    }

    /// Transition out of `Live`; returns false if already resolved
    pub fn resolve(&mut self, status: Status, fade_frames: u32) -> bool {
        if self.status != Status::Live || status == Status::Live {
            return false;
        }
        self.status = status;
        self.fade_left = fade_frames;
        self.fade_total = fade_frames;
        true
    }

    /// Render opacity (fades out after resolution)
    pub fn alpha(&self) -> f32 {
        if self.is_live() {
            1.0
        } else if self.fade_total == 0 {
            0.0
        } else {
            self.fade_left as f32 / self.fade_total as f32
        }
    }

    fn integrate(&mut self, dt: f32, bounds: Bounds, attractor: Option<Attractor>) {
        if self.homing && self.is_live() {
            if let Some(a) = attractor {
                let to = a.pos - self.pos;
                let dist = to.length();
                if dist > 1.0 && dist < a.radius {
                    self.vel += to / dist * a.strength * dt;
                }
            }
        }

        match self.motion {
            Motion::Linear => {
                self.pos += self.vel * dt;
            }
            Motion::Falling { gravity } => {
                self.vel.y += gravity * dt;
                self.pos += self.vel * dt;
            }
            Motion::Bouncing { gravity } => {
                self.vel.y += gravity * dt;
                self.pos += self.vel * dt;
                let half = self.shape.half_extents().x;
                if self.pos.x - half < 0.0 {
                    self.pos.x = half;
                    self.vel.x = self.vel.x.abs();
                } else if self.pos.x + half > bounds.width {
                    self.pos.x = bounds.width - half;
                    self.vel.x = -self.vel.x.abs();
                }
            }
            Motion::Wobble {
                amplitude,
                frequency,
            } => {
                self.anchor_x += self.vel.x * dt;
                self.pos.y += self.vel.y * dt;
                let t = self.age as f32 * crate::consts::SIM_DT;
                self.pos.x = self.anchor_x + amplitude * (t * frequency).sin();
            }
        }
    }
}

/// Time-based spawn cooldown (frames until the next spawn is allowed)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnTimer {
    pub frames_left: u32,
}

impl SpawnTimer {
    /// Count down one frame; true when ready to spawn
    pub fn tick(&mut self) -> bool {
        self.frames_left = self.frames_left.saturating_sub(1);
        self.frames_left == 0
    }

    pub fn reset(&mut self, frames: u32) {
        self.frames_left = frames.max(1);
    }
}

/// Owner of every live entity in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRegistry<K> {
    entities: Vec<Entity<K>>,
    next_id: u32,
    /// Particles, floating text, shake
    pub fx: Feedback,
}

impl<K> Default for EntityRegistry<K> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
            fx: Feedback::default(),
        }
    }
}

impl<K: Copy + PartialEq> EntityRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entity and reset ids (new session)
    pub fn clear(&mut self) {
        self.entities.clear();
        self.next_id = 1;
        self.fx.clear();
    }

    /// Remove gameplay entities but keep ids increasing (next round)
    pub fn clear_entities(&mut self) {
        self.entities.clear();
    }

    /// Append a new entity; `init` sets velocity, motion, flags
    pub fn spawn(
        &mut self,
        kind: K,
        pos: Vec2,
        shape: Shape,
        init: impl FnOnce(&mut Entity<K>),
    ) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        let mut entity = Entity::new(id, kind, pos, shape);
        init(&mut entity);
        self.entities.push(entity);
        id
    }

    /// Integrate positions and count down life/fade timers
    pub fn advance(&mut self, dt: f32, bounds: Bounds, attractor: Option<Attractor>) {
        for entity in self.entities.iter_mut() {
            entity.integrate(dt, bounds, attractor);
            entity.age += 1;
            if entity.is_live() {
                if let Some(life) = entity.life.as_mut() {
                    *life = life.saturating_sub(1);
                }
            } else {
                entity.fade_left = entity.fade_left.saturating_sub(1);
            }
        }
        self.fx.advance(dt);
    }

    /// Remove off-screen, expired and fully faded entities; returns the count removed
    pub fn cull(&mut self, bounds: Bounds, margin: f32) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| {
            let faded = !e.is_live() && e.fade_left == 0;
            let expired = e.life == Some(0);
            let gone = bounds.is_outside(e.pos, e.shape.half_extents(), margin);
            !(faded || expired || gone)
        });
        before - self.entities.len()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity<K>> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity<K>> {
        self.entities.iter_mut()
    }

    /// Live, solid entities (the only ones eligible for collision)
    pub fn live(&self) -> impl Iterator<Item = &Entity<K>> {
        self.entities.iter().filter(|e| e.is_live() && e.solid)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity<K>> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity<K>> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Set-once resolution by id; false if missing or already resolved
    pub fn resolve(&mut self, id: EntityId, status: Status, fade_frames: u32) -> bool {
        self.get_mut(id)
            .map(|e| e.resolve(status, fade_frames))
            .unwrap_or(false)
    }

    /// Ids of live solid entities overlapping the given hitbox
    pub fn overlapping(&self, pos: Vec2, shape: Shape, tolerance: f32) -> Vec<EntityId> {
        self.live()
            .filter(|e| collision::overlaps(pos, shape, e.pos, e.shape, tolerance))
            .map(|e| e.id)
            .collect()
    }

    /// Ids of live solid entities under a tap point
    pub fn under_point(&self, point: Vec2, tolerance: f32) -> Vec<EntityId> {
        self.live()
            .filter(|e| collision::contains_point(e.pos, e.shape, point, tolerance))
            .map(|e| e.id)
            .collect()
    }

    /// Horizontal distance from `spawn_x` back to the trailing edge of the
    /// nearest matching entity (infinite when none exist)
    pub fn clearance(&self, spawn_x: f32, matches: impl Fn(K) -> bool) -> f32 {
        self.entities
            .iter()
            .filter(|e| matches(e.kind))
            .map(|e| spawn_x - (e.pos.x + e.shape.half_extents().x))
            .fold(f32::INFINITY, f32::min)
    }
}
