//! Difficulty and progression: curves, weighted kind tables, milestones and
//! timed power-up effects
//!
//! All curves are data; each game supplies its own numbers.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// What drives the difficulty level of a game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LevelBasis {
    /// One level per this many points
    Score { per_level: u64 },
    /// One level per this many seconds of play
    Time { secs_per_level: f32 },
}

impl LevelBasis {
    /// Continuous difficulty level (0 at session start)
    pub fn level(&self, score: u64, elapsed_secs: f32) -> f32 {
        match *self {
            LevelBasis::Score { per_level } => score as f32 / per_level.max(1) as f32,
            LevelBasis::Time { secs_per_level } => elapsed_secs / secs_per_level.max(0.001),
        }
    }
}

/// Maps a difficulty level to spawn interval and speed multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyCurve {
    /// Spawn interval at level 0 (frames)
    pub base_interval: f32,
    /// Frames removed per level
    pub interval_step: f32,
    /// Interval floor (frames)
    pub min_interval: f32,
    /// Speed multiplier gained per level
    pub speed_step: f32,
    /// Speed multiplier cap
    pub max_speed: f32,
}

impl DifficultyCurve {
    /// Spawn interval in frames: decreasing in level, clamped to the floor
    pub fn spawn_interval(&self, level: f32) -> u32 {
        let frames = (self.base_interval - self.interval_step * level.max(0.0)).max(self.min_interval);
        frames.round().max(1.0) as u32
    }

    /// Entity speed multiplier: increasing in level, clamped to the cap
    pub fn speed_multiplier(&self, level: f32) -> f32 {
        (1.0 + self.speed_step * level.max(0.0)).min(self.max_speed)
    }
}

/// One row of a weighted kind table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindWeight<K> {
    pub kind: K,
    /// Weight at level 0
    pub base: f32,
    /// Weight change per level (positive for harder kinds)
    pub per_level: f32,
    /// Upper clamp
    pub max: f32,
}

/// Probability table over entity kinds that shifts with difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindWeights<K> {
    rows: Vec<KindWeight<K>>,
}

impl<K: Copy> KindWeights<K> {
    pub fn new(rows: Vec<KindWeight<K>>) -> Self {
        Self { rows }
    }

    /// Convenience row builder: `(kind, base, per_level, max)`
    pub fn from_rows(rows: &[(K, f32, f32, f32)]) -> Self {
        Self::new(
            rows.iter()
                .map(|&(kind, base, per_level, max)| KindWeight {
                    kind,
                    base,
                    per_level,
                    max,
                })
                .collect(),
        )
    }

    /// Normalized probabilities at `level`; clamped weights summing to 1
    pub fn probabilities(&self, level: f32) -> Vec<(K, f32)> {
        let weights: Vec<(K, f32)> = self
            .rows
            .iter()
            .map(|r| (r.kind, (r.base + r.per_level * level.max(0.0)).clamp(0.0, r.max)))
            .collect();
        let total: f32 = weights.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            let uniform = 1.0 / weights.len().max(1) as f32;
            return weights.into_iter().map(|(k, _)| (k, uniform)).collect();
        }
        weights.into_iter().map(|(k, w)| (k, w / total)).collect()
    }

    /// Weighted pick at `level`
    pub fn pick<R: Rng>(&self, level: f32, rng: &mut R) -> Option<K> {
        let probs = self.probabilities(level);
        let roll: f32 = rng.random();
        let mut acc = 0.0;
        for &(kind, p) in &probs {
            acc += p;
            if roll < acc {
                return Some(kind);
            }
        }
        // Float rounding can leave the last sliver unclaimed
        probs.last().map(|&(k, _)| k)
    }
}

/// Cumulative thresholds that fire once each (belts, waves, rounds)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestones {
    thresholds: Vec<u64>,
    reached: usize,
}

impl Milestones {
    /// Thresholds must be ascending
    pub fn new(thresholds: Vec<u64>) -> Self {
        debug_assert!(thresholds.windows(2).all(|w| w[0] < w[1]));
        Self {
            thresholds,
            reached: 0,
        }
    }

    /// Evenly spaced thresholds: `step, 2*step, ...` (count of them)
    pub fn every(step: u64, count: usize) -> Self {
        Self::new((1..=count as u64).map(|i| i * step).collect())
    }

    /// Feed the current value; returns the index of each newly crossed
    /// milestone (more than one if a big jump crossed several)
    pub fn update(&mut self, value: u64) -> Vec<usize> {
        let mut crossed = Vec::new();
        while self.reached < self.thresholds.len() && value >= self.thresholds[self.reached] {
            crossed.push(self.reached);
            self.reached += 1;
        }
        crossed
    }
}

/// A game's power-up tag, usable as a `TimedEffects` key
pub trait EffectKind: Copy + Ord + fmt::Debug {
    /// Stable name for events and logs
    fn name(self) -> &'static str;
}

/// Named timed effects keyed by expiry frame
///
/// Re-activating an effect refreshes its expiry; magnitudes never stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEffects<E: Ord> {
    expiry: BTreeMap<E, u64>,
}

impl<E: Ord> Default for TimedEffects<E> {
    fn default() -> Self {
        Self {
            expiry: BTreeMap::new(),
        }
    }
}

impl<E: Ord + Copy> TimedEffects<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active from `now` for `duration` frames
    pub fn activate(&mut self, effect: E, now: u64, duration: u32) {
        self.expiry.insert(effect, now + duration as u64);
    }

    pub fn is_active(&self, effect: E, now: u64) -> bool {
        self.expiry.get(&effect).is_some_and(|&end| now < end)
    }

    /// Frames left (0 when inactive)
    pub fn remaining(&self, effect: E, now: u64) -> u32 {
        self.expiry
            .get(&effect)
            .map(|&end| end.saturating_sub(now) as u32)
            .unwrap_or(0)
    }

    /// Remove effects whose expiry has passed; returns them once
    pub fn expire(&mut self, now: u64) -> Vec<E> {
        let ended: Vec<E> = self
            .expiry
            .iter()
            .filter(|&(_, &end)| now >= end)
            .map(|(&e, _)| e)
            .collect();
        for e in &ended {
            self.expiry.remove(e);
        }
        ended
    }

    pub fn active(&self, now: u64) -> impl Iterator<Item = E> + '_ {
        self.expiry
            .iter()
            .filter(move |&(_, &end)| now < end)
            .map(|(&e, _)| e)
    }

    pub fn clear(&mut self) {
        self.expiry.clear();
    }
}
