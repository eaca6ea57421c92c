//! Score, combo, lives and miss bookkeeping
//!
//! `GameSession` holds the numbers; `Ctx` ties them to entities so every
//! scoring event resolves its entity first and fires at most once.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{EntityId, Status};
use super::game::Ctx;
use super::progression::EffectKind;
use super::render::Color;
use super::state::{GameEvent, GameSession};

/// Per-game scoring tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Combo needed per multiplier step
    pub combo_step: u32,
    pub multiplier_cap: u32,
    /// Frames of inactivity before the combo lapses (None = never)
    pub combo_window: Option<u32>,
    /// Combo that triggers frenzy (None = no frenzy)
    pub frenzy_threshold: Option<u32>,
    pub frenzy_frames: u32,
    /// Points factor while frenzy is active
    pub frenzy_factor: u32,
    /// Every Nth miss costs a life (None = misses only break the combo)
    pub miss_tolerance: Option<u32>,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            combo_step: 3,
            multiplier_cap: 5,
            combo_window: None,
            frenzy_threshold: None,
            frenzy_frames: 0,
            frenzy_factor: 2,
            miss_tolerance: None,
        }
    }
}

/// Result of a scoring action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Award {
    pub points: u64,
    /// Multiplier applied to this pickup
    pub multiplier: u32,
    pub combo: u32,
    pub frenzy_started: bool,
}

/// Result of a hazard contact or a miss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardOutcome {
    /// Invincible; nothing happened
    Ignored,
    /// Counted against the miss tolerance without costing a life
    Tolerated,
    LifeLost { lives_left: u32 },
    /// Last life gone
    Fatal,
}

impl GameSession {
    /// Current combo multiplier: `min(cap, 1 + combo / step)`
    pub fn multiplier(&self, rules: &ScoringRules) -> u32 {
        (1 + self.combo / rules.combo_step.max(1)).min(rules.multiplier_cap.max(1))
    }

    /// Score a beneficial contact worth `base` points
    ///
    /// The multiplier is taken before this pickup's combo increment.
    pub fn award(&mut self, base: u64, rules: &ScoringRules) -> Award {
        let multiplier = self.multiplier(rules);
        let mut points = base * multiplier as u64;
        if self.is_frenzy() {
            points *= rules.frenzy_factor.max(1) as u64;
        }
        self.score += points;
        self.combo += 1;
        self.best_combo = self.best_combo.max(self.combo);
        if let Some(window) = rules.combo_window {
            self.combo_timer = window;
        }

        let frenzy_started = rules.frenzy_threshold == Some(self.combo) && rules.frenzy_frames > 0;
        if frenzy_started {
            self.frenzy_frames = rules.frenzy_frames;
        }

        Award {
            points,
            multiplier,
            combo: self.combo,
            frenzy_started,
        }
    }

    /// Drop the combo; returns true if there was one to lose
    pub fn break_combo(&mut self) -> bool {
        let had = self.combo > 0;
        self.combo = 0;
        self.combo_timer = 0;
        had
    }

    fn lose_life(&mut self, invincible_frames: u32) -> HazardOutcome {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            HazardOutcome::Fatal
        } else {
            self.invincible_frames = invincible_frames;
            HazardOutcome::LifeLost {
                lives_left: self.lives,
            }
        }
    }

    /// Hazard contact: costs a life and the combo unless invincible
    pub fn hazard(&mut self, invincible_frames: u32) -> HazardOutcome {
        if self.is_invincible() {
            return HazardOutcome::Ignored;
        }
        self.break_combo();
        self.lose_life(invincible_frames)
    }

    /// A good item got away
    pub fn miss(&mut self, rules: &ScoringRules, invincible_frames: u32) -> HazardOutcome {
        self.break_combo();
        self.misses += 1;
        match rules.miss_tolerance {
            Some(every) if self.misses % every.max(1) == 0 => self.lose_life(invincible_frames),
            _ => HazardOutcome::Tolerated,
        }
    }

    /// Penalty hazard: subtracts points (never below zero) and the combo
    pub fn penalize(&mut self, points: u64) -> u64 {
        let taken = points.min(self.score);
        self.score -= taken;
        self.break_combo();
        taken
    }
}

const SCORE_TEXT_FRAMES: u32 = 45;

impl<K: Copy + PartialEq, E: EffectKind> Ctx<'_, K, E> {
    fn entity_pos(&self, id: EntityId) -> Option<Vec2> {
        self.entities.get(id).map(|e| e.pos)
    }

    /// Collect a live entity worth `base` points; None if already resolved
    pub fn collect(&mut self, id: EntityId, base: u64, color: Color) -> Option<Award> {
        let pos = self.entity_pos(id)?;
        if !self.entities.resolve(id, Status::Collected, self.rules.fade_frames) {
            return None;
        }
        Some(self.score_at(pos, base, color))
    }

    /// Score a beneficial action that has no entity behind it
    pub fn score_at(&mut self, pos: Vec2, base: u64, color: Color) -> Award {
        let award = self.session.award(base, &self.rules.scoring);
        self.entities.fx.burst(&mut *self.rng, pos, 8, color);
        self.entities
            .fx
            .float_text(format!("+{}", award.points), pos, color, SCORE_TEXT_FRAMES);
        self.events.push(GameEvent::Scored {
            points: award.points,
            combo: award.combo,
        });
        if award.frenzy_started {
            log::debug!("Frenzy at combo {}", award.combo);
            self.entities.fx.add_flash(0.4);
            self.entities
                .fx
                .float_text("Frenzy!", pos - Vec2::Y * 24.0, Color::GOLD, 60);
            self.events.push(GameEvent::FrenzyStarted);
        }
        award
    }

    /// Hazard contact with a live entity
    pub fn hazard(&mut self, id: EntityId) -> Option<HazardOutcome> {
        let pos = self.entity_pos(id)?;
        if self.session.is_invincible() {
            return Some(HazardOutcome::Ignored);
        }
        if !self.entities.resolve(id, Status::Hit, self.rules.fade_frames) {
            return None;
        }
        Some(self.hazard_at(pos))
    }

    /// Hazard contact at a point (falls, walls)
    pub fn hazard_at(&mut self, pos: Vec2) -> HazardOutcome {
        let had_combo = self.session.combo > 0;
        let outcome = self.session.hazard(self.rules.invincible_frames);
        if outcome == HazardOutcome::Ignored {
            return outcome;
        }
        if had_combo {
            self.events.push(GameEvent::ComboBroken);
        }
        self.entities.fx.add_shake(0.6);
        self.entities.fx.add_flash(0.3);
        self.entities.fx.burst(&mut *self.rng, pos, 16, Color::RED);
        self.push_life_event(outcome);
        outcome
    }

    /// A good entity got away
    pub fn miss(&mut self, id: EntityId) -> Option<HazardOutcome> {
        let pos = self.entity_pos(id)?;
        if !self.entities.resolve(id, Status::Missed, self.rules.fade_frames) {
            return None;
        }
        let had_combo = self.session.combo > 0;
        let outcome = self
            .session
            .miss(&self.rules.scoring, self.rules.invincible_frames);
        if had_combo {
            self.events.push(GameEvent::ComboBroken);
        }
        match outcome {
            HazardOutcome::Tolerated => {
                self.events.push(GameEvent::Missed {
                    misses: self.session.misses,
                });
            }
            _ => {
                self.entities.fx.add_shake(0.3);
                self.push_life_event(outcome);
            }
        }
        self.entities.fx.float_text("Miss", pos, Color::GREY, SCORE_TEXT_FRAMES);
        Some(outcome)
    }

    /// Penalty entity: costs `points` and the combo; None if already resolved
    pub fn penalty(&mut self, id: EntityId, points: u64) -> Option<u64> {
        let pos = self.entity_pos(id)?;
        if !self.entities.resolve(id, Status::Hit, self.rules.fade_frames) {
            return None;
        }
        let had_combo = self.session.combo > 0;
        let taken = self.session.penalize(points);
        if had_combo {
            self.events.push(GameEvent::ComboBroken);
        }
        self.entities.fx.add_shake(0.4);
        self.entities.fx.burst(&mut *self.rng, pos, 12, Color::RED);
        self.entities
            .fx
            .float_text(format!("-{}", points), pos, Color::RED, SCORE_TEXT_FRAMES);
        self.events.push(GameEvent::Penalty { points: taken });
        Some(taken)
    }

    /// Remove an obstacle without scoring it (cleared by a power-up)
    pub fn destroy(&mut self, id: EntityId, color: Color) -> bool {
        let Some(pos) = self.entity_pos(id) else {
            return false;
        };
        if !self.entities.resolve(id, Status::Hit, self.rules.fade_frames) {
            return false;
        }
        self.entities.fx.burst(&mut *self.rng, pos, 10, color);
        true
    }

    /// Break the combo without any other cost (mistimed press)
    pub fn break_combo(&mut self) {
        if self.session.break_combo() {
            self.events.push(GameEvent::ComboBroken);
        }
    }

    /// Start or refresh a timed effect for `frames`
    pub fn activate(&mut self, effect: E, frames: u32) {
        let refreshed = self.effects.is_active(effect, self.session.frame);
        self.effects.activate(effect, self.session.frame, frames);
        if !refreshed {
            log::debug!("Effect {} started for {} frames", effect.name(), frames);
            self.events.push(GameEvent::EffectStarted {
                effect: effect.name(),
            });
        }
    }

    pub fn is_active(&self, effect: E) -> bool {
        self.effects.is_active(effect, self.session.frame)
    }

    /// Report a crossed milestone once
    pub fn milestone(&mut self, index: usize, label: impl Into<String>) {
        log::debug!("Milestone {} reached", index);
        let at = glam::Vec2::new(self.session.width / 2.0, self.session.height / 3.0);
        self.entities.fx.float_text(label, at, Color::GOLD, 90);
        self.entities.fx.add_flash(0.25);
        self.events.push(GameEvent::Milestone { index });
    }

    fn push_life_event(&mut self, outcome: HazardOutcome) {
        match outcome {
            HazardOutcome::LifeLost { lives_left } => {
                self.events.push(GameEvent::LifeLost { lives_left })
            }
            HazardOutcome::Fatal => self.events.push(GameEvent::LifeLost { lives_left: 0 }),
            HazardOutcome::Ignored | HazardOutcome::Tolerated => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::game::GameRules;
    use proptest::prelude::*;

    fn session(lives: u32) -> GameSession {
        let rules = GameRules {
            lives,
            ..GameRules::default()
        };
        GameSession::new(&rules, 1, 0)
    }

    #[test]
    fn test_multiplier_applies_before_increment() {
        let rules = ScoringRules::default();
        let mut s = session(3);
        let sequence: Vec<u32> = (0..7).map(|_| s.award(10, &rules).multiplier).collect();
        assert_eq!(sequence, vec![1, 1, 1, 2, 2, 2, 3]);
        assert_eq!(s.combo, 7);
        assert_eq!(s.score, 10 * (1 + 1 + 1 + 2 + 2 + 2 + 3));
    }

    #[test]
    fn test_multiplier_is_capped() {
        let rules = ScoringRules {
            multiplier_cap: 2,
            ..ScoringRules::default()
        };
        let mut s = session(3);
        s.combo = 100;
        assert_eq!(s.multiplier(&rules), 2);
    }

    #[test]
    fn test_frenzy_triggers_at_threshold_and_doubles() {
        let rules = ScoringRules {
            frenzy_threshold: Some(2),
            frenzy_frames: 100,
            combo_step: 100,
            ..ScoringRules::default()
        };
        let mut s = session(3);
        assert!(!s.award(10, &rules).frenzy_started);
        assert!(s.award(10, &rules).frenzy_started);
        assert!(s.is_frenzy());
        assert_eq!(s.award(10, &rules).points, 20);
    }

    #[test]
    fn test_hazard_costs_life_and_combo() {
        let mut s = session(2);
        s.combo = 5;
        assert_eq!(s.hazard(30), HazardOutcome::LifeLost { lives_left: 1 });
        assert_eq!(s.combo, 0);
        // Still invincible
        assert_eq!(s.hazard(30), HazardOutcome::Ignored);
        s.invincible_frames = 0;
        assert_eq!(s.hazard(30), HazardOutcome::Fatal);
        assert_eq!(s.lives, 0);
    }

    #[test]
    fn test_every_third_miss_costs_a_life() {
        let rules = ScoringRules {
            miss_tolerance: Some(3),
            ..ScoringRules::default()
        };
        let mut s = session(3);
        assert_eq!(s.miss(&rules, 0), HazardOutcome::Tolerated);
        assert_eq!(s.miss(&rules, 0), HazardOutcome::Tolerated);
        assert_eq!(s.miss(&rules, 0), HazardOutcome::LifeLost { lives_left: 2 });
        assert_eq!(s.miss(&rules, 0), HazardOutcome::Tolerated);
    }

    #[test]
    fn test_misses_without_tolerance_are_free() {
        let rules = ScoringRules::default();
        let mut s = session(1);
        for _ in 0..10 {
            assert_eq!(s.miss(&rules, 0), HazardOutcome::Tolerated);
        }
        assert_eq!(s.lives, 1);
    }

    #[test]
    fn test_penalty_floors_at_zero() {
        let mut s = session(3);
        s.score = 20;
        s.combo = 4;
        assert_eq!(s.penalize(30), 20);
        assert_eq!(s.score, 0);
        assert_eq!(s.combo, 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Award(u64),
        Hazard,
        Miss,
        Idle,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u64..100).prop_map(Op::Award),
            Just(Op::Hazard),
            Just(Op::Miss),
            Just(Op::Idle),
        ]
    }

    proptest! {
        #[test]
        fn prop_score_never_decreases_without_penalty(ops in proptest::collection::vec(op(), 1..200)) {
            let rules = ScoringRules {
                frenzy_threshold: Some(4),
                frenzy_frames: 30,
                miss_tolerance: Some(3),
                ..ScoringRules::default()
            };
            let mut s = session(1000);
            let mut last = s.score;
            for op in ops {
                match op {
                    Op::Award(base) => { s.award(base, &rules); }
                    Op::Hazard => { s.hazard(0); }
                    Op::Miss => { s.miss(&rules, 0); }
                    Op::Idle => { s.frenzy_frames = s.frenzy_frames.saturating_sub(1); }
                }
                prop_assert!(s.score >= last);
                last = s.score;
            }
        }

        #[test]
        fn prop_multiplier_within_bounds(combo in 0u32..10_000, step in 1u32..10, cap in 1u32..10) {
            let rules = ScoringRules { combo_step: step, multiplier_cap: cap, ..ScoringRules::default() };
            let mut s = session(3);
            s.combo = combo;
            let m = s.multiplier(&rules);
            prop_assert!(m >= 1 && m <= cap);
        }
    }
}
