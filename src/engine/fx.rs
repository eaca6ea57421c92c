//! Visual feedback entities: particles, floating text, shake and flash
//!
//! Purely cosmetic; nothing here feeds back into scoring or collisions.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::render::Color;
use crate::settings::Settings;

/// A particle for bursts and sparkles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}

/// Score popups and callouts ("+20", "Frenzy!")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingText {
    pub text: String,
    pub pos: Vec2,
    pub color: Color,
    pub frames_left: u32,
    pub total_frames: u32,
}

impl FloatingText {
    pub fn alpha(&self) -> f32 {
        self.frames_left as f32 / self.total_frames.max(1) as f32
    }
}

/// Default particle cap when no settings are applied
pub const MAX_PARTICLES: usize = 256;

/// Particle gravity (pixels/s²)
const PARTICLE_GRAVITY: f32 = 400.0;

/// Rise speed of floating text (pixels/s)
const TEXT_RISE: f32 = 40.0;

/// Cosmetic feedback owned by the entity registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub particles: Vec<Particle>,
    pub texts: Vec<FloatingText>,
    /// Screen shake intensity (0-1)
    pub shake: f32,
    /// Full-screen flash intensity (0-1)
    pub flash: f32,
    max_particles: usize,
    shake_enabled: bool,
    flash_enabled: bool,
}

impl Default for Feedback {
    fn default() -> Self {
        Self {
            particles: Vec::new(),
            texts: Vec::new(),
            shake: 0.0,
            flash: 0.0,
            max_particles: MAX_PARTICLES,
            shake_enabled: true,
            flash_enabled: true,
        }
    }
}

impl Feedback {
    /// Apply player preferences (particle cap, reduced motion)
    pub fn configure(&mut self, settings: &Settings) {
        self.max_particles = settings.max_particles();
        self.shake_enabled = settings.effective_screen_shake();
        self.flash_enabled = settings.effective_flash();
        self.particles.truncate(self.max_particles);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.texts.clear();
        self.shake = 0.0;
        self.flash = 0.0;
    }

    /// Radial burst of particles at a contact point
    pub fn burst<R: Rng>(&mut self, rng: &mut R, at: Vec2, count: usize, color: Color) {
        if self.max_particles == 0 {
            return;
        }
        for _ in 0..count {
            if self.particles.len() >= self.max_particles {
                // Remove oldest particles to make room
                self.particles.remove(0);
            }
            let angle: f32 = rng.random_range(0.0..std::f32::consts::TAU);
            let speed: f32 = rng.random_range(60.0..220.0);
            self.particles.push(Particle {
                pos: at,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                color,
                life: 1.0,
                size: rng.random_range(2.0..5.0),
            });
        }
    }

    pub fn float_text(&mut self, text: impl Into<String>, at: Vec2, color: Color, frames: u32) {
        self.texts.push(FloatingText {
            text: text.into(),
            pos: at,
            color,
            frames_left: frames,
            total_frames: frames,
        });
    }

    pub fn add_shake(&mut self, amount: f32) {
        if self.shake_enabled {
            self.shake = (self.shake + amount).min(1.0);
        }
    }

    pub fn add_flash(&mut self, amount: f32) {
        if self.flash_enabled {
            self.flash = (self.flash + amount).min(1.0);
        }
    }

    /// Advance particles and texts, decay shake/flash, drop dead effects
    pub fn advance(&mut self, dt: f32) {
        for particle in self.particles.iter_mut() {
            particle.pos += particle.vel * dt;
            particle.vel.y += PARTICLE_GRAVITY * dt;
            // Drag
            particle.vel *= 0.98;
            // ~0.6 second lifetime
            particle.life -= dt * 1.6;
            particle.size *= 0.99;
        }
        self.particles.retain(|p| p.life > 0.0);

        for text in self.texts.iter_mut() {
            text.pos.y -= TEXT_RISE * dt;
            text.frames_left = text.frames_left.saturating_sub(1);
        }
        self.texts.retain(|t| t.frames_left > 0);

        self.shake *= 0.9;
        if self.shake < 0.01 {
            self.shake = 0.0;
        }
        self.flash *= 0.9;
        if self.flash < 0.01 {
            self.flash = 0.0;
        }
    }

    /// Camera offset for the current shake (deterministic per frame)
    pub fn shake_offset(&self, frame: u64) -> Vec2 {
        if self.shake <= 0.0 {
            return Vec2::ZERO;
        }
        let t = frame as f32;
        let magnitude = self.shake * 8.0;
        Vec2::new((t * 1.7).sin(), (t * 2.3).cos()) * magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_burst_respects_particle_cap() {
        let mut fx = Feedback::default();
        let mut settings = Settings::default();
        settings.quality = crate::settings::QualityPreset::Low;
        fx.configure(&settings);

        let mut rng = Pcg32::seed_from_u64(7);
        fx.burst(&mut rng, Vec2::ZERO, 500, Color::WHITE);
        assert_eq!(fx.particles.len(), settings.max_particles());
    }

    #[test]
    fn test_particles_disabled_spawns_nothing() {
        let mut fx = Feedback::default();
        let settings = Settings {
            particles: false,
            ..Settings::default()
        };
        fx.configure(&settings);
        let mut rng = Pcg32::seed_from_u64(7);
        fx.burst(&mut rng, Vec2::ZERO, 10, Color::WHITE);
        assert!(fx.particles.is_empty());
    }

    #[test]
    fn test_reduced_motion_suppresses_shake() {
        let mut fx = Feedback::default();
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        fx.configure(&settings);
        fx.add_shake(0.5);
        assert_eq!(fx.shake, 0.0);
        assert_eq!(fx.shake_offset(10), Vec2::ZERO);
    }

    #[test]
    fn test_effects_expire() {
        let mut fx = Feedback::default();
        let mut rng = Pcg32::seed_from_u64(1);
        fx.burst(&mut rng, Vec2::ZERO, 5, Color::WHITE);
        fx.float_text("+10", Vec2::ZERO, Color::WHITE, 3);
        fx.add_shake(1.0);

        for _ in 0..60 {
            fx.advance(crate::consts::SIM_DT);
        }
        assert!(fx.particles.is_empty());
        assert!(fx.texts.is_empty());
        assert_eq!(fx.shake, 0.0);
    }
}
