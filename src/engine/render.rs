//! Render pipeline: fixed z-order painting onto a 2D surface
//!
//! Rendering only reads engine state. Order per paint:
//! background → entities → particles → player → overlays → HUD.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::game::{Engine, Game};
use super::progression::{EffectKind, TimedEffects};
use super::state::{GamePhase, GameSession};
use crate::store::ScoreStore;

/// RGBA color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const GREY: Color = Color::rgb(150, 150, 160);
    pub const RED: Color = Color::rgb(230, 70, 80);
    pub const GOLD: Color = Color::rgb(245, 200, 70);
    pub const BLUSH: Color = Color::rgb(246, 196, 206);
    pub const SAGE: Color = Color::rgb(156, 183, 150);
    pub const CREAM: Color = Color::rgb(252, 246, 235);
    pub const SKY: Color = Color::rgb(190, 225, 245);
    pub const INK: Color = Color::rgb(60, 50, 70);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with alpha scaled by `alpha` (0-1)
    pub fn fade(self, alpha: f32) -> Self {
        Self {
            a: (self.a as f32 * alpha.clamp(0.0, 1.0)).round() as u8,
            ..self
        }
    }

    /// CSS color string for canvas fill styles
    pub fn to_css(self) -> String {
        format!(
            "rgba({}, {}, {}, {:.3})",
            self.r,
            self.g,
            self.b,
            self.a as f32 / 255.0
        )
    }
}

/// Paint layers, in back-to-front order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Background,
    Entities,
    Particles,
    Player,
    Overlay,
    Hud,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// 2D raster target
pub trait Surface {
    fn size(&self) -> Vec2;
    fn clear(&mut self, color: Color);
    /// Axis-aligned rectangle from its top-left corner
    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn text(&mut self, text: &str, pos: Vec2, size: f32, color: Color, align: TextAlign);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    /// Global alpha for subsequent draws until `restore`
    fn set_alpha(&mut self, alpha: f32);
    /// Marks the start of a layer (debug and test hook)
    fn begin_layer(&mut self, _layer: Layer) {}
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Layer(Layer),
    Clear(Color),
    Rect { pos: Vec2, size: Vec2, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
    Text { text: String, pos: Vec2 },
    Save,
    Restore,
    Translate(Vec2),
    Alpha(f32),
}

/// Surface that records the draw calls of the latest frame instead of painting
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub size: Vec2,
    pub commands: Vec<DrawCmd>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::new(),
        }
    }

    /// Layers in the order they were begun
    pub fn layers(&self) -> Vec<Layer> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Layer(l) => Some(*l),
                _ => None,
            })
            .collect()
    }

    /// Every text drawn, in order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCmd::Clear(color));
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCmd::Rect { pos, size, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCmd::Circle {
            center,
            radius,
            color,
        });
    }

    fn text(&mut self, text: &str, pos: Vec2, _size: f32, _color: Color, _align: TextAlign) {
        self.commands.push(DrawCmd::Text {
            text: text.to_string(),
            pos,
        });
    }

    fn save(&mut self) {
        self.commands.push(DrawCmd::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCmd::Restore);
    }

    fn translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCmd::Translate(offset));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCmd::Alpha(alpha));
    }

    fn begin_layer(&mut self, layer: Layer) {
        // A background layer starts a new frame
        if layer == Layer::Background {
            self.commands.clear();
        }
        self.commands.push(DrawCmd::Layer(layer));
    }
}

/// Paint one frame of the engine's current state
pub fn render_frame<G: Game, S: ScoreStore>(surface: &mut dyn Surface, engine: &Engine<G, S>) {
    let session = engine.session();
    let game = engine.game();
    let fx = &engine.entities().fx;

    surface.begin_layer(Layer::Background);
    surface.save();
    surface.translate(fx.shake_offset(session.frame));
    game.draw_background(surface, session);

    surface.begin_layer(Layer::Entities);
    for entity in engine.entities().iter() {
        surface.save();
        surface.set_alpha(entity.alpha());
        game.draw_entity(surface, entity);
        surface.restore();
    }

    surface.begin_layer(Layer::Particles);
    for p in &fx.particles {
        surface.fill_circle(p.pos, p.size, p.color.fade(p.life));
    }
    for t in &fx.texts {
        surface.text(&t.text, t.pos, 18.0, t.color.fade(t.alpha()), TextAlign::Center);
    }

    surface.begin_layer(Layer::Player);
    game.draw_player(surface, session);

    surface.begin_layer(Layer::Overlay);
    game.draw_overlay(surface, session);
    surface.restore();

    if fx.flash > 0.0 {
        let size = surface.size();
        surface.fill_rect(Vec2::ZERO, size, Color::WHITE.fade(fx.flash * 0.6));
    }

    surface.begin_layer(Layer::Hud);
    draw_hud(surface, session, engine.settings().show_best);
    draw_effect_timers(surface, session, engine.effects());
    draw_banner(surface, session, game.title(), engine.can_restart());
}

fn draw_hud(surface: &mut dyn Surface, session: &GameSession, show_best: bool) {
    if session.phase == GamePhase::Start {
        return;
    }
    let width = surface.size().x;
    surface.text(
        &format!("Score {}", session.score),
        Vec2::new(16.0, 28.0),
        20.0,
        Color::INK,
        TextAlign::Left,
    );
    if show_best {
        surface.text(
            &format!("Best {}", session.best.max(session.score)),
            Vec2::new(16.0, 52.0),
            14.0,
            Color::INK,
            TextAlign::Left,
        );
    }
    // Timed games show the clock instead of hearts
    let lives = if session.time_left.is_some() { 0 } else { session.lives };
    for i in 0..lives {
        surface.fill_circle(
            Vec2::new(width - 20.0 - i as f32 * 22.0, 24.0),
            8.0,
            Color::RED,
        );
    }
    if session.combo >= 2 {
        let label = if session.is_frenzy() {
            format!("FRENZY x{}", session.combo)
        } else {
            format!("Combo x{}", session.combo)
        };
        surface.text(&label, Vec2::new(width / 2.0, 28.0), 18.0, Color::GOLD, TextAlign::Center);
    }
    if let Some(secs) = session.secs_left() {
        surface.text(
            &format!("{}s", secs),
            Vec2::new(width / 2.0, 52.0),
            16.0,
            Color::INK,
            TextAlign::Center,
        );
    }
}

/// Active power-ups with whole seconds left, top right
fn draw_effect_timers<E: EffectKind>(
    surface: &mut dyn Surface,
    session: &GameSession,
    effects: &TimedEffects<E>,
) {
    if session.phase != GamePhase::Playing {
        return;
    }
    let x = surface.size().x - 16.0;
    for (row, effect) in effects.active(session.frame).enumerate() {
        let secs = effects
            .remaining(effect, session.frame)
            .div_ceil(crate::consts::FRAMES_PER_SECOND);
        surface.text(
            &format!("{} {}s", effect.name(), secs),
            Vec2::new(x, 28.0 + row as f32 * 18.0),
            14.0,
            Color::INK,
            TextAlign::Right,
        );
    }
}

pub const RESTART_HINT: &str = "Tap or press Enter to play again";

fn draw_banner(surface: &mut dyn Surface, session: &GameSession, title: &str, can_restart: bool) {
    let size = surface.size();
    let center = size / 2.0;
    let (heading, sub) = match session.phase {
        GamePhase::Start => (title.to_string(), "Tap or press Space to start".to_string()),
        GamePhase::Paused => ("Paused".to_string(), "Press Esc to resume".to_string()),
        GamePhase::RoundResult => (
            format!("Round {} complete!", session.round),
            format!("Score {}", session.score),
        ),
        GamePhase::Celebration => ("Just married!".to_string(), format!("Score {}", session.score)),
        GamePhase::GameOver => {
            let sub = if session.score > session.best {
                format!("New best: {}!", session.score)
            } else {
                format!("Score {}  Best {}", session.score, session.best)
            };
            ("Game Over".to_string(), sub)
        }
        GamePhase::Playing => return,
    };
    surface.fill_rect(Vec2::ZERO, size, Color::CREAM.fade(0.7));
    surface.text(&heading, center - Vec2::Y * 16.0, 32.0, Color::INK, TextAlign::Center);
    surface.text(&sub, center + Vec2::Y * 20.0, 16.0, Color::INK, TextAlign::Center);
    if session.phase == GamePhase::GameOver && can_restart {
        surface.text(
            RESTART_HINT,
            center + Vec2::Y * 48.0,
            14.0,
            Color::INK,
            TextAlign::Center,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_color() {
        assert_eq!(Color::WHITE.to_css(), "rgba(255, 255, 255, 1.000)");
        assert_eq!(Color::BLACK.fade(0.5).a, 128);
        assert_eq!(Color::BLACK.fade(2.0).a, 255);
    }

    #[test]
    fn test_recording_surface_tracks_layers() {
        let mut s = RecordingSurface::new(100.0, 100.0);
        s.begin_layer(Layer::Background);
        s.fill_rect(Vec2::ZERO, Vec2::ONE, Color::SKY);
        s.begin_layer(Layer::Hud);
        s.text("hi", Vec2::ZERO, 12.0, Color::INK, TextAlign::Left);
        assert_eq!(s.layers(), vec![Layer::Background, Layer::Hud]);
        assert_eq!(s.texts(), vec!["hi"]);
    }
}
