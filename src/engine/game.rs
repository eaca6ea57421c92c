//! Engine core: the `Game` strategy trait and the `Engine` that drives it
//!
//! A game supplies data (rules) and hooks (step, spawn, collide, draw); the
//! engine owns the session, entities, effects and RNG and runs the phase
//! machine. One `tick` is one fixed simulation step.

use std::fmt;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Attractor, Bounds, Entity, EntityRegistry};
use super::input::TickInput;
use super::progression::{EffectKind, LevelBasis, TimedEffects};
use super::render::Surface;
use super::scoring::ScoringRules;
use super::state::{Flow, GameEvent, GamePhase, GameSession};
use crate::consts::SIM_DT;
use crate::settings::Settings;
use crate::store::ScoreStore;

/// Per-game tuning data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameRules {
    /// Playfield size in pixels
    pub width: f32,
    pub height: f32,
    /// Lives at session start (1 = instant fail)
    pub lives: u32,
    /// Hitbox inset in pixels (negative widens)
    pub tolerance: f32,
    /// How far past the edges entities survive before culling
    pub cull_margin: f32,
    /// Whether the pause intent is honoured
    pub pausable: bool,
    /// Frames a resolved entity stays visible
    pub fade_frames: u32,
    /// Session countdown in frames
    pub time_limit: Option<u32>,
    /// Length of round-result and celebration interludes in frames
    pub interlude_frames: u32,
    /// Grace frames after losing a life
    pub invincible_frames: u32,
    pub level_basis: LevelBasis,
    pub scoring: ScoringRules,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            lives: 3,
            tolerance: 0.0,
            cull_margin: 80.0,
            pausable: false,
            fade_frames: 12,
            time_limit: None,
            interlude_frames: 120,
            invincible_frames: 60,
            level_basis: LevelBasis::Score { per_level: 100 },
            scoring: ScoringRules::default(),
        }
    }
}

impl GameRules {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }
}

/// Mutable view of the engine handed to game hooks
pub struct Ctx<'a, K, E: Ord> {
    pub session: &'a mut GameSession,
    pub entities: &'a mut EntityRegistry<K>,
    pub effects: &'a mut TimedEffects<E>,
    pub rng: &'a mut Pcg32,
    pub rules: &'a GameRules,
    pub settings: &'a Settings,
    pub(crate) events: &'a mut Vec<GameEvent>,
}

impl<K, E: Ord> Ctx<'_, K, E> {
    pub fn bounds(&self) -> Bounds {
        self.rules.bounds()
    }

    /// Current frame
    pub fn frame(&self) -> u64 {
        self.session.frame
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Background decorations are skipped on the low quality preset
    pub fn decorations(&self) -> bool {
        self.settings.quality.decorations_enabled()
    }
}

/// A mini-game plugged into the engine
///
/// Per-game state that is not an entity (the player, spawn timers) lives on
/// the implementor and must be fully re-initialised by `reset`.
pub trait Game {
    /// Entity kind tag
    type Kind: Copy + PartialEq + fmt::Debug;
    /// Timed power-up tag
    type Effect: EffectKind;

    /// Storage namespace (`<id>_highScore`)
    fn id(&self) -> &'static str;

    /// Display name for the splash screen
    fn title(&self) -> &'static str;

    fn rules(&self) -> GameRules;

    /// New session: reset player and per-game timers
    fn reset(&mut self, ctx: &mut Ctx<Self::Kind, Self::Effect>);

    /// Player movement and input intents
    fn step(&mut self, ctx: &mut Ctx<Self::Kind, Self::Effect>, input: &TickInput);

    /// Spawn new entities
    fn spawn(&mut self, ctx: &mut Ctx<Self::Kind, Self::Effect>);

    /// Resolve contacts between the player (or contact zone) and live entities
    fn collide(&mut self, ctx: &mut Ctx<Self::Kind, Self::Effect>, input: &TickInput);

    /// Magnet-style pull applied to homing entities this step
    fn attractor(
        &self,
        _session: &GameSession,
        _effects: &TimedEffects<Self::Effect>,
    ) -> Option<Attractor> {
        None
    }

    fn on_effect_ended(&mut self, _ctx: &mut Ctx<Self::Kind, Self::Effect>, _effect: Self::Effect) {}

    /// Game-specific terminal conditions, checked after every step
    fn flow(&self, _session: &GameSession) -> Flow {
        Flow::Continue
    }

    /// Where an interlude leads once it runs out
    fn after_interlude(&mut self, phase: GamePhase, _session: &GameSession) -> Flow {
        match phase {
            GamePhase::RoundResult => Flow::NextRound,
            _ => Flow::GameOver,
        }
    }

    /// Set up the next round (entities and combo are already cleared)
    fn start_round(&mut self, _ctx: &mut Ctx<Self::Kind, Self::Effect>) {}

    fn draw_background(&self, surface: &mut dyn Surface, session: &GameSession);
    fn draw_entity(&self, surface: &mut dyn Surface, entity: &Entity<Self::Kind>);
    fn draw_player(&self, surface: &mut dyn Surface, session: &GameSession);
    fn draw_overlay(&self, _surface: &mut dyn Surface, _session: &GameSession) {}
}

/// Seed used for the first session when the host provides none
const DEFAULT_SEED: u64 = 0x5EED_CAFE;

/// Frames after game over before a tap or jump starts a new session, so the
/// input that ended the run cannot restart it
pub const RESTART_DELAY_FRAMES: u32 = 45;

/// Runs one game: phase machine, fixed step, persistence on game over
pub struct Engine<G: Game, S: ScoreStore> {
    game: G,
    rules: GameRules,
    session: GameSession,
    entities: EntityRegistry<G::Kind>,
    effects: TimedEffects<G::Effect>,
    rng: Pcg32,
    store: S,
    settings: Settings,
    events: Vec<GameEvent>,
    on_game_over: Option<Box<dyn FnMut(u64)>>,
    game_over_recorded: bool,
    /// Frames left before game over accepts any action as a restart
    restart_delay: u32,
    next_seed: u64,
}

impl<G: Game, S: ScoreStore> Engine<G, S> {
    /// Enter the start phase with the stored best score loaded
    pub fn new(game: G, store: S, settings: Settings) -> Self {
        let rules = game.rules();
        let best = store.read_best(game.id());
        let mut entities = EntityRegistry::new();
        entities.fx.configure(&settings);
        log::info!("{} ready (best {})", game.id(), best);
        Self {
            session: GameSession::new(&rules, DEFAULT_SEED, best),
            game,
            rules,
            entities,
            effects: TimedEffects::new(),
            rng: Pcg32::seed_from_u64(DEFAULT_SEED),
            store,
            settings,
            events: Vec::new(),
            on_game_over: None,
            game_over_recorded: false,
            restart_delay: 0,
            next_seed: DEFAULT_SEED,
        }
    }

    /// Called once with the final score at every game over
    pub fn on_game_over(&mut self, callback: impl FnMut(u64) + 'static) {
        self.on_game_over = Some(Box::new(callback));
    }

    /// Seed for the next input-triggered session
    pub fn set_next_seed(&mut self, seed: u64) {
        self.next_seed = seed;
    }

    pub fn apply_settings(&mut self, settings: Settings) {
        self.entities.fx.configure(&settings);
        self.settings = settings;
    }

    /// The game plus a hook context over the rest of the engine
    fn split(&mut self) -> (&mut G, Ctx<'_, G::Kind, G::Effect>) {
        let Self {
            game,
            session,
            entities,
            effects,
            rng,
            rules,
            settings,
            events,
            ..
        } = self;
        let ctx = Ctx {
            session,
            entities,
            effects,
            rng,
            rules,
            settings,
            events,
        };
        (game, ctx)
    }

    /// Begin a fresh session; nothing carries over from a previous run
    pub fn start(&mut self, seed: u64) {
        let best = self.store.read_best(self.game.id());
        self.session = GameSession::new(&self.rules, seed, best);
        self.entities.clear();
        self.effects.clear();
        self.rng = Pcg32::seed_from_u64(seed);
        self.game_over_recorded = false;
        self.restart_delay = 0;
        self.next_seed = seed.wrapping_add(1);

        let (game, mut ctx) = self.split();
        game.reset(&mut ctx);

        self.session.phase = GamePhase::Playing;
        self.events.push(GameEvent::Started { seed });
        log::info!("{} session started (seed {})", self.game.id(), seed);
    }

    /// Advance one fixed step according to the current phase
    pub fn tick(&mut self, input: &TickInput) {
        match self.session.phase {
            GamePhase::Start | GamePhase::GameOver => {
                // Start always works; taps and jumps wait out the restart delay
                let wants_start = input.start || (self.restart_delay == 0 && input.any_action());
                if wants_start {
                    self.start(self.next_seed);
                } else {
                    self.restart_delay = self.restart_delay.saturating_sub(1);
                    self.entities.fx.advance(SIM_DT);
                }
            }
            GamePhase::Playing => {
                if input.pause && self.rules.pausable {
                    self.toggle_pause();
                } else {
                    self.step(input);
                }
            }
            GamePhase::Paused => {
                if input.pause {
                    self.toggle_pause();
                }
            }
            GamePhase::RoundResult | GamePhase::Celebration => self.interlude(),
        }
    }

    /// Pause or resume; false when the current phase does not allow it
    pub fn toggle_pause(&mut self) -> bool {
        match self.session.phase {
            GamePhase::Playing if self.rules.pausable => {
                self.session.phase = GamePhase::Paused;
                self.events.push(GameEvent::Paused);
                log::info!("{} paused", self.game.id());
                true
            }
            GamePhase::Paused => {
                self.session.phase = GamePhase::Playing;
                self.events.push(GameEvent::Resumed);
                log::info!("{} resumed", self.game.id());
                true
            }
            _ => false,
        }
    }

    fn step(&mut self, input: &TickInput) {
        self.session.frame += 1;
        self.session.difficulty_level = self
            .rules
            .level_basis
            .level(self.session.score, self.session.elapsed_secs());

        let attractor = self.game.attractor(&self.session, &self.effects);
        let bounds = self.rules.bounds();
        let (game, mut ctx) = self.split();

        game.step(&mut ctx, input);
        game.spawn(&mut ctx);
        ctx.entities.advance(SIM_DT, bounds, attractor);
        ctx.entities.cull(bounds, ctx.rules.cull_margin);
        game.collide(&mut ctx, input);

        // Timers
        let session = &mut *ctx.session;
        session.invincible_frames = session.invincible_frames.saturating_sub(1);
        if session.frenzy_frames > 0 {
            session.frenzy_frames -= 1;
            if session.frenzy_frames == 0 {
                ctx.events.push(GameEvent::FrenzyEnded);
            }
        }
        if session.combo_timer > 0 {
            session.combo_timer -= 1;
            if session.combo_timer == 0 && session.combo > 0 {
                session.combo = 0;
                ctx.events.push(GameEvent::ComboBroken);
            }
        }
        if let Some(left) = session.time_left.as_mut() {
            *left = left.saturating_sub(1);
        }
        let now = ctx.session.frame;
        for effect in ctx.effects.expire(now) {
            log::debug!("Effect {} ended", effect.name());
            ctx.events.push(GameEvent::EffectEnded {
                effect: effect.name(),
            });
            game.on_effect_ended(&mut ctx, effect);
        }

        let flow = if self.session.lives == 0 || self.session.time_left == Some(0) {
            Flow::GameOver
        } else {
            self.game.flow(&self.session)
        };
        self.apply_flow(flow);
    }

    fn interlude(&mut self) {
        self.entities.fx.advance(SIM_DT);
        self.session.interlude_frames = self.session.interlude_frames.saturating_sub(1);
        if self.session.interlude_frames == 0 {
            let flow = self.game.after_interlude(self.session.phase, &self.session);
            self.apply_flow(flow);
        }
    }

    fn apply_flow(&mut self, flow: Flow) {
        match flow {
            Flow::Continue => {}
            Flow::RoundResult => {
                self.session.phase = GamePhase::RoundResult;
                self.session.interlude_frames = self.rules.interlude_frames;
                self.events.push(GameEvent::RoundOver {
                    round: self.session.round,
                });
                log::info!("{} round {} over", self.game.id(), self.session.round);
            }
            Flow::Celebration => {
                self.session.phase = GamePhase::Celebration;
                self.session.interlude_frames = self.rules.interlude_frames;
                self.events.push(GameEvent::Celebration);
                log::info!("{} celebration", self.game.id());
            }
            Flow::NextRound => {
                self.session.round += 1;
                self.session.break_combo();
                self.entities.clear_entities();
                self.effects.clear();
                let (game, mut ctx) = self.split();
                game.start_round(&mut ctx);
                self.session.phase = GamePhase::Playing;
                self.events.push(GameEvent::RoundStarted {
                    round: self.session.round,
                });
                log::info!("{} round {} started", self.game.id(), self.session.round);
            }
            Flow::GameOver => self.finish(),
        }
    }

    /// Terminal transition; persistence and callback run once per session
    fn finish(&mut self) {
        self.session.phase = GamePhase::GameOver;
        self.restart_delay = RESTART_DELAY_FRAMES;
        if self.game_over_recorded {
            return;
        }
        self.game_over_recorded = true;

        let score = self.session.score;
        let previous = self.session.best;
        let best = match self.store.write_best(self.game.id(), score) {
            Ok(best) => best,
            Err(e) => {
                log::warn!("Could not save {} best score: {}", self.game.id(), e);
                previous.max(score)
            }
        };
        if let Some(callback) = self.on_game_over.as_mut() {
            callback(score);
        }
        self.events.push(GameEvent::GameOver {
            score,
            best,
            new_best: score > previous,
        });
        log::info!("{} game over: score {} (best {})", self.game.id(), score, best);
    }

    /// Whether the host should keep the timing driver running
    ///
    /// Game over keeps painting until the restart delay has run out.
    pub fn wants_frames(&self) -> bool {
        self.session.phase.is_animated()
            || (self.session.phase == GamePhase::GameOver && self.restart_delay > 0)
    }

    /// Whether a tap or jump would start a new session now
    pub fn can_restart(&self) -> bool {
        matches!(self.session.phase, GamePhase::Start | GamePhase::GameOver) && self.restart_delay == 0
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn entities(&self) -> &EntityRegistry<G::Kind> {
        &self.entities
    }

    pub fn effects(&self) -> &TimedEffects<G::Effect> {
        &self.effects
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Hook-level access for scripted scenarios and tests
    pub fn with_ctx<R>(&mut self, f: impl FnOnce(&mut G, &mut Ctx<G::Kind, G::Effect>) -> R) -> R {
        let (game, mut ctx) = self.split();
        f(game, &mut ctx)
    }
}
