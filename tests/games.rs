//! Per-game rules played through the engine

use glam::Vec2;
use wedding_arcade::consts::SIM_DT;
use wedding_arcade::engine::{Engine, Game, GameEvent, GamePhase, TickInput};
use wedding_arcade::games::aisle_walk::{self, AisleKind};
use wedding_arcade::games::cat_swat::{self, CatKind};
use wedding_arcade::games::egg_catch::{self, EggEffect, EggKind};
use wedding_arcade::games::{AisleWalk, CatSwat, EggCatch};
use wedding_arcade::{MemoryStore, QualityPreset, Settings};

fn idle() -> TickInput {
    TickInput::default()
}

fn started<G: Game>(game: G, seed: u64) -> Engine<G, MemoryStore> {
    let mut engine = Engine::new(game, MemoryStore::new(), Settings::default());
    engine.start(seed);
    engine.drain_events();
    engine
}

#[test]
fn test_every_third_dropped_egg_costs_a_life() {
    let mut engine = started(EggCatch::new(), 8);

    let lives = engine.with_ctx(|game, ctx| {
        let mut lives = Vec::new();
        for _ in 0..3 {
            // Far from the basket and already past its rim
            let id = game.spawn_item(ctx, EggKind::Egg, 30.0);
            if let Some(egg) = ctx.entities.get_mut(id) {
                egg.pos.y = egg_catch::HEIGHT - 5.0;
            }
            game.collide(ctx, &TickInput::default());
            lives.push(ctx.session.lives);
        }
        lives
    });

    assert_eq!(lives, vec![3, 3, 2]);
    assert_eq!(engine.session().misses, 3);
    let events = engine.drain_events();
    assert!(events.contains(&GameEvent::Missed { misses: 2 }));
    assert!(events.contains(&GameEvent::LifeLost { lives_left: 2 }));
}

#[test]
fn test_rotten_egg_in_basket_hurts_but_dropping_it_does_not() {
    let mut engine = started(EggCatch::new(), 8);
    let basket_x = engine.game().basket_x;

    engine.with_ctx(|game, ctx| {
        let dropped = game.spawn_item(ctx, EggKind::Rotten, 30.0);
        if let Some(egg) = ctx.entities.get_mut(dropped) {
            egg.pos.y = egg_catch::HEIGHT - 5.0;
        }
        let caught = game.spawn_item(ctx, EggKind::Rotten, basket_x);
        if let Some(egg) = ctx.entities.get_mut(caught) {
            egg.pos.y = egg_catch::BASKET_Y - 8.0;
        }
        game.collide(ctx, &TickInput::default());
    });

    let session = engine.session();
    assert_eq!(session.lives, 2);
    assert_eq!(session.misses, 0);
    assert!(session.is_invincible());
}

#[test]
fn test_wide_basket_expires() {
    const DURATION: u32 = 30;
    let mut engine = started(EggCatch::new(), 21);
    engine.with_ctx(|_, ctx| ctx.activate(EggEffect::WideBasket, DURATION));

    for _ in 0..DURATION - 1 {
        engine.tick(&idle());
    }
    assert_eq!(engine.game().basket_width, egg_catch::WIDE_BASKET_WIDTH);

    engine.tick(&idle());
    engine.tick(&idle());
    assert_eq!(engine.game().basket_width, egg_catch::BASKET_WIDTH);
    assert!(
        engine
            .drain_events()
            .contains(&GameEvent::EffectEnded { effect: "wideBasket" })
    );
}

#[test]
fn test_basket_follows_steering_within_bounds() {
    let mut engine = started(EggCatch::new(), 5);
    for _ in 0..60 {
        engine.tick(&TickInput {
            steer: 1.0,
            ..idle()
        });
    }
    let game = engine.game();
    assert_eq!(game.basket_x, egg_catch::WIDTH - game.basket_width / 2.0);
}

#[test]
fn test_cat_swat_round_ends_when_the_clock_runs_out() {
    let mut engine = started(CatSwat::new(), 13);
    let limit = engine.rules().time_limit.unwrap_or_default();

    for _ in 0..limit - 1 {
        engine.tick(&idle());
    }
    assert_eq!(engine.phase(), GamePhase::Playing);
    // Escaped cats never cost the only life
    assert_eq!(engine.session().lives, 1);

    engine.tick(&idle());
    assert_eq!(engine.phase(), GamePhase::GameOver);
    assert_eq!(engine.session().time_left, Some(0));
}

#[test]
fn test_cat_swat_pause_freezes_the_clock() {
    let mut engine = started(CatSwat::new(), 13);
    for _ in 0..10 {
        engine.tick(&idle());
    }
    engine.tick(&TickInput {
        pause: true,
        ..idle()
    });
    assert_eq!(engine.phase(), GamePhase::Paused);
    let frozen = engine.session().clone();

    for _ in 0..120 {
        engine.tick(&TickInput {
            tap: Some(Vec2::new(100.0, 100.0)),
            ..idle()
        });
    }
    assert_eq!(engine.session(), &frozen);
    assert!(!engine.wants_frames());

    engine.tick(&TickInput {
        pause: true,
        ..idle()
    });
    assert_eq!(engine.phase(), GamePhase::Playing);
}

#[test]
fn test_swatting_cake_never_drops_score_below_zero() {
    let mut engine = started(CatSwat::new(), 17);

    let (cat_award, taken) = engine.with_ctx(|game, ctx| {
        let cat = game.toss(ctx, CatKind::Cat, 120.0);
        let cake = game.toss(ctx, CatKind::Cake, 360.0);
        let cat_pos = ctx.entities.get(cat).map(|e| e.pos).unwrap_or_default();
        let cake_pos = ctx.entities.get(cake).map(|e| e.pos).unwrap_or_default();

        game.collide(
            ctx,
            &TickInput {
                tap: Some(cat_pos),
                ..TickInput::default()
            },
        );
        let after_cat = ctx.session.score;
        game.collide(
            ctx,
            &TickInput {
                tap: Some(cake_pos),
                ..TickInput::default()
            },
        );
        (after_cat, ctx.session.score)
    });

    assert_eq!(cat_award, cat_swat::CAT_POINTS);
    assert!(cat_swat::CAKE_PENALTY > cat_swat::CAT_POINTS);
    assert_eq!(taken, 0);
    assert_eq!(engine.session().combo, 0);
    assert!(
        engine
            .drain_events()
            .contains(&GameEvent::Penalty { points: cat_swat::CAT_POINTS })
    );
}

#[test]
fn test_tap_on_empty_table_does_nothing() {
    let mut engine = started(CatSwat::new(), 17);
    engine.with_ctx(|game, ctx| {
        game.toss(ctx, CatKind::Cat, 120.0);
        game.collide(
            ctx,
            &TickInput {
                tap: Some(Vec2::new(400.0, 100.0)),
                ..TickInput::default()
            },
        );
    });
    assert_eq!(engine.session().score, 0);
    assert_eq!(engine.entities().live().count(), 1);
}

/// Press on the step where the nearest prompt lands closest to the zone
fn on_beat(engine: &Engine<AisleWalk, MemoryStore>) -> TickInput {
    let step = engine.game().tempo.speed * SIM_DT;
    let press = engine
        .entities()
        .live()
        .filter(|e| e.kind != AisleKind::Petal)
        .any(|e| (e.pos.x + e.vel.x * SIM_DT - aisle_walk::ZONE_X).abs() <= step / 2.0 + 0.01);
    TickInput {
        jump: press,
        ..TickInput::default()
    }
}

#[test]
fn test_aisle_walk_rounds_lead_to_celebration() {
    let mut engine = started(AisleWalk::new(), 30);
    let mut phases = vec![engine.phase()];
    let mut events = Vec::new();

    for _ in 0..20_000 {
        if engine.phase() == GamePhase::GameOver {
            break;
        }
        let input = if engine.phase() == GamePhase::Playing {
            on_beat(&engine)
        } else {
            idle()
        };
        engine.tick(&input);
        events.extend(engine.drain_events());
        if phases.last() != Some(&engine.phase()) {
            phases.push(engine.phase());
        }
    }

    assert_eq!(
        phases,
        vec![
            GamePhase::Playing,
            GamePhase::RoundResult,
            GamePhase::Playing,
            GamePhase::RoundResult,
            GamePhase::Playing,
            GamePhase::Celebration,
            GamePhase::GameOver,
        ]
    );
    assert_eq!(engine.session().round, aisle_walk::ROUNDS);
    assert_eq!(engine.session().lives, 3);
    assert!(events.contains(&GameEvent::RoundStarted { round: 3 }));
    assert!(events.contains(&GameEvent::Celebration));
    let scored = events
        .iter()
        .filter(|e| matches!(e, GameEvent::Scored { .. }))
        .count();
    assert_eq!(scored as u32, aisle_walk::ROUNDS * aisle_walk::PROMPTS_PER_ROUND);
}

#[test]
fn test_aisle_walk_missed_steps_cost_lives() {
    let mut engine = started(AisleWalk::new(), 30);
    for _ in 0..5_000 {
        if engine.phase() == GamePhase::GameOver {
            break;
        }
        engine.tick(&idle());
    }
    // Every fourth miss costs a life; twelve of sixteen misses end the walk
    assert_eq!(engine.phase(), GamePhase::GameOver);
    assert_eq!(engine.session().misses, 12);
    assert_eq!(engine.session().round, 1);
}

#[test]
fn test_low_quality_walk_has_no_petals() {
    let petals = |quality: QualityPreset| {
        let settings = Settings {
            quality,
            ..Settings::default()
        };
        let mut engine = Engine::new(AisleWalk::new(), MemoryStore::new(), settings);
        engine.start(30);
        for _ in 0..120 {
            engine.tick(&idle());
        }
        engine
            .entities()
            .iter()
            .filter(|e| e.kind == AisleKind::Petal)
            .count()
    };
    assert_eq!(petals(QualityPreset::Low), 0);
    assert!(petals(QualityPreset::Medium) > 0);
}
