//! Wedding Arcade entry point
//!
//! On the web this mounts the game named by the canvas `data-game`
//! attribute. Natively it runs a headless demo of one game or serves the
//! RSVP/score API over HTTP.

#[cfg(target_arch = "wasm32")]
mod web_app {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;
    use web_sys::{CustomEvent, CustomEventInit};

    use wedding_arcade::games::{self, AisleWalk, CatSwat, DogRun, EggCatch};
    use wedding_arcade::highscores::{HighScoreEntry, format_date};
    use wedding_arcade::platform::web::{GameHandle, LocalStore, PlatformError, mount_game};
    use wedding_arcade::store::ScoreStore;

    const CANVAS_ID: &str = "game-canvas";
    const GAME_OVER_EVENT: &str = "arcade:gameover";

    thread_local! {
        static MOUNTED: RefCell<Option<GameHandle>> = const { RefCell::new(None) };
    }

    /// Tell the page a session ended so it can ask for a name
    fn announce_game_over(game_id: &'static str) -> impl FnMut(u64) + 'static {
        move |score| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let detail = js_sys::Object::new();
            let _ = js_sys::Reflect::set(&detail, &"game".into(), &game_id.into());
            let _ = js_sys::Reflect::set(&detail, &"score".into(), &(score as f64).into());
            let init = CustomEventInit::new();
            init.set_detail(&detail);
            match CustomEvent::new_with_event_init_dict(GAME_OVER_EVENT, &init) {
                Ok(event) => {
                    let _ = window.dispatch_event(&event);
                }
                Err(e) => log::warn!("Could not announce game over: {:?}", e),
            }
        }
    }

    fn mount(game_id: &str) -> Result<GameHandle, PlatformError> {
        match game_id {
            games::runner::GAME_ID => mount_game(
                CANVAS_ID,
                DogRun::new(),
                announce_game_over(games::runner::GAME_ID),
            ),
            games::egg_catch::GAME_ID => mount_game(
                CANVAS_ID,
                EggCatch::new(),
                announce_game_over(games::egg_catch::GAME_ID),
            ),
            games::cat_swat::GAME_ID => mount_game(
                CANVAS_ID,
                CatSwat::new(),
                announce_game_over(games::cat_swat::GAME_ID),
            ),
            games::aisle_walk::GAME_ID => mount_game(
                CANVAS_ID,
                AisleWalk::new(),
                announce_game_over(games::aisle_walk::GAME_ID),
            ),
            other => Err(PlatformError::UnknownGame(other.to_string())),
        }
    }

    /// Replace the running game (if any) with `game_id`
    #[wasm_bindgen]
    pub fn switch_game(game_id: &str) -> Result<(), JsValue> {
        unmount_game();
        let handle = mount(game_id).map_err(|e| JsValue::from_str(&e.to_string()))?;
        MOUNTED.with(|m| *m.borrow_mut() = Some(handle));
        Ok(())
    }

    /// Stop the running game and remove its listeners
    #[wasm_bindgen]
    pub fn unmount_game() {
        if let Some(handle) = MOUNTED.with(|m| m.borrow_mut().take()) {
            handle.unmount();
        }
    }

    /// Add a named score to the local top-10; returns the rank achieved
    #[wasm_bindgen]
    pub fn record_score(game_id: &str, name: &str, score: f64) -> Option<u32> {
        let window = web_sys::window()?;
        let mut store = LocalStore::open(&window);
        let entry = HighScoreEntry::new(name, score.max(0.0) as u64, format_date(js_sys::Date::now()));
        match store.append_leaderboard(game_id, entry) {
            Ok(rank) => rank.map(|r| r as u32),
            Err(e) => {
                log::warn!("Could not save {} leaderboard: {}", game_id, e);
                None
            }
        }
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialised".into());
        }

        let game_id = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CANVAS_ID))
            .and_then(|el| el.get_attribute("data-game"))
            .unwrap_or_else(|| games::runner::GAME_ID.to_string());

        log::info!("Wedding Arcade starting {}", game_id);
        if let Err(e) = switch_game(&game_id) {
            // Leave the page usable; the canvas simply stays blank
            log::error!("Could not start {}: {:?}", game_id, e);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{SystemTime, UNIX_EPOCH};

    use wedding_arcade::api::{self, Api, ApiConfig};
    use wedding_arcade::engine::{Engine, Game, GamePhase, Key, RawInput, RecordingSurface};
    use wedding_arcade::games::runner::{self, RunnerKind};
    use wedding_arcade::games::{self, AisleWalk, CatSwat, DogRun, EggCatch};
    use wedding_arcade::platform::{Host, ManualScheduler};
    use wedding_arcade::{MemoryStore, Settings};

    /// Give up after five simulated minutes
    const DEMO_FRAMES: u32 = 60 * 60 * 5;
    const FRAME_MS: f64 = 1000.0 / 60.0;

    const DEFAULT_ADDR: &str = "127.0.0.1:3000";

    pub const USAGE: &str = "usage:
  wedding-arcade [demo [GAME_ID] [SEED]]
  wedding-arcade serve [ADDR]          (DATABASE_URL unset serves mock data)";

    type DemoHost<G> = Host<G, MemoryStore, ManualScheduler, RecordingSurface>;

    fn now_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }

    fn tap(host: &mut DemoHost<impl Game>, key: Key) {
        host.on_input(RawInput::KeyDown { key, repeat: false });
        host.on_input(RawInput::KeyUp(key));
    }

    /// Jump hurdles and cones, duck birds
    fn runner_pilot(host: &mut DemoHost<DogRun>) {
        let ahead = host
            .engine
            .entities()
            .live()
            .filter(|e| e.kind.is_obstacle())
            .map(|e| (e.kind, e.pos.x - e.shape.half_extents().x - runner::PLAYER_X))
            .filter(|(_, gap)| *gap > 0.0)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        match ahead {
            Some((RunnerKind::Bird, gap)) if gap < 90.0 => {
                host.on_input(RawInput::KeyDown {
                    key: Key::Down,
                    repeat: false,
                });
            }
            Some((_, gap)) if gap < 70.0 && host.engine.game().dog.grounded => {
                host.on_input(RawInput::KeyUp(Key::Down));
                tap(host, Key::Action);
            }
            _ => host.on_input(RawInput::KeyUp(Key::Down)),
        }
    }

    fn play<G: Game>(game: G, seed: u64, mut pilot: impl FnMut(&mut DemoHost<G>)) {
        let rules = game.rules();
        let mut engine = Engine::new(game, MemoryStore::new(), Settings::default());
        engine.set_next_seed(seed);
        engine.on_game_over(|score| log::info!("Final score {}", score));
        let mut host = Host::new(
            engine,
            ManualScheduler::new(),
            RecordingSurface::new(rules.width, rules.height),
        );

        tap(&mut host, Key::Start);
        let mut now = 0.0;
        let mut frames = 0;
        while host.engine.phase() != GamePhase::GameOver && frames < DEMO_FRAMES {
            pilot(&mut host);
            now += FRAME_MS;
            if !host.pump(now) {
                break;
            }
            frames += 1;
        }

        let session = host.engine.session();
        println!(
            "{}: {:?} after {} frames, score {} (best combo {}, round {})",
            host.engine.game().id(),
            session.phase,
            frames,
            session.score,
            session.best_combo,
            session.round
        );
    }

    pub fn demo(game_id: Option<&str>, seed: Option<&str>) -> Result<(), String> {
        let seed = match seed {
            Some(s) => s.parse().map_err(|_| format!("seed must be a number: {}", s))?,
            None => now_ms() as u64,
        };
        let game_id = game_id.unwrap_or(games::runner::GAME_ID);
        log::info!("Demo of {} with seed {}", game_id, seed);
        match game_id {
            games::runner::GAME_ID => play(DogRun::new(), seed, runner_pilot),
            games::egg_catch::GAME_ID => play(EggCatch::new(), seed, |_| {}),
            games::cat_swat::GAME_ID => play(CatSwat::new(), seed, |_| {}),
            games::aisle_walk::GAME_ID => play(AisleWalk::new(), seed, |_| {}),
            other => return Err(format!("unknown game {}; known: {:?}", other, games::GAME_IDS)),
        }
        Ok(())
    }

    async fn shutdown_signal() {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Could not listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Received Ctrl+C, shutting down");
    }

    /// Serve the API until Ctrl+C; a configured database must be reachable
    pub fn serve(addr: Option<&str>) -> Result<(), String> {
        let addr: std::net::SocketAddr = addr
            .unwrap_or(DEFAULT_ADDR)
            .parse()
            .map_err(|e| format!("bad listen address: {}", e))?;
        let runtime = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
        runtime.block_on(async move {
            let config = ApiConfig::from_env();
            let api = Api::connect(&config).await.map_err(|e| e.to_string())?;
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .map_err(|e| format!("could not bind {}: {}", addr, e))?;
            log::info!("Serving the API on http://{}", addr);
            axum::serve(listener, api::router(api))
                .with_graceful_shutdown(shutdown_signal())
                .await
                .map_err(|e| e.to_string())
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        None => native::demo(None, None),
        Some("demo") => native::demo(
            args.get(1).map(String::as_str),
            args.get(2).map(String::as_str),
        ),
        Some("serve") => native::serve(args.get(1).map(String::as_str)),
        Some(_) => Err(native::USAGE.to_string()),
    };
    if let Err(message) = result {
        eprintln!("{}", message);
        std::process::exit(2);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry point is web_app::start
}
