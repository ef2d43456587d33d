//! Forest Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent};

    use forest_runner::Theme;
    use forest_runner::consts::*;
    use forest_runner::sim::{
        Action, GamePhase, InputTracker, ObstacleKind, Session, SessionSnapshot, tick,
    };

    /// Instructions stay visible this long before the first run starts
    const START_DELAY_MS: f64 = 300.0;

    /// Game instance holding all state
    struct Game {
        session: Session,
        tracker: InputTracker,
        ctx: CanvasRenderingContext2d,
        document: Document,
        accumulator: f64,
        last_time: f64,
        last_snapshot: SessionSnapshot,
        last_phase: GamePhase,
    }

    impl Game {
        fn new(session: Session, ctx: CanvasRenderingContext2d, document: Document) -> Self {
            let last_snapshot = session.snapshot();
            Self {
                last_phase: session.phase(),
                session,
                tracker: InputTracker::new(),
                ctx,
                document,
                accumulator: 0.0,
                last_time: 0.0,
                last_snapshot,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, time: f64) {
            if self.session.phase() == GamePhase::NotStarted && time >= START_DELAY_MS {
                if let Err(e) = self.session.start() {
                    log::warn!("Auto start failed: {}", e);
                }
            }

            let dt = if self.last_time > 0.0 {
                time - self.last_time
            } else {
                FRAME_MS as f64
            };
            self.last_time = time;
            self.accumulator += dt.min(self.session.tuning.max_tick_ms as f64);

            let mut substeps = 0;
            while self.accumulator >= FRAME_MS as f64 && substeps < MAX_SUBSTEPS {
                let input = self.tracker.snapshot(time);
                self.last_snapshot = tick(&mut self.session, &input, FRAME_MS);
                self.accumulator -= FRAME_MS as f64;
                substeps += 1;
            }
            if substeps == MAX_SUBSTEPS {
                // Drop the backlog instead of catching up next frame
                self.accumulator = self.accumulator.min(FRAME_MS as f64);
            }
            if substeps == 0 {
                self.last_snapshot = self.session.snapshot();
            }

            if self.session.phase() != self.last_phase {
                if self.session.phase() == GamePhase::GameOver {
                    log::info!("Run over at {} m", self.session.distance_m());
                }
                self.last_phase = self.session.phase();
            }
        }

        fn render(&self) {
            let t = &self.session.tuning;
            let snap = &self.last_snapshot;
            let ctx = &self.ctx;

            ctx.set_fill_style_str("#0f1a14");
            ctx.fill_rect(0.0, 0.0, t.viewport_width as f64, t.viewport_height as f64);
            ctx.set_fill_style_str("#2e4a2a");
            let ground = t.ground_y() as f64;
            ctx.fill_rect(0.0, ground, t.viewport_width as f64, t.viewport_height as f64 - ground);

            for o in snap.visible(t.viewport_width, t.viewport_margin) {
                let color = match o.kind {
                    ObstacleKind::Spikes => "#9aa3ad",
                    ObstacleKind::Lava => "#e2561d",
                    ObstacleKind::Ghost => "#d9e6f2",
                };
                ctx.set_fill_style_str(color);
                ctx.fill_rect(
                    o.sprite.min.x as f64,
                    o.sprite.min.y as f64,
                    o.sprite.size.x as f64,
                    o.sprite.size.y as f64,
                );
            }

            let p = &snap.player;
            ctx.set_fill_style_str(if p.on_ground { "#f2c14e" } else { "#f7d98b" });
            ctx.fill_rect(p.pos.x as f64, p.pos.y as f64, p.size.x as f64, p.size.y as f64);
            // Facing marker
            ctx.set_fill_style_str("#1b1b1b");
            let eye_x = if p.facing >= 0 { p.pos.x + p.size.x - 18.0 } else { p.pos.x + 8.0 };
            ctx.fill_rect(eye_x as f64, (p.pos.y + 20.0) as f64, 10.0, 10.0);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let snap = &self.last_snapshot;

            if let Some(el) = self.document.get_element_by_id("distance") {
                el.set_text_content(Some(&format!("{} m", snap.distance_m)));
            }

            if let Some(el) = self.document.get_element_by_id("overlay") {
                if snap.phase == GamePhase::GameOver {
                    let _ = el.class_list().remove_1("hidden");
                    if let Some(title) = self.document.get_element_by_id("overlay-title") {
                        title.set_text_content(Some("Game Over"));
                    }
                    if let Some(line) = self.document.get_element_by_id("score-line") {
                        line.set_text_content(Some(&format!("Distance: {} m", snap.distance_m)));
                    }
                } else {
                    let _ = el.class_list().add_1("hidden");
                }
            }
        }

        /// Drop held controls when focus is lost
        fn release_all(&mut self, reason: &str) {
            self.tracker.clear();
            log::info!("Released held keys ({})", reason);
        }

        fn restart(&mut self) {
            self.session.reset();
            self.tracker.clear();
            self.accumulator = 0.0;
            self.last_snapshot = self.session.snapshot();
            log::info!("Game restarted");
        }
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    fn theme_from_query() -> Theme {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        search
            .trim_start_matches('?')
            .split('&')
            .find_map(|kv| kv.strip_prefix("theme="))
            .and_then(Theme::from_str)
            .unwrap_or_default()
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Forest Runner starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game")
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let theme = theme_from_query();
        let seed = js_sys::Date::now() as u64;
        let session = Session::with_theme(theme, seed)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        canvas.set_width(session.tuning.viewport_width as u32);
        canvas.set_height(session.tuning.viewport_height as u32);
        log::info!("Theme {} with seed {}", theme.as_str(), seed);

        let game = Rc::new(RefCell::new(Game::new(session, ctx, document.clone())));

        setup_input_handlers(&window, game.clone())?;
        setup_restart_button(&document, game.clone())?;

        request_animation_frame(game);
        Ok(())
    }

    fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                if Action::suppresses_default(&code) {
                    event.prevent_default();
                }
                if let Some(action) = Action::from_key_code(&code) {
                    game.borrow_mut().tracker.press(action, now_ms());
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(action) = Action::from_key_code(&event.code()) {
                    game.borrow_mut().tracker.release(action);
                }
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Window blur (click outside): key-up events never arrive
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().release_all("window blur");
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Visibility change (tab switch, minimize)
        if let Some(document) = window.document() {
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.hidden() {
                    game.borrow_mut().release_all("tab hidden");
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_restart_button(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        if let Some(btn) = document.get_element_by_id("restart") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().restart();
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use forest_runner::consts::FRAME_MS;
    use forest_runner::sim::{Autopilot, DeathCause, GameEvent, Session, SessionError, tick};
    use forest_runner::{ConfigError, Theme, Tuning};

    const DEFAULT_TICKS: u64 = 60 * 60 * 5;

    #[derive(Debug, thiserror::Error)]
    pub enum RunError {
        #[error("usage: forest-runner [forest|rooftop] [seed] [--tuning FILE] [--ticks N] ({0})")]
        Usage(String),
        #[error("cannot read tuning file {path}: {source}")]
        Io {
            path: PathBuf,
            source: std::io::Error,
        },
        #[error(transparent)]
        Config(#[from] ConfigError),
        #[error(transparent)]
        Session(#[from] SessionError),
    }

    #[derive(Debug, Default)]
    struct Args {
        theme: Theme,
        seed: u64,
        tuning: Option<PathBuf>,
        ticks: Option<u64>,
    }

    fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, RunError> {
        let mut out = Args::default();
        let mut positional = 0;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--tuning" => {
                    let path = args.next().ok_or_else(|| RunError::Usage("--tuning needs a file".into()))?;
                    out.tuning = Some(PathBuf::from(path));
                }
                "--ticks" => {
                    let n = args.next().ok_or_else(|| RunError::Usage("--ticks needs a count".into()))?;
                    out.ticks = Some(n.parse().map_err(|_| RunError::Usage(format!("bad tick count {n}")))?);
                }
                other if positional == 0 && Theme::from_str(other).is_some() => {
                    out.theme = Theme::from_str(other).unwrap_or_default();
                    positional += 1;
                }
                other if positional <= 1 => {
                    out.seed = other.parse().map_err(|_| RunError::Usage(format!("bad seed {other}")))?;
                    positional = 2;
                }
                other => return Err(RunError::Usage(format!("unexpected argument {other}"))),
            }
        }
        Ok(out)
    }

    fn load_tuning(args: &Args) -> Result<Tuning, RunError> {
        match &args.tuning {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| RunError::Io {
                    path: path.clone(),
                    source,
                })?;
                Ok(Tuning::from_json(&json)?)
            }
            None => Ok(args.theme.tuning()),
        }
    }

    pub fn run(args: impl Iterator<Item = String>) -> Result<(), RunError> {
        let args = parse_args(args)?;
        let tuning = load_tuning(&args)?;
        log::info!("Theme {} with seed {}", args.theme.as_str(), args.seed);

        let mut session = Session::new(tuning, args.seed)?;
        session.start()?;

        let mut pilot = Autopilot::new();
        let mut snapshot = session.snapshot();
        let mut jumps = 0u32;
        let mut cause = None;
        for _ in 0..args.ticks.unwrap_or(DEFAULT_TICKS) {
            let input = pilot.input(&snapshot);
            snapshot = tick(&mut session, &input, FRAME_MS);
            for event in &snapshot.events {
                match event {
                    GameEvent::Jumped { .. } => jumps += 1,
                    GameEvent::Died { cause: c } => cause = Some(*c),
                    _ => {}
                }
            }
            if !snapshot.alive {
                break;
            }
        }

        let outcome = match cause {
            None => "still running".to_string(),
            Some(DeathCause::FellOut) => "fell out of the world".to_string(),
            Some(DeathCause::Hazard { obstacle_id, kind }) => format!("hit {kind:?} #{obstacle_id}"),
        };
        log::info!("Finished after {} ticks", session.time_ticks);
        println!(
            "distance {} m, {} jumps, {:.1} s, {}",
            session.distance_m(),
            jumps,
            session.time_ms / 1000.0,
            outcome
        );
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Forest Runner (native) starting...");
    log::info!("Headless autopilot run; build for wasm32 to play in a browser");

    if let Err(e) = headless::run(std::env::args().skip(1)) {
        log::error!("{}", e);
        eprintln!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
