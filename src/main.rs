//! Powder Run entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, KeyboardEvent, PointerEvent,
    };

    use powder_run::audio::AudioManager;
    use powder_run::platform::now_ms;
    use powder_run::renderer::{RenderState, SpriteSheet};
    use powder_run::services::{
        Cue, FeedbackSink, HudSink, HudSnapshot, PlayerProfile, RunRecord, ScoreSink, Services,
    };
    use powder_run::sim::{CollectibleKind, GamePhase};
    use powder_run::{Session, SessionLeaderboard, Settings, Tuning};

    const SPRITE_URL: &str = "skier.png";
    const TUNING_KEY: &str = "powder_run_tuning";

    /// Audio shared between the session (as a sink) and the focus handlers
    struct SharedAudio(Rc<RefCell<AudioManager>>);

    impl FeedbackSink for SharedAudio {
        fn cue(&mut self, cue: Cue) {
            self.0.borrow().play(cue);
        }
    }

    struct SharedBoard(Rc<RefCell<SessionLeaderboard>>);

    impl ScoreSink for SharedBoard {
        fn record(&mut self, record: RunRecord) {
            self.0.borrow_mut().record(record);
        }
    }

    /// Writes the HUD into the page
    struct DomHud {
        document: web_sys::Document,
        show_toasts: bool,
        board: Rc<RefCell<SessionLeaderboard>>,
    }

    impl DomHud {
        fn set_text(&self, selector: &str, text: &str) {
            if let Some(el) = self.document.query_selector(selector).ok().flatten() {
                el.set_text_content(Some(text));
            }
        }

        fn set_hidden(&self, id: &str, hidden: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.class_list().toggle_with_force("hidden", hidden);
            }
        }
    }

    impl HudSink for DomHud {
        fn update(&mut self, hud: &HudSnapshot) {
            self.set_text("#hud-score .hud-value", &hud.score.to_string());
            self.set_text("#hud-time .hud-value", &hud.time_remaining.to_string());
            self.set_text("#hud-level .hud-value", &hud.level.to_string());

            let complete = hud.phase == GamePhase::LevelComplete;
            self.set_hidden("level-complete", !complete);
            if complete {
                self.set_text("#final-score", &hud.score.to_string());
                if let Some(best) = self.board.borrow().top_score() {
                    self.set_text("#best-score", &best.to_string());
                }
            }
        }

        fn toast(&mut self, item: CollectibleKind, delta: i64) {
            if !self.show_toasts {
                return;
            }
            let Some(container) = self.document.get_element_by_id("toasts") else {
                return;
            };
            let Ok(el) = self.document.create_element("div") else {
                return;
            };
            let class = if delta < 0 { "toast bad" } else { "toast" };
            let _ = el.set_attribute("class", class);
            el.set_text_content(Some(&format!("{:?} {:+}", item, delta)));
            let _ = container.append_child(&el);

            // Fade out handled in CSS; drop the node afterwards
            let closure = Closure::once(move || el.remove());
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    closure.as_ref().unchecked_ref(),
                    1200,
                );
            }
            closure.forget();
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        render_state: Option<RenderState>,
        settings: Settings,
        audio: Rc<RefCell<AudioManager>>,
        /// Pending sprite sheet that arrived before the GPU was ready
        sprite: Option<SpriteSheet>,
        left_held: bool,
        right_held: bool,
        /// Last pointer x while dragging
        drag_x: Option<f32>,
        raf_handle: Option<i32>,
        clock_handle: Option<i32>,
    }

    impl Game {
        fn update_direction(&mut self) {
            let direction = self.right_held as i8 - self.left_held as i8;
            self.session.set_direction(direction);
        }

        fn render(&mut self) {
            if let Some(sheet) = self.sprite.take() {
                match self.render_state.as_mut() {
                    Some(rs) => {
                        if let Err(e) = rs.set_sprite(&sheet) {
                            log::warn!("Keeping placeholder skier: {}", e);
                        }
                    }
                    None => self.sprite = Some(sheet),
                }
            }
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            match render_state.render(&self.session.state, &self.settings) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    let (width, height) = render_state.size;
                    render_state.resize(width, height);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Cancel the frame callback and the level clock. Safe to repeat.
        fn teardown(&mut self) {
            if let Some(window) = web_sys::window() {
                if let Some(handle) = self.raf_handle.take() {
                    let _ = window.cancel_animation_frame(handle);
                }
                if let Some(handle) = self.clock_handle.take() {
                    window.clear_interval_with_handle(handle);
                }
            }
            self.session.teardown();
        }
    }

    fn load_tuning() -> Tuning {
        let stored = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|s| s.get_item(TUNING_KEY).ok().flatten());
        match stored.map(|json| Tuning::from_json(&json)) {
            Some(Ok(tuning)) => {
                log::info!("Using tuning override from LocalStorage");
                tuning
            }
            Some(Err(e)) => {
                log::warn!("Ignoring tuning override: {}", e);
                Tuning::default()
            }
            None => Tuning::default(),
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Powder Run starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let audio = Rc::new(RefCell::new(AudioManager::from_settings(&settings)));
        let board = Rc::new(RefCell::new(SessionLeaderboard::load()));
        let hud = DomHud {
            document: document.clone(),
            show_toasts: settings.toasts,
            board: board.clone(),
        };
        let services = Services::new(SharedAudio(audio.clone()), SharedBoard(board), hud);

        let seed = js_sys::Date::now() as u64;
        let session = Session::new(
            seed,
            load_tuning(),
            settings.quality.mesh_resolution(),
            PlayerProfile::default(),
            services,
            now_ms(),
        );

        let game = Rc::new(RefCell::new(Game {
            session,
            render_state: None,
            settings,
            audio,
            sprite: None,
            left_held: false,
            right_held: false,
            drag_x: None,
            raf_handle: None,
            clock_handle: None,
        }));

        // Simulation and clock run while the GPU and sprite load
        start_clock(game.clone());
        load_sprite(game.clone());
        setup_input_handlers(&canvas, game.clone());
        setup_focus_handlers(game.clone());
        setup_teardown(game.clone());

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height).await;
        game.borrow_mut().render_state = Some(render_state);

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Powder Run running with seed {}", seed);
    }

    fn start_clock(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut()>::new({
            let game = game.clone();
            move || game.borrow_mut().session.clock(now_ms())
        });
        let handle = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                250,
            )
            .ok();
        game.borrow_mut().clock_handle = handle;
        closure.forget();
    }

    /// Fetch the sprite sheet and decode it to RGBA through a 2D canvas
    fn load_sprite(game: Rc<RefCell<Game>>) {
        let Ok(image) = HtmlImageElement::new() else {
            log::warn!("Image element unavailable, using placeholder skier");
            return;
        };

        let onload = Closure::<dyn FnMut()>::new({
            let image = image.clone();
            move || match decode_image(&image) {
                Some(Ok(sheet)) => {
                    log::info!("Sprite sheet loaded ({}x{})", sheet.width(), sheet.height());
                    game.borrow_mut().sprite = Some(sheet);
                }
                Some(Err(e)) => log::warn!("Sprite sheet rejected, using placeholder: {}", e),
                None => log::warn!("Sprite sheet could not be decoded, using placeholder"),
            }
        });
        let onerror = Closure::<dyn FnMut()>::new(|| {
            log::warn!("Sprite sheet failed to load, using placeholder");
        });

        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        image.set_src(SPRITE_URL);
        onload.forget();
        onerror.forget();
    }

    fn decode_image(
        image: &HtmlImageElement,
    ) -> Option<Result<SpriteSheet, powder_run::renderer::SpriteError>> {
        let (w, h) = (image.natural_width(), image.natural_height());
        let document = web_sys::window()?.document()?;
        let canvas: HtmlCanvasElement = document.create_element("canvas").ok()?.dyn_into().ok()?;
        canvas.set_width(w);
        canvas.set_height(h);
        let ctx: CanvasRenderingContext2d = canvas.get_context("2d").ok()??.dyn_into().ok()?;
        ctx.draw_image_with_html_image_element(image, 0.0, 0.0).ok()?;
        let data = ctx.get_image_data(0.0, 0.0, w as f64, h as f64).ok()?;
        Some(SpriteSheet::new(w, h, data.data().0))
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Keyboard steering and level advance
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                g.audio.borrow().resume();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.left_held = true,
                    "ArrowRight" | "d" | "D" => g.right_held = true,
                    " " | "Enter" => {
                        if g.session.phase() == GamePhase::LevelComplete {
                            g.session.advance_level(now_ms());
                        }
                    }
                    _ => return,
                }
                g.update_direction();
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.left_held = false,
                    "ArrowRight" | "d" | "D" => g.right_held = false,
                    _ => return,
                }
                g.update_direction();
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer drag steering (mouse and touch)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                g.audio.borrow().resume();
                g.drag_x = Some(event.client_x() as f32);
                if g.session.phase() == GamePhase::LevelComplete {
                    g.session.advance_level(now_ms());
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                if let Some(last) = g.drag_x {
                    let x = event.client_x() as f32;
                    g.session.add_drag(x - last);
                    g.drag_x = Some(x);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        for name in ["pointerup", "pointercancel", "pointerleave"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                game.borrow_mut().drag_x = None;
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_focus_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let g = game.borrow();
                let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                if g.settings.mute_on_blur {
                    g.audio.borrow_mut().set_muted(hidden);
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        for (name, muted) in [("blur", true), ("focus", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let g = game.borrow();
                if g.settings.mute_on_blur {
                    g.audio.borrow_mut().set_muted(muted);
                }
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_teardown(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().teardown();
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::once({
            let game = game.clone();
            move |_time: f64| game_loop(game)
        });
        let handle = window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .ok();
        game.borrow_mut().raf_handle = handle;
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            g.raf_handle = None;
            if g.session.is_torn_down() {
                return;
            }
            g.session.frame(now_ms());
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Powder Run (native) starting...");
    log::info!("Native build runs a headless demo - use `trunk serve` for the web version");

    headless::run(3);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use powder_run::consts::{PLAYER_Z, SIM_DT};
    use powder_run::services::{LogFeedback, PlayerProfile, Services};
    use powder_run::sim::{CollectibleKind, GamePhase, GameState, ObjectKind};
    use powder_run::{Session, SessionLeaderboard, Settings, Tuning};

    /// How far ahead the autopilot looks
    const LOOKAHEAD: f32 = 25.0;

    /// Steer away from obstacles and pizza, toward everything else
    fn autopilot(state: &GameState) -> i8 {
        let x = state.player.render_x;
        let mut best: Option<(f32, f32)> = None;
        for obj in state.spawner.pool.live() {
            let ahead = PLAYER_Z - obj.pos.z;
            if obj.hit || ahead <= 0.0 || ahead > LOOKAHEAD {
                continue;
            }
            let avoid = obj.kind.is_obstacle()
                || obj.kind == ObjectKind::Collectible(CollectibleKind::Pizza);
            let dx = obj.pos.x - x;
            if avoid && dx.abs() > 2.0 {
                continue;
            }
            if best.is_none_or(|(d, _)| ahead < d) {
                let pull = if avoid { -dx.signum() } else { dx };
                best = Some((ahead, pull));
            }
        }
        match best {
            Some((_, pull)) if pull.abs() > 0.3 => pull.signum() as i8,
            // Drift back toward the middle of the run
            _ if x.abs() > 4.0 => -x.signum() as i8,
            _ => 0,
        }
    }

    pub fn run(levels: u32) {
        let settings = Settings::load();
        let seed = 0x5EED;
        let mut session = Session::new(
            seed,
            Tuning::default(),
            settings.quality.mesh_resolution(),
            PlayerProfile {
                name: "Autopilot".to_string(),
                thumbnail: None,
            },
            Services::new(LogFeedback, SessionLeaderboard::new(), LogFeedback),
            0.0,
        );

        let frame_ms = SIM_DT * 1000.0;
        let mut now = 0.0;
        while session.state.level <= levels {
            now += frame_ms;
            session.clock(now);
            match session.phase() {
                GamePhase::Playing => {
                    session.set_direction(autopilot(&session.state));
                    session.frame(now);
                }
                GamePhase::LevelComplete => {
                    let hud = session.hud();
                    println!(
                        "Level {:>2}: {:>6} points after {} steps",
                        hud.level, hud.score, session.state.steps
                    );
                    if hud.level == levels {
                        break;
                    }
                    session.advance_level(now);
                }
            }
        }
        session.teardown();
        println!("Headless run finished");
    }
}
