//! JavaScript bindings
//!
//! The host page creates a `WebGame` once the player is authorized, forwards
//! keyboard and touch input, and receives snapshots through a callback.

use std::cell::{Cell, RefCell};

use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::assets::AssetManifest;
use crate::assets::web::load_bundle;
use crate::engine::{
    AnimationFrameScheduler, CallbackObserver, Engine, EngineHandle, EngineSlot, Snapshot,
};
use crate::input::{InputAggregator, InputCommand};
use crate::renderer::canvas::CanvasSurface;
use crate::settings::Settings;
use crate::sim::RunPhase;
use crate::tuning::Difficulty;
use crate::ControlIntent;

thread_local! {
    /// One live engine per page
    static SLOT: RefCell<EngineSlot<CanvasSurface, AnimationFrameScheduler>> =
        RefCell::new(EngineSlot::new());
    static GENERATION: Cell<u64> = const { Cell::new(0) };
}

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already installed by an earlier init
        return;
    }
    log::info!("Astro Gate module loaded");
}

fn snapshot_to_js(snapshot: &Snapshot) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(snapshot).map_err(|err| JsValue::from_str(&err.to_string()))?;
    js_sys::JSON::parse(&json)
}

/// Page-facing handle to the running game
#[wasm_bindgen]
pub struct WebGame {
    handle: EngineHandle<CanvasSurface>,
    input: InputAggregator,
    generation: u64,
}

#[wasm_bindgen]
impl WebGame {
    /// Load assets and start a fresh engine on `canvas`
    ///
    /// Any previous game on the page is destroyed first. `difficulty` and
    /// `seed` override the stored settings when given.
    pub async fn create(
        canvas: HtmlCanvasElement,
        difficulty: Option<String>,
        seed: Option<f64>,
        base_url: Option<String>,
    ) -> Result<WebGame, JsError> {
        let mut settings = Settings::load();
        if let Some(tier) = difficulty.as_deref().and_then(Difficulty::from_str) {
            settings.difficulty = tier;
        }
        let mut options = settings.engine_options();
        if let Some(seed) = seed {
            options.seed = seed as u64;
        }

        let mut manifest = AssetManifest::default();
        if let Some(base_url) = base_url {
            manifest.base_url = base_url;
        }
        let assets = load_bundle(&manifest).await?;

        let handle = SLOT.with(|slot| {
            let mut slot = slot.borrow_mut();
            let engine = slot.launch(|| {
                Engine::new(&canvas, options, assets, AnimationFrameScheduler::new())
            })?;
            Ok::<_, JsError>(engine.handle())
        })?;
        let generation = GENERATION.with(|g| {
            g.set(g.get() + 1);
            g.get()
        });

        Ok(WebGame {
            handle,
            input: InputAggregator::new(),
            generation,
        })
    }

    /// Store player settings; they apply from the next `create`
    ///
    /// Returns the settings actually stored (defaults if `json` is unreadable).
    pub fn set_settings(json: &str) -> String {
        Settings::store_json(json).to_json()
    }

    /// Currently stored player settings as JSON
    pub fn settings() -> String {
        Settings::load().to_json()
    }

    /// Begin the frame loop
    ///
    /// `on_update` receives `{ score, isGameOver, isPaused }` every frame;
    /// `on_game_over` receives the final score once.
    pub fn start(&self, on_update: js_sys::Function, on_game_over: Option<js_sys::Function>) {
        if !self.is_current() {
            log::warn!("start() on a replaced game ignored");
            return;
        }
        let observer = CallbackObserver::new(
            move |snapshot: &Snapshot| {
                let value = snapshot_to_js(snapshot)?;
                on_update.call1(&JsValue::NULL, &value).map(|_| ())
            },
            on_game_over.map(|callback| {
                move |score: u64| {
                    callback
                        .call1(&JsValue::NULL, &JsValue::from_f64(score as f64))
                        .map(|_| ())
                }
            }),
        );
        SLOT.with(|slot| {
            if let Some(engine) = slot.borrow_mut().current_mut() {
                engine.start(observer);
            }
        });
    }

    /// Directly set the control intent (custom input schemes)
    pub fn set_controls(&self, lateral: f32, firing: bool) {
        self.handle.set_controls(ControlIntent::new(lateral, firing));
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.handle.set_paused(paused);
        self.sync_controls();
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        snapshot_to_js(&self.handle.snapshot())
    }

    /// Forward a `keydown`; returns true if the game consumed the key
    pub fn key_down(&mut self, code: &str, repeat: bool) -> bool {
        if !InputAggregator::handles(code) {
            return false;
        }
        if let Some(InputCommand::TogglePause) = self.input.key_down(code, repeat) {
            let paused = self.handle.snapshot().is_paused;
            self.handle.set_paused(!paused);
        }
        self.sync_controls();
        true
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        if !InputAggregator::handles(code) {
            return false;
        }
        self.input.key_up(code);
        self.sync_controls();
        true
    }

    /// Joystick offset from the pad center; returns the clamped `[dx, dy]`
    pub fn joystick_moved(&mut self, dx: f32, dy: f32) -> Vec<f32> {
        let (dx, dy) = self.input.joystick_moved(dx, dy);
        self.sync_controls();
        vec![dx, dy]
    }

    pub fn joystick_released(&mut self) {
        self.input.joystick_released();
        self.sync_controls();
    }

    pub fn set_touch_fire(&mut self, pressed: bool) {
        self.input.set_touch_fire(pressed);
        self.sync_controls();
    }

    /// Stop this game's frame loop; a no-op if it was already replaced
    pub fn destroy(&self) {
        if self.is_current() {
            SLOT.with(|slot| slot.borrow_mut().teardown());
        }
    }
}

impl WebGame {
    fn is_current(&self) -> bool {
        GENERATION.with(|g| g.get() == self.generation)
    }

    fn sync_controls(&mut self) {
        if self.handle.phase() != RunPhase::Running {
            self.input.release_touch();
        }
        self.handle.set_controls(self.input.intent());
    }
}
