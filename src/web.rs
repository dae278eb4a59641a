//! Browser binding
//!
//! Wraps an `Engine` for JavaScript. Frames are driven by
//! requestAnimationFrame; a callback whose request went stale (pause, reset,
//! teardown) runs nothing and does not reschedule.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::clock::{FrameOutcome, FrameRequest};
use crate::collaborators::NullSubmitter;
use crate::engine::Engine;
use crate::highscores::LocalStorageBestScoreStore;
use crate::settings::Settings;
use crate::sim::{GameMode, GamePhase, HorizontalInput};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    log::info!("Aqua Arcade starting...");
}

/// One mini-game, playable from JavaScript
#[wasm_bindgen]
pub struct WebArcade {
    engine: Rc<RefCell<Engine>>,
}

#[wasm_bindgen]
impl WebArcade {
    /// `mode` is "jumper", "dodge" or "flyer"; falls back to stored settings
    #[wasm_bindgen(constructor)]
    pub fn new(mode: Option<String>) -> Result<WebArcade, JsValue> {
        let mut settings = Settings::load();
        if let Some(name) = mode {
            settings.mode = GameMode::from_str(&name)
                .ok_or_else(|| JsValue::from_str(&format!("unknown game mode `{}`", name)))?;
            settings.policy = None;
        }
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let store = LocalStorageBestScoreStore::new(settings.mode.game_type());
        let engine = Engine::from_settings(&settings, seed, Box::new(NullSubmitter), Box::new(store))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            engine: Rc::new(RefCell::new(engine)),
        })
    }

    pub fn start(&self) -> bool {
        let request = self.engine.borrow_mut().start();
        self.schedule(request)
    }

    pub fn toggle_pause(&self) -> bool {
        let (before, request) = {
            let mut engine = self.engine.borrow_mut();
            let before = engine.phase();
            (before, engine.toggle_pause())
        };
        self.schedule(request);
        before != self.engine.borrow().phase()
    }

    pub fn quit(&self) -> bool {
        self.engine.borrow_mut().quit()
    }

    pub fn reset(&self) -> bool {
        self.engine.borrow_mut().reset()
    }

    /// -1 left, 1 right, 0 none
    pub fn set_horizontal_input(&self, direction: i32) {
        let input = match direction.signum() {
            -1 => HorizontalInput::Left,
            1 => HorizontalInput::Right,
            _ => HorizontalInput::None,
        };
        self.engine.borrow_mut().set_horizontal_input(input);
    }

    pub fn jump(&self) -> bool {
        self.engine.borrow_mut().jump()
    }

    pub fn tap(&self) -> bool {
        self.engine.borrow_mut().tap()
    }

    pub fn set_score_multiplier(&self, multiplier: u32) -> bool {
        self.engine.borrow_mut().set_score_multiplier(multiplier)
    }

    pub fn is_game_over(&self) -> bool {
        self.engine.borrow().phase() == GamePhase::GameOver
    }

    pub fn is_running(&self) -> bool {
        self.engine.borrow().is_running()
    }

    pub fn best_score(&self) -> f64 {
        self.engine.borrow().best_score() as f64
    }

    /// Current snapshot as JSON
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.engine.borrow().snapshot())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Drain notices as a JSON array
    pub fn take_notices_json(&self) -> Result<String, JsValue> {
        let notices = self.engine.borrow_mut().take_notices();
        serde_json::to_string(&notices).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Stop the frame loop for good (page navigation)
    pub fn teardown(&self) {
        self.engine.borrow_mut().teardown();
    }

    fn schedule(&self, request: Option<FrameRequest>) -> bool {
        match request {
            Some(request) => {
                request_animation_frame(self.engine.clone(), request);
                true
            }
            None => false,
        }
    }
}

fn request_animation_frame(engine: Rc<RefCell<Engine>>, request: FrameRequest) {
    let Some(window) = web_sys::window() else {
        log::error!("No window; frame loop not started");
        return;
    };
    let closure = Closure::once(move |time: f64| {
        game_loop(engine, request, time);
    });
    if window
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .is_err()
    {
        log::error!("requestAnimationFrame failed");
    }
    closure.forget();
}

fn game_loop(engine: Rc<RefCell<Engine>>, request: FrameRequest, time: f64) {
    let outcome = engine.borrow_mut().on_frame(request, time);
    if let FrameOutcome::Ran {
        next: Some(next), ..
    } = outcome
    {
        request_animation_frame(engine, next);
    }
}
