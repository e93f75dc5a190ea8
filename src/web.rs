//! Browser binding
//!
//! A JS render loop owns a [`WebGame`], forwards DOM key events to it, calls
//! [`WebGame::frame`] from `requestAnimationFrame` and reads back JSON for
//! drawing, the HUD, the quiz modal and sound effects.

use wasm_bindgen::prelude::*;

use crate::autopilot;
use crate::input::InputCollector;
use crate::quiz::QuestionBank;
use crate::session::Session;
use crate::settings::{QualityPreset, Settings};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already set: {e}").into());
    }
    log::info!("Quiz Invaders loaded");
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_err)
}

#[wasm_bindgen]
pub struct WebGame {
    session: Session,
    input: InputCollector,
    settings: Settings,
    autopilot: bool,
}

#[wasm_bindgen]
impl WebGame {
    /// Game with the built-in question bank
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebGame, JsValue> {
        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();
        let bank = QuestionBank::builtin(seed)
            .map_err(js_err)?
            .banded(settings.banded_questions);
        Ok(Self::from_parts(
            Session::new(seed, Tuning::default(), bank),
            settings,
        ))
    }

    /// Game with a caller-supplied question bank and optional tuning overrides
    pub fn with_questions(questions_json: &str, tuning_json: Option<String>) -> Result<WebGame, JsValue> {
        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();
        let bank = QuestionBank::from_json(questions_json, seed)
            .map_err(js_err)?
            .banded(settings.banded_questions);
        let tuning = match tuning_json {
            Some(json) => Tuning::from_json(&json).map_err(js_err)?,
            None => Tuning::default(),
        };
        Ok(Self::from_parts(Session::new(seed, tuning, bank), settings))
    }

    pub fn key_down(&mut self, key: &str) -> bool {
        self.input.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.input.key_up(key)
    }

    /// Window lost focus: drop held keys and pause
    pub fn blur(&mut self) {
        self.input.clear();
        self.session.pause();
    }

    /// Advance one display frame (`dt` in seconds)
    pub fn frame(&mut self, dt: f32) {
        if self.input.take_pause() {
            self.session.toggle_pause();
        }
        let intents = if self.autopilot {
            autopilot::steer(self.session.simulation())
        } else {
            self.input.intents()
        };
        self.session.frame(dt, &intents);
    }

    pub fn start(&mut self) {
        self.session.start();
    }

    pub fn restart(&mut self) {
        self.input.clear();
        self.session.restart();
    }

    pub fn quit_to_menu(&mut self) {
        self.input.clear();
        self.session.quit_to_menu();
    }

    pub fn toggle_pause(&mut self) {
        self.session.toggle_pause();
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.autopilot = on;
    }

    /// Answer the open quiz; returns the outcome as JSON, or `null` when no quiz is open
    pub fn submit_answer(&mut self, answer: &str) -> Result<String, JsValue> {
        to_json(&self.session.submit_answer(answer))
    }

    pub fn state(&self) -> String {
        self.session.state().as_str().to_string()
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        to_json(&self.session.snapshot())
    }

    pub fn stats_json(&self) -> Result<String, JsValue> {
        to_json(self.session.stats())
    }

    pub fn accuracy(&self) -> f32 {
        self.session.stats().accuracy()
    }

    /// Open question as JSON, or `null`
    pub fn question_json(&self) -> Result<String, JsValue> {
        to_json(&self.session.current_question())
    }

    /// Events since the last call, as a JSON array of names
    pub fn drain_events_json(&mut self) -> Result<String, JsValue> {
        to_json(&self.session.drain_events())
    }

    pub fn settings_json(&self) -> Result<String, JsValue> {
        to_json(&self.settings)
    }

    /// Switch quality preset by name; returns false for unknown names
    pub fn set_quality(&mut self, name: &str) -> bool {
        let Some(preset) = QualityPreset::parse(name) else {
            return false;
        };
        self.settings.quality = preset;
        self.settings_changed();
        true
    }

    pub fn set_particles(&mut self, on: bool) {
        self.settings.particles = on;
        self.settings_changed();
    }
}

impl WebGame {
    fn from_parts(mut session: Session, settings: Settings) -> WebGame {
        session.apply_settings(&settings);
        WebGame {
            session,
            input: InputCollector::new(),
            settings,
            autopilot: false,
        }
    }

    fn settings_changed(&mut self) {
        self.session.apply_settings(&self.settings);
        self.settings.save();
    }
}
