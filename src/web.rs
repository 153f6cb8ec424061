//! Browser surface.
//!
//! One session lives in a thread-local slot, driven by a
//! `requestAnimationFrame` loop that applies due promotions. The host page
//! calls the exported functions on clicks and polls `drain_events_json()` /
//! `snapshot_json()` to render cards, counters, overlays and sounds.

use std::cell::{Cell, RefCell};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::{Storage, window};

use crate::catalog::{Catalog, format_listeners};
use crate::config::GameConfig;
use crate::error::{GameError, PersistenceError};
use crate::persistence::StorageBackend;
use crate::round::{GameEvent, Phase, RoundView, Session, Side};

// --- localStorage backend ---------------------------------------------------

pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, PersistenceError> {
        let win = window().ok_or_else(|| PersistenceError::Backend("no window".into()))?;
        let storage = win
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| PersistenceError::Backend("localStorage disabled".into()))?;
        Ok(Self { storage })
    }
}

impl StorageBackend for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.storage.remove_item(key).map_err(js_error)
    }
}

fn js_error(v: JsValue) -> PersistenceError {
    PersistenceError::Backend(v.as_string().unwrap_or_else(|| format!("{v:?}")))
}

// --- Console logging --------------------------------------------------------

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            log::Level::Info => web_sys::console::info_1(&line),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Route `log` records to the browser console. Safe to call more than once.
pub fn init_console_logging(level: log::LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

// --- Session slot & frame loop ----------------------------------------------

type WebSession = Session<LocalStorage, StdRng>;

struct WebGame {
    session: WebSession,
    events: Vec<GameEvent>,
}

thread_local! {
    static GAME: RefCell<Option<WebGame>> = const { RefCell::new(None) };
    static LOOP_RUNNING: Cell<bool> = const { Cell::new(false) };
}

type FrameCallback = std::rc::Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn request_frame(cb: &Closure<dyn FnMut(f64)>) {
    use wasm_bindgen::JsCast;
    if let Some(w) = window() {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

fn start_frame_loop() {
    if LOOP_RUNNING.with(|r| r.replace(true)) {
        return;
    }
    let f: FrameCallback = std::rc::Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        GAME.with(|cell| {
            if let Some(game) = cell.borrow_mut().as_mut() {
                let events = game.session.tick(ts);
                game.events.extend(events);
            }
        });
        if let Some(cb) = f.borrow().as_ref() {
            request_frame(cb);
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(cb) = g.borrow().as_ref() {
        request_frame(cb);
    }
}

fn with_game<T>(f: impl FnOnce(&mut WebGame) -> T) -> Option<T> {
    GAME.with(|cell| cell.borrow_mut().as_mut().map(f))
}

// --- Exports ----------------------------------------------------------------

/// Enter (or resume) the game mode. `catalog_json` defaults to the bundled
/// dataset; `config_json` may be partial.
#[wasm_bindgen]
pub fn start_game(catalog_json: Option<String>, config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json {
        Some(json) => GameConfig::from_json(&json),
        None => Ok(GameConfig::default()),
    }
    .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let catalog = match catalog_json {
        Some(json) => Catalog::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => Catalog::sample(),
    };
    let storage = LocalStorage::open().map_err(|e| JsValue::from_str(&e.to_string()))?;
    let mut session = Session::new(catalog, config, storage, StdRng::from_entropy())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let events = session
        .start(performance_now())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    GAME.with(|cell| cell.replace(Some(WebGame { session, events })));
    start_frame_loop();
    Ok(())
}

/// Submit a guess (`"left"` / `"right"`). Returns whether it was accepted.
#[wasm_bindgen]
pub fn submit_guess(side: &str) -> bool {
    let Some(side) = Side::parse(side) else {
        log::warn!("web: unknown side '{side}'");
        return false;
    };
    with_game(|game| {
        let events = game.session.submit_guess(side, performance_now());
        let accepted = !events.is_empty();
        game.events.extend(events);
        accepted
    })
    .unwrap_or(false)
}

#[wasm_bindgen]
pub fn play_again() -> Result<(), JsValue> {
    with_game(|game| {
        let events = game.session.play_again(performance_now())?;
        game.events.extend(events);
        Ok(())
    })
    .unwrap_or(Ok(()))
    .map_err(|e: GameError| JsValue::from_str(&e.to_string()))
}

/// Leave the game mode; the saved round is kept for the next `start_game`.
#[wasm_bindgen]
pub fn exit_game() {
    with_game(|game| game.session.deactivate());
}

#[derive(Serialize)]
struct Snapshot {
    #[serde(flatten)]
    phase: Phase,
    round: Option<RoundView>,
}

/// Current phase and visible round as JSON.
#[wasm_bindgen]
pub fn snapshot_json() -> Result<String, JsValue> {
    let snapshot = with_game(|game| Snapshot {
        phase: game.session.phase(),
        round: game.session.state().map(|s| s.view()),
    })
    .unwrap_or(Snapshot {
        phase: Phase::Idle,
        round: None,
    });
    serde_json::to_string(&snapshot).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Events produced since the last call, as a JSON array.
#[wasm_bindgen]
pub fn drain_events_json() -> Result<String, JsValue> {
    let events = with_game(|game| std::mem::take(&mut game.events)).unwrap_or_default();
    serde_json::to_string(&events).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen(js_name = formatListeners)]
pub fn format_listeners_js(n: f64) -> String {
    format_listeners(n.max(0.0) as u64)
}
