//! Under or Higher core crate.
//!
//! Two artist cards are shown and the player calls which one has more monthly
//! listeners. Correct calls extend a streak that survives page reloads; the
//! first wrong call ends the run.
//!
//! Native code drives a [`Session`] directly (tests, tooling). In the browser
//! the [`web`] module owns a session and exposes it to the host page, which is
//! responsible for all rendering, animation and audio.

use wasm_bindgen::prelude::*;

pub mod catalog;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod persistence;
pub mod rng;
pub mod round;
pub mod selector;
pub mod web;

pub use catalog::{Artist, Catalog, Tiers, format_listeners};
pub use config::GameConfig;
pub use difficulty::{Difficulty, next_difficulty};
pub use error::{CatalogError, GameError, PersistenceError};
pub use persistence::{MemoryStorage, PersistenceGateway, SavedRound, StorageBackend};
pub use rng::FixedSequence;
pub use round::{GameEvent, Phase, RoundState, RoundView, Session, Side};
pub use selector::{MatchSelector, closeness_ratio, left_wins};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    web::init_console_logging(log::LevelFilter::Info);
}
