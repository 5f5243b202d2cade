//! Horses core crate.
//!
//! A herd of horses walks a grid eating apples; every apple reveals the next
//! narrator line and its effect (inverted controls, speed changes, wrapping
//! walls, ...). The simulation (`grid`, `input`, `herd`, `narrator`, `config`,
//! `game`) is plain Rust and runs natively under `cargo test`; `web` hosts it in
//! the browser behind the `start_game()` entrypoint.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod game;
pub mod grid;
pub mod herd;
pub mod input;
pub mod narrator;
pub mod web;

pub use config::{ConfigError, GameConfig};
pub use game::{Effect, Game, GameState, ManualScheduler, Renderer, Scheduler, TickOutcome, TimerHandle};
pub use grid::{Bounds, Cell};
pub use herd::Herd;
pub use input::{Direction, DirectionResolver};
pub use narrator::{NARRATOR_SCRIPT, Narrator, NarratorLine};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    web::init_logger();
}

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    web::start(GameConfig::default())
}

/// Start with a JSON config, e.g. `{"gridWidth": 12, "tickMs": 200}`.
#[wasm_bindgen]
pub fn start_game_with_config(config_json: &str) -> Result<(), JsValue> {
    let config = GameConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    web::start(config)
}

#[wasm_bindgen]
pub fn restart_game() -> Result<(), JsValue> {
    web::restart()
}
