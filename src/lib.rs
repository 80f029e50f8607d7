// ==================== Imports ====================
use wasm_bindgen::prelude::*;

mod browser;
mod game;

pub mod config;
pub mod dice;
pub mod engine;
pub mod hud;
pub mod intro;
pub mod player;
pub mod scene;
pub mod session;
pub mod timer;

use engine::GameLoop;
use game::JavaSquirrel;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - routes panics and `log` records to the browser console
/// - spawns the game loop
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    #[cfg(target_arch = "wasm32")]
    console_log::init_with_level(log::Level::Debug)
        .map_err(|err| JsValue::from_str(&format!("logger already set : {}", err)))?;

    browser::spawn_local(async move {
        if let Err(err) = GameLoop::start(JavaSquirrel::new()).await {
            log::error!("could not start the game : {:#}", err);
        }
    });

    Ok(())
}
