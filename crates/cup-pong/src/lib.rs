use wasm_bindgen::prelude::*;

pub mod aim;
pub mod anchor;
pub mod ball;
pub mod body;
pub mod collision;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod game;
pub mod level;
pub mod trajectory;

pub use game::CupPong;

pong_web::export_game!(CupPong, "cup-pong");

/// Replace the running game with a level parsed from JSON. A level that does
/// not parse or validate is logged and the built-in level is loaded instead.
#[wasm_bindgen]
pub fn game_load_level(json: &str) {
    let game = CupPong::from_json_or_builtin(json);
    with_runner(|r| r.restart(game));
}
