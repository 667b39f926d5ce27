pub mod runner;

pub use runner::GameRunner;
pub use pong_engine;

/// Generate all `#[wasm_bindgen]` exports for a game.
///
/// Generates:
/// - `thread_local!` storage for the GameRunner
/// - `with_runner()` helper function
/// - All wasm-bindgen exports (game_init, game_tick, input handlers, data accessors)
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
/// use pong_engine::*;
///
/// mod game;
/// use game::MyGame;
///
/// pong_web::export_game!(MyGame, "my-game");
/// ```
///
/// The game type must provide `fn new() -> Self`. The caller's crate must
/// depend on `wasm-bindgen`, `log`, `console_log` and `console_error_panic_hook`.
#[macro_export]
macro_rules! export_game {
    ($game_type:ty, $game_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::GameRunner<$game_type>>> = RefCell::new(None);
        }

        /// Runs `f` against the runner. Calls made before `game_init()` are
        /// logged and return `None`.
        fn with_runner<R>(f: impl FnOnce(&mut $crate::GameRunner<$game_type>) -> R) -> Option<R> {
            RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
                Some(runner) => Some(f(runner)),
                None => {
                    log::warn!("{}: called before game_init()", $game_name);
                    None
                }
            })
        }

        #[wasm_bindgen]
        pub fn game_init() {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let runner = $crate::GameRunner::new(<$game_type>::new());
            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });

            with_runner(|r| r.init());
            log::info!("{}: initialized", $game_name);
        }

        #[wasm_bindgen]
        pub fn game_tick(dt: f32) {
            with_runner(|r| r.tick(dt));
        }

        #[wasm_bindgen]
        pub fn game_pointer_down(x: f32, y: f32) {
            with_runner(|r| r.push_input($crate::pong_engine::InputEvent::PointerDown { x, y }));
        }

        #[wasm_bindgen]
        pub fn game_pointer_up(x: f32, y: f32) {
            with_runner(|r| r.push_input($crate::pong_engine::InputEvent::PointerUp { x, y }));
        }

        #[wasm_bindgen]
        pub fn game_pointer_move(x: f32, y: f32) {
            with_runner(|r| r.push_input($crate::pong_engine::InputEvent::PointerMove { x, y }));
        }

        #[wasm_bindgen]
        pub fn game_custom_event(kind: u32, a: f32, b: f32, c: f32) {
            with_runner(|r| r.push_input($crate::pong_engine::InputEvent::Custom { kind, a, b, c }));
        }

        // ---- Data accessors ----

        #[wasm_bindgen]
        pub fn get_header() -> Vec<f32> {
            with_runner(|r| r.header()).unwrap_or_default()
        }

        #[wasm_bindgen]
        pub fn get_transforms_ptr() -> *const f32 {
            with_runner(|r| r.transforms_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_transform_count() -> u32 {
            with_runner(|r| r.transform_count()).unwrap_or_default()
        }

        #[wasm_bindgen]
        pub fn get_overlay_ptr() -> *const f32 {
            with_runner(|r| r.overlay_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_overlay_segment_count() -> u32 {
            with_runner(|r| r.overlay_segment_count()).unwrap_or_default()
        }

        #[wasm_bindgen]
        pub fn get_sound_events_ptr() -> *const u8 {
            with_runner(|r| r.sound_events_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_sound_events_len() -> u32 {
            with_runner(|r| r.sound_events_len()).unwrap_or_default()
        }

        #[wasm_bindgen]
        pub fn get_game_events_ptr() -> *const f32 {
            with_runner(|r| r.game_events_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_game_events_len() -> u32 {
            with_runner(|r| r.game_events_len()).unwrap_or_default()
        }

        #[wasm_bindgen]
        pub fn get_world_width() -> f32 {
            with_runner(|r| r.world_width()).unwrap_or_default()
        }

        #[wasm_bindgen]
        pub fn get_world_height() -> f32 {
            with_runner(|r| r.world_height()).unwrap_or_default()
        }

        #[wasm_bindgen]
        pub fn get_buffer_total_floats() -> u32 {
            with_runner(|r| r.buffer_total_floats()).unwrap_or_default()
        }
    };
}
