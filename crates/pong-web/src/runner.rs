use pong_engine::{
    build_transform_buffer, EngineContext, FixedTimestep, Game, GameConfig, InputEvent,
    InputQueue, ProtocolLayout, TransformInstance,
};

/// Generic game runner that wires up the engine loop.
///
/// Each concrete game creates a `thread_local!` GameRunner and exports free
/// functions via `#[wasm_bindgen]` (see [`crate::export_game!`]), because
/// wasm-bindgen cannot export generic structs directly.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    timestep: FixedTimestep,
    config: GameConfig,
    layout: ProtocolLayout,
    initialized: bool,
    frame: u32,
    transforms: Vec<TransformInstance>,
    /// Flat buffer of sound event IDs for SharedArrayBuffer reads.
    sound_buffer: Vec<u8>,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        let timestep = FixedTimestep::new(config.fixed_dt);
        let layout = ProtocolLayout::from_config(&config);

        Self {
            ctx: EngineContext::with_config(&config),
            input: InputQueue::new(),
            timestep,
            layout,
            transforms: Vec::with_capacity(config.max_transforms),
            sound_buffer: Vec::with_capacity(config.max_sounds),
            config,
            game,
            initialized: false,
            frame: 0,
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.game.init(&mut self.ctx);
        self.initialized = true;
        self.publish();
    }

    /// Swap in a new game and start it on a fresh context. Pending input is
    /// dropped; the frame counter keeps running so the host sees a new frame.
    pub fn restart(&mut self, game: G) {
        let config = game.config();
        self.timestep = FixedTimestep::new(config.fixed_dt);
        self.layout = ProtocolLayout::from_config(&config);
        self.ctx = EngineContext::with_config(&config);
        self.input = InputQueue::new();
        self.transforms = Vec::with_capacity(config.max_transforms);
        self.sound_buffer = Vec::with_capacity(config.max_sounds);
        self.config = config;
        self.game = game;
        self.init();
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one frame: step physics and game logic at the fixed rate, then
    /// republish the per-frame buffers.
    ///
    /// Queued input is delivered to the first fixed step of the frame only.
    /// A frame with no fixed step keeps its input for the next frame.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        let steps = self.timestep.accumulate(dt);
        if steps == 0 {
            return;
        }

        self.ctx.clear_frame_data();
        let input = InputQueue::from(self.input.drain());
        let idle = InputQueue::new();
        for step in 0..steps {
            #[cfg(feature = "physics")]
            self.ctx.step_physics();
            let queue = if step == 0 { &input } else { &idle };
            self.game.update(&mut self.ctx, queue);
        }

        self.frame = self.frame.wrapping_add(1);
        self.publish();
    }

    fn publish(&mut self) {
        build_transform_buffer(self.ctx.scene.iter(), &mut self.transforms, self.layout.max_transforms);
        self.ctx.overlay.rebuild_segments();

        self.sound_buffer.clear();
        for sound in self.ctx.sounds.iter().take(self.layout.max_sounds) {
            self.sound_buffer.push(sound.0 as u8);
        }
        self.ctx.events.truncate(self.layout.max_events);
    }

    /// Header floats for the current frame (see `pong_engine::bridge::protocol`).
    pub fn header(&self) -> Vec<f32> {
        self.layout
            .header(
                &self.config,
                self.frame,
                [
                    self.transforms.len(),
                    self.ctx.overlay.segment_count(),
                    self.sound_buffer.len(),
                    self.ctx.events.len(),
                ],
            )
            .to_vec()
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    // ---- Pointer accessors for SharedArrayBuffer reads ----

    pub fn transforms_ptr(&self) -> *const f32 {
        self.transforms.as_ptr() as *const f32
    }

    pub fn transform_count(&self) -> u32 {
        self.transforms.len() as u32
    }

    pub fn overlay_ptr(&self) -> *const f32 {
        self.ctx.overlay.segments_ptr()
    }

    pub fn overlay_segment_count(&self) -> u32 {
        self.ctx.overlay.segment_count() as u32
    }

    pub fn sound_events_ptr(&self) -> *const u8 {
        self.sound_buffer.as_ptr()
    }

    pub fn sound_events_len(&self) -> u32 {
        self.sound_buffer.len() as u32
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        self.ctx.events.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.ctx.events.len() as u32
    }

    pub fn world_width(&self) -> f32 {
        self.config.world_width
    }

    pub fn world_height(&self) -> f32 {
        self.config.world_height
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }
}
