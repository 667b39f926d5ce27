pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod bridge;
pub mod input;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext};
pub use api::types::{EntityId, PartId, SoundEvent, GameEvent};
pub use components::entity::Entity;
pub use core::scene::Scene;
pub use core::time::{FixedTimestep, TimerId, TimerQueue};
pub use input::queue::{InputEvent, InputQueue};
pub use input::drag::{DragEvent, DragGesture};
pub use bridge::protocol::ProtocolLayout;
pub use systems::overlay::{OverlayState, OverlaySegment, Polyline};
pub use systems::snapshot::{TransformInstance, build_transform_buffer};

#[cfg(feature = "physics")]
pub use core::physics::{
    PhysicsWorld, PhysicsBody, BodyDesc, BodyType,
    ColliderDesc, ColliderMaterial, CollisionPair,
    JointHandle, SpringDesc,
};
