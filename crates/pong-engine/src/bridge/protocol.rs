/// SharedArrayBuffer layout.
/// Must stay in sync with the host-side protocol reader.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 12 floats]
/// [Transforms: max_transforms × 6 floats]
/// [Overlay: max_overlay_segments × 6 floats]
/// [Sounds: max_sounds × 1 float]
/// [Events: max_events × 4 floats]
/// ```
///
/// Capacities are written once into the header at init; the host reads them
/// back to compute section offsets.

use crate::api::game::GameConfig;
use crate::api::types::GameEvent;
use crate::systems::overlay::OverlaySegment;
use crate::systems::snapshot::TransformInstance;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 12;

/// Header field indices.
pub const HEADER_FRAME_COUNTER: usize = 0;
pub const HEADER_PROTOCOL_VERSION: usize = 1;
pub const HEADER_WORLD_WIDTH: usize = 2;
pub const HEADER_WORLD_HEIGHT: usize = 3;
pub const HEADER_MAX_TRANSFORMS: usize = 4;
pub const HEADER_TRANSFORM_COUNT: usize = 5;
pub const HEADER_MAX_OVERLAY_SEGMENTS: usize = 6;
pub const HEADER_OVERLAY_SEGMENT_COUNT: usize = 7;
pub const HEADER_MAX_SOUNDS: usize = 8;
pub const HEADER_SOUND_COUNT: usize = 9;
pub const HEADER_MAX_EVENTS: usize = 10;
pub const HEADER_EVENT_COUNT: usize = 11;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_transforms: usize,
    pub max_overlay_segments: usize,
    pub max_sounds: usize,
    pub max_events: usize,

    pub transform_data_offset: usize,
    pub overlay_data_offset: usize,
    pub sound_data_offset: usize,
    pub event_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
}

impl ProtocolLayout {
    /// Compute layout from raw capacity values.
    pub fn new(
        max_transforms: usize,
        max_overlay_segments: usize,
        max_sounds: usize,
        max_events: usize,
    ) -> Self {
        let transform_data_offset = HEADER_FLOATS;
        let overlay_data_offset = transform_data_offset + max_transforms * TransformInstance::FLOATS;
        let sound_data_offset = overlay_data_offset + max_overlay_segments * OverlaySegment::FLOATS;
        let event_data_offset = sound_data_offset + max_sounds;
        let buffer_total_floats = event_data_offset + max_events * GameEvent::FLOATS;

        Self {
            max_transforms,
            max_overlay_segments,
            max_sounds,
            max_events,
            transform_data_offset,
            overlay_data_offset,
            sound_data_offset,
            event_data_offset,
            buffer_total_floats,
        }
    }

    /// Compute layout from a GameConfig.
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.max_transforms,
            config.max_overlay_segments,
            config.max_sounds,
            config.max_events,
        )
    }

    /// Header values for a frame, indexed by the `HEADER_*` constants.
    pub fn header(
        &self,
        config: &GameConfig,
        frame: u32,
        counts: [usize; 4],
    ) -> [f32; HEADER_FLOATS] {
        let [transforms, segments, sounds, events] = counts;
        let mut header = [0.0; HEADER_FLOATS];
        header[HEADER_FRAME_COUNTER] = frame as f32;
        header[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        header[HEADER_WORLD_WIDTH] = config.world_width;
        header[HEADER_WORLD_HEIGHT] = config.world_height;
        header[HEADER_MAX_TRANSFORMS] = self.max_transforms as f32;
        header[HEADER_TRANSFORM_COUNT] = transforms.min(self.max_transforms) as f32;
        header[HEADER_MAX_OVERLAY_SEGMENTS] = self.max_overlay_segments as f32;
        header[HEADER_OVERLAY_SEGMENT_COUNT] = segments.min(self.max_overlay_segments) as f32;
        header[HEADER_MAX_SOUNDS] = self.max_sounds as f32;
        header[HEADER_SOUND_COUNT] = sounds.min(self.max_sounds) as f32;
        header[HEADER_MAX_EVENTS] = self.max_events as f32;
        header[HEADER_EVENT_COUNT] = events.min(self.max_events) as f32;
        header
    }
}
