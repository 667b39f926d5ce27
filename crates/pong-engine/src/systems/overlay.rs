//! Overlay polylines: guide lines and trails drawn on top of the scene.
//!
//! Games push polylines every frame; the runner flattens them into a
//! segment buffer the host draws as plain lines.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// One line segment on the wire: 6 floats = 24 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct OverlaySegment {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub width: f32,
    pub alpha: f32,
}

impl OverlaySegment {
    pub const FLOATS: usize = 6;
}

#[derive(Debug, Clone)]
pub struct Polyline {
    pub points: Vec<Vec2>,
    pub width: f32,
    pub alpha: f32,
}

/// Per-frame overlay state.
pub struct OverlayState {
    pub polylines: Vec<Polyline>,
    segments: Vec<OverlaySegment>,
    max_segments: usize,
}

impl OverlayState {
    pub fn new(max_segments: usize) -> Self {
        Self {
            polylines: Vec::new(),
            segments: Vec::with_capacity(max_segments),
            max_segments,
        }
    }

    /// Queue a polyline for this frame. Fewer than two points draws nothing.
    pub fn add_polyline(&mut self, points: Vec<Vec2>, width: f32, alpha: f32) {
        if points.len() < 2 {
            return;
        }
        self.polylines.push(Polyline { points, width, alpha });
    }

    /// Drop this frame's polylines (call before re-drawing).
    pub fn clear(&mut self) {
        self.polylines.clear();
    }

    /// Flatten polylines into the segment buffer, truncating at capacity.
    pub fn rebuild_segments(&mut self) {
        self.segments.clear();
        'lines: for line in &self.polylines {
            for pair in line.points.windows(2) {
                if self.segments.len() >= self.max_segments {
                    log::warn!("overlay: segment capacity {} reached", self.max_segments);
                    break 'lines;
                }
                self.segments.push(OverlaySegment {
                    x0: pair[0].x,
                    y0: pair[0].y,
                    x1: pair[1].x,
                    y1: pair[1].y,
                    width: line.width,
                    alpha: line.alpha,
                });
            }
        }
    }

    pub fn segments(&self) -> &[OverlaySegment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segments_ptr(&self) -> *const f32 {
        self.segments.as_ptr() as *const f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_is_six_floats() {
        assert_eq!(std::mem::size_of::<OverlaySegment>(), OverlaySegment::FLOATS * 4);
    }

    #[test]
    fn polyline_flattens_into_segments() {
        let mut overlay = OverlayState::new(16);
        overlay.add_polyline(vec![Vec2::ZERO, Vec2::X, Vec2::ONE], 2.0, 0.5);
        overlay.add_polyline(vec![Vec2::ZERO], 2.0, 0.5);
        overlay.rebuild_segments();
        assert_eq!(overlay.segment_count(), 2);
        assert_eq!(overlay.segments()[1].x0, 1.0);
        assert_eq!(overlay.segments()[1].y1, 1.0);
    }

    #[test]
    fn rebuild_truncates_at_capacity() {
        let mut overlay = OverlayState::new(3);
        let points: Vec<Vec2> = (0..10).map(|i| Vec2::new(i as f32, 0.0)).collect();
        overlay.add_polyline(points, 1.0, 1.0);
        overlay.rebuild_segments();
        assert_eq!(overlay.segment_count(), 3);
        overlay.clear();
        overlay.rebuild_segments();
        assert_eq!(overlay.segment_count(), 0);
    }
}
