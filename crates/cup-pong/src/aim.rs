//! Pull-back geometry: the drag clamp and the ghost box that separates a
//! retraction from a shot.

use glam::Vec2;

/// Clamp `pointer` onto the disc of `radius` around `start`.
///
/// Points inside the disc are returned unchanged; points outside land on its
/// boundary, on the ray from `start` towards `pointer`.
pub fn clamp_to_radius(start: Vec2, pointer: Vec2, radius: f32) -> Vec2 {
    let offset = pointer - start;
    let distance = offset.length();
    if distance <= radius {
        pointer
    } else {
        start + offset * (radius / distance)
    }
}

/// Axis-aligned box given by its center and half extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self { center, half_extents }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// Whether `other` lies entirely inside `self`. Touching edges count as inside.
    pub fn contains(&self, other: &Aabb) -> bool {
        let (min, max) = (self.min(), self.max());
        let (other_min, other_max) = (other.min(), other.max());
        other_min.x >= min.x && other_min.y >= min.y && other_max.x <= max.x && other_max.y <= max.y
    }
}

/// A release counts as a retraction when the ball's bounds sit fully inside
/// the ghost box: the ball bounds at rest, scaled by `ghost_scale`.
pub fn is_retraction(start: Vec2, pos: Vec2, half_extents: Vec2, ghost_scale: f32) -> bool {
    let ghost = Aabb::new(start, half_extents * ghost_scale);
    ghost.contains(&Aabb::new(pos, half_extents))
}

/// Per-step launch velocity for a release at `pos`.
pub fn launch_velocity(start: Vec2, pos: Vec2, speed: f32) -> Vec2 {
    (start - pos) * speed
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: Vec2 = Vec2::new(100.0, 100.0);

    #[test]
    fn clamp_passes_points_inside_the_radius() {
        for pointer in [
            START,
            Vec2::new(150.0, 120.0),
            Vec2::new(195.0, 100.0),
            Vec2::new(100.0, 5.0),
            Vec2::new(30.0, 160.0),
        ] {
            assert_eq!(clamp_to_radius(START, pointer, 95.0), pointer);
        }
    }

    #[test]
    fn clamp_projects_far_points_onto_the_circle() {
        for pointer in [
            Vec2::new(300.0, 100.0),
            Vec2::new(-400.0, -50.0),
            Vec2::new(100.0, 1000.0),
            Vec2::new(180.0, 180.0),
        ] {
            let clamped = clamp_to_radius(START, pointer, 95.0);
            assert!((clamped.distance(START) - 95.0).abs() < 1e-3);
            let along = (clamped - START).normalize();
            let towards = (pointer - START).normalize();
            assert!(along.dot(towards) > 0.9999, "not colinear: {:?} vs {:?}", along, towards);
        }
    }

    #[test]
    fn clamp_pull_along_x() {
        let clamped = clamp_to_radius(START, Vec2::new(300.0, 100.0), 95.0);
        assert!((clamped - Vec2::new(195.0, 100.0)).length() < 1e-4);
    }

    #[test]
    fn small_pull_is_a_retraction() {
        let half = Vec2::splat(16.0);
        assert!(is_retraction(START, START, half, 1.6));
        // Ghost half extent 25.6, ball half extent 16: up to 9.6 of slack.
        assert!(is_retraction(START, START + Vec2::new(9.0, -9.0), half, 1.6));
        assert!(!is_retraction(START, START + Vec2::new(10.0, 0.0), half, 1.6));
        assert!(!is_retraction(START, START + Vec2::new(-60.0, 40.0), half, 1.6));
    }

    #[test]
    fn launch_velocity_points_back_through_the_rest_spot() {
        let v = launch_velocity(START, Vec2::new(20.0, 140.0), 0.15);
        assert!((v - Vec2::new(12.0, -6.0)).length() < 1e-5);
    }

    #[test]
    fn aabb_containment_is_inclusive() {
        let outer = Aabb::new(Vec2::ZERO, Vec2::splat(10.0));
        assert!(outer.contains(&Aabb::new(Vec2::new(5.0, 0.0), Vec2::splat(5.0))));
        assert!(!outer.contains(&Aabb::new(Vec2::new(5.1, 0.0), Vec2::splat(5.0))));
    }
}
