use glam::Vec2;

use crate::body::BallBody;

/// Soft spring tying a ball to its rest spot.
///
/// Tracks whether the spring is live so repeated attach or detach calls
/// never stack joints or remove one twice.
#[derive(Debug, Clone)]
pub struct ConstraintAnchor {
    point: Vec2,
    stiffness: f32,
    attached: bool,
}

impl ConstraintAnchor {
    pub fn new(point: Vec2, stiffness: f32) -> Self {
        Self {
            point,
            stiffness,
            attached: false,
        }
    }

    /// Returns `true` if the spring was newly attached.
    pub fn attach(&mut self, body: &mut impl BallBody) -> bool {
        if self.attached {
            return false;
        }
        body.attach_anchor(self.point, self.stiffness);
        self.attached = true;
        true
    }

    /// Returns `true` if a live spring was removed.
    pub fn detach(&mut self, body: &mut impl BallBody) -> bool {
        if !self.attached {
            return false;
        }
        body.detach_anchor();
        self.attached = false;
        true
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn point(&self) -> Vec2 {
        self.point
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::mock::MockBody;

    #[test]
    fn attach_is_idempotent() {
        let mut body = MockBody::at(Vec2::ZERO);
        let mut anchor = ConstraintAnchor::new(Vec2::new(5.0, 5.0), 0.05);
        assert!(anchor.attach(&mut body));
        assert!(!anchor.attach(&mut body));
        assert_eq!(body.attach_calls, 1);
        assert_eq!(body.anchor, Some((Vec2::new(5.0, 5.0), 0.05)));
    }

    #[test]
    fn detach_is_idempotent() {
        let mut body = MockBody::at(Vec2::ZERO);
        let mut anchor = ConstraintAnchor::new(Vec2::ZERO, 0.05);
        assert!(!anchor.detach(&mut body));
        anchor.attach(&mut body);
        assert!(anchor.detach(&mut body));
        assert!(!anchor.detach(&mut body));
        assert!(body.anchor.is_none());
        assert!(!anchor.is_attached());
    }
}
