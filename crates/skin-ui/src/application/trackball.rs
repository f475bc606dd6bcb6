//! Trackball: a rotation-aware relative pointer.
//!
//! While the trackball is shown, host mouse motion drives it instead of the
//! touch screen.  Motion deltas are rotated by the current layout's D-pad
//! rotation so "up" on the host stays "up" on the rotated device.

use skin_core::Rotation;

pub const TRACKBALL_DIAMETER: i32 = 60;
pub const TRACKBALL_RING: i32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Trackball {
    diameter: i32,
    ring: i32,
    rotation: Rotation,
}

impl Default for Trackball {
    fn default() -> Self {
        Self::new()
    }
}

impl Trackball {
    pub fn new() -> Self {
        Self {
            diameter: TRACKBALL_DIAMETER,
            ring: TRACKBALL_RING,
            rotation: Rotation::Deg0,
        }
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Size of the on-screen ball including its ring.
    pub fn outer_diameter(&self) -> i32 {
        self.diameter + 2 * self.ring
    }

    /// Converts host motion into device trackball motion.
    pub fn motion(&self, dx: i32, dy: i32) -> (i32, i32) {
        self.rotation.rotate_delta(dx, dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrotated_motion_is_unchanged() {
        let ball = Trackball::new();
        assert_eq!(ball.motion(3, -4), (3, -4));
    }

    #[test]
    fn test_motion_follows_layout_rotation() {
        // Arrange
        let mut ball = Trackball::new();

        // Act
        ball.set_rotation(Rotation::Deg90);

        // Assert
        assert_eq!(ball.motion(1, 0), (0, 1));
        assert_eq!(ball.motion(0, 1), (-1, 0));
    }

    #[test]
    fn test_outer_diameter_includes_ring() {
        assert_eq!(Trackball::new().outer_diameter(), 68);
    }
}
