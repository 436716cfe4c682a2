//=========================================================================
// Camera Types
//=========================================================================
//
// Live camera pose, transition targets and the room clamp box.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec3;

//=== CameraPose ==========================================================

/// Position and look-at point of the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    pub const fn new(position: Vec3, look_at: Vec3) -> Self {
        Self { position, look_at }
    }
}

//=== CameraTarget ========================================================

/// Requested camera move. Consumed once by the navigator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    pub position: Vec3,
    pub look_at: Vec3,
    pub duration_seconds: f32,
}

impl CameraTarget {
    pub const fn new(position: Vec3, look_at: Vec3, duration_seconds: f32) -> Self {
        Self {
            position,
            look_at,
            duration_seconds,
        }
    }

    /// Target that frames `anchor` from `offset`, looking at `anchor + focus`.
    pub fn framing(anchor: Vec3, offset: Vec3, focus: Vec3, duration_seconds: f32) -> Self {
        Self::new(anchor + offset, anchor + focus, duration_seconds)
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.position, self.look_at)
    }
}

//=== RoomBounds ==========================================================

/// Axis-aligned box the camera position is kept inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomBounds {
    min: Vec3,
    max: Vec3,
}

impl RoomBounds {
    /// Creates a box from two corners.
    ///
    /// # Panics
    ///
    /// Panics if any component of `min` exceeds `max`.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        assert!(
            min.cmple(max).all(),
            "Room bounds min {:?} must not exceed max {:?}",
            min,
            max
        );
        Self { min, max }
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn clamp(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

//=========================================================================
// Tests
//=========================================================================
