//=========================================================================
// Camera Tween
//=========================================================================
//
// Time-bounded ease-in-out interpolation between two camera poses.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::camera::{CameraPose, CameraTarget};

//=== Easing ==============================================================

/// Cubic ease-in-out on `t` in `[0, 1]`. Out-of-range input is clamped.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

//=== Tween ===============================================================

/// Single in-flight camera interpolation.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    from: CameraPose,
    to: CameraPose,
    duration: f32,
    elapsed: f32,
}

impl Tween {
    pub fn new(from: CameraPose, target: &CameraTarget) -> Self {
        Self {
            from,
            to: target.pose(),
            duration: target.duration_seconds,
            elapsed: 0.0,
        }
    }

    /// Advances by `dt` seconds and returns the interpolated pose.
    pub fn advance(&mut self, dt: f32) -> CameraPose {
        self.elapsed += dt.max(0.0);
        self.sample()
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn destination(&self) -> CameraPose {
        self.to
    }

    fn sample(&self) -> CameraPose {
        if self.is_finished() {
            return self.to;
        }
        let eased = ease_in_out_cubic(self.progress());
        CameraPose::new(
            self.from.position.lerp(self.to.position, eased),
            self.from.look_at.lerp(self.to.look_at, eased),
        )
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn easing_hits_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(ease_in_out_cubic(-3.0), 0.0);
        assert_eq!(ease_in_out_cubic(7.0), 1.0);
    }

    #[test]
    fn easing_is_monotonic() {
        let mut previous = 0.0;
        for step in 1..=100 {
            let value = ease_in_out_cubic(step as f32 / 100.0);
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn tween_reaches_target_exactly() {
        let from = CameraPose::new(Vec3::ZERO, Vec3::Z);
        let target = CameraTarget::new(Vec3::new(4.0, 2.0, 0.0), Vec3::ZERO, 1.0);
        let mut tween = Tween::new(from, &target);

        let halfway = tween.advance(0.5);
        assert!(halfway.position.x > 0.0 && halfway.position.x < 4.0);
        assert!(!tween.is_finished());

        let end = tween.advance(0.75);
        assert_eq!(end, target.pose());
        assert!(tween.is_finished());
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let target = CameraTarget::new(Vec3::ONE, Vec3::ZERO, 0.0);
        let mut tween = Tween::new(CameraPose::new(Vec3::ZERO, Vec3::ZERO), &target);

        assert!(tween.is_finished());
        assert_eq!(tween.advance(0.0), target.pose());
    }
}
