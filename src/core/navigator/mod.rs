//=========================================================================
// Scene Navigator
//=========================================================================
//
// Owns the live camera pose and at most one in-flight transition.
//
// Flow:
//   set_target(Some) → Tween(live pose → target)
//   update(dt)       → advance tween → clamp → CameraArrived on completion
//   set_target(None) → cancel, back to free-look
//
// A newer target always replaces the in-flight one (last write wins);
// superseded transitions never report arrival.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec3;
use log::debug;

//=== Module Declarations =================================================

mod camera;
mod tween;

//=== Public API ==========================================================

pub use camera::{CameraPose, CameraTarget, RoomBounds};
pub use tween::{ease_in_out_cubic, Tween};

//=== TransitionId ========================================================

/// Identifies one requested camera transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(u64);

/// Reported by [`SceneNavigator::update`] when a transition completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraArrived {
    pub transition: TransitionId,
}

//=== SceneNavigator ======================================================

/// Camera animation sequencer bounded to the room box.
#[derive(Debug)]
pub struct SceneNavigator {
    pose: CameraPose,
    bounds: RoomBounds,
    active: Option<(TransitionId, Tween)>,
    next_id: u64,
}

impl SceneNavigator {
    //--- Construction -----------------------------------------------------

    /// Creates a navigator at `initial`, clamped into `bounds`.
    pub fn new(initial: CameraPose, bounds: RoomBounds) -> Self {
        Self {
            pose: CameraPose::new(bounds.clamp(initial.position), initial.look_at),
            bounds,
            active: None,
            next_id: 0,
        }
    }

    //--- Targets ----------------------------------------------------------

    /// Replaces the camera target.
    ///
    /// `Some` starts a tween from the live pose and returns its id.
    /// `None` cancels any in-flight tween and returns to free-look.
    /// A non-positive duration moves the camera at once; arrival is still
    /// reported on the next update.
    pub fn set_target(&mut self, target: Option<CameraTarget>) -> Option<TransitionId> {
        if let Some((superseded, _)) = self.active.take() {
            debug!(target: "navigator", "Transition {:?} superseded", superseded);
        }

        let target = target?;
        let id = TransitionId(self.next_id);
        self.next_id += 1;

        let tween = Tween::new(self.pose, &target);
        if tween.is_finished() {
            self.apply(target.pose());
        }

        debug!(
            target: "navigator",
            "Transition {:?} toward {:?} over {:.2}s",
            id, target.position, target.duration_seconds
        );
        self.active = Some((id, tween));
        Some(id)
    }

    /// Cancels any in-flight tween. Same as `set_target(None)`.
    pub fn cancel(&mut self) {
        self.set_target(None);
    }

    //--- Update Loop ------------------------------------------------------

    /// Advances the active tween by `dt` seconds and clamps the camera.
    pub fn update(&mut self, dt: f32) -> Option<CameraArrived> {
        let Some((id, tween)) = self.active.as_mut() else {
            self.apply(self.pose);
            return None;
        };

        let id = *id;
        let pose = tween.advance(dt);
        let finished = tween.is_finished();
        self.apply(pose);

        if finished {
            self.active = None;
            debug!(target: "navigator", "Transition {:?} arrived", id);
            Some(CameraArrived { transition: id })
        } else {
            None
        }
    }

    /// Moves the camera by user input while no tween is active.
    ///
    /// Returns false (and ignores the input) during a tween.
    pub fn free_look(&mut self, translate: Vec3, look_delta: Vec3) -> bool {
        if self.active.is_some() {
            return false;
        }
        let pose = CameraPose::new(self.pose.position + translate, self.pose.look_at + look_delta);
        self.apply(pose);
        true
    }

    //--- Query API --------------------------------------------------------

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn bounds(&self) -> RoomBounds {
        self.bounds
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_transition(&self) -> Option<TransitionId> {
        self.active.as_ref().map(|(id, _)| *id)
    }

    /// Pose the active tween is heading to, if any.
    pub fn destination(&self) -> Option<CameraPose> {
        self.active.as_ref().map(|(_, tween)| tween.destination())
    }

    //--- Internal Helpers -------------------------------------------------

    fn apply(&mut self, pose: CameraPose) {
        self.pose = CameraPose::new(self.bounds.clamp(pose.position), pose.look_at);
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn navigator() -> SceneNavigator {
        SceneNavigator::new(
            CameraPose::new(Vec3::new(-2.0, 3.0, 10.0), Vec3::ZERO),
            RoomBounds::new(Vec3::new(-10.0, 0.5, -10.0), Vec3::new(10.0, 7.5, 10.0)),
        )
    }

    fn run_to_end(nav: &mut SceneNavigator) -> Vec<CameraArrived> {
        let mut arrivals = Vec::new();
        for _ in 0..600 {
            if let Some(arrived) = nav.update(1.0 / 60.0) {
                arrivals.push(arrived);
            }
        }
        arrivals
    }

    //--- Targets ----------------------------------------------------------

    #[test]
    fn tween_arrives_once_at_target() {
        let mut nav = navigator();
        let target = CameraTarget::new(Vec3::new(4.0, 1.5, 0.5), Vec3::new(4.0, 0.5, 0.0), 1.0);
        let id = nav.set_target(Some(target)).unwrap();

        let arrivals = run_to_end(&mut nav);
        assert_eq!(arrivals, vec![CameraArrived { transition: id }]);
        assert_eq!(nav.pose(), target.pose());
        assert!(!nav.is_animating());
    }

    #[test]
    fn newer_target_wins_and_old_never_completes() {
        let mut nav = navigator();
        let first = CameraTarget::new(Vec3::new(8.0, 2.0, -4.0), Vec3::ZERO, 1.0);
        let second = CameraTarget::new(Vec3::new(-6.0, 2.0, 7.0), Vec3::new(-6.0, 0.0, 4.0), 1.0);

        let first_id = nav.set_target(Some(first)).unwrap();
        for _ in 0..20 {
            assert!(nav.update(1.0 / 60.0).is_none());
        }
        let second_id = nav.set_target(Some(second)).unwrap();
        assert_ne!(first_id, second_id);

        let mut visited_first = false;
        let mut arrivals = Vec::new();
        for _ in 0..120 {
            if let Some(arrived) = nav.update(1.0 / 60.0) {
                arrivals.push(arrived.transition);
            }
            visited_first |= nav.pose().position == first.position;
        }

        assert!(!visited_first);
        assert_eq!(arrivals, vec![second_id]);
        assert_eq!(nav.pose(), second.pose());
    }

    #[test]
    fn new_tween_starts_from_live_pose() {
        let mut nav = navigator();
        nav.set_target(Some(CameraTarget::new(Vec3::new(8.0, 2.0, -4.0), Vec3::ZERO, 1.0)));
        for _ in 0..30 {
            nav.update(1.0 / 60.0);
        }
        let live = nav.pose();

        nav.set_target(Some(CameraTarget::new(Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO, 1.0)));
        nav.update(0.0);
        assert_eq!(nav.pose(), live);
    }

    #[test]
    fn clearing_target_returns_to_free_look() {
        let mut nav = navigator();
        nav.set_target(Some(CameraTarget::new(Vec3::ZERO, Vec3::X, 2.0)));
        nav.update(0.5);
        let stopped = nav.pose();

        assert!(nav.set_target(None).is_none());
        assert!(!nav.is_animating());
        assert!(run_to_end(&mut nav).is_empty());
        assert_eq!(nav.pose(), stopped);
    }

    #[test]
    fn non_positive_duration_snaps() {
        let mut nav = navigator();
        let target = CameraTarget::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, 0.0);
        let id = nav.set_target(Some(target)).unwrap();

        assert_eq!(nav.pose(), target.pose());
        assert_eq!(nav.update(0.0), Some(CameraArrived { transition: id }));
    }

    //--- Clamping ---------------------------------------------------------

    #[test]
    fn camera_stays_in_room_during_tween_to_outside_target() {
        let mut nav = navigator();
        nav.set_target(Some(CameraTarget::new(Vec3::new(40.0, 20.0, -40.0), Vec3::ZERO, 1.0)));

        for _ in 0..90 {
            nav.update(1.0 / 60.0);
            assert!(nav.bounds().contains(nav.pose().position));
        }
        assert_eq!(nav.pose().position, Vec3::new(10.0, 7.5, -10.0));
    }

    #[test]
    fn free_look_is_clamped_and_blocked_while_animating() {
        let mut nav = navigator();
        assert!(nav.free_look(Vec3::new(0.0, -50.0, 0.0), Vec3::ZERO));
        assert_eq!(nav.pose().position.y, 0.5);

        nav.set_target(Some(CameraTarget::new(Vec3::ZERO, Vec3::X, 1.0)));
        let before = nav.pose();
        assert!(!nav.free_look(Vec3::X, Vec3::ZERO));
        assert_eq!(nav.pose(), before);
    }

    #[test]
    fn initial_pose_outside_room_is_clamped() {
        let nav = SceneNavigator::new(
            CameraPose::new(Vec3::new(0.0, 0.0, 30.0), Vec3::ZERO),
            RoomBounds::new(Vec3::splat(-10.0), Vec3::splat(10.0)),
        );
        assert_eq!(nav.pose().position, Vec3::new(0.0, 0.0, 10.0));
    }
}
