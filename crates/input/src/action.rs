use glam::Vec3;
use serde::{Deserialize, Serialize};
use trackway_common::Steering;

/// A high-level action produced by whatever captures input.
///
/// Key repeat and held-key tracking happen upstream; each tick the caller
/// passes every action that is active for that tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Action {
    SteerLeft,
    SteerRight,
    /// Raise the speed multiplier by one step.
    Accelerate,
    /// Lower the speed multiplier by one step.
    Decelerate,
    /// Throw the current track away and generate a new one.
    RegenerateTrack,
    ToggleCameraMode,
    /// Move the free camera by a world-space delta.
    MoveCamera(Vec3),
    /// Flip the paused flag.
    Pause,
    /// Unbound input.
    Noop,
}

/// Everything the simulation needs to know about input for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub steering: Steering,
    pub accelerate: bool,
    pub decelerate: bool,
    pub regenerate: bool,
    pub toggle_camera: bool,
    /// Sum of all camera moves this tick.
    pub camera_delta: Vec3,
    /// Toggle the pause state.
    pub toggle_pause: bool,
}

impl Intent {
    /// Fold a tick's actions into one intent.
    ///
    /// Flags are idempotent: two `RegenerateTrack`s still regenerate once.
    /// Camera moves accumulate.
    pub fn resolve(actions: &[Action]) -> Self {
        let mut left = false;
        let mut right = false;
        let mut intent = Intent::default();
        for action in actions {
            match *action {
                Action::SteerLeft => left = true,
                Action::SteerRight => right = true,
                Action::Accelerate => intent.accelerate = true,
                Action::Decelerate => intent.decelerate = true,
                Action::RegenerateTrack => intent.regenerate = true,
                Action::ToggleCameraMode => intent.toggle_camera = true,
                Action::MoveCamera(delta) => {
                    if delta.is_finite() {
                        intent.camera_delta += delta;
                    }
                }
                Action::Pause => intent.toggle_pause = true,
                Action::Noop => {}
            }
        }
        intent.steering = Steering::from_flags(left, right);
        intent
    }

    /// Net speed request: +1, -1 or 0 when both or neither are held.
    pub fn speed_direction(&self) -> f32 {
        match (self.accelerate, self.decelerate) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Intent::default()
    }
}
