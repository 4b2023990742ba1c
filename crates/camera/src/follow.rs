use glam::{Mat4, Vec3, vec3};
use serde::{Deserialize, Serialize};
use trackway_common::Pose;

/// Chase-camera placement relative to the vehicle, in vehicle-local space
/// (+X right, +Y up, -Z forward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera position relative to the vehicle.
    pub offset: Vec3,
    /// Look-at point relative to the vehicle.
    pub lookahead: Vec3,
    /// Fraction of the remaining distance covered per tick.
    pub lerp_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            offset: vec3(0.0, 3.0, 7.0),
            lookahead: vec3(0.0, 0.5, -10.0),
            lerp_factor: 0.1,
        }
    }
}

/// Where the camera is and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraState {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, Vec3::Y)
    }
}

/// Exponentially smoothed chase camera.
///
/// Smoothing is per tick, so it assumes the caller ticks at a fixed rate.
#[derive(Debug, Clone, Default)]
pub struct FollowCamera {
    config: CameraConfig,
    state: Option<CameraState>,
}

impl FollowCamera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Current smoothed state, `None` until the first update.
    pub fn state(&self) -> Option<CameraState> {
        self.state
    }

    /// Where the camera wants to be for a given vehicle pose.
    pub fn target(&self, vehicle: &Pose) -> CameraState {
        CameraState {
            position: vehicle.transform_point(self.config.offset),
            look_at: vehicle.transform_point(self.config.lookahead),
        }
    }

    /// Move toward the target. The first call snaps straight to it.
    pub fn update(&mut self, vehicle: &Pose, lerp_factor: f32) -> CameraState {
        let target = self.target(vehicle);
        let f = if lerp_factor.is_finite() {
            lerp_factor.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let next = match self.state {
            None => target,
            Some(current) => CameraState {
                position: approach(current.position, target.position, f),
                look_at: approach(current.look_at, target.look_at, f),
            },
        };
        self.state = Some(next);
        next
    }

    /// Continue smoothing from an explicit state.
    pub fn place(&mut self, state: CameraState) {
        self.state = Some(state);
    }

    /// Forget the smoothed state; the next update snaps.
    pub fn reset(&mut self) {
        self.state = None;
    }
}

/// Step `from` toward `to`. Written as an offset so a camera already at its
/// target stays bit-identical.
fn approach(from: Vec3, to: Vec3, f: f32) -> Vec3 {
    from + (to - from) * f
}
