use glam::{Vec3, vec3};

use crate::follow::CameraState;

/// Free-flying camera driven by direct translation deltas from the caller.
/// Bypasses the follow camera entirely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub sensitivity: f32,
}

impl Default for FreeCamera {
    fn default() -> Self {
        Self {
            position: vec3(0.0, 10.0, 15.0),
            yaw: -90.0_f32.to_radians(),
            pitch: -30.0_f32.to_radians(),
            sensitivity: 0.003,
        }
    }
}

impl FreeCamera {
    /// A camera at `position` looking at `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let mut cam = Self {
            position,
            ..Self::default()
        };
        if let Some(dir) = (target - position).try_normalize() {
            cam.yaw = dir.z.atan2(dir.x);
            cam.pitch = dir.y.clamp(-1.0, 1.0).asin();
        }
        cam
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    /// Additive world-space move.
    pub fn translate(&mut self, delta: Vec3) {
        if delta.is_finite() {
            self.position += delta;
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch -= dy * self.sensitivity;
        self.pitch = self
            .pitch
            .clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
    }

    pub fn state(&self) -> CameraState {
        CameraState {
            position: self.position,
            look_at: self.position + self.forward(),
        }
    }
}
