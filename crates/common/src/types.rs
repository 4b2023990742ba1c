use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// World-space placement of a rigid object: position plus orientation.
///
/// Local axes follow the renderer convention: +X right, +Y up, -Z forward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Map a point from local space into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Rotate a local direction into world space.
    pub fn transform_vector(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

/// Resolved steering intent for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Steering {
    Left,
    #[default]
    Straight,
    Right,
}

impl Steering {
    /// -1 for left, 0 for straight, +1 for right.
    pub fn sign(self) -> f32 {
        match self {
            Steering::Left => -1.0,
            Steering::Straight => 0.0,
            Steering::Right => 1.0,
        }
    }

    /// Resolve held left/right flags. Both or neither means straight.
    pub fn from_flags(left: bool, right: bool) -> Self {
        match (left, right) {
            (true, false) => Steering::Left,
            (false, true) => Steering::Right,
            _ => Steering::Straight,
        }
    }
}
