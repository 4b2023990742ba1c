//! Orthonormal frames along the track.

use glam::{Mat3, Quat, Vec3};

/// Below this `|tangent × reference_up|` the cross product is too short to
/// normalize reliably.
const DEGENERATE_EPSILON: f32 = 1e-4;

/// Tangents with a vertical component above this are treated as pointing
/// straight up or down.
const VERTICAL_THRESHOLD: f32 = 0.9;

/// Right/up/forward basis at one point of the curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

impl Frame {
    /// Rotation taking local axes (+X right, +Y up, -Z forward) onto this
    /// frame.
    pub fn rotation(&self) -> Quat {
        Quat::from_mat3(&Mat3::from_cols(self.right, self.up, -self.forward)).normalize()
    }
}

/// Derive a stable frame from a tangent and a reference up vector.
///
/// Never returns NaN: a zero or non-finite tangent is replaced by -Z, and a
/// tangent parallel to `reference_up` falls back to world X (vertical
/// tangents) or to a cross product with world Y.
pub fn frame(tangent: Vec3, reference_up: Vec3) -> Frame {
    let forward = tangent.try_normalize().unwrap_or(Vec3::NEG_Z);

    let cross = forward.cross(reference_up);
    let right = if cross.length() >= DEGENERATE_EPSILON && cross.is_finite() {
        cross.normalize()
    } else {
        let fallback = if forward.y.abs() > VERTICAL_THRESHOLD {
            Vec3::X
        } else {
            forward.cross(Vec3::Y)
        };
        (fallback - forward * forward.dot(fallback))
            .try_normalize()
            .unwrap_or_else(|| forward.any_orthonormal_vector())
    };

    let up = right.cross(forward).normalize();
    Frame { right, up, forward }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(f: &Frame) {
        assert!((f.right.length() - 1.0).abs() < 1e-5, "right {:?}", f.right);
        assert!((f.up.length() - 1.0).abs() < 1e-5, "up {:?}", f.up);
        assert!((f.forward.length() - 1.0).abs() < 1e-5);
        assert!(f.right.dot(f.up).abs() < 1e-5);
        assert!(f.right.dot(f.forward).abs() < 1e-5);
        assert!(f.up.dot(f.forward).abs() < 1e-5);
    }

    #[test]
    fn straight_ahead_frame() {
        let f = frame(Vec3::NEG_Z, Vec3::Y);
        assert!((f.right - Vec3::X).length() < 1e-6);
        assert!((f.up - Vec3::Y).length() < 1e-6);
        assert_orthonormal(&f);
    }

    #[test]
    fn generic_tangent_is_orthonormal() {
        let f = frame(Vec3::new(0.3, 0.2, -0.9), Vec3::Y);
        assert_orthonormal(&f);
        assert!(f.up.y > 0.0);
    }

    #[test]
    fn vertical_tangent_falls_back_to_world_x() {
        let f = frame(Vec3::Y, Vec3::Y);
        assert_orthonormal(&f);
        assert!((f.right - Vec3::X).length() < 1e-6);

        let down = frame(Vec3::NEG_Y, Vec3::Y);
        assert_orthonormal(&down);
    }

    #[test]
    fn tangent_parallel_to_tilted_reference() {
        let reference = Vec3::new(1.0, 0.0, 0.0);
        let f = frame(reference, reference);
        assert_orthonormal(&f);
    }

    #[test]
    fn zero_and_nan_tangents_do_not_propagate() {
        for t in [Vec3::ZERO, Vec3::splat(f32::NAN)] {
            let f = frame(t, Vec3::Y);
            assert!(f.right.is_finite() && f.up.is_finite());
            assert_orthonormal(&f);
        }
    }

    #[test]
    fn rotation_maps_local_axes() {
        let f = frame(Vec3::new(1.0, 0.0, -1.0), Vec3::Y);
        let q = f.rotation();
        assert!((q * Vec3::NEG_Z - f.forward).length() < 1e-5);
        assert!((q * Vec3::X - f.right).length() < 1e-5);
        assert!((q * Vec3::Y - f.up).length() < 1e-5);
    }
}
