use glam::{Vec3, vec3};
use trackway_common::Pose;

use crate::vertex::MeshBuffers;

/// One box-shaped piece of the vehicle body, in vehicle-local space.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPart {
    pub name: &'static str,
    pub offset: Vec3,
    pub half_extents: Vec3,
}

/// The player vehicle as a set of body parts. Owns its parts outright; the
/// vehicle pose places the whole set each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleModel {
    pub parts: Vec<BodyPart>,
}

impl Default for VehicleModel {
    fn default() -> Self {
        Self {
            parts: vec![
                // 1 × 0.5 × 2 hull resting on the road.
                BodyPart {
                    name: "chassis",
                    offset: vec3(0.0, 0.25, 0.0),
                    half_extents: vec3(0.5, 0.25, 1.0),
                },
                BodyPart {
                    name: "canopy",
                    offset: vec3(0.0, 0.62, 0.15),
                    half_extents: vec3(0.3, 0.12, 0.45),
                },
                BodyPart {
                    name: "pod_left",
                    offset: vec3(-0.62, 0.2, 0.3),
                    half_extents: vec3(0.12, 0.15, 0.7),
                },
                BodyPart {
                    name: "pod_right",
                    offset: vec3(0.62, 0.2, 0.3),
                    half_extents: vec3(0.12, 0.15, 0.7),
                },
            ],
        }
    }
}

impl VehicleModel {
    /// World pose of every part for a given vehicle pose.
    pub fn part_poses(&self, vehicle: &Pose) -> Vec<Pose> {
        self.parts
            .iter()
            .map(|part| Pose::new(vehicle.transform_point(part.offset), vehicle.rotation))
            .collect()
    }

    /// All parts as one indexed mesh placed at `vehicle`.
    pub fn to_buffers(&self, vehicle: &Pose) -> MeshBuffers {
        let mut buffers = MeshBuffers::new();
        for (part, pose) in self.parts.iter().zip(self.part_poses(vehicle)) {
            buffers.push_box(&pose, part.half_extents);
        }
        buffers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn default_model_has_four_parts() {
        let model = VehicleModel::default();
        assert_eq!(model.parts.len(), 4);
        assert_eq!(model.to_buffers(&Pose::default()).triangle_count(), 48);
    }

    #[test]
    fn parts_follow_vehicle_pose() {
        let model = VehicleModel::default();
        let pose = Pose::new(
            vec3(10.0, 0.0, -5.0),
            Quat::from_rotation_y(std::f32::consts::PI),
        );
        let poses = model.part_poses(&pose);
        // Rotating half a turn swaps the side pods.
        assert!((poses[2].position - vec3(10.62, 0.2, -5.3)).length() < 1e-4);
        assert!((poses[0].position - vec3(10.0, 0.25, -5.0)).length() < 1e-4);
    }
}
