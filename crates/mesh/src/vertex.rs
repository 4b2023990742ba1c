use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::shapes::{Quad, box_mesh};
use trackway_common::Pose;

/// Vertex layout handed to the renderer: position, normal, texture coords.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: Vec3, normal: Vec3, uv: [f32; 2]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position
            .iter()
            .chain(&self.normal)
            .chain(&self.uv)
            .all(|v| v.is_finite())
    }
}

/// Indexed triangle list ready for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_quad(&mut self, quad: &Quad) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&quad.vertices);
        self.indices.extend(Quad::INDICES.iter().map(|i| base + i));
    }

    /// Append a box with the given half extents, placed by `pose`.
    pub fn push_box(&mut self, pose: &Pose, half_extents: Vec3) {
        let base = self.vertices.len() as u32;
        let (vertices, indices) = box_mesh(half_extents);
        self.vertices.extend(vertices.into_iter().map(|v| {
            MeshVertex::new(
                pose.transform_point(Vec3::from_array(v.position)),
                pose.transform_vector(Vec3::from_array(v.normal)),
                v.uv,
            )
        }));
        self.indices.extend(indices.into_iter().map(|i| base + i));
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Raw vertex bytes for a GPU vertex buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes for a GPU index buffer.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
