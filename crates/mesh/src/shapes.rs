use glam::Vec3;

use crate::vertex::MeshVertex;

/// Four corners of a flat strip piece: start-left, start-right, end-right,
/// end-left. Counter-clockwise when seen from the side the normal points to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub vertices: [MeshVertex; 4],
}

impl Quad {
    pub const INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(MeshVertex::is_finite)
    }
}

/// Axis-aligned box centred on the origin with per-face normals and UVs.
pub fn box_mesh(half_extents: Vec3) -> (Vec<MeshVertex>, Vec<u32>) {
    let [x, y, z] = half_extents.to_array();
    // (normal, four corners counter-clockwise seen from outside)
    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0],  [[-x, -y,  z], [ x, -y,  z], [ x,  y,  z], [-x,  y,  z]]),
        ([0.0, 0.0, -1.0], [[ x, -y, -z], [-x, -y, -z], [-x,  y, -z], [ x,  y, -z]]),
        ([1.0, 0.0, 0.0],  [[ x, -y,  z], [ x, -y, -z], [ x,  y, -z], [ x,  y,  z]]),
        ([-1.0, 0.0, 0.0], [[-x, -y, -z], [-x, -y,  z], [-x,  y,  z], [-x,  y, -z]]),
        ([0.0, 1.0, 0.0],  [[-x,  y,  z], [ x,  y,  z], [ x,  y, -z], [-x,  y, -z]]),
        ([0.0, -1.0, 0.0], [[-x, -y, -z], [ x, -y, -z], [ x, -y,  z], [-x, -y,  z]]),
    ];
    const UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u32;
        for (corner, uv) in corners.into_iter().zip(UVS) {
            vertices.push(MeshVertex {
                position: corner,
                normal,
                uv,
            });
        }
        indices.extend(Quad::INDICES.iter().map(|i| base + i));
    }
    (vertices, indices)
}
