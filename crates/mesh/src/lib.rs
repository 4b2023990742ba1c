//! Renderable geometry derived from a track curve.
//!
//! # Invariants
//! - Geometry is a deterministic function of the curve and the build config.
//! - No NaN or infinite vertex ever leaves this crate; a bad build yields an
//!   error and no mesh.
//! - Built meshes are never mutated; a new track builds a new mesh.

mod road;
mod shapes;
mod vehicle;
mod vertex;

pub use road::{BarrierBox, RoadMesh, RoadMeshBuilder, RoadMeshConfig, Side};
pub use shapes::{Quad, box_mesh};
pub use vehicle::{BodyPart, VehicleModel};
pub use vertex::{MeshBuffers, MeshVertex};
