use glam::Vec3;
use rand::Rng;
use trackway_common::TrackError;
use trackway_curve::{Curve, Parameterization, generate};
use trackway_mesh::{RoadMesh, RoadMeshBuilder};

use crate::config::TrackConfig;

/// One generated track: control points, the curve through them and the
/// road geometry built from it.
///
/// A track that fails to build keeps its control points and the fault, with
/// no curve and an empty mesh.
#[derive(Debug, Clone)]
pub struct Track {
    control_points: Vec<Vec3>,
    curve: Option<Curve>,
    mesh: RoadMesh,
    fault: Option<TrackError>,
    width: f32,
}

impl Track {
    pub fn generate<R: Rng + ?Sized>(config: &TrackConfig, rng: &mut R) -> Self {
        let _span =
            tracing::info_span!("generate_track", segments = config.segment_count).entered();
        let points = generate(
            config.segment_count,
            config.segment_length,
            &config.bounds,
            rng,
        );
        Self::from_control_points(points, config)
    }

    /// Build curve and mesh from explicit control points.
    pub fn from_control_points(points: Vec<Vec3>, config: &TrackConfig) -> Self {
        let built = Curve::new(points.clone(), config.parameterization).and_then(|curve| {
            let mesh = RoadMeshBuilder::new(config.road).build(&curve)?;
            Ok((curve, mesh))
        });

        match built {
            Ok((curve, mesh)) => {
                tracing::info!(
                    control_points = points.len(),
                    length = curve.length(),
                    quads = mesh.surface.len(),
                    "track built"
                );
                Self {
                    control_points: points,
                    curve: Some(curve),
                    mesh,
                    fault: None,
                    width: config.road.width,
                }
            }
            Err(err) => {
                tracing::warn!(%err, control_points = points.len(), "track build failed");
                Self {
                    control_points: points,
                    curve: None,
                    mesh: RoadMesh::default(),
                    fault: Some(err),
                    width: config.road.width,
                }
            }
        }
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.control_points
    }

    pub fn curve(&self) -> Option<&Curve> {
        self.curve.as_ref()
    }

    /// How the curve maps `t`, `None` for a faulted track.
    pub fn parameterization(&self) -> Option<Parameterization> {
        self.curve.as_ref().map(Curve::parameterization)
    }

    pub fn mesh(&self) -> &RoadMesh {
        &self.mesh
    }

    pub fn fault(&self) -> Option<&TrackError> {
        self.fault.as_ref()
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Curve length, 0 for a faulted track.
    pub fn length(&self) -> f32 {
        self.curve.as_ref().map_or(0.0, Curve::length)
    }

    pub fn is_drivable(&self) -> bool {
        self.curve.is_some()
    }
}
