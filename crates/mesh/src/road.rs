//! Road ribbon extrusion along a curve.
//!
//! The curve is sampled at `sample_count + 1` uniform parameter steps. Each
//! pair of adjacent samples becomes one surface quad whose frame comes from
//! the tangent at the pair's parameter midpoint, so both edges of a quad share
//! one right vector. Lane markings reuse the same sampling at a coarser
//! stride and barriers coarser still.

use glam::{Vec3, vec3};
use serde::{Deserialize, Serialize};
use trackway_common::{Pose, TrackError};
use trackway_curve::{Curve, Frame, frame};

use crate::shapes::Quad;
use crate::vertex::{MeshBuffers, MeshVertex};

/// Barriers shorter than this are skipped.
const MIN_BARRIER_LENGTH: f32 = 1e-3;

/// Geometry settings for a road build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadMeshConfig {
    /// Full width of the driving surface.
    pub width: f32,
    /// Number of surface quads along the curve.
    pub sample_count: usize,
    /// A lane-marking dash starts every `marking_interval` samples.
    pub marking_interval: usize,
    pub marking_width: f32,
    /// Lift along the frame's up vector that keeps markings off the surface.
    pub marking_lift: f32,
    /// Distance of the edge markings from the road edge.
    pub edge_inset: f32,
    /// One barrier box per side spans `barrier_interval` samples.
    pub barrier_interval: usize,
    pub barrier_thickness: f32,
    pub barrier_height: f32,
}

impl Default for RoadMeshConfig {
    fn default() -> Self {
        Self {
            width: 7.0,
            sample_count: 200,
            marking_interval: 4,
            marking_width: 0.2,
            marking_lift: 0.01,
            edge_inset: 0.3,
            barrier_interval: 8,
            barrier_thickness: 0.3,
            barrier_height: 0.5,
        }
    }
}

impl RoadMeshConfig {
    pub fn validate(&self) -> Result<(), TrackError> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(invalid("width", "must be positive"));
        }
        if self.sample_count == 0 {
            return Err(invalid("sample_count", "must be at least 1"));
        }
        if self.marking_interval == 0 {
            return Err(invalid("marking_interval", "must be at least 1"));
        }
        if self.barrier_interval == 0 {
            return Err(invalid("barrier_interval", "must be at least 1"));
        }
        let sizes = [
            self.marking_width,
            self.marking_lift,
            self.edge_inset,
            self.barrier_thickness,
            self.barrier_height,
        ];
        if !sizes.iter().all(|s| s.is_finite() && *s >= 0.0) {
            return Err(invalid(
                "road dimensions",
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: &'static str) -> TrackError {
    TrackError::InvalidParameter { name, reason }
}

/// Which side of the centerline a barrier sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// Oriented box running along one coarse span of the road edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrierBox {
    pub side: Side,
    pub pose: Pose,
    pub half_extents: Vec3,
}

/// All geometry of one track. Built once, never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadMesh {
    pub surface: Vec<Quad>,
    pub markings: Vec<Quad>,
    pub barriers: Vec<BarrierBox>,
}

impl RoadMesh {
    pub fn is_empty(&self) -> bool {
        self.surface.is_empty() && self.markings.is_empty() && self.barriers.is_empty()
    }

    pub fn surface_buffers(&self) -> MeshBuffers {
        quads_to_buffers(&self.surface)
    }

    pub fn marking_buffers(&self) -> MeshBuffers {
        quads_to_buffers(&self.markings)
    }

    pub fn barrier_buffers(&self) -> MeshBuffers {
        let mut buffers = MeshBuffers::new();
        for barrier in &self.barriers {
            buffers.push_box(&barrier.pose, barrier.half_extents);
        }
        buffers
    }
}

fn quads_to_buffers(quads: &[Quad]) -> MeshBuffers {
    let mut buffers = MeshBuffers::new();
    for quad in quads {
        buffers.push_quad(quad);
    }
    buffers
}

/// Extrudes surface, markings and barriers along a curve.
#[derive(Debug, Clone, Default)]
pub struct RoadMeshBuilder {
    config: RoadMeshConfig,
}

/// One curve sample with the distance travelled to reach it.
struct Sample {
    position: Vec3,
    distance: f32,
}

impl RoadMeshBuilder {
    pub fn new(config: RoadMeshConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RoadMeshConfig {
        &self.config
    }

    /// Build the full road geometry. Rejects invalid settings or any
    /// non-finite vertex; on error nothing is emitted.
    pub fn build(&self, curve: &Curve) -> Result<RoadMesh, TrackError> {
        self.config.validate()?;
        let n = self.config.sample_count;
        let samples = sample(curve, n);

        let mesh = RoadMesh {
            surface: self.surface(curve, &samples),
            markings: self.markings(curve, &samples),
            barriers: self.barriers(&samples),
        };

        let finite = mesh.surface.iter().chain(&mesh.markings).all(Quad::is_finite)
            && mesh
                .barriers
                .iter()
                .all(|b| b.pose.is_finite() && b.half_extents.is_finite());
        if !finite {
            return Err(TrackError::NonFinite("road mesh"));
        }

        tracing::debug!(
            surface = mesh.surface.len(),
            markings = mesh.markings.len(),
            barriers = mesh.barriers.len(),
            "road mesh built"
        );
        Ok(mesh)
    }

    fn surface(&self, curve: &Curve, samples: &[Sample]) -> Vec<Quad> {
        let half_width = self.config.width * 0.5;
        samples
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let fr = span_frame(curve, i, samples.len() - 1);
                strip_quad(
                    &pair[0],
                    &pair[1],
                    &fr,
                    0.0,
                    half_width,
                    0.0,
                    self.config.width,
                )
            })
            .collect()
    }

    fn markings(&self, curve: &Curve, samples: &[Sample]) -> Vec<Quad> {
        let c = &self.config;
        let half = c.marking_width * 0.5;
        let edge = (c.width * 0.5 - c.edge_inset).max(0.0);
        let offsets = [0.0, -edge, edge];
        let spans = samples.len() - 1;

        let mut quads = Vec::with_capacity(spans.div_ceil(c.marking_interval) * offsets.len());
        for i in (0..spans).step_by(c.marking_interval) {
            let fr = span_frame(curve, i, spans);
            for offset in offsets {
                quads.push(strip_quad(
                    &samples[i],
                    &samples[i + 1],
                    &fr,
                    offset,
                    half,
                    c.marking_lift,
                    c.width,
                ));
            }
        }
        quads
    }

    fn barriers(&self, samples: &[Sample]) -> Vec<BarrierBox> {
        let c = &self.config;
        let spans = samples.len() - 1;
        let mut barriers = Vec::new();
        for start in (0..spans).step_by(c.barrier_interval) {
            let end = (start + c.barrier_interval).min(spans);
            let (a, b) = (samples[start].position, samples[end].position);
            let length = a.distance(b);
            if length < MIN_BARRIER_LENGTH {
                continue;
            }
            let fr = frame(b - a, Vec3::Y);
            let rotation = fr.rotation();
            let mid = (a + b) * 0.5;
            let lateral = c.width * 0.5 + c.barrier_thickness * 0.5;
            for side in [Side::Left, Side::Right] {
                let center =
                    mid + fr.right * (side.sign() * lateral) + fr.up * (c.barrier_height * 0.5);
                barriers.push(BarrierBox {
                    side,
                    pose: Pose::new(center, rotation),
                    half_extents: vec3(
                        c.barrier_thickness * 0.5,
                        c.barrier_height * 0.5,
                        length * 0.5,
                    ),
                });
            }
        }
        barriers
    }
}

fn sample(curve: &Curve, n: usize) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(n + 1);
    let mut distance = 0.0;
    let mut prev: Option<Vec3> = None;
    for i in 0..=n {
        let position = curve.position(i as f32 / n as f32);
        if let Some(p) = prev {
            distance += p.distance(position);
        }
        samples.push(Sample { position, distance });
        prev = Some(position);
    }
    samples
}

/// Frame shared by both ends of span `i`, taken at the span's midpoint.
fn span_frame(curve: &Curve, i: usize, spans: usize) -> Frame {
    let t_mid = (i as f32 + 0.5) / spans as f32;
    frame(curve.tangent(t_mid), Vec3::Y)
}

/// Flat quad between two samples, centred `offset` along the frame's right
/// vector, `half_width` to either side, lifted by `lift` along up.
fn strip_quad(
    a: &Sample,
    b: &Sample,
    fr: &Frame,
    offset: f32,
    half_width: f32,
    lift: f32,
    uv_scale: f32,
) -> Quad {
    let left = fr.right * (offset - half_width) + fr.up * lift;
    let right = fr.right * (offset + half_width) + fr.up * lift;
    let (v0, v1) = (a.distance / uv_scale, b.distance / uv_scale);
    Quad {
        vertices: [
            MeshVertex::new(a.position + left, fr.up, [0.0, v0]),
            MeshVertex::new(a.position + right, fr.up, [1.0, v0]),
            MeshVertex::new(b.position + right, fr.up, [1.0, v1]),
            MeshVertex::new(b.position + left, fr.up, [0.0, v1]),
        ],
    }
}
