use trackway_kernel::{FrameOutput, Session, Track};
use trackway_mesh::MeshBuffers;

/// Upload-ready buffers for one track's static geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackGeometry {
    pub surface: MeshBuffers,
    pub markings: MeshBuffers,
    pub barriers: MeshBuffers,
}

impl TrackGeometry {
    pub fn from_track(track: &Track) -> Self {
        let mesh = track.mesh();
        Self {
            surface: mesh.surface_buffers(),
            markings: mesh.marking_buffers(),
            barriers: mesh.barrier_buffers(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.surface.triangle_count()
            + self.markings.triangle_count()
            + self.barriers.triangle_count()
    }

    pub fn vertex_count(&self) -> usize {
        self.surface.vertices.len() + self.markings.vertices.len() + self.barriers.vertices.len()
    }
}

/// Everything a GPU backend uploads. Track buffers are cached and only
/// rebuilt when a tick reports a new track; the vehicle moves every tick.
#[derive(Debug, Clone, Default)]
pub struct FrameGeometry {
    track: TrackGeometry,
    vehicle: MeshBuffers,
    track_version: u64,
}

impl FrameGeometry {
    pub fn new(session: &Session) -> Self {
        Self {
            track: TrackGeometry::from_track(session.track()),
            vehicle: session.vehicle_model().to_buffers(&session.pose()),
            track_version: 0,
        }
    }

    /// Bring the buffers up to date after a tick.
    pub fn sync(&mut self, session: &Session, frame: &FrameOutput) {
        if frame.track_rebuilt {
            self.track = TrackGeometry::from_track(session.track());
            self.track_version += 1;
            tracing::debug!(
                version = self.track_version,
                triangles = self.track.triangle_count(),
                "track geometry rebuilt"
            );
        }
        self.vehicle = session.vehicle_model().to_buffers(&frame.pose);
    }

    pub fn track(&self) -> &TrackGeometry {
        &self.track
    }

    pub fn vehicle(&self) -> &MeshBuffers {
        &self.vehicle
    }

    /// Bumped every time the track buffers are replaced.
    pub fn track_version(&self) -> u64 {
        self.track_version
    }
}
