use std::fmt::Write;

use glam::{Mat4, Vec3};
use trackway_camera::CameraState;
use trackway_kernel::Session;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 10.0, 15.0),
            target: Vec3::ZERO,
            fov_degrees: 75.0,
        }
    }
}

impl RenderView {
    pub fn from_camera(state: &CameraState) -> Self {
        Self {
            eye: state.position,
            target: state.look_at,
            ..Self::default()
        }
    }

    /// The session's current camera view, or the default view before the
    /// first tick.
    pub fn of_session(session: &Session) -> Self {
        session
            .camera()
            .view()
            .map_or_else(Self::default, |state| Self::from_camera(&state))
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, 0.1, 1000.0)
    }
}

/// Renderer-agnostic interface. Reads session state and a view, produces
/// output, and never mutates the session.
pub trait Renderer {
    type Output;

    fn render(&self, session: &Session, view: &RenderView) -> Self::Output;
}

/// Human-readable dump of a session, for the CLI and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, session: &Session, view: &RenderView) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_session(&mut out, session, view);
        out
    }
}

fn write_session(out: &mut String, session: &Session, view: &RenderView) -> std::fmt::Result {
    writeln!(
        out,
        "=== Session (tick={}, seed={}, generation={}) ===",
        session.tick_count(),
        session.seed(),
        session.generation()
    )?;

    let track = session.track();
    match track.fault() {
        Some(err) => writeln!(
            out,
            "Track: FAULT ({err}), control_points={}",
            track.control_points().len()
        )?,
        None => {
            let mesh = track.mesh();
            writeln!(
                out,
                "Track: control_points={} length={:.1} width={:.1} parameterization={:?}",
                track.control_points().len(),
                track.length(),
                track.width(),
                track.parameterization().unwrap_or_default()
            )?;
            writeln!(
                out,
                "Mesh: surface={} markings={} barriers={}",
                mesh.surface.len(),
                mesh.markings.len(),
                mesh.barriers.len()
            )?;
        }
    }

    let state = session.vehicle_state();
    let p = session.pose().position;
    let f = session.pose().forward();
    writeln!(
        out,
        "Vehicle: pos=({:.2}, {:.2}, {:.2}) fwd=({:.2}, {:.2}, {:.2}) t={:.4} lateral={:.3} steer={:.3}",
        p.x, p.y, p.z, f.x, f.y, f.z, state.t, state.lateral, state.steer
    )?;
    writeln!(
        out,
        "Progress: lap_distance={:.1} total={:.1} laps={} speed={:.1}{}",
        state.distance,
        session.total_distance(),
        session.laps(),
        session.speed(),
        if session.is_paused() { " [paused]" } else { "" }
    )?;
    writeln!(
        out,
        "Camera ({}): eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
        session.camera().mode(),
        view.eye.x,
        view.eye.y,
        view.eye.z,
        view.target.x,
        view.target.y,
        view.target.z,
        view.fov_degrees
    )?;
    Ok(())
}
