use serde::Serialize;
use trackway_camera::CameraMode;
use trackway_kernel::Session;

/// Lateral offsets within this band of the centerline count as centered.
pub const CENTER_DEADBAND: f32 = 0.2;

/// Coarse side-of-road readout for the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LateralZone {
    Left,
    Center,
    Right,
}

impl LateralZone {
    pub fn classify(lateral: f32, deadband: f32) -> Self {
        if lateral < -deadband {
            LateralZone::Left
        } else if lateral > deadband {
            LateralZone::Right
        } else {
            LateralZone::Center
        }
    }
}

impl std::fmt::Display for LateralZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LateralZone::Left => "left",
            LateralZone::Center => "center",
            LateralZone::Right => "right",
        };
        f.write_str(s)
    }
}

/// Snapshot of the numbers a HUD shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    pub tick: u64,
    pub generation: u64,
    pub lap_distance: f32,
    pub total_distance: f64,
    pub laps: u64,
    pub speed: f32,
    pub paused: bool,
    pub lateral: f32,
    pub zone: LateralZone,
    pub camera_mode: CameraMode,
    pub camera_position: Option<[f32; 3]>,
    pub track_fault: Option<String>,
}

impl Telemetry {
    pub fn capture(session: &Session) -> Self {
        let state = session.vehicle_state();
        Self {
            tick: session.tick_count(),
            generation: session.generation(),
            lap_distance: state.distance,
            total_distance: session.total_distance(),
            laps: session.laps(),
            speed: session.speed(),
            paused: session.is_paused(),
            lateral: state.lateral,
            zone: LateralZone::classify(state.lateral, CENTER_DEADBAND),
            camera_mode: session.camera().mode(),
            camera_position: session.camera().view().map(|v| v.position.to_array()),
            track_fault: session.track().fault().map(ToString::to_string),
        }
    }
}

impl std::fmt::Display for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tick={} distance={:.1} total={:.1} laps={} speed={:.1} zone={} camera={}",
            self.tick,
            self.lap_distance,
            self.total_distance,
            self.laps,
            self.speed,
            self.zone,
            self.camera_mode
        )?;
        if let Some([x, y, z]) = self.camera_position {
            write!(f, " eye=({x:.1}, {y:.1}, {z:.1})")?;
        }
        if self.paused {
            f.write_str(" [paused]")?;
        }
        if let Some(fault) = &self.track_fault {
            write!(f, " fault=\"{fault}\"")?;
        }
        Ok(())
    }
}
