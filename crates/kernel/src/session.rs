use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use trackway_camera::{CameraMode, CameraRig, CameraState};
use trackway_common::{Pose, Steering, TrackError};
use trackway_input::Intent;
use trackway_locomotion::{Locomotion, LocomotionInput, VehicleState};
use trackway_mesh::VehicleModel;

use crate::config::{ConfigError, GameConfig};
use crate::track::Track;

/// Record of something that happened during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A new track was built and the vehicle respawned on it.
    TrackGenerated {
        generation: u64,
        seed: u64,
        length: f32,
    },
    /// A track failed to build. The vehicle holds its last pose.
    TrackFault {
        generation: u64,
        seed: u64,
        reason: String,
    },
    /// The vehicle wrapped past the end of the track.
    LapCompleted { lap: u64, tick: u64 },
    /// The camera switched between follow and free mode.
    CameraModeChanged { mode: CameraMode, tick: u64 },
    /// The session advanced one tick.
    Stepped { tick: u64 },
}

/// What the renderer needs after one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub tick: u64,
    pub pose: Pose,
    pub camera: CameraState,
    /// The track was replaced this tick; renderers must rebuild its geometry.
    pub track_rebuilt: bool,
    /// Why the vehicle did not move this tick, if it didn't.
    pub fault: Option<TrackError>,
}

/// The authoritative game state.
///
/// Everything the simulation mutates lives here and only changes through
/// [`Session::tick`] and [`Session::regenerate`].
#[derive(Debug, Clone)]
pub struct Session {
    config: GameConfig,
    track: Track,
    locomotion: Locomotion,
    camera: CameraRig,
    vehicle: VehicleModel,
    pose: Pose,
    speed: f32,
    paused: bool,
    tick: u64,
    /// Seed the current track was generated from.
    seed: u64,
    generation: u64,
    laps: u64,
    /// Distance over all laps and tracks.
    total_distance: f64,
    event_log: Vec<SessionEvent>,
}

impl Session {
    /// Start a session on the track for `config.seed`.
    ///
    /// Fails only on a config no session can run with. A track that does
    /// not build is not an error here; it is reported as a fault event.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (track, locomotion, settled) = build_track(&config, config.seed);
        let mut session = Self {
            config,
            track,
            locomotion,
            camera: CameraRig::new(config.camera),
            vehicle: VehicleModel::default(),
            pose: Pose::default(),
            speed: config.speed.initial,
            paused: false,
            tick: 0,
            seed: config.seed,
            generation: 0,
            laps: 0,
            total_distance: 0.0,
            event_log: Vec::new(),
        };
        session.record_install(settled);
        Ok(session)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn vehicle_state(&self) -> &VehicleState {
        self.locomotion.state()
    }

    pub fn vehicle_model(&self) -> &VehicleModel {
        &self.vehicle
    }

    /// Current vehicle pose. Held at the last valid value while the track
    /// is faulted.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of tracks generated after the first.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn laps(&self) -> u64 {
        self.laps
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Distance covered in the current lap.
    pub fn lap_distance(&self) -> f32 {
        self.locomotion.state().distance
    }

    pub fn events(&self) -> &[SessionEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Replace the track with a new one from the next seed in the sequence
    /// and respawn the vehicle at its start. The camera is left alone so it
    /// glides to the new spawn point.
    pub fn regenerate(&mut self) {
        self.seed = splitmix64(self.seed);
        self.generation += 1;
        tracing::debug!(
            generation = self.generation,
            seed = self.seed,
            "regenerating track"
        );
        self.install_track();
    }

    fn install_track(&mut self) {
        let (track, locomotion, settled) = build_track(&self.config, self.seed);
        self.track = track;
        self.locomotion = locomotion;
        self.record_install(settled);
    }

    fn record_install(&mut self, settled: Result<Pose, TrackError>) {
        let event = match settled {
            Ok(pose) => {
                self.pose = pose;
                SessionEvent::TrackGenerated {
                    generation: self.generation,
                    seed: self.seed,
                    length: self.track.length(),
                }
            }
            Err(err) => self.fault_event(&err),
        };
        self.event_log.push(event);
    }

    fn fault_event(&self, err: &TrackError) -> SessionEvent {
        tracing::warn!(
            %err,
            generation = self.generation,
            seed = self.seed,
            "track unusable, holding last vehicle pose"
        );
        SessionEvent::TrackFault {
            generation: self.generation,
            seed: self.seed,
            reason: err.to_string(),
        }
    }

    /// Advance the session by one external tick.
    ///
    /// Order: regeneration, pause, camera mode, speed, vehicle, camera.
    pub fn tick(&mut self, intent: &Intent, dt: f32) -> FrameOutput {
        self.tick += 1;
        let _span = tracing::info_span!("session_tick", tick = self.tick).entered();

        if intent.regenerate {
            self.regenerate();
        }
        if intent.toggle_pause {
            self.paused = !self.paused;
            tracing::debug!(paused = self.paused, "pause toggled");
        }
        if intent.toggle_camera {
            let mode = self.camera.toggle();
            self.event_log.push(SessionEvent::CameraModeChanged {
                mode,
                tick: self.tick,
            });
        }

        let mut fault = None;
        if !self.paused {
            self.adjust_speed(intent.speed_direction());
            if let Err(err) = self.drive(intent.steering, dt) {
                tracing::trace!(%err, "vehicle held");
                fault = Some(err);
            }
        }

        let camera = self.camera.update(&self.pose, intent.camera_delta);
        self.event_log.push(SessionEvent::Stepped { tick: self.tick });

        FrameOutput {
            tick: self.tick,
            pose: self.pose,
            camera,
            track_rebuilt: intent.regenerate,
            fault,
        }
    }

    fn adjust_speed(&mut self, direction: f32) {
        if direction == 0.0 {
            return;
        }
        let s = &self.config.speed;
        self.speed = (self.speed + direction * s.step).clamp(s.min, s.max);
    }

    fn drive(&mut self, steering: Steering, dt: f32) -> Result<(), TrackError> {
        let before = self.locomotion.state().distance;
        let input = LocomotionInput {
            steering,
            speed_multiplier: self.speed,
            dt,
        };
        let curve = self.track.curve().ok_or_else(|| track_fault(&self.track))?;
        let out = self.locomotion.tick(Some(curve), &input)?;

        if out.wrapped {
            let remaining = (self.track.length() - before).max(0.0);
            self.total_distance += f64::from(remaining);
            self.laps += 1;
            tracing::debug!(lap = self.laps, tick = self.tick, "lap completed");
            self.event_log.push(SessionEvent::LapCompleted {
                lap: self.laps,
                tick: self.tick,
            });
        } else {
            let covered = (self.locomotion.state().distance - before).max(0.0);
            self.total_distance += f64::from(covered);
        }
        self.pose = out.pose;
        Ok(())
    }

    /// Deterministic hash of the simulation state for replay comparison.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        let floats = |h: &mut u64, values: &[f32]| {
            for v in values {
                mix(h, &v.to_le_bytes());
            }
        };

        mix(&mut h, &self.tick.to_le_bytes());
        mix(&mut h, &self.seed.to_le_bytes());
        mix(&mut h, &self.generation.to_le_bytes());
        mix(&mut h, &self.laps.to_le_bytes());
        mix(&mut h, &[self.paused as u8, self.camera.mode() as u8]);
        mix(&mut h, &self.total_distance.to_le_bytes());

        let state = self.locomotion.state();
        floats(
            &mut h,
            &[
                self.speed,
                state.t,
                state.lateral,
                state.steer,
                state.distance,
            ],
        );
        floats(&mut h, &self.pose.position.to_array());
        floats(&mut h, &self.pose.rotation.to_array());
        if let Some(view) = self.camera.view() {
            floats(&mut h, &view.position.to_array());
            floats(&mut h, &view.look_at.to_array());
        }
        h
    }
}

/// Generate the track for `seed` and place a fresh vehicle at its start.
fn build_track(config: &GameConfig, seed: u64) -> (Track, Locomotion, Result<Pose, TrackError>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let track = Track::generate(&config.track, &mut rng);
    let mut locomotion = Locomotion::spawn(config.locomotion, track.width());
    let settled = match track.curve() {
        Some(curve) => locomotion.settle(curve),
        None => Err(track_fault(&track)),
    };
    (track, locomotion, settled)
}

/// Why a track has no curve.
fn track_fault(track: &Track) -> TrackError {
    track.fault().cloned().unwrap_or(TrackError::MissingCurve)
}

/// Run a fresh session through a recorded intent sequence.
pub fn replay(config: GameConfig, intents: &[Intent], dt: f32) -> Result<Session, ConfigError> {
    let mut session = Session::new(config)?;
    for intent in intents {
        session.tick(intent, dt);
    }
    Ok(session)
}

/// Scripted input that weaves left and right, holding each direction for
/// `period` ticks with a straight stretch in between.
pub fn weaving_script(ticks: u64, period: u64) -> Vec<Intent> {
    let period = period.max(1);
    (0..ticks)
        .map(|i| {
            let steering = match (i / period) % 4 {
                0 => Steering::Left,
                2 => Steering::Right,
                _ => Steering::Straight,
            };
            Intent {
                steering,
                ..Intent::default()
            }
        })
        .collect()
}

/// Splitmix64 step. Derives each regenerated track's seed from the last.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use trackway_curve::Parameterization;
    use trackway_input::Action;

    const DT: f32 = 1.0 / 60.0;

    fn run(session: &mut Session, ticks: usize, intent: &Intent) {
        for _ in 0..ticks {
            session.tick(intent, DT);
        }
    }

    #[test]
    fn new_session_has_track_and_settled_pose() {
        let session = Session::new(GameConfig::default()).unwrap();
        assert!(session.track().is_drivable());
        assert_eq!(session.tick_count(), 0);
        assert_eq!(session.pose().position, session.track().control_points()[0]);
        assert!(matches!(
            session.events(),
            [SessionEvent::TrackGenerated { generation: 0, .. }]
        ));
    }

    #[test]
    fn unusable_config_is_rejected() {
        let mut config = GameConfig::default();
        config.speed.min = 2.0;
        config.speed.max = 1.0;
        assert!(matches!(
            Session::new(config),
            Err(ConfigError::Invalid { field: "speed", .. })
        ));

        let mut config = GameConfig::default();
        config.locomotion.max_lateral = -0.5;
        assert!(matches!(
            replay(config, &weaving_script(10, 2), DT),
            Err(ConfigError::Section {
                section: "locomotion",
                ..
            })
        ));
    }

    #[test]
    fn two_thousand_ticks_wrap_at_least_once() {
        let mut session = Session::new(GameConfig::default()).unwrap();
        let mut wrapped = false;
        for _ in 0..2000 {
            let before = session.vehicle_state().t;
            session.tick(&Intent::default(), DT);
            if session.vehicle_state().t < before {
                assert_eq!(session.vehicle_state().t, 0.0);
                assert_eq!(session.lap_distance(), 0.0);
                wrapped = true;
            }
        }
        assert!(wrapped);
        assert!(session.laps() >= 1);
    }

    #[test]
    fn laps_and_total_distance_accumulate() {
        let mut session = Session::new(GameConfig::default()).unwrap();
        let length = f64::from(session.track().length());
        run(&mut session, 2500, &Intent::default());

        assert_eq!(session.laps(), 2);
        let lap_events = session
            .events()
            .iter()
            .filter(|e| matches!(e, SessionEvent::LapCompleted { .. }))
            .count();
        assert_eq!(lap_events, 2);

        let expected = length * 2.0 + f64::from(session.lap_distance());
        assert!((session.total_distance() - expected).abs() < length * 0.01);
    }

    #[test]
    fn arc_length_session_moves_evenly_and_wraps() {
        let mut config = GameConfig::default();
        config.track.parameterization = Parameterization::ArcLength;
        let mut session = Session::new(config).unwrap();
        let length = f64::from(session.track().length());

        let (mut min, mut max) = (f32::MAX, 0.0_f32);
        let mut prev = session.pose().position;
        for _ in 0..1100 {
            let laps = session.laps();
            let out = session.tick(&Intent::default(), DT);
            if session.laps() == laps {
                let step = out.pose.position.distance(prev);
                min = min.min(step);
                max = max.max(step);
            }
            prev = out.pose.position;
        }

        assert_eq!(session.laps(), 1);
        assert!(max / min < 1.3, "min={min} max={max}");
        let expected = length + f64::from(session.lap_distance());
        assert!((session.total_distance() - expected).abs() < length * 0.01);
    }

    #[test]
    fn idle_vehicle_stays_centered() {
        let mut session = Session::new(GameConfig::default()).unwrap();
        run(&mut session, 300, &Intent::default());
        assert_eq!(session.vehicle_state().lateral, 0.0);
        assert_eq!(session.vehicle_state().steer, 0.0);
    }

    #[test]
    fn speed_steps_and_clamps() {
        let mut session = Session::new(GameConfig::default()).unwrap();
        let accelerate = Intent::resolve(&[Action::Accelerate]);
        run(&mut session, 5, &accelerate);
        assert!((session.speed() - 1.5).abs() < 1e-4);

        run(&mut session, 100, &accelerate);
        assert_eq!(session.speed(), 3.0);

        run(&mut session, 100, &Intent::resolve(&[Action::Decelerate]));
        assert_eq!(session.speed(), 0.0);

        let t = session.vehicle_state().t;
        run(&mut session, 10, &Intent::default());
        assert_eq!(session.vehicle_state().t, t);
    }

    #[test]
    fn paused_session_holds_vehicle_and_speed() {
        let mut session = Session::new(GameConfig::default()).unwrap();
        run(&mut session, 10, &Intent::default());
        session.tick(&Intent::resolve(&[Action::Pause]), DT);
        assert!(session.is_paused());

        let state = *session.vehicle_state();
        let speed = session.speed();
        let out = session.tick(
            &Intent::resolve(&[Action::Accelerate, Action::SteerLeft]),
            DT,
        );
        assert_eq!(*session.vehicle_state(), state);
        assert_eq!(session.speed(), speed);
        assert!(out.camera.position.is_finite());

        session.tick(&Intent::resolve(&[Action::Pause]), DT);
        assert!(!session.is_paused());
        session.tick(&Intent::default(), DT);
        assert!(session.vehicle_state().t > state.t);
    }

    #[test]
    fn regenerate_swaps_track_and_respawns() {
        let mut session = Session::new(GameConfig::default()).unwrap();
        run(&mut session, 100, &Intent::resolve(&[Action::SteerRight]));
        let first_seed = session.seed();
        let first_points = session.track().control_points().to_vec();
        let camera_before = session.camera().view().unwrap();

        let out = session.tick(&Intent::resolve(&[Action::RegenerateTrack]), DT);
        assert!(out.track_rebuilt);
        assert_eq!(session.generation(), 1);
        assert_eq!(session.seed(), splitmix64(first_seed));
        assert_ne!(session.track().control_points(), first_points.as_slice());
        assert_eq!(session.vehicle_state().lateral, 0.0);
        assert!(session.vehicle_state().t < 0.01);

        // Camera keeps smoothing from where it was instead of snapping.
        let target = session.camera().follow().target(&out.pose);
        assert_ne!(out.camera.position, target.position);
        assert_ne!(out.camera, camera_before);
    }

    #[test]
    fn malformed_track_does_not_panic() {
        let mut config = GameConfig::default();
        config.track.segment_count = 0;
        let mut session = Session::new(config).unwrap();
        assert!(!session.track().is_drivable());
        assert!(matches!(
            session.events(),
            [SessionEvent::TrackFault { .. }]
        ));

        let out = session.tick(&Intent::resolve(&[Action::SteerLeft]), DT);
        assert_eq!(
            out.fault,
            Some(TrackError::TooFewControlPoints { count: 1 })
        );
        assert_eq!(out.pose, Pose::default());
        assert!(out.camera.position.is_finite());
    }

    #[test]
    fn camera_toggle_is_recorded() {
        let mut session = Session::new(GameConfig::default()).unwrap();
        session.tick(&Intent::default(), DT);
        let out = session.tick(
            &Intent::resolve(&[
                Action::ToggleCameraMode,
                Action::MoveCamera(Vec3::new(0.0, 5.0, 0.0)),
            ]),
            DT,
        );
        assert_eq!(session.camera().mode(), CameraMode::Free);
        assert!(session.events().iter().any(|e| matches!(
            e,
            SessionEvent::CameraModeChanged {
                mode: CameraMode::Free,
                tick: 2
            }
        )));
        // Free camera started at the follow eye and moved by the delta.
        assert!(out.camera.position.y > out.pose.position.y + 5.0);
    }

    #[test]
    fn drain_events_clears_log() {
        let mut session = Session::new(GameConfig::default()).unwrap();
        run(&mut session, 3, &Intent::default());
        let events = session.drain_events();
        assert_eq!(events.len(), 4); // track + 3 steps
        assert!(session.events().is_empty());
    }

    #[test]
    fn replay_is_deterministic() {
        let script = weaving_script(600, 40);
        let a = replay(GameConfig::default(), &script, DT).unwrap();
        let b = replay(GameConfig::default(), &script, DT).unwrap();
        assert_eq!(a.state_hash(), b.state_hash());
        assert_eq!(a.pose(), b.pose());
    }

    #[test]
    fn different_seeds_diverge() {
        let script = weaving_script(100, 20);
        let a = replay(GameConfig::default(), &script, DT).unwrap();
        let b = replay(
            GameConfig {
                seed: 7,
                ..GameConfig::default()
            },
            &script,
            DT,
        )
        .unwrap();
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn weaving_script_alternates() {
        let script = weaving_script(8, 2);
        let steering: Vec<_> = script.iter().map(|i| i.steering).collect();
        assert_eq!(
            steering,
            [
                Steering::Left,
                Steering::Left,
                Steering::Straight,
                Steering::Straight,
                Steering::Right,
                Steering::Right,
                Steering::Straight,
                Steering::Straight,
            ]
        );
    }
}
