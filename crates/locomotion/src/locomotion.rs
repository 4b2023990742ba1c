use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use trackway_common::{Pose, Steering, TrackError};
use trackway_curve::{Curve, frame};

/// Upper bound on how many reference ticks one call may integrate.
const MAX_STEP_SCALE: f32 = 4.0;

/// Tuning for the steering, lateral and forward integrators.
///
/// Gains are per reference tick: a tick with `dt == reference_dt` applies
/// them exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Steering change per tick while a direction is held.
    pub turn_rate: f32,
    /// Steering accumulator bound `smax`.
    pub max_steer: f32,
    /// Multiplier applied to steering per tick when no direction is held.
    pub damping: f32,
    /// Steering magnitudes below this snap to exactly zero.
    pub steer_epsilon: f32,
    /// Lateral change per unit of steering per tick.
    pub lateral_gain: f32,
    /// Lateral bound `ℓmax`, as a fraction of the half-width.
    pub max_lateral: f32,
    /// Curve parameter advanced per tick at speed multiplier 1.
    pub forward_gain: f32,
    /// Height of the cosmetic bounce.
    pub bounce_amplitude: f32,
    /// Bounce phase advance in radians per unit of lap distance.
    pub bounce_frequency: f32,
    /// Roll (radians) per unit of steering.
    pub bank_factor: f32,
    /// Tick length the gains are tuned for.
    pub reference_dt: f32,
}

impl LocomotionConfig {
    /// Reject gains and bounds the integrators cannot run with.
    pub fn validate(&self) -> Result<(), TrackError> {
        if !(self.reference_dt.is_finite() && self.reference_dt > 0.0) {
            return Err(invalid("reference_dt", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(invalid("damping", "must lie in [0, 1]"));
        }
        let magnitudes = [
            self.turn_rate,
            self.max_steer,
            self.steer_epsilon,
            self.lateral_gain,
            self.max_lateral,
            self.forward_gain,
        ];
        if !magnitudes.iter().all(|m| m.is_finite() && *m >= 0.0) {
            return Err(invalid(
                "gains and bounds",
                "must be finite and non-negative",
            ));
        }
        let shaping = [
            self.bounce_amplitude,
            self.bounce_frequency,
            self.bank_factor,
        ];
        if !shaping.iter().all(|v| v.is_finite()) {
            return Err(TrackError::NonFinite("locomotion config"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: &'static str) -> TrackError {
    TrackError::InvalidParameter { name, reason }
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            turn_rate: 0.02,
            max_steer: 0.1,
            damping: 0.85,
            steer_epsilon: 1e-4,
            lateral_gain: 0.5,
            max_lateral: 0.85,
            forward_gain: 0.001,
            bounce_amplitude: 0.03,
            bounce_frequency: 0.8,
            bank_factor: 2.0,
            reference_dt: 1.0 / 60.0,
        }
    }
}

/// Mutable vehicle state. Reset whenever the track is regenerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Forward parameter along the curve, `[0, 1)`.
    pub t: f32,
    /// Offset from the centerline as a fraction of the half-width.
    pub lateral: f32,
    /// Steering accumulator.
    pub steer: f32,
    /// Distance covered in the current lap.
    pub distance: f32,
}

/// Everything the external loop supplies for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionInput {
    pub steering: Steering,
    pub speed_multiplier: f32,
    pub dt: f32,
}

/// Result of a successful tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    pub pose: Pose,
    /// `t · curve.length()`.
    pub distance: f32,
    /// The vehicle crossed `t = 1` this tick and restarted at 0.
    pub wrapped: bool,
}

/// Owns the vehicle state and advances it along a curve once per tick.
#[derive(Debug, Clone)]
pub struct Locomotion {
    config: LocomotionConfig,
    half_width: f32,
    state: VehicleState,
    last_pose: Pose,
}

impl Locomotion {
    /// A fresh vehicle at the start of a track of the given width.
    pub fn spawn(config: LocomotionConfig, track_width: f32) -> Self {
        Self {
            config,
            half_width: track_width * 0.5,
            state: VehicleState::default(),
            last_pose: Pose::default(),
        }
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    /// Most recent valid pose. Held unchanged while ticks fail.
    pub fn last_pose(&self) -> Pose {
        self.last_pose
    }

    /// Place the vehicle for its current state without advancing it.
    pub fn settle(&mut self, curve: &Curve) -> Result<Pose, TrackError> {
        let pose = self.place(curve, &self.state)?;
        self.last_pose = pose;
        Ok(pose)
    }

    /// Advance one tick.
    ///
    /// With no curve, or if the new pose would not be finite, returns an
    /// error and leaves both state and last pose untouched.
    pub fn tick(
        &mut self,
        curve: Option<&Curve>,
        input: &LocomotionInput,
    ) -> Result<TickOutput, TrackError> {
        let curve = curve.ok_or(TrackError::MissingCurve)?;
        let k = self.step_scale(input.dt);

        let mut next = self.state;
        next.steer = self.integrate_steering(next.steer, input.steering, k);
        let bound = self.config.max_lateral;
        next.lateral = (next.lateral + next.steer * self.config.lateral_gain * k)
            .max(-bound)
            .min(bound);

        let speed = if input.speed_multiplier.is_finite() {
            input.speed_multiplier.max(0.0)
        } else {
            0.0
        };
        let advanced = next.t + self.config.forward_gain * speed * k;
        let wrapped = advanced >= 1.0;
        if wrapped {
            next.t = 0.0;
            next.distance = 0.0;
        } else {
            next.distance += (advanced - next.t) * curve.length();
            next.t = advanced;
        }

        let pose = self.place(curve, &next)?;
        self.state = next;
        self.last_pose = pose;

        if wrapped {
            tracing::debug!("vehicle wrapped to start of track");
        }

        Ok(TickOutput {
            pose,
            distance: next.t * curve.length(),
            wrapped,
        })
    }

    fn step_scale(&self, dt: f32) -> f32 {
        let k = dt / self.config.reference_dt;
        if k.is_finite() {
            k.clamp(0.0, MAX_STEP_SCALE)
        } else {
            0.0
        }
    }

    fn integrate_steering(&self, steer: f32, steering: Steering, k: f32) -> f32 {
        let c = &self.config;
        match steering {
            Steering::Left => (steer - c.turn_rate * k).max(-c.max_steer),
            Steering::Right => (steer + c.turn_rate * k).min(c.max_steer),
            Steering::Straight => {
                let damped = steer * c.damping.powf(k);
                if damped.abs() < c.steer_epsilon {
                    0.0
                } else {
                    damped
                }
            }
        }
    }

    /// World pose for a state: curve point offset along the frame, plus a
    /// small bounce, banked by the steering accumulator.
    fn place(&self, curve: &Curve, state: &VehicleState) -> Result<Pose, TrackError> {
        let fr = frame(curve.tangent(state.t), Vec3::Y);
        let bounce =
            self.config.bounce_amplitude * (state.distance * self.config.bounce_frequency).sin();
        let position = curve.position(state.t)
            + fr.right * (state.lateral * self.half_width)
            + fr.up * bounce;

        let bank = Quat::from_axis_angle(fr.forward, state.steer * self.config.bank_factor);
        let pose = Pose::new(position, (bank * fr.rotation()).normalize());

        if pose.is_finite() {
            Ok(pose)
        } else {
            tracing::warn!(?state, "vehicle pose is not finite");
            Err(TrackError::NonFinite("vehicle pose"))
        }
    }
}
