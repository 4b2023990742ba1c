use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use trackway_camera::CameraConfig;
use trackway_common::TrackError;
use trackway_curve::{Parameterization, PathBounds};
use trackway_locomotion::LocomotionConfig;
use trackway_mesh::RoadMeshConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
    #[error("invalid `{section}` config: {source}")]
    Section {
        section: &'static str,
        source: TrackError,
    },
}

/// Shape of a generated track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub segment_count: usize,
    pub segment_length: f32,
    pub parameterization: Parameterization,
    pub bounds: PathBounds,
    pub road: RoadMeshConfig,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            segment_count: 20,
            segment_length: 20.0,
            parameterization: Parameterization::Uniform,
            bounds: PathBounds::default(),
            road: RoadMeshConfig::default(),
        }
    }
}

/// Range and step of the player-controlled speed multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    pub initial: f32,
    pub min: f32,
    pub max: f32,
    /// Change per accelerate/decelerate tick.
    pub step: f32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            initial: 1.0,
            min: 0.0,
            max: 3.0,
            step: 0.1,
        }
    }
}

/// Everything a session needs. Missing fields fall back to defaults, so a
/// config file only has to name what it changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed of the first track. Later tracks derive their seeds from it.
    pub seed: u64,
    pub track: TrackConfig,
    pub locomotion: LocomotionConfig,
    pub camera: CameraConfig,
    pub speed: SpeedConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            track: TrackConfig::default(),
            locomotion: LocomotionConfig::default(),
            camera: CameraConfig::default(),
            speed: SpeedConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), seed = config.seed, "loaded config");
        Ok(config)
    }

    /// Reject values no session can run with.
    ///
    /// A zero segment count is allowed: it produces a faulted track, which
    /// the session handles at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let track = &self.track;
        if !(track.segment_length.is_finite() && track.segment_length > 0.0) {
            return Err(invalid("track.segment_length", "must be positive"));
        }
        track.road.validate().map_err(section("track.road"))?;

        let b = &track.bounds;
        if !(probability(b.turn_probability) && probability(b.elevation_probability)) {
            return Err(invalid("track.bounds", "probabilities must lie in [0, 1]"));
        }
        let limits = [
            b.max_lateral_step,
            b.lateral_limit,
            b.max_elevation_step,
            b.max_elevation,
        ];
        if !limits.iter().all(|v| v.is_finite() && *v >= 0.0) {
            return Err(invalid(
                "track.bounds",
                "steps and limits must be non-negative",
            ));
        }

        self.locomotion.validate().map_err(section("locomotion"))?;

        if !(0.0..=1.0).contains(&self.camera.lerp_factor) {
            return Err(invalid("camera.lerp_factor", "must lie in [0, 1]"));
        }

        let speed = &self.speed;
        if !(speed.min.is_finite() && speed.max.is_finite() && speed.min >= 0.0) {
            return Err(invalid("speed", "range must be finite and non-negative"));
        }
        if speed.min > speed.max {
            return Err(invalid("speed", "min exceeds max"));
        }
        if !(speed.min..=speed.max).contains(&speed.initial) {
            return Err(invalid("speed.initial", "must lie within [min, max]"));
        }
        if !(speed.step.is_finite() && speed.step >= 0.0) {
            return Err(invalid("speed.step", "must be non-negative"));
        }
        Ok(())
    }
}

fn probability(p: f32) -> bool {
    (0.0..=1.0).contains(&p)
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn section(section: &'static str) -> impl FnOnce(TrackError) -> ConfigError {
    move |source| ConfigError::Section { section, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
        assert_eq!(GameConfig::default().track.segment_count, 20);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            GameConfig::from_json_str(r#"{ "seed": 7, "track": { "segment_count": 5 } }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.track.segment_count, 5);
        assert_eq!(config.track.segment_length, 20.0);
        assert_eq!(config.speed, SpeedConfig::default());
    }

    #[test]
    fn arc_length_selectable() {
        let config =
            GameConfig::from_json_str(r#"{ "track": { "parameterization": "arc_length" } }"#)
                .unwrap();
        assert_eq!(config.track.parameterization, Parameterization::ArcLength);
    }

    #[test]
    fn inverted_speed_range_rejected() {
        let err =
            GameConfig::from_json_str(r#"{ "speed": { "min": 2.0, "max": 1.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "speed", .. }));
    }

    #[test]
    fn bad_probability_rejected() {
        let mut config = GameConfig::default();
        config.track.bounds.turn_probability = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_width_rejected() {
        let mut config = GameConfig::default();
        config.track.road.width = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Section {
                section: "track.road",
                ..
            })
        ));
    }

    #[test]
    fn negative_lateral_bound_rejected() {
        let err = GameConfig::from_json_str(r#"{ "locomotion": { "max_lateral": -0.5 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Section {
                section: "locomotion",
                source: TrackError::InvalidParameter { .. },
            }
        ));
        assert!(err.to_string().contains("locomotion"));
    }

    #[test]
    fn bad_damping_rejected() {
        let mut config = GameConfig::default();
        config.locomotion.damping = 2.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Section {
                section: "locomotion",
                ..
            })
        ));
    }

    #[test]
    fn zero_segments_allowed() {
        let mut config = GameConfig::default();
        config.track.segment_count = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_json_reported() {
        assert!(matches!(
            GameConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn missing_file_reported() {
        let err = GameConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("here.json"));
    }
}
