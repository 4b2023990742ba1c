//! Session kernel: owns the track, the vehicle and the cameras, and steps
//! them once per external tick.
//!
//! # Invariants
//! - A tick never panics; track faults are recorded and the vehicle holds
//!   its last pose.
//! - Track regeneration is atomic: the new curve and mesh are swapped in
//!   together before the vehicle moves.
//! - Given the same config and intent sequence, two sessions produce the
//!   same `state_hash`.

pub mod config;
pub mod session;
pub mod track;

pub use config::{ConfigError, GameConfig, SpeedConfig, TrackConfig};
pub use session::{FrameOutput, Session, SessionEvent, replay, weaving_script};
pub use track::Track;
