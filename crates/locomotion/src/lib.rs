//! Vehicle locomotion along a track curve.
//!
//! # Invariants
//! - `t` stays in `[0, 1)`; crossing 1 wraps to exactly 0 and resets the lap
//!   distance in the same tick.
//! - Lateral position and steering never leave their configured bounds.
//! - A failed tick leaves the state untouched and the last pose held.

mod locomotion;

pub use locomotion::{Locomotion, LocomotionConfig, LocomotionInput, TickOutput, VehicleState};
pub use trackway_common::Steering;
