//! Cameras that view the vehicle.
//!
//! # Invariants
//! - The follow camera snaps to its target on the first update and smooths
//!   afterwards.
//! - Camera state lives outside the vehicle: it survives track regeneration.
//! - Exactly one mode drives the view on any tick.

mod follow;
mod free;
mod rig;

pub use follow::{CameraConfig, CameraState, FollowCamera};
pub use free::FreeCamera;
pub use rig::{CameraMode, CameraRig};
