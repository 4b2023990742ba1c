//! Shared types for the trackway crates.
//!
//! # Invariants
//! - A `Pose` handed to collaborators is always finite.
//! - Track faults are values, never panics.

mod error;
mod types;

pub use error::TrackError;
pub use types::{Pose, Steering};
