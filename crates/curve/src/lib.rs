//! Track geometry: control-point generation, curve evaluation, frames.
//!
//! # Invariants
//! - Generation is a pure function of the injected random source.
//! - A `Curve` is immutable; regenerating a track builds a new one.
//! - Frames are always unit length and mutually orthogonal.

pub mod curve;
pub mod frame;
pub mod path;

pub use curve::{Curve, Parameterization};
pub use frame::{Frame, frame};
pub use path::{PathBounds, generate};
