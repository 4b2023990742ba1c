//! Rendering adapter: renderer-agnostic interface over session state.
//!
//! # Invariants
//! - Renderers read a `Session`; they never mutate it.
//! - Track geometry is rebuilt only when the session reports a new track.
//!
//! The GPU backend lives outside this workspace. `DebugTextRenderer` stands
//! in for it in the CLI and in tests.

mod geometry;
mod renderer;

pub use geometry::{FrameGeometry, TrackGeometry};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "trackway-render v0.1.0"
}
