//! Developer tooling: read-only telemetry over a running session.
//!
//! # Invariants
//! - Tools only read session state.

mod telemetry;

pub use telemetry::{LateralZone, Telemetry};

pub fn crate_info() -> &'static str {
    "trackway-tools v0.1.0"
}
