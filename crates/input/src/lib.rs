//! Player input mapped to actions and resolved into a per-tick intent.
//!
//! # Invariants
//! - The simulation consumes a resolved `Intent`, never raw key events.
//! - Opposing steering actions in the same tick cancel out.

pub mod action;

pub use action::{Action, Intent};

pub fn crate_info() -> &'static str {
    "trackway-input v0.1.0"
}
