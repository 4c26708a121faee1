//! Input for the prism demo, captured once per frame.
//!
//! # Invariants
//! - No global input singleton: every consumer receives an `InputSnapshot`.
//! - Held movement persists across snapshots; actions and pointer motion do not.

pub mod action;
pub mod snapshot;

pub use action::{Action, MoveAction};
pub use snapshot::{InputSnapshot, InputState};

pub fn crate_info() -> &'static str {
    "prism-input v0.1.0"
}
