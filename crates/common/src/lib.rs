//! Shared types for the prism demo.
//!
//! # Invariants
//! - A `Transform` never hands out stale matrices or basis vectors.
//! - Each `Transform` has exactly one owner (an entity or a camera).

mod transform;
mod types;

pub use transform::Transform;
pub use types::EntityId;

pub fn crate_info() -> &'static str {
    "prism-common v0.1.0"
}
