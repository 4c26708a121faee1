//! Scene: cameras, entities, lights and the per-frame update.
//!
//! # Invariants
//! - A scene always has at least one camera; the active index is in range.
//! - The active camera changes only inside [`Scene::update`] or through the
//!   explicit cycling methods.
//! - Entities draw in insertion order.

pub mod camera;
pub mod config;
pub mod entity;
pub mod light;
pub mod scene;

pub use camera::{Camera, Projection};
pub use config::{ConfigError, SceneConfig};
pub use entity::{Entity, Motion};
pub use light::{DirectionalLight, Lighting, PointLight};
pub use scene::{FrameParts, Scene};

pub fn crate_info() -> &'static str {
    "prism-scene v0.1.0"
}
