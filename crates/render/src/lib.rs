//! Rendering adapter: frame assembly and the renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers cannot mutate the scene; they only see a [`FramePacket`].
//! - A packet holds one draw call per entity, in scene insertion order.

mod frame;
mod renderer;

pub use frame::{DrawCall, FrameAssembler, FrameCamera, FramePacket};
pub use renderer::{DebugTextRenderer, Renderer};

use prism_assets::AssetError;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("asset lookup failed: {0}")]
    Asset(#[from] AssetError),
}

pub fn crate_info() -> &'static str {
    "prism-render v0.1.0"
}
