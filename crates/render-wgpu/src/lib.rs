//! wgpu render backend.
//!
//! Draws assembled frames with a lit pipeline (Lambert diffuse, Blinn-Phong
//! specular, directional and point lights) and a gradient sky behind them.
//!
//! # Invariants
//! - The renderer reads [`prism_render::FramePacket`]s only and never touches
//!   the scene.
//! - Meshes are uploaded once per handle; the asset store is append-only.

mod gpu;
mod shaders;
mod sky;

pub use gpu::{
    FrameUniforms, GpuDirectionalLight, GpuPointLight, MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS,
    OBJECT_STRIDE, ObjectUniforms, SurfaceTarget, WgpuRenderer, pack_objects,
};
pub use sky::{SkyGradient, SkyPass, SkyUniforms};
