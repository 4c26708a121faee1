use crate::frame::FramePacket;
use prism_assets::AssetStore;
use std::fmt::Write;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer consumes an assembled frame and the assets it references. It
/// never sees the scene, so it cannot move entities or switch cameras.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Draw one frame.
    fn render(&mut self, frame: &FramePacket, assets: &AssetStore) -> Self::Output;
}

/// Produces a human-readable dump of a frame.
///
/// Used for CLI output, logging, and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, frame: &FramePacket, assets: &AssetStore) -> String {
        self.frames += 1;
        let mut out = String::new();
        let p = frame.camera.position;
        let _ = writeln!(out, "=== Frame {} ===", self.frames);
        let _ = writeln!(out, "Camera: pos=({:.2}, {:.2}, {:.2})", p.x, p.y, p.z);
        let _ = writeln!(
            out,
            "Lights: {} directional, {} point, ambient=({:.2}, {:.2}, {:.2})",
            frame.lighting.directional.len(),
            frame.lighting.point.len(),
            frame.lighting.ambient.x,
            frame.lighting.ambient.y,
            frame.lighting.ambient.z
        );
        let _ = writeln!(out, "Draws: {}", frame.draws.len());

        for draw in &frame.draws {
            let mesh = assets.mesh(draw.mesh).map_or("?", |m| m.name.as_str());
            let material = assets.material(draw.material).map_or("?", |m| m.name.as_str());
            let t = draw.world.w_axis;
            let c = draw.color_tint;
            let _ = writeln!(
                out,
                "  [{}] mesh={} material={} pos=({:.2}, {:.2}, {:.2}) tint=({:.2}, {:.2}, {:.2}, {:.2}) roughness={:.2}",
                draw.entity.short(),
                mesh,
                material,
                t.x,
                t.y,
                t.z,
                c.x,
                c.y,
                c.z,
                c.w,
                draw.roughness
            );
        }

        out
    }
}
