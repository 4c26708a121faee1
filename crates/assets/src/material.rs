use glam::Vec4;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Surface parameters shared by every entity that references them.
///
/// Texture and sampler slots map a shader-side binding name to the name of a
/// resource owned by the graphics backend; this crate never loads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    color_tint: Vec4,
    #[serde(deserialize_with = "clamped_roughness")]
    roughness: f32,
    #[serde(default)]
    textures: BTreeMap<String, String>,
    #[serde(default)]
    samplers: BTreeMap<String, String>,
}

fn clamped_roughness<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    f32::deserialize(deserializer).map(|r| r.clamp(0.0, 1.0))
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".into(),
            color_tint: Vec4::ONE,
            roughness: 0.5,
            textures: BTreeMap::new(),
            samplers: BTreeMap::new(),
        }
    }
}

impl Material {
    pub fn new(name: impl Into<String>, color_tint: Vec4, roughness: f32) -> Self {
        Self {
            name: name.into(),
            color_tint,
            roughness: roughness.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    pub fn color_tint(&self) -> Vec4 {
        self.color_tint
    }

    pub fn set_color_tint(&mut self, color_tint: Vec4) {
        self.color_tint = color_tint;
    }

    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    /// Clamped to `[0, 1]`.
    pub fn set_roughness(&mut self, roughness: f32) {
        self.roughness = roughness.clamp(0.0, 1.0);
    }

    pub fn add_texture(&mut self, slot: impl Into<String>, texture: impl Into<String>) {
        self.textures.insert(slot.into(), texture.into());
    }

    pub fn add_sampler(&mut self, slot: impl Into<String>, sampler: impl Into<String>) {
        self.samplers.insert(slot.into(), sampler.into());
    }

    pub fn textures(&self) -> &BTreeMap<String, String> {
        &self.textures
    }

    pub fn samplers(&self) -> &BTreeMap<String, String> {
        &self.samplers
    }
}
