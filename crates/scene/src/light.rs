use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Infinitely distant light. `direction` is the way the light travels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: Vec3,
    #[serde(default = "unit_intensity")]
    pub intensity: f32,
}

impl DirectionalLight {
    pub fn new(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction.normalize_or(Vec3::NEG_Y),
            color,
            intensity,
        }
    }
}

/// Light radiating from a point, fading to nothing at `range`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    #[serde(default = "unit_intensity")]
    pub intensity: f32,
    pub range: f32,
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            position,
            color,
            intensity,
            range: range.max(0.0),
        }
    }
}

fn unit_intensity() -> f32 {
    1.0
}

/// All lights in a scene plus a flat ambient term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lighting {
    pub ambient: Vec3,
    pub directional: Vec<DirectionalLight>,
    pub point: Vec<PointLight>,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.1),
            directional: Vec::new(),
            point: Vec::new(),
        }
    }
}

impl Lighting {
    /// The demo rig: a white key light from above, a cool fill and two
    /// coloured point lights.
    pub fn demo() -> Self {
        Self {
            ambient: Vec3::new(0.08, 0.08, 0.1),
            directional: vec![
                DirectionalLight::new(Vec3::new(0.3, -1.0, 0.5), Vec3::ONE, 1.0),
                DirectionalLight::new(Vec3::new(-1.0, -0.2, 0.0), Vec3::new(0.6, 0.7, 1.0), 0.3),
            ],
            point: vec![
                PointLight::new(Vec3::new(0.0, 2.0, -2.0), Vec3::new(1.0, 0.85, 0.6), 1.5, 8.0),
                PointLight::new(Vec3::new(-3.0, 1.0, 1.0), Vec3::new(0.4, 1.0, 0.6), 1.0, 5.0),
            ],
        }
    }

    pub fn light_count(&self) -> usize {
        self.directional.len() + self.point.len()
    }
}
