//! YAML scene description.
//!
//! A [`SceneConfig`] lists the window, clip planes, cameras, materials,
//! entities and lights. [`SceneConfig::default`] is the stock demo scene.

use crate::camera::{DEFAULT_FAR_CLIP, DEFAULT_NEAR_CLIP, Projection};
use crate::entity::Motion;
use crate::light::Lighting;
use glam::{Vec3, Vec4};
use prism_assets::MeshKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f32::consts::FRAC_PI_4;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("config defines no cameras")]
    NoCameras,
    #[error("entity {entity} uses material {index}, but only {count} are defined")]
    MaterialOutOfRange {
        entity: usize,
        index: usize,
        count: usize,
    },
    #[error("invalid clip planes: near {near}, far {far}")]
    InvalidClip { near: f32, far: f32 },
    #[error("camera {camera} has field of view {degrees} degrees, expected (0, 180)")]
    InvalidFieldOfView { camera: usize, degrees: f32 },
    #[error("camera {camera} has orthographic height {height}, expected a positive value")]
    InvalidOrthographicHeight { camera: usize, height: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Prism".into(),
            width: 1280,
            height: 720,
        }
    }
}

impl WindowConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    pub near: f32,
    pub far: f32,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            near: DEFAULT_NEAR_CLIP,
            far: DEFAULT_FAR_CLIP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    pub movement_speed: f32,
    pub look_speed: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    #[serde(default)]
    pub projection: Projection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialConfig {
    pub name: String,
    pub color: Vec4,
    #[serde(default = "default_roughness")]
    pub roughness: f32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub textures: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub samplers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub mesh: MeshKind,
    /// Index into [`SceneConfig::materials`].
    pub material: usize,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<Motion>,
}

fn default_roughness() -> f32 {
    0.5
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub clip: ClipConfig,
    pub cameras: Vec<CameraConfig>,
    pub materials: Vec<MaterialConfig>,
    pub entities: Vec<EntityConfig>,
    pub lighting: Lighting,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let camera = |position: Vec3| CameraConfig {
            position,
            rotation: Vec3::ZERO,
            movement_speed: 5.0,
            look_speed: 0.004,
            fov_degrees: FRAC_PI_4.to_degrees(),
            projection: Projection::Perspective,
        };
        let material = |name: &str, color: Vec4, roughness: f32| MaterialConfig {
            name: name.into(),
            color,
            roughness,
            textures: BTreeMap::new(),
            samplers: BTreeMap::new(),
        };
        let entity = |name: &str, mesh: MeshKind, material: usize, position: Vec3| EntityConfig {
            name: Some(name.into()),
            mesh,
            material,
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            motion: None,
        };

        Self {
            window: WindowConfig::default(),
            clip: ClipConfig::default(),
            cameras: vec![
                camera(Vec3::new(0.0, 0.0, -5.0)),
                camera(Vec3::new(5.0, 0.0, -5.0)),
                camera(Vec3::new(0.0, 5.0, -5.0)),
            ],
            materials: vec![
                material("red", Vec4::new(1.0, 0.0, 0.0, 1.0), 0.2),
                material("green", Vec4::new(0.0, 1.0, 0.0, 1.0), 0.5),
                material("blue", Vec4::new(0.0, 0.0, 1.0, 1.0), 0.8),
            ],
            entities: vec![
                EntityConfig {
                    motion: Some(Motion::spin(Vec3::new(0.0, 0.0, 0.5))),
                    ..entity("triangle", MeshKind::Triangle, 0, Vec3::new(-3.0, 0.0, 0.0))
                },
                EntityConfig {
                    motion: Some(Motion::spin(Vec3::new(0.0, 0.6, 0.0))),
                    ..entity("crate", MeshKind::Cube, 1, Vec3::ZERO)
                },
                EntityConfig {
                    motion: Some(Motion::spin(Vec3::new(0.0, 0.0, -0.5))),
                    ..entity("orb", MeshKind::Sphere, 2, Vec3::new(3.0, 0.0, 0.0))
                },
                EntityConfig {
                    scale: Vec3::splat(0.5),
                    motion: Some(Motion::drift(Vec3::new(-0.1, 0.0, 0.0))),
                    ..entity("drifter", MeshKind::Cube, 0, Vec3::new(0.0, 1.5, 0.0))
                },
                EntityConfig {
                    scale: Vec3::new(20.0, 1.0, 20.0),
                    ..entity("floor", MeshKind::Plane, 1, Vec3::new(0.0, -1.5, 0.0))
                },
            ],
            lighting: Lighting::demo(),
        }
    }
}

impl SceneConfig {
    /// Read, parse and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(
            path = %path.display(),
            cameras = config.cameras.len(),
            entities = config.entities.len(),
            "scene config loaded"
        );
        Ok(config)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Check cross references and numeric ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cameras.is_empty() {
            return Err(ConfigError::NoCameras);
        }
        let ClipConfig { near, far } = self.clip;
        if !(near > 0.0 && far > near) {
            return Err(ConfigError::InvalidClip { near, far });
        }
        for (camera, cfg) in self.cameras.iter().enumerate() {
            if !(cfg.fov_degrees > 0.0 && cfg.fov_degrees < 180.0) {
                return Err(ConfigError::InvalidFieldOfView {
                    camera,
                    degrees: cfg.fov_degrees,
                });
            }
            if let Projection::Orthographic { height } = cfg.projection {
                if !(height > 0.0) {
                    return Err(ConfigError::InvalidOrthographicHeight { camera, height });
                }
            }
        }
        let count = self.materials.len();
        for (entity, cfg) in self.entities.iter().enumerate() {
            if cfg.material >= count {
                return Err(ConfigError::MaterialOutOfRange {
                    entity,
                    index: cfg.material,
                    count,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_the_demo_layout() {
        let config = SceneConfig::default();
        config.validate().unwrap();
        assert_eq!(config.cameras.len(), 3);
        assert_eq!(config.materials.len(), 3);
        assert_eq!(config.entities.len(), 5);
        assert_eq!(config.cameras[0].position, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(config.cameras[1].position, Vec3::new(5.0, 0.0, -5.0));
        assert_eq!(config.cameras[2].position, Vec3::new(0.0, 5.0, -5.0));
        assert!((config.cameras[0].fov_degrees - 45.0).abs() < 1e-4);
    }

    #[test]
    fn yaml_round_trip_keeps_layout() {
        let config = SceneConfig::default();
        let yaml = config.to_yaml().unwrap();
        let parsed = SceneConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_yaml_fills_defaults() {
        let yaml = "
cameras:
  - position: [0.0, 1.0, -3.0]
    movement_speed: 2.0
    look_speed: 0.01
    fov_degrees: 60.0
materials:
  - name: grey
    color: [0.5, 0.5, 0.5, 1.0]
entities:
  - mesh: cube
    material: 0
";
        let config = SceneConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.clip, ClipConfig::default());
        assert_eq!(config.window, WindowConfig::default());
        assert_eq!(config.entities[0].scale, Vec3::ONE);
        assert_eq!(config.entities[0].position, Vec3::ZERO);
        assert_eq!(config.materials[0].roughness, 0.5);
        assert_eq!(config.cameras[0].projection, Projection::Perspective);
    }

    #[test]
    fn rejects_missing_cameras() {
        let config = SceneConfig {
            cameras: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoCameras)));
    }

    #[test]
    fn rejects_bad_material_reference() {
        let mut config = SceneConfig::default();
        config.entities[2].material = 7;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MaterialOutOfRange {
                entity: 2,
                index: 7,
                count: 3
            })
        ));
    }

    #[test]
    fn rejects_bad_clip_planes() {
        for (near, far) in [(0.0, 10.0), (-1.0, 10.0), (5.0, 5.0), (10.0, 1.0)] {
            let config = SceneConfig {
                clip: ClipConfig { near, far },
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidClip { .. })),
                "near {near} far {far} accepted"
            );
        }
    }

    #[test]
    fn rejects_bad_field_of_view() {
        let mut config = SceneConfig::default();
        config.cameras[1].fov_degrees = 180.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFieldOfView { camera: 1, .. })
        ));
    }

    #[test]
    fn rejects_non_positive_orthographic_height() {
        for height in [0.0, -4.0, f32::NAN] {
            let mut config = SceneConfig::default();
            config.cameras[2].projection = Projection::Orthographic { height };
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigError::InvalidOrthographicHeight { camera: 2, .. })
                ),
                "height {height} accepted"
            );
        }

        let mut config = SceneConfig::default();
        config.cameras[2].projection = Projection::Orthographic { height: 10.0 };
        config.validate().unwrap();
    }

    #[test]
    fn parse_errors_surface_as_yaml() {
        let err = SceneConfig::from_yaml_str("cameras: [[[").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn load_and_save_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.yaml");
        SceneConfig::default().save(&path).unwrap();
        let loaded = SceneConfig::load(&path).unwrap();
        assert_eq!(loaded.entities.len(), 5);

        let missing = SceneConfig::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));
    }

    #[test]
    fn window_aspect_guards_zero_height() {
        let window = WindowConfig {
            width: 800,
            height: 0,
            ..Default::default()
        };
        assert_eq!(window.aspect_ratio(), 800.0);
    }
}
