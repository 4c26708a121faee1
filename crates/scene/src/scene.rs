use crate::camera::Camera;
use crate::config::{ConfigError, SceneConfig};
use crate::entity::Entity;
use crate::light::Lighting;
use prism_assets::{AssetStore, Material, MaterialHandle, Mesh, MeshHandle, MeshKind};
use prism_common::{EntityId, Transform};
use prism_input::{Action, InputSnapshot};
use std::collections::HashMap;

/// Borrowed view of a scene for building one frame.
///
/// Entities are mutable because reading their matrices refreshes the
/// transform caches.
pub struct FrameParts<'a> {
    pub entities: &'a mut [Entity],
    pub camera: &'a Camera,
    pub lighting: &'a Lighting,
    pub assets: &'a AssetStore,
}

/// Everything that is simulated and drawn.
///
/// A scene always holds at least one camera, so [`Scene::active_camera`]
/// cannot fail. Entities are kept in insertion order, which is also draw order.
#[derive(Debug, Clone)]
pub struct Scene {
    assets: AssetStore,
    entities: Vec<Entity>,
    cameras: Vec<Camera>,
    active_camera: usize,
    lighting: Lighting,
    elapsed: f32,
}

impl Scene {
    /// Empty scene viewed through `camera`.
    pub fn new(camera: Camera) -> Self {
        Self {
            assets: AssetStore::new(),
            entities: Vec::new(),
            cameras: vec![camera],
            active_camera: 0,
            lighting: Lighting::default(),
            elapsed: 0.0,
        }
    }

    /// Build a scene from a validated config. Meshes are created once per kind
    /// and shared between entities.
    pub fn from_config(config: &SceneConfig, aspect_ratio: f32) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut cameras = config.cameras.iter().map(|c| {
            Camera::new(
                aspect_ratio,
                c.position,
                c.movement_speed,
                c.look_speed,
                c.fov_degrees.to_radians(),
            )
            .with_clip_planes(config.clip.near, config.clip.far)
            .with_projection(c.projection)
            .with_rotation(c.rotation)
        });
        let first = cameras.next().ok_or(ConfigError::NoCameras)?;
        let mut scene = Self::new(first);
        scene.cameras.extend(cameras);
        scene.lighting = config.lighting.clone();

        let materials: Vec<MaterialHandle> = config
            .materials
            .iter()
            .map(|m| {
                let mut material = Material::new(m.name.clone(), m.color, m.roughness);
                for (slot, texture) in &m.textures {
                    material.add_texture(slot.clone(), texture.clone());
                }
                for (slot, sampler) in &m.samplers {
                    material.add_sampler(slot.clone(), sampler.clone());
                }
                scene.assets.add_material(material)
            })
            .collect();

        let mut meshes: HashMap<MeshKind, MeshHandle> = HashMap::new();
        for (index, e) in config.entities.iter().enumerate() {
            let mesh = *meshes
                .entry(e.mesh)
                .or_insert_with(|| scene.assets.add_mesh(Mesh::primitive(e.mesh)));
            let material = *materials
                .get(e.material)
                .ok_or(ConfigError::MaterialOutOfRange {
                    entity: index,
                    index: e.material,
                    count: materials.len(),
                })?;
            let transform = Transform::new()
                .with_position(e.position)
                .with_rotation(e.rotation)
                .with_scale(e.scale);
            let mut entity = Entity::new(mesh, material).with_transform(transform);
            if let Some(name) = &e.name {
                entity = entity.with_name(name.clone());
            }
            if let Some(motion) = e.motion {
                entity = entity.with_motion(motion);
            }
            scene.add_entity(entity);
        }

        tracing::info!(
            cameras = scene.cameras.len(),
            entities = scene.entities.len(),
            meshes = scene.assets.mesh_count(),
            materials = scene.assets.material_count(),
            "scene built"
        );
        Ok(scene)
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetStore {
        &mut self.assets
    }

    /// Add an entity with an identity transform. Returns its id.
    pub fn spawn(&mut self, mesh: MeshHandle, material: MaterialHandle) -> EntityId {
        self.add_entity(Entity::new(mesh, material))
    }

    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        tracing::debug!(id = %id, name = entity.name(), "entity spawned");
        self.entities.push(entity);
        id
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    /// Entities in insertion order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn lighting_mut(&mut self) -> &mut Lighting {
        &mut self.lighting
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn add_camera(&mut self, camera: Camera) -> usize {
        self.cameras.push(camera);
        self.cameras.len() - 1
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    pub fn active_camera_index(&self) -> usize {
        self.active_camera
    }

    pub fn active_camera(&self) -> &Camera {
        &self.cameras[self.active_camera]
    }

    pub fn active_camera_mut(&mut self) -> &mut Camera {
        &mut self.cameras[self.active_camera]
    }

    /// Select a camera by index. Out-of-range indices are ignored.
    pub fn set_active_camera(&mut self, index: usize) -> bool {
        if index < self.cameras.len() {
            self.active_camera = index;
            true
        } else {
            false
        }
    }

    pub fn next_camera(&mut self) {
        self.active_camera = (self.active_camera + 1) % self.cameras.len();
        tracing::debug!(index = self.active_camera, "next camera");
    }

    pub fn previous_camera(&mut self) {
        let count = self.cameras.len();
        self.active_camera = (self.active_camera + count - 1) % count;
        tracing::debug!(index = self.active_camera, "previous camera");
    }

    /// New drawable size in pixels. Every camera gets the new aspect ratio so
    /// switching cameras after a resize shows no stretching.
    pub fn resize(&mut self, width: u32, height: u32) {
        let aspect_ratio = width as f32 / height.max(1) as f32;
        for camera in &mut self.cameras {
            camera.set_aspect_ratio(aspect_ratio);
        }
        tracing::debug!(width, height, aspect_ratio, "scene resized");
    }

    /// Seconds simulated so far.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// One simulation step: camera switching, entity motion, then the active
    /// camera.
    pub fn update(&mut self, dt: f32, input: &InputSnapshot) {
        for action in input.actions() {
            match action {
                Action::NextCamera => self.next_camera(),
                Action::PreviousCamera => self.previous_camera(),
                Action::ToggleOverlay | Action::Quit => {}
            }
        }

        for entity in &mut self.entities {
            entity.animate(dt);
        }

        self.cameras[self.active_camera].update(dt, input);
        self.elapsed += dt;
    }

    /// Split borrows for frame assembly.
    pub fn frame_parts(&mut self) -> FrameParts<'_> {
        FrameParts {
            entities: &mut self.entities,
            camera: &self.cameras[self.active_camera],
            lighting: &self.lighting,
            assets: &self.assets,
        }
    }
}
