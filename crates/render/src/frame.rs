use crate::RenderError;
use glam::{Mat4, Vec3, Vec4};
use prism_assets::{MaterialHandle, MeshHandle};
use prism_common::EntityId;
use prism_scene::{Lighting, Scene};

/// Camera state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameCamera {
    pub view: Mat4,
    pub projection: Mat4,
    pub position: Vec3,
}

impl FrameCamera {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Everything a backend needs to draw one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub entity: EntityId,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub world: Mat4,
    pub world_inverse_transpose: Mat4,
    pub color_tint: Vec4,
    pub roughness: f32,
}

/// One frame's worth of draw data, detached from the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePacket {
    pub camera: FrameCamera,
    pub lighting: Lighting,
    pub draws: Vec<DrawCall>,
}

/// Flattens a scene into a [`FramePacket`].
#[derive(Debug, Default)]
pub struct FrameAssembler {
    frames: u64,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames assembled so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// One draw call per entity, in insertion order. Reading the matrices
    /// refreshes any stale transform caches.
    pub fn assemble(&mut self, scene: &mut Scene) -> Result<FramePacket, RenderError> {
        let parts = scene.frame_parts();
        let camera = FrameCamera {
            view: parts.camera.view_matrix(),
            projection: parts.camera.projection_matrix(),
            position: parts.camera.position(),
        };

        let mut draws = Vec::with_capacity(parts.entities.len());
        for entity in parts.entities.iter_mut() {
            let (id, mesh, material) = (entity.id(), entity.mesh(), entity.material());
            parts.assets.mesh(mesh)?;
            let surface = parts.assets.material(material)?;
            let transform = entity.transform_mut();
            draws.push(DrawCall {
                entity: id,
                mesh,
                material,
                world: transform.world_matrix(),
                world_inverse_transpose: transform.world_inverse_transpose_matrix(),
                color_tint: surface.color_tint(),
                roughness: surface.roughness(),
            });
        }

        self.frames += 1;
        tracing::trace!(frame = self.frames, draws = draws.len(), "frame assembled");
        Ok(FramePacket {
            camera,
            lighting: parts.lighting.clone(),
            draws,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_assets::{AssetError, Material, Mesh};
    use prism_common::Transform;
    use prism_input::InputSnapshot;
    use prism_scene::{Camera, Entity, SceneConfig};
    use std::f32::consts::FRAC_PI_4;

    fn demo_scene() -> Scene {
        Scene::from_config(&SceneConfig::default(), 16.0 / 9.0).unwrap()
    }

    #[test]
    fn one_draw_per_entity_in_order() {
        let mut scene = demo_scene();
        let packet = FrameAssembler::new().assemble(&mut scene).unwrap();
        assert_eq!(packet.draws.len(), 5);
        for (draw, entity) in packet.draws.iter().zip(scene.entities()) {
            assert_eq!(draw.entity, entity.id());
            assert_eq!(draw.mesh, entity.mesh());
            assert_eq!(draw.material, entity.material());
        }
        assert_eq!(packet.lighting, *scene.lighting());
    }

    #[test]
    fn camera_comes_from_active_camera() {
        let mut scene = demo_scene();
        scene.next_camera();
        let packet = FrameAssembler::new().assemble(&mut scene).unwrap();
        let active = scene.active_camera();
        assert_eq!(packet.camera.view, active.view_matrix());
        assert_eq!(packet.camera.projection, active.projection_matrix());
        assert_eq!(packet.camera.position, Vec3::new(5.0, 0.0, -5.0));
    }

    #[test]
    fn draw_matrices_match_transform() {
        let mut scene = Scene::new(Camera::new(1.0, Vec3::ZERO, 1.0, 0.01, FRAC_PI_4));
        let mesh = scene.assets_mut().add_mesh(Mesh::cube());
        let material = scene
            .assets_mut()
            .add_material(Material::new("m", Vec4::new(0.2, 0.4, 0.6, 1.0), 0.3));
        let transform = Transform::new()
            .with_position(Vec3::new(1.0, 2.0, 3.0))
            .with_scale(Vec3::new(2.0, 1.0, 1.0));
        scene.add_entity(Entity::new(mesh, material).with_transform(transform.clone()));

        let packet = FrameAssembler::new().assemble(&mut scene).unwrap();
        let draw = packet.draws[0];
        let mut expected = transform;
        assert_eq!(draw.world, expected.world_matrix());
        assert_eq!(
            draw.world_inverse_transpose,
            expected.world_inverse_transpose_matrix()
        );
        assert_eq!(draw.color_tint, Vec4::new(0.2, 0.4, 0.6, 1.0));
        assert!((draw.roughness - 0.3).abs() < 1e-6);
        assert!(!scene.entities()[0].transform().is_matrix_dirty());
    }

    #[test]
    fn assembly_sees_motion_after_update() {
        let mut scene = demo_scene();
        let mut assembler = FrameAssembler::new();
        let before = assembler.assemble(&mut scene).unwrap();
        scene.update(1.0, &InputSnapshot::idle());
        let after = assembler.assemble(&mut scene).unwrap();
        assert_ne!(before.draws[0].world, after.draws[0].world);
        assert_eq!(before.draws[4].world, after.draws[4].world);
        assert_eq!(assembler.frames(), 2);
    }

    #[test]
    fn shared_material_edit_reaches_every_draw() {
        let mut scene = demo_scene();
        let red = scene.entities()[0].material();
        scene
            .assets_mut()
            .material_mut(red)
            .unwrap()
            .set_color_tint(Vec4::new(1.0, 1.0, 0.0, 1.0));
        let packet = FrameAssembler::new().assemble(&mut scene).unwrap();
        let tinted: Vec<_> = packet.draws.iter().filter(|d| d.material == red).collect();
        assert_eq!(tinted.len(), 2);
        assert!(
            tinted
                .iter()
                .all(|d| d.color_tint == Vec4::new(1.0, 1.0, 0.0, 1.0))
        );
    }

    #[test]
    fn missing_material_is_an_error() {
        let mut scene = Scene::new(Camera::new(1.0, Vec3::ZERO, 1.0, 0.01, FRAC_PI_4));
        let mesh = scene.assets_mut().add_mesh(Mesh::plane());
        scene.spawn(mesh, MaterialHandle(5));
        let err = FrameAssembler::new().assemble(&mut scene).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Asset(AssetError::MaterialNotFound(MaterialHandle(5)))
        ));
    }

    #[test]
    fn missing_mesh_is_an_error() {
        let mut scene = Scene::new(Camera::new(1.0, Vec3::ZERO, 1.0, 0.01, FRAC_PI_4));
        let material = scene.assets_mut().add_material(Material::default());
        scene.spawn(MeshHandle(0), material);
        assert!(matches!(
            FrameAssembler::new().assemble(&mut scene),
            Err(RenderError::Asset(AssetError::MeshNotFound(_)))
        ));
    }

    #[test]
    fn empty_scene_assembles_no_draws() {
        let mut scene = Scene::new(Camera::new(1.0, Vec3::ZERO, 1.0, 0.01, FRAC_PI_4));
        let packet = FrameAssembler::new().assemble(&mut scene).unwrap();
        assert!(packet.draws.is_empty());
    }
}
