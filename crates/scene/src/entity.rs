use glam::Vec3;
use prism_assets::{MaterialHandle, MeshHandle};
use prism_common::{EntityId, Transform};
use serde::{Deserialize, Serialize};

/// Per-second animation applied by [`Entity::animate`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Motion {
    /// Pitch, yaw and roll rates in radians per second.
    pub spin: Vec3,
    /// World-space velocity in units per second.
    pub velocity: Vec3,
    /// Change in scale per second, added component-wise.
    pub scale_rate: Vec3,
}

impl Motion {
    pub fn spin(spin: Vec3) -> Self {
        Self {
            spin,
            ..Default::default()
        }
    }

    pub fn drift(velocity: Vec3) -> Self {
        Self {
            velocity,
            ..Default::default()
        }
    }

    pub fn is_still(&self) -> bool {
        self.spin == Vec3::ZERO && self.velocity == Vec3::ZERO && self.scale_rate == Vec3::ZERO
    }
}

/// A drawable object: one transform, one shared mesh, one shared material.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    name: String,
    mesh: MeshHandle,
    material: MaterialHandle,
    transform: Transform,
    motion: Option<Motion>,
}

impl Entity {
    /// Entity with an identity transform.
    pub fn new(mesh: MeshHandle, material: MaterialHandle) -> Self {
        let id = EntityId::new();
        Self {
            name: format!("entity-{}", id.short()),
            id,
            mesh,
            material,
            transform: Transform::new(),
            motion: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = (!motion.is_still()).then_some(motion);
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh(&self) -> MeshHandle {
        self.mesh
    }

    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    /// Point this entity at a different shared material.
    pub fn set_material(&mut self, material: MaterialHandle) {
        self.material = material;
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn motion(&self) -> Option<Motion> {
        self.motion
    }

    pub fn set_motion(&mut self, motion: Option<Motion>) {
        self.motion = motion.filter(|m| !m.is_still());
    }

    /// Advance the entity's motion by `dt` seconds. Still entities are untouched
    /// so their cached matrices stay clean.
    pub fn animate(&mut self, dt: f32) {
        let Some(motion) = self.motion else {
            return;
        };
        if motion.spin != Vec3::ZERO {
            self.transform.rotate(motion.spin * dt);
        }
        if motion.velocity != Vec3::ZERO {
            self.transform.move_absolute(motion.velocity * dt);
        }
        if motion.scale_rate != Vec3::ZERO {
            let scale = self.transform.scale() + motion.scale_rate * dt;
            self.transform.set_scale(scale);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handles() -> (MeshHandle, MaterialHandle) {
        (MeshHandle(0), MaterialHandle(0))
    }

    #[test]
    fn new_entity_has_identity_transform() {
        let (mesh, material) = handles();
        let mut e = Entity::new(mesh, material);
        assert_eq!(e.transform_mut().world_matrix(), glam::Mat4::IDENTITY);
        assert!(e.name().starts_with("entity-"));
        assert!(e.motion().is_none());
    }

    #[test]
    fn ids_are_unique() {
        let (mesh, material) = handles();
        let a = Entity::new(mesh, material);
        let b = Entity::new(mesh, material);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn animate_applies_spin_and_drift() {
        let (mesh, material) = handles();
        let mut e = Entity::new(mesh, material)
            .with_motion(Motion {
                spin: Vec3::new(0.0, 0.0, 1.0),
                velocity: Vec3::new(-2.0, 0.0, 0.0),
                scale_rate: Vec3::new(0.0, 1.0, 0.0),
            });
        e.animate(0.5);
        assert_eq!(e.transform().pitch_yaw_roll(), Vec3::new(0.0, 0.0, 0.5));
        assert_eq!(e.transform().position(), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(e.transform().scale(), Vec3::new(1.0, 1.5, 1.0));
    }

    #[test]
    fn still_entity_keeps_clean_cache() {
        let (mesh, material) = handles();
        let mut e = Entity::new(mesh, material).with_motion(Motion::default());
        assert!(e.motion().is_none());
        e.transform_mut().world_matrix();
        e.animate(1.0);
        assert!(!e.transform().is_matrix_dirty());
    }

    #[test]
    fn material_can_be_swapped() {
        let (mesh, material) = handles();
        let mut e = Entity::new(mesh, material);
        e.set_material(MaterialHandle(4));
        assert_eq!(e.material(), MaterialHandle(4));
        assert_eq!(e.mesh(), mesh);
    }
}
