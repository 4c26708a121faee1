//! Shared meshes and materials addressed by typed handles.
//!
//! Entities never own geometry or surface parameters. They hold a
//! [`MeshHandle`] and a [`MaterialHandle`] into one [`AssetStore`], so many
//! entities can share a mesh, and editing a material is seen by all of them.

mod material;
mod mesh;

pub use material::Material;
pub use mesh::{Mesh, MeshKind, Vertex};

use serde::{Deserialize, Serialize};

/// Index of a mesh in an [`AssetStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub u32);

/// Index of a material in an [`AssetStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialHandle(pub u32);

/// Errors from asset lookups.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("mesh not found: {0:?}")]
    MeshNotFound(MeshHandle),
    #[error("material not found: {0:?}")]
    MaterialNotFound(MaterialHandle),
}

/// Append-only mesh and material tables.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        let handle = MeshHandle(self.meshes.len() as u32);
        tracing::debug!(
            name = %mesh.name,
            vertices = mesh.vertex_count(),
            indices = mesh.index_count(),
            "mesh registered"
        );
        self.meshes.push(mesh);
        handle
    }

    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        let handle = MaterialHandle(self.materials.len() as u32);
        tracing::debug!(name = %material.name, "material registered");
        self.materials.push(material);
        handle
    }

    pub fn mesh(&self, handle: MeshHandle) -> Result<&Mesh, AssetError> {
        self.meshes
            .get(handle.0 as usize)
            .ok_or(AssetError::MeshNotFound(handle))
    }

    pub fn material(&self, handle: MaterialHandle) -> Result<&Material, AssetError> {
        self.materials
            .get(handle.0 as usize)
            .ok_or(AssetError::MaterialNotFound(handle))
    }

    pub fn material_mut(&mut self, handle: MaterialHandle) -> Result<&mut Material, AssetError> {
        self.materials
            .get_mut(handle.0 as usize)
            .ok_or(AssetError::MaterialNotFound(handle))
    }

    /// Meshes with their handles, in registration order.
    pub fn meshes(&self) -> impl Iterator<Item = (MeshHandle, &Mesh)> {
        self.meshes
            .iter()
            .enumerate()
            .map(|(i, m)| (MeshHandle(i as u32), m))
    }

    /// Materials with their handles, in registration order.
    pub fn materials(&self) -> impl Iterator<Item = (MaterialHandle, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialHandle(i as u32), m))
    }

    pub fn find_material(&self, name: &str) -> Option<MaterialHandle> {
        self.materials
            .iter()
            .position(|m| m.name == name)
            .map(|i| MaterialHandle(i as u32))
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}

pub fn crate_info() -> &'static str {
    "prism-assets v0.1.0"
}
