//! CPU-side geometry and the built-in primitives.
//!
//! Triangles wind so that `(b - a) x (c - a)` points out of the surface. With
//! the left-handed view and projection used by the renderer, front faces come
//! out clockwise on screen.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// The procedural shapes the demo can place in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshKind {
    Cube,
    Plane,
    Sphere,
    Triangle,
}

/// Indexed triangle list.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn primitive(kind: MeshKind) -> Self {
        match kind {
            MeshKind::Cube => Self::cube(),
            MeshKind::Plane => Self::plane(),
            MeshKind::Sphere => Self::sphere(24, 16),
            MeshKind::Triangle => Self::triangle(),
        }
    }

    /// Unit cube centred on the origin.
    pub fn cube() -> Self {
        let p = 0.5_f32;
        #[rustfmt::skip]
        let vertices = vec![
            // +Z face
            Vertex::new([-p, -p,  p], [0.0, 0.0, 1.0], [0.0, 1.0]),
            Vertex::new([ p, -p,  p], [0.0, 0.0, 1.0], [1.0, 1.0]),
            Vertex::new([ p,  p,  p], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([-p,  p,  p], [0.0, 0.0, 1.0], [0.0, 0.0]),
            // -Z face
            Vertex::new([ p, -p, -p], [0.0, 0.0, -1.0], [0.0, 1.0]),
            Vertex::new([-p, -p, -p], [0.0, 0.0, -1.0], [1.0, 1.0]),
            Vertex::new([-p,  p, -p], [0.0, 0.0, -1.0], [1.0, 0.0]),
            Vertex::new([ p,  p, -p], [0.0, 0.0, -1.0], [0.0, 0.0]),
            // +X face
            Vertex::new([ p, -p,  p], [1.0, 0.0, 0.0], [0.0, 1.0]),
            Vertex::new([ p, -p, -p], [1.0, 0.0, 0.0], [1.0, 1.0]),
            Vertex::new([ p,  p, -p], [1.0, 0.0, 0.0], [1.0, 0.0]),
            Vertex::new([ p,  p,  p], [1.0, 0.0, 0.0], [0.0, 0.0]),
            // -X face
            Vertex::new([-p, -p, -p], [-1.0, 0.0, 0.0], [0.0, 1.0]),
            Vertex::new([-p, -p,  p], [-1.0, 0.0, 0.0], [1.0, 1.0]),
            Vertex::new([-p,  p,  p], [-1.0, 0.0, 0.0], [1.0, 0.0]),
            Vertex::new([-p,  p, -p], [-1.0, 0.0, 0.0], [0.0, 0.0]),
            // +Y face
            Vertex::new([-p,  p,  p], [0.0, 1.0, 0.0], [0.0, 1.0]),
            Vertex::new([ p,  p,  p], [0.0, 1.0, 0.0], [1.0, 1.0]),
            Vertex::new([ p,  p, -p], [0.0, 1.0, 0.0], [1.0, 0.0]),
            Vertex::new([-p,  p, -p], [0.0, 1.0, 0.0], [0.0, 0.0]),
            // -Y face
            Vertex::new([-p, -p, -p], [0.0, -1.0, 0.0], [0.0, 1.0]),
            Vertex::new([ p, -p, -p], [0.0, -1.0, 0.0], [1.0, 1.0]),
            Vertex::new([ p, -p,  p], [0.0, -1.0, 0.0], [1.0, 0.0]),
            Vertex::new([-p, -p,  p], [0.0, -1.0, 0.0], [0.0, 0.0]),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0,1,2, 2,3,0,       // +Z
            4,5,6, 6,7,4,       // -Z
            8,9,10, 10,11,8,    // +X
            12,13,14, 14,15,12, // -X
            16,17,18, 18,19,16, // +Y
            20,21,22, 22,23,20, // -Y
        ];
        Self::new("cube", vertices, indices)
    }

    /// Unit square in the XZ plane facing +Y.
    pub fn plane() -> Self {
        let h = 0.5_f32;
        let n = [0.0, 1.0, 0.0];
        let vertices = vec![
            Vertex::new([-h, 0.0, -h], n, [0.0, 1.0]),
            Vertex::new([h, 0.0, -h], n, [1.0, 1.0]),
            Vertex::new([h, 0.0, h], n, [1.0, 0.0]),
            Vertex::new([-h, 0.0, h], n, [0.0, 0.0]),
        ];
        Self::new("plane", vertices, vec![0, 3, 2, 2, 1, 0])
    }

    /// Single triangle in the XY plane facing -Z, towards a camera behind the origin.
    pub fn triangle() -> Self {
        let n = [0.0, 0.0, -1.0];
        let vertices = vec![
            Vertex::new([0.0, 0.5, 0.0], n, [0.5, 0.0]),
            Vertex::new([0.5, -0.5, 0.0], n, [1.0, 1.0]),
            Vertex::new([-0.5, -0.5, 0.0], n, [0.0, 1.0]),
        ];
        Self::new("triangle", vertices, vec![0, 1, 2])
    }

    /// UV sphere of radius 0.5.
    pub fn sphere(segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let radius = 0.5_f32;

        let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            let theta = v * PI;
            for segment in 0..=segments {
                let u = segment as f32 / segments as f32;
                let phi = u * TAU;
                let normal = [theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()];
                let position = [normal[0] * radius, normal[1] * radius, normal[2] * radius];
                vertices.push(Vertex::new(position, normal, [u, v]));
            }
        }

        let stride = segments + 1;
        let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = (ring + 1) * stride + segment;
                let c = b + 1;
                let d = a + 1;
                indices.extend_from_slice(&[a, c, b, a, d, c]);
            }
        }

        Self::new("sphere", vertices, indices)
    }
}
