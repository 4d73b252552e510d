//! Mesh representation for 3D models
//!
//! Meshes are plain CPU-side geometry shared between entities through
//! `Rc<Mesh>`; how vertices reach the GPU is the backend's business.

use std::rc::Rc;

use bytemuck::{Pod, Zeroable};

/// 3D vertex data structure for rendering
///
/// `#[repr(C)]` and `Pod` so backends can upload vertex slices with
/// `bytemuck::cast_slice` without copying.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Name used to reference the mesh from serialized scenes
    pub name: String,

    /// Vertex data
    pub vertices: Vec<Vertex>,

    /// Triangle indices into `vertices`
    pub indices: Vec<u32>,
}

/// Meshes are shared between every entity drawing them
pub type SharedMesh = Rc<Mesh>;

impl Mesh {
    /// Create a new mesh
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
        }
    }

    /// Number of indices submitted per draw
    pub fn index_count(&self) -> u32 {
        u32::try_from(self.indices.len()).unwrap_or(u32::MAX)
    }

    /// True if every index references an existing vertex
    pub fn is_valid(&self) -> bool {
        let vertex_count = self.vertices.len();
        self.indices.iter().all(|&index| (index as usize) < vertex_count)
    }

    /// Unit cube centered on the origin, 2 units wide
    pub fn cube() -> Self {
        let vertices = vec![
            // Front face
            Vertex::new([-1.0, -1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            Vertex::new([1.0, -1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
            Vertex::new([-1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
            // Back face
            Vertex::new([-1.0, -1.0, -1.0], [0.0, 0.0, -1.0], [1.0, 0.0]),
            Vertex::new([-1.0, 1.0, -1.0], [0.0, 0.0, -1.0], [1.0, 1.0]),
            Vertex::new([1.0, 1.0, -1.0], [0.0, 0.0, -1.0], [0.0, 1.0]),
            Vertex::new([1.0, -1.0, -1.0], [0.0, 0.0, -1.0], [0.0, 0.0]),
        ];

        let indices = vec![
            // Front
            0, 1, 2, 2, 3, 0,
            // Back
            4, 5, 6, 6, 7, 4,
            // Left
            4, 0, 3, 3, 5, 4,
            // Right
            1, 7, 6, 6, 2, 1,
            // Top
            3, 2, 6, 6, 5, 3,
            // Bottom
            4, 7, 1, 1, 0, 4,
        ];

        Self::new("cube", vertices, indices)
    }

    /// Unit quad in the XY plane facing +Z
    pub fn quad() -> Self {
        let vertices = vec![
            Vertex::new([-0.5, -0.5, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            Vertex::new([0.5, -0.5, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([0.5, 0.5, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
            Vertex::new([-0.5, 0.5, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
        ];
        Self::new("quad", vertices, vec![0, 1, 2, 2, 3, 0])
    }
}
