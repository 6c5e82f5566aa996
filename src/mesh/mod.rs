use thiserror::Error;

pub mod glb;
pub mod loader;
pub mod obj;

pub use loader::load_mesh;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("obj error: {0}")]
    ObjError(#[from] tobj::LoadError),
    #[error("{model}: {msg}")]
    IndexError { model: String, msg: String },
    #[error("gltf error: {0}")]
    GltfError(String),
}

/// Non-indexed mesh data. Every attribute holds one entry per triangle corner,
/// so `position`, `normal` and `texcoord` stay parallel: corner `i` lives at
/// `position[3i..3i+3]`, `normal[3i..3i+3]` and `texcoord[2i..2i+2]`.
///
/// `normal` and `texcoord` are empty when they were not requested or the
/// source file doesn't have them.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct FlatMesh {
    pub position: Vec<f32>,
    pub normal: Vec<f32>,
    pub texcoord: Vec<f32>,
}

impl FlatMesh {
    pub fn new() -> FlatMesh {
        FlatMesh::default()
    }

    /// Number of corners to hand to a triangle-list draw call
    pub fn vertex_count(self: &Self) -> usize {
        self.position.len() / 3
    }

    pub fn has_normals(self: &Self) -> bool {
        !self.normal.is_empty()
    }

    pub fn has_texcoords(self: &Self) -> bool {
        !self.texcoord.is_empty()
    }

    pub fn is_empty(self: &Self) -> bool {
        self.position.is_empty()
    }
}
