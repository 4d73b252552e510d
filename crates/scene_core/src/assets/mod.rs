//! Asset loading
//!
//! Loaders turn files into [`EntityTemplate`]s which the scene instantiates
//! with [`crate::scene::Scene::instantiate`]. Meshes are registered by name
//! in a [`MeshLibrary`] so serialized scenes can refer to them.

pub mod obj_loader;

pub use obj_loader::ObjLoader;

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use thiserror::Error;

use crate::render::mesh::{Mesh, SharedMesh};
use crate::scene::EntityTemplate;

/// Produces entity templates from files on disk
pub trait AssetLoader {
    /// Load `path` into a template
    fn load(&mut self, path: &Path) -> Result<EntityTemplate, AssetError>;
}

/// Name-keyed set of shared meshes
#[derive(Debug, Default, Clone)]
pub struct MeshLibrary {
    meshes: HashMap<String, SharedMesh>,
}

impl MeshLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Library holding the built-in `cube` and `quad` meshes
    pub fn with_primitives() -> Self {
        let mut library = Self::new();
        library.insert(Mesh::cube());
        library.insert(Mesh::quad());
        library
    }

    /// Register a mesh under its own name, returning the shared handle.
    /// A mesh with the same name is replaced.
    pub fn insert(&mut self, mesh: Mesh) -> SharedMesh {
        let mesh = Rc::new(mesh);
        self.insert_shared(Rc::clone(&mesh));
        mesh
    }

    /// Register an already shared mesh
    pub fn insert_shared(&mut self, mesh: SharedMesh) {
        if self.meshes.insert(mesh.name.clone(), Rc::clone(&mesh)).is_some() {
            log::debug!("Replaced mesh '{}'", mesh.name);
        }
    }

    /// Look up a mesh by name
    pub fn get(&self, name: &str) -> Option<SharedMesh> {
        self.meshes.get(name).cloned()
    }

    /// Number of registered meshes
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// True if no meshes are registered
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Invalid asset data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Unsupported asset format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// IO error during asset loading
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_are_shared() {
        let library = MeshLibrary::with_primitives();
        let a = library.get("cube").unwrap();
        let b = library.get("cube").unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert!(library.get("quad").is_some());
        assert!(library.get("teapot").is_none());
        assert_eq!(library.len(), 2);
    }
}
