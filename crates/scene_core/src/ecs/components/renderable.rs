//! Renderable components
//!
//! [`MeshRenderer`] pairs a shared mesh with a shared material and yields one
//! render command per frame. [`InstancedRenderer`] draws the same pair many
//! times in one call, each instance offset by its own local matrix.

use std::rc::Rc;

use crate::ecs::Component;
use crate::foundation::math::Mat4;
use crate::render::material::SharedMaterial;
use crate::render::mesh::SharedMesh;

/// Draws one mesh with one material at the entity's world transform
#[derive(Debug, Clone)]
pub struct MeshRenderer {
    /// Geometry; entities without a mesh are not drawn
    pub mesh: Option<SharedMesh>,

    /// Material; entities without a material are not drawn
    pub material: Option<SharedMaterial>,

    /// Whether this object is visible
    pub visible: bool,
}

impl MeshRenderer {
    /// Create a visible renderer
    pub fn new(mesh: SharedMesh, material: SharedMaterial) -> Self {
        Self {
            mesh: Some(mesh),
            material: Some(material),
            visible: true,
        }
    }

    /// Renderer with geometry but no material yet
    pub fn without_material(mesh: SharedMesh) -> Self {
        Self {
            mesh: Some(mesh),
            material: None,
            visible: true,
        }
    }

    /// Set visibility
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Set the material
    pub fn set_material(&mut self, material: SharedMaterial) {
        self.material = Some(material);
    }

    /// Check if this component should be rendered
    pub fn should_render(&self) -> bool {
        self.visible && self.mesh.is_some() && self.material.is_some()
    }

    /// True if both renderers point at the very same material instance
    pub fn shares_material_with(&self, other: &Self) -> bool {
        match (&self.material, &other.material) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Component for MeshRenderer {
    fn type_tag(&self) -> &'static str {
        "MeshRenderer"
    }
}

/// Draws one mesh many times with a single instanced draw call
#[derive(Debug, Clone)]
pub struct InstancedRenderer {
    /// Shared geometry
    pub mesh: Option<SharedMesh>,
    /// Shared material
    pub material: Option<SharedMaterial>,
    /// Per-instance transforms, relative to the owning entity
    pub instances: Vec<Mat4>,
    /// Whether this object is visible
    pub visible: bool,
}

impl InstancedRenderer {
    /// Create a renderer with no instances
    pub fn new(mesh: SharedMesh, material: SharedMaterial) -> Self {
        Self {
            mesh: Some(mesh),
            material: Some(material),
            instances: Vec::new(),
            visible: true,
        }
    }

    /// Builder: add an instance
    pub fn with_instance(mut self, local: Mat4) -> Self {
        self.instances.push(local);
        self
    }

    /// Check if this component should be rendered
    pub fn should_render(&self) -> bool {
        self.visible && !self.instances.is_empty() && self.mesh.is_some() && self.material.is_some()
    }

    /// World matrices of every instance
    pub fn world_instances(&self, world: &Mat4) -> Vec<Mat4> {
        self.instances.iter().map(|local| world * local).collect()
    }
}

impl Component for InstancedRenderer {
    fn type_tag(&self) -> &'static str {
        "InstancedRenderer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::material::Material;
    use crate::render::mesh::Mesh;

    #[test]
    fn test_missing_material_is_not_rendered() {
        let renderer = MeshRenderer::without_material(Rc::new(Mesh::cube()));
        assert!(!renderer.should_render());
    }

    #[test]
    fn test_hidden_renderer_is_not_rendered() {
        let mut renderer = MeshRenderer::new(Rc::new(Mesh::cube()), Material::new("m").into_shared());
        assert!(renderer.should_render());
        renderer.set_visible(false);
        assert!(!renderer.should_render());
    }

    #[test]
    fn test_material_sharing() {
        let mesh = Rc::new(Mesh::cube());
        let material = Material::new("shared").into_shared();
        let a = MeshRenderer::new(Rc::clone(&mesh), Rc::clone(&material));
        let b = MeshRenderer::new(Rc::clone(&mesh), material);
        let c = MeshRenderer::new(mesh, Material::new("shared").into_shared());
        assert!(a.shares_material_with(&b));
        assert!(!a.shares_material_with(&c));
    }

    #[test]
    fn test_instances_follow_entity_world() {
        let renderer = InstancedRenderer::new(Rc::new(Mesh::quad()), Material::new("grass").into_shared())
            .with_instance(Mat4::new_translation(&Vec3::new(1.0, 0.0, 0.0)))
            .with_instance(Mat4::new_translation(&Vec3::new(2.0, 0.0, 0.0)));
        let world = Mat4::new_translation(&Vec3::new(0.0, 5.0, 0.0));
        let instances = renderer.world_instances(&world);
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[1], Mat4::new_translation(&Vec3::new(2.0, 5.0, 0.0)));
    }

    #[test]
    fn test_empty_instanced_renderer_is_skipped() {
        let renderer = InstancedRenderer::new(Rc::new(Mesh::quad()), Material::new("grass").into_shared());
        assert!(!renderer.should_render());
    }
}
