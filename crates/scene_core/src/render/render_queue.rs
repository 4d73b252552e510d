//! # Render Queue
//!
//! Collects one frame's render commands and orders them for submission.
//!
//! - **RenderCommand**: entity, shared mesh and material, model matrix and
//!   camera distance; instanced draws also carry per-instance matrices
//! - **CommandType**: separates opaque and transparent objects
//!
//! Opaque commands draw nearest first so the depth test rejects hidden
//! fragments early. Transparent commands draw farthest first so blending
//! composes correctly. Both sorts are stable: equal distances keep
//! collection order.

use std::cmp::Ordering;

use crate::ecs::EntityId;
use crate::foundation::math::Mat4;
use crate::render::material::SharedMaterial;
use crate::render::mesh::SharedMesh;

/// Type of render command for sorting and batching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    /// Opaque objects rendered front-to-back
    Opaque,
    /// Transparent objects rendered back-to-front
    Transparent,
}

/// Individual render command containing all data needed to draw an object
#[derive(Debug, Clone)]
pub struct RenderCommand {
    /// Entity that produced this command
    pub entity: EntityId,

    /// Material to bind
    pub material: SharedMaterial,

    /// Geometry to draw
    pub mesh: SharedMesh,

    /// World transform matrix
    pub model: Mat4,

    /// Distance from the camera to the model's translation
    pub distance: f32,

    /// Type of command for sorting
    pub command_type: CommandType,

    /// World matrices for an instanced draw; empty for a single draw
    pub instances: Vec<Mat4>,
}

impl RenderCommand {
    /// Create a single-draw command; the queue it lands in follows the
    /// material's transparency
    pub fn new(entity: EntityId, mesh: SharedMesh, material: SharedMaterial, model: Mat4, distance: f32) -> Self {
        let command_type = if material.borrow().is_transparent() {
            CommandType::Transparent
        } else {
            CommandType::Opaque
        };
        Self {
            entity,
            material,
            mesh,
            model,
            distance,
            command_type,
            instances: Vec::new(),
        }
    }

    /// Attach per-instance world matrices
    pub fn with_instances(mut self, instances: Vec<Mat4>) -> Self {
        self.instances = instances;
        self
    }

    /// True for transparent commands
    pub fn is_transparent(&self) -> bool {
        self.command_type == CommandType::Transparent
    }

    /// Number of instances this command draws
    pub fn instance_count(&self) -> u32 {
        u32::try_from(self.instances.len().max(1)).unwrap_or(u32::MAX)
    }
}

/// Collection of render commands organized for submission
#[derive(Debug, Default)]
pub struct RenderQueue {
    /// Opaque objects, near to far after sorting
    opaque_commands: Vec<RenderCommand>,

    /// Transparent objects, far to near after sorting
    transparent_commands: Vec<RenderCommand>,
}

impl RenderQueue {
    /// Create a new empty render queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a render queue with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            opaque_commands: Vec::with_capacity(capacity),
            transparent_commands: Vec::with_capacity(capacity / 4),
        }
    }

    /// Add a render command to the queue
    pub fn add_command(&mut self, command: RenderCommand) {
        match command.command_type {
            CommandType::Opaque => self.opaque_commands.push(command),
            CommandType::Transparent => self.transparent_commands.push(command),
        }
    }

    /// Sort commands into draw order
    pub fn sort_commands(&mut self) {
        self.sort_opaque();
        self.sort_transparent();
    }

    /// Sort opaque commands nearest first
    pub fn sort_opaque(&mut self) {
        self.opaque_commands
            .sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
    }

    /// Sort transparent commands farthest first
    pub fn sort_transparent(&mut self) {
        self.transparent_commands
            .sort_by(|a, b| b.distance.partial_cmp(&a.distance).unwrap_or(Ordering::Equal));
    }

    /// Opaque commands in their current order
    pub fn opaque_commands(&self) -> &[RenderCommand] {
        &self.opaque_commands
    }

    /// Transparent commands in their current order
    pub fn transparent_commands(&self) -> &[RenderCommand] {
        &self.transparent_commands
    }

    /// Get total number of commands
    pub fn command_count(&self) -> usize {
        self.opaque_commands.len() + self.transparent_commands.len()
    }

    /// Clear all commands for next frame
    pub fn clear(&mut self) {
        self.opaque_commands.clear();
        self.transparent_commands.clear();
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.opaque_commands.is_empty() && self.transparent_commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::material::{Material, UniformValue};
    use crate::render::mesh::Mesh;
    use crate::scene::Scene;
    use std::rc::Rc;

    fn command(scene: &mut Scene, material: &SharedMaterial, distance: f32) -> RenderCommand {
        let entity = scene.create_entity(format!("d{distance}"));
        RenderCommand::new(entity, Rc::new(Mesh::cube()), Rc::clone(material), Mat4::identity(), distance)
    }

    #[test]
    fn test_render_queue_creation() {
        let queue = RenderQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.command_count(), 0);
    }

    #[test]
    fn test_transparency_picks_queue() {
        let mut scene = Scene::new("q");
        let opaque = Material::new("opaque").into_shared();
        let glass = Material::new("glass")
            .with_property("alpha", UniformValue::Float(0.4))
            .into_shared();

        let mut queue = RenderQueue::new();
        queue.add_command(command(&mut scene, &opaque, 1.0));
        queue.add_command(command(&mut scene, &glass, 1.0));
        assert_eq!(queue.opaque_commands().len(), 1);
        assert_eq!(queue.transparent_commands().len(), 1);
        assert!(queue.transparent_commands()[0].is_transparent());
    }

    #[test]
    fn test_command_sorting() {
        let mut scene = Scene::new("q");
        let opaque = Material::new("opaque").into_shared();
        let glass = Material::new("glass")
            .with_property("use_transparency", UniformValue::Bool(true))
            .into_shared();

        let mut queue = RenderQueue::with_capacity(8);
        for distance in [10.0, 5.0, 7.5] {
            queue.add_command(command(&mut scene, &opaque, distance));
        }
        for distance in [3.0, 8.0, 5.0] {
            queue.add_command(command(&mut scene, &glass, distance));
        }
        queue.sort_commands();

        let opaque: Vec<f32> = queue.opaque_commands().iter().map(|c| c.distance).collect();
        let transparent: Vec<f32> = queue.transparent_commands().iter().map(|c| c.distance).collect();
        assert_eq!(opaque, vec![5.0, 7.5, 10.0]);
        assert_eq!(transparent, vec![8.0, 5.0, 3.0]);
    }

    #[test]
    fn test_equal_distances_keep_order() {
        let mut scene = Scene::new("q");
        let material = Material::new("m").into_shared();
        let first = command(&mut scene, &material, 2.0);
        let second = command(&mut scene, &material, 2.0);
        let (first_id, second_id) = (first.entity, second.entity);

        let mut queue = RenderQueue::new();
        queue.add_command(first);
        queue.add_command(second);
        queue.sort_commands();
        assert_eq!(queue.opaque_commands()[0].entity, first_id);
        assert_eq!(queue.opaque_commands()[1].entity, second_id);
    }

    #[test]
    fn test_clear_queue() {
        let mut scene = Scene::new("q");
        let material = Material::new("m").into_shared();
        let mut queue = RenderQueue::new();
        queue.add_command(command(&mut scene, &material, 5.0));
        assert_eq!(queue.command_count(), 1);

        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_instance_count() {
        let mut scene = Scene::new("q");
        let material = Material::new("m").into_shared();
        let single = command(&mut scene, &material, 1.0);
        assert_eq!(single.instance_count(), 1);
        let instanced = single.with_instances(vec![Mat4::identity(); 3]);
        assert_eq!(instanced.instance_count(), 3);
    }
}
