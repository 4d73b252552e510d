//! Entity templates produced by asset loaders

use crate::ecs::components::TransformComponent;
use crate::ecs::{Component, EntityId};
use crate::scene::scene::Scene;

/// Description of an entity subtree that has not been added to a scene yet
#[derive(Debug, Default)]
pub struct EntityTemplate {
    /// Entity name
    pub name: String,
    /// Local transform
    pub transform: TransformComponent,
    /// Components other than the transform
    pub components: Vec<Box<dyn Component>>,
    /// Child templates, in order
    pub children: Vec<EntityTemplate>,
}

impl EntityTemplate {
    /// Template with an identity transform and nothing attached
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the local transform
    pub fn with_transform(mut self, transform: TransformComponent) -> Self {
        self.transform = transform;
        self
    }

    /// Attach a component
    pub fn with_component<T: Component>(mut self, component: T) -> Self {
        self.components.push(Box::new(component));
        self
    }

    /// Append a child template
    pub fn with_child(mut self, child: EntityTemplate) -> Self {
        self.children.push(child);
        self
    }

    /// Number of entities the template will create
    pub fn entity_count(&self) -> usize {
        1 + self.children.iter().map(EntityTemplate::entity_count).sum::<usize>()
    }
}

impl Scene {
    /// Create the entities described by `template`, attaching the subtree
    /// root under `attach_point` (or as a new root). Returns the root id.
    ///
    /// An unknown attach point is treated as `None`.
    pub fn instantiate(&mut self, template: EntityTemplate, attach_point: Option<EntityId>) -> EntityId {
        let attach_point = attach_point.filter(|parent| {
            let known = self.contains(*parent);
            if !known {
                log::warn!("Instantiating '{}' as root: attach point {parent} not found", template.name);
            }
            known
        });

        let root = self.spawn_template(template, attach_point);
        self.update_world_matrices_from(root);
        root
    }

    fn spawn_template(&mut self, template: EntityTemplate, parent: Option<EntityId>) -> EntityId {
        let EntityTemplate { name, transform, components, children } = template;
        let id = self.create_entity(name);
        if let Some(entity) = self.entity_mut(id) {
            entity.set_transform(transform);
            for component in components {
                entity.add_boxed_component(component);
            }
        }
        if parent.is_some() {
            self.set_parent(id, parent);
        }
        for child in children {
            self.spawn_template(child, Some(id));
        }
        id
    }
}
