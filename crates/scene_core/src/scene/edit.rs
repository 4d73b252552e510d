//! Reversible hierarchy edits
//!
//! Every successful [`Scene::apply_edit`] returns the edit that undoes it,
//! so an editor can keep plain stacks of [`SceneEdit`] values for undo and
//! redo. Removal keeps the detached entities alive inside a
//! [`DetachedSubtree`]; scripts do not see `on_remove` until the subtree is
//! actually dropped.

use std::collections::HashMap;

use crate::ecs::{Entity, EntityId};
use crate::scene::scene::Scene;

/// An entity subtree taken out of a scene, ready to be put back
pub struct DetachedSubtree {
    root: EntityId,
    parent: Option<EntityId>,
    index: usize,
    entities: Vec<Entity>,
    children: HashMap<EntityId, Vec<EntityId>>,
    default_camera: Option<EntityId>,
}

impl DetachedSubtree {
    /// Root of the detached subtree
    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Parent the subtree was detached from
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Number of detached entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Always false; a subtree holds at least its root
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Drop for DetachedSubtree {
    fn drop(&mut self) {
        // Leaves first, matching Scene::destroy_entity.
        while let Some(mut entity) = self.entities.pop() {
            entity.teardown();
        }
    }
}

impl std::fmt::Debug for DetachedSubtree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetachedSubtree")
            .field("root", &self.root)
            .field("parent", &self.parent)
            .field("entities", &self.entities.len())
            .finish()
    }
}

/// A hierarchy edit that can be applied to a [`Scene`]
#[derive(Debug)]
pub enum SceneEdit {
    /// Move `entity` under `new_parent` (root when `None`), optionally at a
    /// sibling index
    Reparent {
        /// Entity to move
        entity: EntityId,
        /// Destination parent
        new_parent: Option<EntityId>,
        /// Position in the destination sibling list
        index: Option<usize>,
    },
    /// Detach `entity` and its subtree from the scene
    Remove {
        /// Root of the subtree to detach
        entity: EntityId,
    },
    /// Put a previously removed subtree back
    Restore(DetachedSubtree),
}

impl Scene {
    /// Apply `edit` and return its inverse, or `None` if the edit was
    /// rejected. Rejected edits leave the scene unchanged.
    pub fn apply_edit(&mut self, edit: SceneEdit) -> Option<SceneEdit> {
        match edit {
            SceneEdit::Reparent { entity, new_parent, index } => {
                let old_parent = self.parent(entity);
                let old_index = self.sibling_index(entity)?;
                if !self.set_parent_at(entity, new_parent, index) {
                    return None;
                }
                Some(SceneEdit::Reparent {
                    entity,
                    new_parent: old_parent,
                    index: Some(old_index),
                })
            }
            SceneEdit::Remove { entity } => {
                let subtree = self.detach_subtree(entity)?;
                Some(SceneEdit::Restore(subtree))
            }
            SceneEdit::Restore(subtree) => {
                let root = self.restore_subtree(subtree)?;
                Some(SceneEdit::Remove { entity: root })
            }
        }
    }

    /// Take `id` and its descendants out of the scene without tearing them
    /// down
    pub fn detach_subtree(&mut self, id: EntityId) -> Option<DetachedSubtree> {
        let index = self.sibling_index(id)?;
        let parent = self.parent(id);
        let mut ids = vec![id];
        ids.extend(self.descendants(id));

        self.unlink(id);
        let mut children = HashMap::new();
        for entity_id in &ids {
            if let Some(list) = self.children.remove(entity_id) {
                children.insert(*entity_id, list);
            }
            self.parents.remove(entity_id);
        }
        let default_camera = self.default_camera.filter(|camera| ids.contains(camera));
        if default_camera.is_some() {
            self.default_camera = None;
        }
        let entities = ids.iter().filter_map(|entity_id| self.take_entity(*entity_id)).collect();

        log::debug!("Detached subtree {id} ({} entities)", ids.len());
        Some(DetachedSubtree {
            root: id,
            parent,
            index,
            entities,
            children,
            default_camera,
        })
    }

    /// Reinsert a detached subtree with its original ids. Returns the root
    /// id, or `None` if any id is already in use. A parent that no longer
    /// exists turns the subtree into a root.
    pub fn restore_subtree(&mut self, mut subtree: DetachedSubtree) -> Option<EntityId> {
        if subtree.entities.iter().any(|entity| self.contains(entity.id())) {
            log::warn!("Cannot restore subtree {}: id already in use", subtree.root);
            return None;
        }
        let root = subtree.root;
        let parent = subtree.parent.filter(|parent| self.contains(*parent));
        let initialized = self.is_initialized();

        for mut entity in std::mem::take(&mut subtree.entities) {
            if initialized {
                entity.set_live();
            }
            self.insert_entity(entity);
        }
        for (entity_id, list) in std::mem::take(&mut subtree.children) {
            for child in &list {
                self.parents.insert(*child, entity_id);
            }
            self.children.insert(entity_id, list);
        }
        self.link(root, parent, Some(subtree.index));
        if let Some(camera) = subtree.default_camera {
            self.set_default_camera(camera);
        }
        self.update_world_matrices_from(root);

        log::debug!("Restored subtree {root}");
        Some(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::CameraComponent;
    use crate::ecs::Script;
    use std::cell::Cell;
    use std::rc::Rc;

    fn chain(scene: &mut Scene) -> (EntityId, EntityId, EntityId, EntityId) {
        let a = scene.create_entity("a");
        let b = scene.create_entity("b");
        let c = scene.create_entity("c");
        let d = scene.create_entity("d");
        scene.set_parent(b, Some(a));
        scene.set_parent(c, Some(a));
        scene.set_parent(d, Some(b));
        (a, b, c, d)
    }

    #[test]
    fn test_reparent_inverse_restores_order() {
        let mut scene = Scene::new("edit");
        let (a, b, c, _) = chain(&mut scene);
        let x = scene.create_entity("x");

        let undo = scene
            .apply_edit(SceneEdit::Reparent { entity: b, new_parent: Some(x), index: None })
            .unwrap();
        assert_eq!(scene.children(a), &[c]);
        assert_eq!(scene.children(x), &[b]);

        let redo = scene.apply_edit(undo).unwrap();
        assert_eq!(scene.children(a), &[b, c]);
        assert!(scene.children(x).is_empty());
        assert!(matches!(redo, SceneEdit::Reparent { new_parent: Some(p), .. } if p == x));
    }

    #[test]
    fn test_rejected_reparent_returns_none() {
        let mut scene = Scene::new("edit");
        let (a, _, _, d) = chain(&mut scene);
        assert!(scene
            .apply_edit(SceneEdit::Reparent { entity: a, new_parent: Some(d), index: None })
            .is_none());
        assert_eq!(scene.roots(), &[a]);
    }

    #[test]
    fn test_remove_and_restore_subtree() {
        let mut scene = Scene::new("edit");
        let (a, b, c, d) = chain(&mut scene);
        scene.add_component(d, CameraComponent::default());
        scene.set_default_camera(d);

        let undo = scene.apply_edit(SceneEdit::Remove { entity: b }).unwrap();
        assert!(!scene.contains(b));
        assert!(!scene.contains(d));
        assert_eq!(scene.children(a), &[c]);
        assert_eq!(scene.default_camera(), None);

        let redo = scene.apply_edit(undo).unwrap();
        assert!(matches!(redo, SceneEdit::Remove { entity } if entity == b));
        assert_eq!(scene.children(a), &[b, c]);
        assert_eq!(scene.children(b), &[d]);
        assert_eq!(scene.parent(d), Some(b));
        assert_eq!(scene.default_camera(), Some(d));
    }

    struct RemoveCounter(Rc<Cell<u32>>);

    impl Script for RemoveCounter {
        fn on_remove(&mut self, _entity: &mut Entity) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_detached_scripts_removed_only_on_drop() {
        let removed = Rc::new(Cell::new(0));
        let mut scene = Scene::new("edit");
        scene.initialize();
        let (_, b, _, d) = chain(&mut scene);
        scene.add_script(d, RemoveCounter(Rc::clone(&removed)));

        let undo = scene.apply_edit(SceneEdit::Remove { entity: b }).unwrap();
        assert_eq!(removed.get(), 0);
        drop(undo);
        assert_eq!(removed.get(), 1);
    }

    #[test]
    fn test_restore_into_missing_parent_becomes_root() {
        let mut scene = Scene::new("edit");
        let (a, b, _, _) = chain(&mut scene);
        let undo = scene.apply_edit(SceneEdit::Remove { entity: b }).unwrap();
        scene.destroy_entity(a);

        scene.apply_edit(undo).unwrap();
        assert_eq!(scene.roots(), &[b]);
        assert_eq!(scene.parent(b), None);
    }
}
