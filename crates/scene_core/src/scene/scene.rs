//! # Scene
//!
//! The scene owns every entity in a flat table keyed by [`EntityId`] and
//! keeps the hierarchy as pure id-to-id adjacency: a child list per parent,
//! a parent per child and an ordered list of roots. Entities never point at
//! each other, so destroying one can only ever leave stale ids, never
//! dangling references.
//!
//! ## Invariants
//! - The hierarchy is a forest: no entity is its own ancestor.
//! - Every entity appears exactly once, either in one parent's child list
//!   or in the root list.
//! - The default camera, when set, names an entity carrying a
//!   [`CameraComponent`].
//!
//! Operations that would break an invariant are rejected and return
//! `false`; nothing here panics on bad ids.
//!
//! ## Frame order
//! [`Scene::update`] runs every script in root-first pre-order, then
//! propagates world matrices from each root down. Anything reading world
//! matrices (rendering, picking) must run after that.

use std::collections::HashMap;
use std::fmt;

use crate::ecs::components::{CameraComponent, TransformComponent};
use crate::ecs::{Component, Entity, EntityId, EventData, Script};
use crate::foundation::math::{Mat4, Vec3};
use crate::scene::environment::Environment;

/// Lifecycle state of a scene inside a [`crate::scene::SceneManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneState {
    /// Created but not receiving per-frame updates
    #[default]
    Inactive,
    /// The active scene, updated and rendered every frame
    Active,
}

/// View and projection of a camera entity, resolved for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// Camera entity
    pub entity: EntityId,
    /// World-to-view matrix
    pub view: Mat4,
    /// View-to-clip matrix
    pub projection: Mat4,
    /// Camera world position
    pub position: Vec3,
}

/// Container of entities and their hierarchy
pub struct Scene {
    pub(super) name: String,
    pub(super) entities: HashMap<EntityId, Entity>,
    pub(super) roots: Vec<EntityId>,
    pub(super) children: HashMap<EntityId, Vec<EntityId>>,
    pub(super) parents: HashMap<EntityId, EntityId>,
    pub(super) default_camera: Option<EntityId>,
    environment: Option<Environment>,
    initialized: bool,
    state: SceneState,
}

impl Scene {
    /// Create an empty, uninitialized scene
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        log::info!("Creating scene '{name}'");
        Self {
            name,
            entities: HashMap::new(),
            roots: Vec::new(),
            children: HashMap::new(),
            parents: HashMap::new(),
            default_camera: None,
            environment: None,
            initialized: false,
            state: SceneState::Inactive,
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state
    pub fn state(&self) -> SceneState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: SceneState) {
        self.state = state;
    }

    /// True once [`Scene::initialize`] has run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Ambient/sky environment, if any
    pub fn environment(&self) -> Option<&Environment> {
        self.environment.as_ref()
    }

    /// Replace the environment
    pub fn set_environment(&mut self, environment: Option<Environment>) {
        self.environment = environment;
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if the scene holds no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// True if `id` names an entity of this scene
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Borrow an entity
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Borrow an entity mutably
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Create a root entity and return its id
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        let id = EntityId::allocate();
        let mut entity = Entity::new(id, name);
        if self.initialized {
            entity.set_live();
        }
        log::trace!("Created entity {id} '{}' in scene '{}'", entity.name(), self.name);
        self.entities.insert(id, entity);
        self.roots.push(id);
        id
    }

    /// Attach a component to an entity. Returns `false` for unknown ids.
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) => {
                entity.add_component(component);
                true
            }
            None => false,
        }
    }

    /// Component of type `T` on entity `id`
    pub fn get_component<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.entities.get(&id)?.get_component::<T>()
    }

    /// Mutable component of type `T` on entity `id`
    pub fn get_component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities.get_mut(&id)?.get_component_mut::<T>()
    }

    /// Detach a component. Removing the default camera's camera component
    /// also clears the default camera.
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> bool {
        let removed = self
            .entities
            .get_mut(&id)
            .is_some_and(|entity| entity.remove_component::<T>());
        if removed && self.default_camera == Some(id) && !self.has_camera(id) {
            log::debug!("Default camera {id} lost its camera component");
            self.default_camera = None;
        }
        removed
    }

    /// Attach a script; `on_init` runs immediately if the scene is initialized
    pub fn add_script<S: Script>(&mut self, id: EntityId, script: S) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) => {
                entity.add_script(script);
                true
            }
            None => false,
        }
    }

    /// Destroy an entity and its whole subtree.
    ///
    /// Ids leave every adjacency table before storage is freed; descendants
    /// are torn down before their ancestors. Returns `false` for unknown ids.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        if !self.entities.contains_key(&id) {
            return false;
        }
        let mut doomed = vec![id];
        doomed.extend(self.descendants(id));

        self.unlink(id);
        for entity_id in &doomed {
            self.children.remove(entity_id);
            self.parents.remove(entity_id);
        }
        if self.default_camera.is_some_and(|camera| doomed.contains(&camera)) {
            log::debug!("Default camera destroyed with {id}");
            self.default_camera = None;
        }

        for entity_id in doomed.iter().rev() {
            if let Some(mut entity) = self.entities.remove(entity_id) {
                entity.teardown();
            }
        }
        log::debug!("Destroyed {id} and {} descendant(s)", doomed.len() - 1);
        true
    }

    /// Re-parent `child` under `parent`, or make it a root with `None`.
    ///
    /// Rejected (returning `false`, hierarchy unchanged) for unknown ids,
    /// self-parenting, or when `parent` is a descendant of `child`.
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> bool {
        self.set_parent_at(child, parent, None)
    }

    /// Like [`Scene::set_parent`], inserting at `index` in the new sibling
    /// list (appending when `None` or out of range)
    pub fn set_parent_at(&mut self, child: EntityId, parent: Option<EntityId>, index: Option<usize>) -> bool {
        if !self.entities.contains_key(&child) {
            return false;
        }
        if let Some(parent) = parent {
            if !self.entities.contains_key(&parent) || parent == child || self.is_descendant(parent, child) {
                log::debug!("Rejected re-parenting {child} under {parent}");
                return false;
            }
        }
        if self.parent(child) == parent && index.is_none() {
            return true;
        }
        self.unlink(child);
        self.link(child, parent, index);
        true
    }

    /// Make `child` a child of `parent`; see [`Scene::set_parent`]
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> bool {
        self.set_parent(child, Some(parent))
    }

    /// Detach `child` from `parent`, turning it into a root.
    ///
    /// Returns `false` if `child` is not currently a child of `parent`.
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.set_parent(child, None)
    }

    /// Parent of `id`, if any
    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.parents.get(&id).copied()
    }

    /// Children of `id` in insertion order
    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.children.get(&id).map_or(&[][..], Vec::as_slice)
    }

    /// Entities without a parent, in creation/detach order
    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    /// True if `candidate` lies strictly below `ancestor`
    pub fn is_descendant(&self, candidate: EntityId, ancestor: EntityId) -> bool {
        let mut current = self.parent(candidate);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Every entity below `id`, pre-order
    pub fn descendants(&self, id: EntityId) -> Vec<EntityId> {
        let mut result = Vec::new();
        let mut stack: Vec<EntityId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// Depth-first, pre-order walk over every root and its subtree
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            scene: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// First entity named `name` in pre-order. Names are not unique; later
    /// duplicates are never returned.
    pub fn find_entity_by_name(&self, name: &str) -> Option<EntityId> {
        self.pre_order().find(|entity| entity.name() == name).map(Entity::id)
    }

    /// Use `id` as the default camera. Ignored (returns `false`) unless the
    /// entity currently carries a [`CameraComponent`].
    pub fn set_default_camera(&mut self, id: EntityId) -> bool {
        if !self.has_camera(id) {
            log::debug!("Ignoring default camera {id}: no camera component");
            return false;
        }
        self.default_camera = Some(id);
        true
    }

    /// Default camera entity, if one is set
    pub fn default_camera(&self) -> Option<EntityId> {
        self.default_camera.filter(|&id| self.has_camera(id))
    }

    fn has_camera(&self, id: EntityId) -> bool {
        self.entities
            .get(&id)
            .is_some_and(Entity::has_component::<CameraComponent>)
    }

    /// One-time setup: marks every entity live and runs pending `on_init`
    /// callbacks in pre-order. Later calls do nothing.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        let order: Vec<EntityId> = self.pre_order().map(Entity::id).collect();
        for id in order {
            if let Some(entity) = self.entities.get_mut(&id) {
                entity.set_live();
            }
        }
        log::info!("Scene '{}' initialized with {} entities", self.name, self.entities.len());
    }

    /// Per-frame update: scripts in root-first pre-order, then one world
    /// matrix propagation pass
    pub fn update(&mut self, delta_time: f32) {
        let order: Vec<EntityId> = self.pre_order().map(Entity::id).collect();
        for id in order {
            if let Some(entity) = self.entities.get_mut(&id) {
                entity.update(delta_time);
            }
        }
        self.update_world_matrices();
    }

    /// Recompute every world matrix, root to leaf
    pub fn update_world_matrices(&mut self) {
        let roots = self.roots.clone();
        for root in roots {
            self.propagate(root, None);
        }
    }

    /// Recompute world matrices for `id` and its subtree, using the parent's
    /// cached world matrix (identity for a root)
    pub fn update_world_matrices_from(&mut self, id: EntityId) {
        let parent_world = self
            .parent(id)
            .and_then(|parent| self.entities.get(&parent))
            .map(|parent| *parent.world_matrix());
        self.propagate(id, parent_world);
    }

    fn propagate(&mut self, start: EntityId, parent_world: Option<Mat4>) {
        let mut stack = vec![(start, parent_world)];
        while let Some((id, parent_world)) = stack.pop() {
            let Some(entity) = self.entities.get_mut(&id) else { continue };
            let world = entity.transform_mut().update_world_matrix(parent_world.as_ref());
            if let Some(children) = self.children.get(&id) {
                stack.extend(children.iter().rev().map(|&child| (child, Some(world))));
            }
        }
    }

    /// Deliver an event to every script on `id`, and on all its descendants
    /// when `recursive`. Returns `false` for unknown ids.
    pub fn broadcast_event(&mut self, id: EntityId, name: &str, data: &EventData, recursive: bool) -> bool {
        if !self.entities.contains_key(&id) {
            return false;
        }
        let mut targets = vec![id];
        if recursive {
            targets.extend(self.descendants(id));
        }
        for target in targets {
            if let Some(entity) = self.entities.get_mut(&target) {
                entity.broadcast_event(name, data);
            }
        }
        true
    }

    /// View/projection of a camera entity, from its last world matrix
    pub fn camera_view(&self, id: EntityId) -> Option<CameraView> {
        let entity = self.entities.get(&id)?;
        let camera = entity.get_component::<CameraComponent>()?;
        let position = entity.transform().world_position();
        Some(CameraView {
            entity: id,
            view: camera.view_matrix(position),
            projection: camera.projection_matrix(),
            position,
        })
    }

    /// View of the default camera
    pub fn default_camera_view(&self) -> Option<CameraView> {
        self.camera_view(self.default_camera()?)
    }

    /// Forward a viewport resize to every camera in the scene
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        for entity in self.entities.values_mut() {
            if let Some(camera) = entity.get_component_mut::<CameraComponent>() {
                camera.set_aspect_ratio(aspect_ratio);
            }
        }
    }

    /// Position of `id` in its sibling list (or the root list)
    pub(super) fn sibling_index(&self, id: EntityId) -> Option<usize> {
        let siblings = match self.parent(id) {
            Some(parent) => self.children(parent),
            None => self.roots.as_slice(),
        };
        siblings.iter().position(|&sibling| sibling == id)
    }

    /// Remove `id` from its parent's child list (or the root list).
    pub(super) fn unlink(&mut self, id: EntityId) {
        match self.parents.remove(&id) {
            Some(parent) => {
                if let Some(siblings) = self.children.get_mut(&parent) {
                    siblings.retain(|&sibling| sibling != id);
                    if siblings.is_empty() {
                        self.children.remove(&parent);
                    }
                }
            }
            None => self.roots.retain(|&root| root != id),
        }
    }

    /// Insert an unlinked `id` under `parent` (or as a root) at `index`.
    pub(super) fn link(&mut self, id: EntityId, parent: Option<EntityId>, index: Option<usize>) {
        let siblings = match parent {
            Some(parent) => {
                self.parents.insert(id, parent);
                self.children.entry(parent).or_default()
            }
            None => &mut self.roots,
        };
        let index = index.map_or(siblings.len(), |index| index.min(siblings.len()));
        siblings.insert(index, id);
    }

    pub(super) fn insert_entity(&mut self, entity: Entity) {
        self.entities.insert(entity.id(), entity);
    }

    pub(super) fn take_entity(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Replace the transform of `id` and refresh its subtree
    pub fn set_transform(&mut self, id: EntityId, transform: TransformComponent) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else { return false };
        entity.set_transform(transform);
        self.update_world_matrices_from(id);
        true
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("entities", &self.entities.len())
            .field("roots", &self.roots)
            .field("default_camera", &self.default_camera)
            .field("initialized", &self.initialized)
            .field("state", &self.state)
            .finish()
    }
}

/// Pre-order iterator over a scene's entities
pub struct PreOrder<'a> {
    scene: &'a Scene,
    stack: Vec<EntityId>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Entity;

    fn next(&mut self) -> Option<&'a Entity> {
        while let Some(id) = self.stack.pop() {
            self.stack.extend(self.scene.children(id).iter().rev().copied());
            if let Some(entity) = self.scene.entities.get(&id) {
                return Some(entity);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::LightFactory;
    use crate::foundation::math::Mat4Ext;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn assert_single_parent(scene: &Scene) {
        let mut seen: HashMap<EntityId, usize> = HashMap::new();
        for id in scene.roots() {
            *seen.entry(*id).or_default() += 1;
        }
        for children in scene.children.values() {
            for id in children {
                *seen.entry(*id).or_default() += 1;
            }
        }
        assert_eq!(seen.len(), scene.len());
        assert!(seen.values().all(|&count| count == 1), "entity listed twice: {seen:?}");
        for (child, parent) in &scene.parents {
            assert!(scene.children(*parent).contains(child));
        }
    }

    #[test]
    fn test_create_entity_is_root() {
        let mut scene = Scene::new("s");
        let a = scene.create_entity("a");
        assert_eq!(scene.roots(), &[a]);
        assert_eq!(scene.parent(a), None);
        assert!(scene.children(a).is_empty());
        assert!(scene.entity(a).unwrap().has_component::<TransformComponent>());
    }

    #[test]
    fn test_set_parent_rejects_cycles() {
        let mut scene = Scene::new("s");
        let a = scene.create_entity("a");
        let b = scene.create_entity("b");
        let c = scene.create_entity("c");
        assert!(scene.set_parent(b, Some(a)));
        assert!(scene.set_parent(c, Some(b)));

        assert!(!scene.set_parent(a, Some(c)));
        assert!(!scene.set_parent(a, Some(b)));
        assert!(!scene.set_parent(a, Some(a)));

        assert_eq!(scene.parent(a), None);
        assert_eq!(scene.children(a), &[b]);
        assert_eq!(scene.children(b), &[c]);
        assert_eq!(scene.roots(), &[a]);
        assert_single_parent(&scene);
    }

    #[test]
    fn test_random_reparenting_keeps_forest() {
        let mut scene = Scene::new("s");
        let ids: Vec<EntityId> = (0..8).map(|i| scene.create_entity(format!("e{i}"))).collect();

        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            let child = ids[rng.gen_range(0..ids.len())];
            let parent = ids[rng.gen_range(0..ids.len())];
            let target = if rng.gen_bool(0.2) { None } else { Some(parent) };
            scene.set_parent(child, target);

            for &id in &ids {
                assert!(!scene.is_descendant(id, id));
            }
            assert_single_parent(&scene);
        }
    }

    #[test]
    fn test_reparent_moves_between_child_lists() {
        let mut scene = Scene::new("s");
        let a = scene.create_entity("a");
        let b = scene.create_entity("b");
        let c = scene.create_entity("c");
        assert!(scene.add_child(a, c));
        assert!(scene.add_child(b, c));
        assert!(scene.children(a).is_empty());
        assert_eq!(scene.children(b), &[c]);

        // Already a child: no-op.
        assert!(scene.add_child(b, c));
        assert_eq!(scene.children(b), &[c]);

        assert!(!scene.remove_child(a, c));
        assert!(scene.remove_child(b, c));
        assert_eq!(scene.roots(), &[a, b, c]);
        assert_single_parent(&scene);
    }

    #[test]
    fn test_world_matrix_composition() {
        let mut scene = Scene::new("s");
        let parent = scene.create_entity("parent");
        let child = scene.create_entity("child");
        scene.set_parent(child, Some(parent));

        scene.entity_mut(parent).unwrap().transform_mut().set_position(Vec3::new(5.0, 0.0, 0.0));
        scene.entity_mut(parent).unwrap().transform_mut().set_rotation(Vec3::new(0.0, 45.0, 0.0));
        scene.entity_mut(child).unwrap().transform_mut().set_position(Vec3::new(0.0, 0.0, 2.0));
        scene.entity_mut(child).unwrap().transform_mut().set_scale(Vec3::new(2.0, 1.0, 1.0));
        scene.update_world_matrices();

        let wp = *scene.entity(parent).unwrap().world_matrix();
        let lc = scene.entity(child).unwrap().transform().local_matrix();
        assert_relative_eq!(*scene.entity(child).unwrap().world_matrix(), wp * lc, epsilon = 1e-5);
        assert_eq!(wp, scene.entity(parent).unwrap().transform().local_matrix());
    }

    #[test]
    fn test_update_world_matrices_from_subtree() {
        let mut scene = Scene::new("s");
        let root = scene.create_entity("root");
        let child = scene.create_entity("child");
        scene.set_parent(child, Some(root));
        scene.entity_mut(root).unwrap().transform_mut().set_position(Vec3::new(1.0, 0.0, 0.0));
        scene.update_world_matrices();

        scene.entity_mut(child).unwrap().transform_mut().set_position(Vec3::new(0.0, 1.0, 0.0));
        scene.update_world_matrices_from(child);
        assert_relative_eq!(
            scene.entity(child).unwrap().transform().world_position(),
            Vec3::new(1.0, 1.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_destroy_cascades() {
        let mut scene = Scene::new("s");
        let a = scene.create_entity("a");
        let b = scene.create_entity("b");
        let c = scene.create_entity("c");
        let d = scene.create_entity("d");
        scene.set_parent(b, Some(a));
        scene.set_parent(c, Some(b));
        scene.add_component(c, CameraComponent::default());
        assert!(scene.set_default_camera(c));

        assert!(scene.destroy_entity(b));
        assert!(!scene.destroy_entity(b));
        assert!(!scene.contains(b));
        assert!(!scene.contains(c));
        assert!(scene.children(a).is_empty());
        assert_eq!(scene.roots(), &[a, d]);
        assert_eq!(scene.default_camera(), None);
        assert_single_parent(&scene);
    }

    #[test]
    fn test_default_camera_guard() {
        let mut scene = Scene::new("s");
        let camera = scene.create_entity("camera");
        let cube = scene.create_entity("cube");
        scene.add_component(camera, CameraComponent::default());

        assert!(scene.set_default_camera(camera));
        assert!(!scene.set_default_camera(cube));
        assert_eq!(scene.default_camera(), Some(camera));

        assert!(scene.remove_component::<CameraComponent>(camera));
        assert_eq!(scene.default_camera(), None);
    }

    #[test]
    fn test_find_by_name_first_in_pre_order() {
        let mut scene = Scene::new("s");
        let a = scene.create_entity("a");
        let dup_deep = scene.create_entity("dup");
        let b = scene.create_entity("b");
        let dup_late = scene.create_entity("dup");
        scene.set_parent(dup_deep, Some(a));
        scene.set_parent(dup_late, Some(b));

        assert_eq!(scene.find_entity_by_name("dup"), Some(dup_deep));
        assert_eq!(scene.find_entity_by_name("nope"), None);

        scene.destroy_entity(a);
        assert_eq!(scene.find_entity_by_name("dup"), Some(dup_late));
    }

    #[derive(Clone)]
    struct Lifecycle(Rc<RefCell<Vec<String>>>);

    impl Script for Lifecycle {
        fn on_init(&mut self, entity: &mut Entity) {
            self.0.borrow_mut().push(format!("init {}", entity.name()));
        }
        fn on_update(&mut self, entity: &mut Entity, _delta_time: f32) {
            self.0.borrow_mut().push(format!("update {}", entity.name()));
        }
        fn on_remove(&mut self, entity: &mut Entity) {
            self.0.borrow_mut().push(format!("remove {}", entity.name()));
        }
        fn on_event(&mut self, entity: &mut Entity, name: &str, _data: &EventData) {
            self.0.borrow_mut().push(format!("{name} {}", entity.name()));
        }
    }

    #[test]
    fn test_script_lifecycle_in_active_scene() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scene = Scene::new("s");
        scene.initialize();
        let e = scene.create_entity("e");

        scene.add_script(e, Lifecycle(Rc::clone(&log)));
        scene.update(0.016);
        scene.update(0.016);
        scene.destroy_entity(e);
        scene.update(0.016);

        assert_eq!(*log.borrow(), vec!["init e", "update e", "update e", "remove e"]);
    }

    #[test]
    fn test_destroy_before_initialize_skips_remove() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scene = Scene::new("s");
        let e = scene.create_entity("e");
        scene.add_script(e, Lifecycle(Rc::clone(&log)));

        assert!(scene.destroy_entity(e));
        scene.initialize();
        scene.update(0.016);

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_scripts_deferred_until_initialize() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scene = Scene::new("s");
        let parent = scene.create_entity("parent");
        let child = scene.create_entity("child");
        scene.set_parent(child, Some(parent));
        scene.add_script(child, Lifecycle(Rc::clone(&log)));
        scene.add_script(parent, Lifecycle(Rc::clone(&log)));

        scene.update(0.016);
        assert!(log.borrow().is_empty());

        scene.initialize();
        scene.initialize();
        scene.update(0.016);
        assert_eq!(*log.borrow(), vec!["init parent", "init child", "update parent", "update child"]);
    }

    #[test]
    fn test_broadcast_event_recursion() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scene = Scene::new("s");
        scene.initialize();
        let root = scene.create_entity("root");
        let mid = scene.create_entity("mid");
        let leaf = scene.create_entity("leaf");
        scene.set_parent(mid, Some(root));
        scene.set_parent(leaf, Some(mid));
        scene.add_script(root, Lifecycle(Rc::clone(&log)));
        scene.add_script(leaf, Lifecycle(Rc::clone(&log)));
        log.borrow_mut().clear();

        scene.broadcast_event(root, "ping", &EventData::Bool(true), false);
        assert_eq!(*log.borrow(), vec!["ping root"]);

        log.borrow_mut().clear();
        scene.broadcast_event(root, "ping", &EventData::Bool(true), true);
        assert_eq!(*log.borrow(), vec!["ping root", "ping leaf"]);
    }

    #[test]
    fn test_camera_view_uses_world_position() {
        let mut scene = Scene::new("s");
        let rig = scene.create_entity("rig");
        let camera = scene.create_entity("camera");
        scene.set_parent(camera, Some(rig));
        scene.add_component(camera, CameraComponent::perspective(70.0, 1.0, 0.1, 100.0));
        scene.entity_mut(rig).unwrap().transform_mut().set_position(Vec3::new(0.0, 0.0, 10.0));
        scene.update_world_matrices();
        scene.set_default_camera(camera);

        let view = scene.default_camera_view().unwrap();
        assert_relative_eq!(view.position, Vec3::new(0.0, 0.0, 10.0), epsilon = 1e-6);
        let origin = view.view.transform_point(&crate::foundation::math::Point3::origin());
        assert_relative_eq!(origin.coords, Vec3::new(0.0, 0.0, -10.0), epsilon = 1e-5);
    }

    #[test]
    fn test_resize_updates_every_camera() {
        let mut scene = Scene::new("s");
        let a = scene.create_entity("a");
        let b = scene.create_entity("b");
        scene.add_component(a, CameraComponent::perspective(60.0, 1.0, 0.1, 10.0));
        scene.add_component(b, CameraComponent::perspective(60.0, 1.0, 0.1, 10.0));
        scene.add_component(b, LightFactory::point(Vec3::x(), 1.0, 1.0));

        scene.set_aspect_ratio(2.0);
        assert_eq!(scene.get_component::<CameraComponent>(a).and_then(CameraComponent::aspect_ratio), Some(2.0));
        assert_eq!(scene.get_component::<CameraComponent>(b).and_then(CameraComponent::aspect_ratio), Some(2.0));
    }

    #[test]
    fn test_set_transform_refreshes_subtree() {
        let mut scene = Scene::new("s");
        let root = scene.create_entity("root");
        let child = scene.create_entity("child");
        scene.set_parent(child, Some(root));
        scene.set_transform(root, TransformComponent::new().with_rotation(Vec3::new(0.0, 0.0, 90.0)));
        scene.entity_mut(child).unwrap().transform_mut().set_position(Vec3::x());
        scene.update_world_matrices();

        let expected = Mat4::rotation_z(std::f32::consts::FRAC_PI_2) * Mat4::new_translation(&Vec3::x());
        assert_relative_eq!(*scene.entity(child).unwrap().world_matrix(), expected, epsilon = 1e-6);
    }
}
