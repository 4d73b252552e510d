//! Entities: named nodes that carry a transform, components and scripts
//!
//! Hierarchy links are not stored here. The owning [`crate::scene::Scene`]
//! keeps the parent/child adjacency tables, so an entity never holds a
//! pointer to another entity.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::ecs::component::Component;
use crate::ecs::components::TransformComponent;
use crate::ecs::script::{EventData, Script, ScriptSlot};

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-unique entity handle. Zero is never a valid id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(NonZeroU64);

impl EntityId {
    /// Allocate a fresh id. Ids are never handed out twice in one process.
    pub(crate) fn allocate() -> Self {
        let raw = NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1 and would need 2^64 allocations to wrap.
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    /// Rebuild an id from its raw value; `0` yields `None`
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Raw integer value
    pub fn raw(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named node in the scene graph
///
/// Every entity owns exactly one [`TransformComponent`]; other components are
/// stored type-erased with at most one instance per concrete type, in
/// attachment order.
pub struct Entity {
    id: EntityId,
    name: String,
    transform: TransformComponent,
    components: Vec<Box<dyn Component>>,
    scripts: Vec<ScriptSlot>,
    live: bool,
}

impl Entity {
    pub(crate) fn new(id: EntityId, name: impl Into<String>) -> Self {
        let mut transform = TransformComponent::new();
        transform.on_attach(id);
        Self {
            id,
            name: name.into(),
            transform,
            components: Vec::new(),
            scripts: Vec::new(),
            live: false,
        }
    }

    /// Entity id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Entity name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the entity
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// True once the owning scene has been initialized
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// The entity's transform. Always present.
    pub fn transform(&self) -> &TransformComponent {
        &self.transform
    }

    /// Mutable access to the entity's transform
    pub fn transform_mut(&mut self) -> &mut TransformComponent {
        &mut self.transform
    }

    /// Replace the transform wholesale, keeping the cached world matrix
    pub fn set_transform(&mut self, mut transform: TransformComponent) {
        transform.set_world_matrix(*self.transform.world_matrix());
        transform.on_attach(self.id);
        self.transform.on_detach();
        self.transform = transform;
    }

    /// World matrix computed by the last propagation pass
    pub fn world_matrix(&self) -> &crate::foundation::math::Mat4 {
        self.transform.world_matrix()
    }

    /// Attach a component, replacing any existing component of the same type.
    ///
    /// The replaced component receives `on_detach` before it is dropped.
    /// Transforms are routed to [`Entity::set_transform`].
    pub fn add_component<T: Component>(&mut self, component: T) {
        self.add_boxed_component(Box::new(component));
    }

    /// Attach an already boxed component, replacing one of the same type
    pub fn add_boxed_component(&mut self, mut component: Box<dyn Component>) {
        if let Some(transform) = (*component).downcast_mut::<TransformComponent>() {
            let transform = std::mem::take(transform);
            self.set_transform(transform);
            return;
        }
        component.on_attach(self.id);
        let type_id = (*component).as_any().type_id();
        if let Some(slot) = self
            .components
            .iter_mut()
            .find(|existing| (***existing).as_any().type_id() == type_id)
        {
            slot.on_detach();
            *slot = component;
        } else {
            self.components.push(component);
        }
    }

    /// Get a component by type
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        if let Some(transform) = (&self.transform as &dyn Component).downcast_ref::<T>() {
            return Some(transform);
        }
        self.components.iter().find_map(|component| (**component).downcast_ref::<T>())
    }

    /// Get a component by type, mutably
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        if (&self.transform as &dyn Component).is::<T>() {
            return (&mut self.transform as &mut dyn Component).downcast_mut::<T>();
        }
        self.components.iter_mut().find_map(|component| (**component).downcast_mut::<T>())
    }

    /// Returns true if a component of type `T` is attached
    pub fn has_component<T: Component>(&self) -> bool {
        self.get_component::<T>().is_some()
    }

    /// Detach and drop the component of type `T`.
    ///
    /// Returns whether a component was present. The transform cannot be
    /// removed and always yields `false`.
    pub fn remove_component<T: Component>(&mut self) -> bool {
        let Some(index) = self.components.iter().position(|component| (**component).is::<T>()) else {
            return false;
        };
        let mut component = self.components.remove(index);
        component.on_detach();
        true
    }

    /// Iterate over all components, transform first, then attachment order
    pub fn components(&self) -> impl Iterator<Item = &dyn Component> {
        std::iter::once(&self.transform as &dyn Component)
            .chain(self.components.iter().map(|component| &**component))
    }

    /// Number of attached scripts
    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    /// Attach a script.
    ///
    /// If the entity is already live in an initialized scene, `on_init` runs
    /// before this returns; otherwise it is deferred until the scene is
    /// initialized.
    pub fn add_script<S: Script>(&mut self, script: S) {
        self.add_boxed_script(Box::new(script));
    }

    /// Attach a boxed script
    pub fn add_boxed_script(&mut self, mut script: Box<dyn Script>) {
        let initialized = if self.live {
            log::debug!("Initializing script '{}' on {} immediately", script.name(), self.id);
            script.on_init(self);
            true
        } else {
            false
        };
        self.scripts.push(ScriptSlot { script, initialized });
    }

    /// Detach the script at `index` (attachment order), calling `on_remove`
    /// if its `on_init` has run
    pub fn remove_script(&mut self, index: usize) -> bool {
        if index >= self.scripts.len() {
            return false;
        }
        let mut slot = self.scripts.remove(index);
        self.finish_script(&mut slot);
        true
    }

    /// Run `on_update` on every initialized script, in attachment order.
    ///
    /// Scripts waiting for scene initialization are skipped so `on_init`
    /// always precedes the first `on_update`. Does not touch children.
    pub fn update(&mut self, delta_time: f32) {
        self.with_scripts(|entity, slot| {
            if slot.initialized {
                slot.script.on_update(entity, delta_time);
            }
        });
    }

    /// Deliver an event to every script on this entity
    pub fn broadcast_event(&mut self, name: &str, data: &EventData) {
        self.with_scripts(|entity, slot| slot.script.on_event(entity, name, data));
    }

    /// Mark the entity live and run any pending `on_init` callbacks
    pub(crate) fn set_live(&mut self) {
        if self.live {
            return;
        }
        self.live = true;
        self.with_scripts(|entity, slot| {
            if !slot.initialized {
                slot.initialized = true;
                slot.script.on_init(entity);
            }
        });
    }

    /// Remove every script (calling `on_remove` on initialized ones) and
    /// detach every component. Runs once, right before the entity is dropped
    /// by its scene.
    pub(crate) fn teardown(&mut self) {
        // Scripts attached from inside on_remove are torn down too.
        while !self.scripts.is_empty() {
            let mut scripts = std::mem::take(&mut self.scripts);
            for slot in &mut scripts {
                self.finish_script(slot);
            }
        }
        for component in &mut self.components {
            component.on_detach();
        }
        self.components.clear();
        self.transform.on_detach();
    }

    fn finish_script(&mut self, slot: &mut ScriptSlot) {
        if slot.initialized {
            slot.script.on_remove(self);
        } else {
            log::debug!("Dropping script '{}' on {} before it was initialized", slot.script.name(), self.id);
        }
    }

    /// Run `f` over every script while the script list is detached from the
    /// entity, so callbacks can borrow the entity mutably. Scripts added from
    /// inside a callback are appended afterwards.
    fn with_scripts(&mut self, mut f: impl FnMut(&mut Self, &mut ScriptSlot)) {
        let mut scripts = std::mem::take(&mut self.scripts);
        for slot in &mut scripts {
            f(self, slot);
        }
        scripts.append(&mut self.scripts);
        self.scripts = scripts;
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("components", &self.components.len())
            .field("scripts", &self.scripts)
            .field("live", &self.live)
            .finish()
    }
}
