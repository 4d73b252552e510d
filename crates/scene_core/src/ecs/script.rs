//! Script components
//!
//! Scripts are the behavior half of the component model: they receive
//! `on_init` once, `on_update` every frame, named events, and `on_remove`
//! once before they are dropped. Every callback gets mutable access to the
//! owning [`Entity`] so a script can drive its own transform and components.

use crate::ecs::Entity;
use crate::foundation::math::Vec3;

/// Payload attached to a broadcast event
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EventData {
    /// No payload
    #[default]
    None,
    /// Boolean flag
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Float value
    Float(f32),
    /// Vector value
    Vec3(Vec3),
    /// Free-form text
    Text(String),
}

/// Behavior attached to an entity
pub trait Script: 'static {
    /// Human readable name used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called exactly once, before the first `on_update`
    fn on_init(&mut self, _entity: &mut Entity) {}

    /// Called every frame while attached to an initialized entity
    fn on_update(&mut self, _entity: &mut Entity, _delta_time: f32) {}

    /// Called exactly once, before the script is detached or destroyed
    fn on_remove(&mut self, _entity: &mut Entity) {}

    /// Called for every event broadcast to the owning entity
    fn on_event(&mut self, _entity: &mut Entity, _name: &str, _data: &EventData) {}
}

/// A script together with its lifecycle state
pub(crate) struct ScriptSlot {
    pub(crate) script: Box<dyn Script>,
    pub(crate) initialized: bool,
}

impl std::fmt::Debug for ScriptSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptSlot")
            .field("name", &self.script.name())
            .field("initialized", &self.initialized)
            .finish()
    }
}
