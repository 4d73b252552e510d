//! Component trait and type-erased storage helpers

use std::any::Any;
use std::fmt;

use crate::ecs::EntityId;

/// Upcast helper so boxed components can be downcast to their concrete type
pub trait AsAny {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Base trait for all components
///
/// An entity stores at most one component per concrete type. The type tag
/// names the component in serialized scenes and must be stable across
/// builds.
pub trait Component: AsAny + fmt::Debug + 'static {
    /// Stable string tag for this component type
    fn type_tag(&self) -> &'static str;

    /// Called when the component is attached to `owner`
    fn on_attach(&mut self, _owner: EntityId) {}

    /// Called right before the component is removed from its owner
    fn on_detach(&mut self) {}
}

impl dyn Component {
    /// Downcast to a concrete component type
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcast to a concrete component type, mutably
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Returns true if the component is a `T`
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }
}
