//! Entity-Component model
//!
//! Entities are named nodes owning a transform, a type-keyed set of
//! components and an ordered list of scripts. Hierarchy and entity storage
//! live in [`crate::scene::Scene`].

pub mod entity;
pub mod component;
pub mod script;
pub mod components;

pub use entity::{Entity, EntityId};
pub use component::{AsAny, Component};
pub use script::{EventData, Script};
