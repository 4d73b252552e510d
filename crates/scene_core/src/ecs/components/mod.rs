//! Built-in components

pub mod transform;
pub mod camera;
pub mod lighting;
pub mod renderable;

pub use transform::{AxisAngle, TransformComponent};
pub use camera::{CameraComponent, Projection};
pub use lighting::{LightComponent, LightFactory, LightType};
pub use renderable::{InstancedRenderer, MeshRenderer};
