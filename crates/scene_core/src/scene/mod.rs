//! Scene management
//!
//! A [`Scene`] owns its entities and the parent/child adjacency between
//! them. The [`SceneManager`] holds named scenes and picks the active one;
//! [`SceneSerializer`] moves scenes to and from JSON; [`SceneEdit`] applies
//! reversible hierarchy changes for editors.
//!
//! ## Frame flow
//!
//! ```text
//! SceneManager::update(dt)
//!      ↓
//! Scene::update: scripts (pre-order) → world matrices (root to leaf)
//!      ↓
//! Renderer::render(scene)
//! ```

mod edit;
mod environment;
#[allow(clippy::module_inception)]
mod scene;
mod scene_manager;
mod serialization;
mod template;

pub use edit::{DetachedSubtree, SceneEdit};
pub use environment::Environment;
pub use scene::{CameraView, PreOrder, Scene, SceneState};
pub use scene_manager::{ActivationCallback, SceneManager};
pub use serialization::{
    ComponentCodec, ComponentRegistry, DecodeFn, EncodeFn, EntityDocument, LoadContext, SaveContext, SceneDocument,
    SceneSerializer, TYPE_KEY,
};
pub use template::EntityTemplate;

use thiserror::Error;

use crate::ecs::EntityId;

/// Scene loading and saving errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// IO error while reading or writing a scene file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON or a component that failed to (de)serialize
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Component object without a `_type` tag
    #[error("Component on entity '{entity}' has no type tag")]
    MissingTypeTag {
        /// Name of the entity carrying the component
        entity: String,
    },

    /// The same id appears twice in one document
    #[error("Duplicate entity id {0} in scene document")]
    DuplicateId(EntityId),

    /// Entity referenced by the hierarchy but missing from storage
    #[error("Unknown entity {0}")]
    UnknownEntity(EntityId),

    /// A component codec rejected its input
    #[error("Component '{tag}' codec failed: {message}")]
    Component {
        /// Component type tag
        tag: String,
        /// Failure description
        message: String,
    },
}
