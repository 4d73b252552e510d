//! # Scene Core
//!
//! Entity/scene core of a small real-time 3D engine: an entity-component
//! scene graph, world-transform propagation, and a forward renderer that
//! sorts draws by transparency and camera distance.
//!
//! ## Features
//!
//! - **Scene graph**: entities stored by id, parent/child adjacency, cascade
//!   delete, reversible editor edits
//! - **Components**: transform, camera, lights, mesh and instanced renderers,
//!   plus behavior scripts with init/update/remove/event callbacks
//! - **Rendering**: light collection, opaque front-to-back and transparent
//!   back-to-front passes over a pluggable backend
//! - **Serialization**: JSON scene documents with a component registry
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_core::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let mut scene = Scene::new("main");
//!         let camera = scene.create_entity("camera");
//!         scene.add_component(camera, CameraComponent::default());
//!         scene.set_default_camera(camera);
//!         scene.initialize();
//!         engine.scenes.add_scene(scene);
//!         engine.scenes.set_active("main");
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::new(EngineConfig::default(), Box::new(HeadlessBackend::new()))?;
//!     engine.run(&mut MyApp, &mut FixedStepWindow::new(60, 1.0 / 60.0, (1280, 720)))?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod config;
pub mod core;

pub mod foundation;
pub mod ecs;
pub mod assets;
pub mod render;
pub mod scene;
pub mod window;

mod application;
mod engine;

#[cfg(test)]
mod tests;

pub use application::{Application, AppError};
pub use engine::{Engine, EngineError};
pub use core::config::EngineConfig;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Application, AppError,
        Engine, EngineConfig, EngineError,
        foundation::{
            math::{Vec3, Mat4},
            time::{FrameClock, Stopwatch},
        },
        ecs::{Entity, EntityId, Component, Script, EventData},
        ecs::components::{
            TransformComponent, CameraComponent, LightComponent, LightFactory, MeshRenderer, InstancedRenderer,
        },
        assets::{AssetLoader, MeshLibrary, ObjLoader},
        render::{HeadlessBackend, Material, Mesh, Renderer, UniformValue},
        scene::{Scene, SceneManager, SceneSerializer, SceneEdit, EntityTemplate},
        window::{FixedStepWindow, FrameInput, WindowSource},
        core::config::{RendererConfig, ShaderConfig},
    };
}
