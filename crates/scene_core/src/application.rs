//! Application trait and lifecycle management

use crate::assets::AssetError;
use crate::config::ConfigError;
use crate::engine::{Engine, EngineError};
use crate::scene::SceneError;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to drive the engine. The engine is passed to every
/// callback; applications keep no global handle to it.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once before the first frame. Use this to build or load scenes
    /// and pick the active one.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame before the active scene updates and renders.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Cleanup the application
    ///
    /// Called once when the main loop ends.
    fn cleanup(&mut self, _engine: &mut Engine) {}
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Scene loading or saving failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Asset loading error
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}
