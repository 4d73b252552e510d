//! Core engine configuration types

pub mod config;

pub use config::{EngineConfig, RendererConfig, ShaderConfig, WindowConfig};
