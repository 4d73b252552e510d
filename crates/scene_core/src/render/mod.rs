//! # Rendering System
//!
//! Backend-agnostic forward renderer for scenes.
//!
//! ## Architecture
//!
//! - **Renderer**: per-frame light collection, command collection and the
//!   two sorted passes
//! - **RenderBackend**: the seam to a graphics API; [`HeadlessBackend`]
//!   records calls instead of drawing
//! - **ShaderManager**: caches compiled programs by source paths and defines
//! - **Resource Types**: meshes, materials and the light uniform block

pub mod backend;
pub mod headless;
pub mod lighting;
pub mod material;
pub mod mesh;
pub mod render_queue;
pub mod renderer;
pub mod shader;

pub use backend::{
    BackendResult, FramebufferStatus, RenderBackend, RenderState, RenderTargetHandle, ShaderHandle, TextureHandle,
};
pub use headless::{BackendCall, HeadlessBackend};
pub use lighting::{LightBlock, LightContext, MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS};
pub use material::{Material, MaterialProperty, ShaderDescriptor, SharedMaterial, UniformValue};
pub use mesh::{Mesh, SharedMesh, Vertex};
pub use render_queue::{CommandType, RenderCommand, RenderQueue};
pub use renderer::{FrameStats, Renderer};
pub use shader::{ShaderKey, ShaderManager};

use thiserror::Error;

/// High-level rendering error types
///
/// Backend failures are reported through these variants so callers never
/// see graphics-API specific errors.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A rendering operation failed during execution
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// A shader program failed to compile or link
    #[error("Shader compilation failed: {0}")]
    ShaderCompilation(String),

    /// The fallback shader could not be built; nothing can be drawn
    #[error("Fallback shader unavailable: {0}")]
    FallbackShaderUnavailable(String),
}
