//! Backend abstraction for the rendering system
//!
//! The renderer talks to the graphics API only through [`RenderBackend`].
//! Everything below this trait (buffer layouts, shader compilation,
//! framebuffer objects) belongs to the backend implementation.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::math::Mat4;
use crate::render::material::UniformValue;
use crate::render::mesh::Mesh;
use crate::render::shader::ShaderKey;
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a compiled shader program. Zero means "none, use fallback".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ShaderHandle(pub u32);

impl ShaderHandle {
    /// The reserved invalid handle
    pub const INVALID: Self = Self(0);

    /// True for any handle other than [`ShaderHandle::INVALID`]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

/// Handle to a texture owned by the backend. Zero means "missing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    /// The reserved invalid handle
    pub const INVALID: Self = Self(0);

    /// True for any handle other than [`TextureHandle::INVALID`]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

/// Handle to an offscreen render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetHandle(pub u32);

bitflags! {
    /// Fixed-function state for a draw pass
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderState: u32 {
        /// Depth test enabled
        const DEPTH_TEST = 1;
        /// Depth writes enabled
        const DEPTH_WRITE = 1 << 1;
        /// Src-alpha / one-minus-src-alpha blending enabled
        const ALPHA_BLEND = 1 << 2;
    }
}

impl RenderState {
    /// State for the opaque pass
    pub const OPAQUE: Self = Self::DEPTH_TEST.union(Self::DEPTH_WRITE);
    /// State for the transparent pass
    pub const TRANSPARENT: Self = Self::DEPTH_TEST.union(Self::ALPHA_BLEND);
}

/// Result of a framebuffer completeness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramebufferStatus {
    /// Ready to render into
    Complete,
    /// Not renderable; the payload describes why
    Incomplete(String),
}

/// Main rendering backend trait
///
/// Calls are synchronous from the renderer's point of view; a backend is
/// free to buffer them.
pub trait RenderBackend {
    /// Compile the program identified by `key`
    fn compile_shader(&mut self, key: &ShaderKey) -> BackendResult<ShaderHandle>;

    /// Completeness of an offscreen target
    fn framebuffer_status(&self, target: RenderTargetHandle) -> FramebufferStatus;

    /// Bind an offscreen target, or the default framebuffer for `None`
    fn bind_render_target(&mut self, target: Option<RenderTargetHandle>);

    /// Clear color and depth of the bound target
    fn clear(&mut self, color: [f32; 4]);

    /// Apply depth/blend state
    fn set_render_state(&mut self, state: RenderState);

    /// Make `shader` the current program
    fn use_shader(&mut self, shader: ShaderHandle);

    /// Write a uniform of the current program
    fn set_uniform(&mut self, name: &str, value: &UniformValue);

    /// Upload the per-frame light block (see [`crate::render::lighting::LightBlock`])
    fn upload_light_block(&mut self, bytes: &[u8]);

    /// Bind a texture to a texture unit
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);

    /// Per-instance model matrices for the next instanced draw
    fn set_instance_transforms(&mut self, transforms: &[Mat4]);

    /// Draw `mesh` with its index buffer, `instance_count` times
    fn draw_indexed(&mut self, mesh: &Mesh, instance_count: u32) -> BackendResult<()>;
}
