//! Headless backend
//!
//! Implements [`RenderBackend`] without a GPU by recording every call. Used
//! by the test suite and the demo binary to inspect exactly what a frame
//! submitted.

use std::collections::HashSet;

use crate::foundation::math::Mat4;
use crate::render::backend::{
    BackendResult, FramebufferStatus, RenderBackend, RenderState, RenderTargetHandle, ShaderHandle, TextureHandle,
};
use crate::render::lighting::LightBlock;
use crate::render::material::UniformValue;
use crate::render::mesh::Mesh;
use crate::render::shader::ShaderKey;
use crate::render::RenderError;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// `bind_render_target`
    BindRenderTarget(Option<RenderTargetHandle>),
    /// `clear`
    Clear([f32; 4]),
    /// `set_render_state`
    SetRenderState(RenderState),
    /// `use_shader`
    UseShader(ShaderHandle),
    /// `set_uniform`
    SetUniform {
        /// Uniform name
        name: String,
        /// Value written
        value: UniformValue,
    },
    /// `upload_light_block`, decoded
    UploadLights(Box<LightBlock>),
    /// `bind_texture`
    BindTexture {
        /// Texture unit
        unit: u32,
        /// Bound texture
        texture: TextureHandle,
    },
    /// `set_instance_transforms`
    SetInstanceTransforms(Vec<Mat4>),
    /// `draw_indexed`
    Draw {
        /// Name of the mesh drawn
        mesh: String,
        /// Indices submitted
        index_count: u32,
        /// Instance count
        instance_count: u32,
    },
}

/// Recording backend with no GPU behind it
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    calls: Vec<BackendCall>,
    next_shader: u32,
    compile_attempts: usize,
    failing_shaders: HashSet<String>,
    incomplete_targets: HashSet<RenderTargetHandle>,
}

impl HeadlessBackend {
    /// Create a backend where every shader compiles
    pub fn new() -> Self {
        Self::default()
    }

    /// Make any program using `path` as vertex or fragment source fail
    pub fn with_failing_shader(mut self, path: impl Into<String>) -> Self {
        self.failing_shaders.insert(path.into());
        self
    }

    /// Report `target` as an incomplete framebuffer
    pub fn with_incomplete_target(mut self, target: RenderTargetHandle) -> Self {
        self.incomplete_targets.insert(target);
        self
    }

    /// Every call recorded since the last [`Self::clear_calls`]
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Forget recorded calls
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Recorded draw calls only
    pub fn draws(&self) -> impl Iterator<Item = &BackendCall> {
        self.calls.iter().filter(|call| matches!(call, BackendCall::Draw { .. }))
    }

    /// Number of shaders compiled successfully
    pub fn compiled_shader_count(&self) -> usize {
        self.next_shader as usize
    }

    /// Number of compile requests, failed ones included
    pub fn compile_attempts(&self) -> usize {
        self.compile_attempts
    }
}

impl RenderBackend for HeadlessBackend {
    fn compile_shader(&mut self, key: &ShaderKey) -> BackendResult<ShaderHandle> {
        self.compile_attempts += 1;
        if self.failing_shaders.contains(&key.vertex) || self.failing_shaders.contains(&key.fragment) {
            return Err(RenderError::ShaderCompilation(format!(
                "{} / {}: simulated failure",
                key.vertex, key.fragment
            )));
        }
        self.next_shader += 1;
        Ok(ShaderHandle(self.next_shader))
    }

    fn framebuffer_status(&self, target: RenderTargetHandle) -> FramebufferStatus {
        if self.incomplete_targets.contains(&target) {
            FramebufferStatus::Incomplete(format!("target {} has no attachments", target.0))
        } else {
            FramebufferStatus::Complete
        }
    }

    fn bind_render_target(&mut self, target: Option<RenderTargetHandle>) {
        self.calls.push(BackendCall::BindRenderTarget(target));
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.calls.push(BackendCall::Clear(color));
    }

    fn set_render_state(&mut self, state: RenderState) {
        self.calls.push(BackendCall::SetRenderState(state));
    }

    fn use_shader(&mut self, shader: ShaderHandle) {
        self.calls.push(BackendCall::UseShader(shader));
    }

    fn set_uniform(&mut self, name: &str, value: &UniformValue) {
        self.calls.push(BackendCall::SetUniform { name: name.to_string(), value: *value });
    }

    fn upload_light_block(&mut self, bytes: &[u8]) {
        match bytemuck::try_pod_read_unaligned::<LightBlock>(bytes) {
            Ok(block) => self.calls.push(BackendCall::UploadLights(Box::new(block))),
            Err(e) => log::error!("Light block of {} bytes could not be decoded: {e:?}", bytes.len()),
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        self.calls.push(BackendCall::BindTexture { unit, texture });
    }

    fn set_instance_transforms(&mut self, transforms: &[Mat4]) {
        self.calls.push(BackendCall::SetInstanceTransforms(transforms.to_vec()));
    }

    fn draw_indexed(&mut self, mesh: &Mesh, instance_count: u32) -> BackendResult<()> {
        if !mesh.is_valid() {
            return Err(RenderError::RenderingFailed(format!("mesh '{}' has out-of-range indices", mesh.name)));
        }
        self.calls.push(BackendCall::Draw {
            mesh: mesh.name.clone(),
            index_count: mesh.index_count(),
            instance_count,
        });
        Ok(())
    }
}
