//! # Scene Renderer
//!
//! Turns a propagated [`Scene`] into backend calls. One frame is:
//!
//! 1. **Lights**: pre-order walk, every enabled light pushed into the
//!    [`LightContext`] (capped per type), ambient from the scene environment
//! 2. **Commands**: pre-order walk, one [`RenderCommand`] per visible
//!    renderable with both mesh and material
//! 3. **Opaque pass**: depth test and write, no blending, nearest first
//! 4. **Transparent pass**: depth test, no depth write, alpha blending,
//!    farthest first; depth writes are restored afterwards
//!
//! World matrices are read as they are; call [`Scene::update`] or
//! [`Scene::update_world_matrices`] first.

use crate::core::config::RendererConfig;
use crate::ecs::components::{InstancedRenderer, LightComponent, MeshRenderer};
use crate::foundation::math::{utils, Vec3};
use crate::foundation::time::Stopwatch;
use crate::render::backend::{FramebufferStatus, RenderBackend, RenderState, RenderTargetHandle, ShaderHandle};
use crate::render::lighting::LightContext;
use crate::render::material::UniformValue;
use crate::render::render_queue::{RenderCommand, RenderQueue};
use crate::render::shader::ShaderManager;
use crate::render::RenderError;
use crate::scene::{CameraView, Environment, Scene};

/// Uniform receiving the model matrix
pub const U_MODEL: &str = "u_model";
/// Uniform receiving the view matrix
pub const U_VIEW: &str = "u_view";
/// Uniform receiving the projection matrix
pub const U_PROJECTION: &str = "u_projection";
/// Uniform receiving projection * view * model
pub const U_MVP: &str = "u_mvp";
/// Uniform receiving the inverse-transpose of the model's upper 3x3
pub const U_NORMAL_MATRIX: &str = "u_normal_matrix";
/// Uniform receiving the camera world position
pub const U_CAMERA_POSITION: &str = "u_camera_position";

/// What one frame did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// Draws issued in the opaque pass
    pub opaque_draws: usize,
    /// Draws issued in the transparent pass
    pub transparent_draws: usize,
    /// Draws the backend rejected
    pub failed_draws: usize,
    /// Lights that made it into the light block
    pub lights: usize,
    /// Lights dropped because their type was full
    pub dropped_lights: usize,
    /// True when the frame was not drawn at all
    pub skipped: bool,
    /// CPU time spent building and submitting the frame
    pub cpu_time_ms: f32,
}

impl FrameStats {
    /// Total successful draws
    pub fn draw_count(&self) -> usize {
        self.opaque_draws + self.transparent_draws
    }
}

/// Two-pass forward renderer over a [`RenderBackend`]
pub struct Renderer {
    config: RendererConfig,
    shaders: ShaderManager,
    queue: RenderQueue,
    lights: LightContext,
    frame_count: u64,
}

impl Renderer {
    /// Create a renderer; call [`Renderer::initialize`] before drawing
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            shaders: ShaderManager::new(),
            queue: RenderQueue::with_capacity(256),
            lights: LightContext::new(),
            frame_count: 0,
        }
    }

    /// Compile the fallback shader. Failure is fatal: without it there is
    /// nothing to draw materials with.
    pub fn initialize(&mut self, backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
        self.shaders.initialize_fallback(&self.config.fallback_shader, backend)?;
        log::info!("Renderer initialized");
        Ok(())
    }

    /// Renderer configuration
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Shader cache
    pub fn shaders(&self) -> &ShaderManager {
        &self.shaders
    }

    /// Shader cache, mutably
    pub fn shaders_mut(&mut self) -> &mut ShaderManager {
        &mut self.shaders
    }

    /// Lights collected by the last frame
    pub fn light_context(&self) -> &LightContext {
        &self.lights
    }

    /// Commands of the last frame, in draw order
    pub fn queue(&self) -> &RenderQueue {
        &self.queue
    }

    /// Frames rendered so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Render `scene` from its default camera into the default framebuffer.
    /// Returns `None` when the scene has no default camera.
    pub fn render_scene(&mut self, scene: &Scene, backend: &mut dyn RenderBackend) -> Option<FrameStats> {
        let Some(camera) = scene.default_camera_view() else {
            log::trace!("Scene '{}' has no default camera, nothing rendered", scene.name());
            return None;
        };
        Some(self.render(scene, &camera, backend))
    }

    /// Render `scene` from `camera` into the default framebuffer
    pub fn render(&mut self, scene: &Scene, camera: &CameraView, backend: &mut dyn RenderBackend) -> FrameStats {
        self.render_to(scene, camera, None, backend)
    }

    /// Render `scene` from `camera` into `target` (the default framebuffer
    /// for `None`). An incomplete offscreen target skips the frame.
    pub fn render_to(
        &mut self,
        scene: &Scene,
        camera: &CameraView,
        target: Option<RenderTargetHandle>,
        backend: &mut dyn RenderBackend,
    ) -> FrameStats {
        let stopwatch = Stopwatch::start_new();
        let mut stats = FrameStats::default();

        if let Some(target) = target {
            if let FramebufferStatus::Incomplete(reason) = backend.framebuffer_status(target) {
                log::error!("Render target {target:?} incomplete ({reason}), skipping frame");
                stats.skipped = true;
                return stats;
            }
        }

        self.collect_lights(scene, camera.position);
        self.collect_commands(scene, camera.position);

        backend.bind_render_target(target);
        backend.clear(self.config.clear_color);

        let queue = std::mem::take(&mut self.queue);

        backend.set_render_state(RenderState::OPAQUE);
        let mut bound = ShaderHandle::INVALID;
        for command in queue.opaque_commands() {
            if self.draw_command(command, camera, &mut bound, backend) {
                stats.opaque_draws += 1;
            } else {
                stats.failed_draws += 1;
            }
        }

        if !queue.transparent_commands().is_empty() {
            backend.set_render_state(RenderState::TRANSPARENT);
            for command in queue.transparent_commands() {
                if self.draw_command(command, camera, &mut bound, backend) {
                    stats.transparent_draws += 1;
                } else {
                    stats.failed_draws += 1;
                }
            }
            backend.set_render_state(RenderState::OPAQUE);
        }
        self.queue = queue;

        self.frame_count += 1;
        stats.lights = self.lights.directional_count() + self.lights.point_count() + self.lights.spot_count();
        stats.dropped_lights = self.lights.dropped_count();
        stats.cpu_time_ms = stopwatch.elapsed_millis();
        log::trace!(
            "Frame {}: {} opaque, {} transparent, {} lights",
            self.frame_count,
            stats.opaque_draws,
            stats.transparent_draws,
            stats.lights
        );
        stats
    }

    fn collect_lights(&mut self, scene: &Scene, camera_position: Vec3) {
        let fallback = Environment::default();
        let environment = scene.environment().unwrap_or(&fallback);
        self.lights
            .reset(environment.ambient_color, environment.ambient_intensity, camera_position);

        for entity in scene.pre_order() {
            if let Some(light) = entity.get_component::<LightComponent>() {
                self.lights.push(light, entity.world_matrix());
            }
        }
    }

    fn collect_commands(&mut self, scene: &Scene, camera_position: Vec3) {
        self.queue.clear();
        for entity in scene.pre_order() {
            let world = *entity.world_matrix();
            let distance = (camera_position - utils::translation_of(&world)).norm();

            if let Some(renderer) = entity.get_component::<MeshRenderer>() {
                if let (true, Some(mesh), Some(material)) =
                    (renderer.visible, renderer.mesh.as_ref(), renderer.material.as_ref())
                {
                    self.queue
                        .add_command(RenderCommand::new(entity.id(), mesh.clone(), material.clone(), world, distance));
                }
            }

            if let Some(renderer) = entity.get_component::<InstancedRenderer>() {
                if renderer.should_render() {
                    if let (Some(mesh), Some(material)) = (renderer.mesh.as_ref(), renderer.material.as_ref()) {
                        let command =
                            RenderCommand::new(entity.id(), mesh.clone(), material.clone(), world, distance)
                                .with_instances(renderer.world_instances(&world));
                        self.queue.add_command(command);
                    }
                }
            }
        }

        self.queue.sort_opaque();
        if self.config.sort_transparent {
            self.queue.sort_transparent();
        }
    }

    /// Issue one command. Returns `false` if the backend rejected the draw.
    fn draw_command(
        &mut self,
        command: &RenderCommand,
        camera: &CameraView,
        bound: &mut ShaderHandle,
        backend: &mut dyn RenderBackend,
    ) -> bool {
        let resolved = command.material.borrow_mut().resolve_shader(&mut self.shaders, backend);
        let shader = if resolved.is_valid() { resolved } else { self.shaders.fallback() };

        if shader != *bound {
            backend.use_shader(shader);
            backend.upload_light_block(self.lights.as_bytes());
            backend.set_uniform(U_CAMERA_POSITION, &UniformValue::Vec3(camera.position));
            *bound = shader;
        }

        let model = command.model;
        backend.set_uniform(U_MODEL, &UniformValue::Mat4(model));
        backend.set_uniform(U_VIEW, &UniformValue::Mat4(camera.view));
        backend.set_uniform(U_PROJECTION, &UniformValue::Mat4(camera.projection));
        backend.set_uniform(U_MVP, &UniformValue::Mat4(camera.projection * camera.view * model));
        backend.set_uniform(U_NORMAL_MATRIX, &UniformValue::Mat3(utils::normal_matrix(&model)));

        command.material.borrow().bind_properties(backend, 0);

        if !command.instances.is_empty() {
            backend.set_instance_transforms(&command.instances);
        }
        match backend.draw_indexed(&command.mesh, command.instance_count()) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Draw for entity {} failed: {e}", command.entity);
                false
            }
        }
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("frame_count", &self.frame_count)
            .field("cached_shaders", &self.shaders.cached_count())
            .finish()
    }
}
