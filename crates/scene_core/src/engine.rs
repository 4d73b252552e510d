//! Core engine implementation

use crate::{
    application::Application,
    core::config::{ConfigError, EngineConfig},
    foundation::time::FrameClock,
    render::{FrameStats, RenderBackend, RenderError, Renderer},
    scene::SceneManager,
    window::{FrameInput, WindowSource},
};
use thiserror::Error;

/// Main engine struct
///
/// The engine owns the scene manager, the renderer and the backend, and is
/// passed explicitly to every [`Application`] callback. There is no global
/// engine instance.
pub struct Engine {
    /// Loaded scenes and the active one
    pub scenes: SceneManager,

    /// Scene renderer
    renderer: Renderer,

    /// Graphics backend
    backend: Box<dyn RenderBackend>,

    /// Frame timing, fed by the window source
    clock: FrameClock,

    /// Engine configuration
    config: EngineConfig,

    /// Current framebuffer size
    viewport: (u32, u32),

    /// Statistics of the last rendered frame
    last_stats: Option<FrameStats>,

    /// Whether the engine should continue running
    running: bool,
}

impl Engine {
    /// Create a new engine instance
    ///
    /// Validates the configuration and compiles the fallback shader; either
    /// failing is fatal.
    pub fn new(config: EngineConfig, mut backend: Box<dyn RenderBackend>) -> Result<Self, EngineError> {
        log::info!("Initializing engine for '{}'...", config.application_name);
        config.validate()?;

        let mut renderer = Renderer::new(config.renderer.clone());
        renderer.initialize(backend.as_mut())?;
        let viewport = (config.window.width, config.window.height);

        Ok(Self {
            scenes: SceneManager::new(),
            renderer,
            backend,
            clock: FrameClock::new(),
            config,
            viewport,
            last_stats: None,
            running: true,
        })
    }

    /// Run the main loop until the window source runs dry or
    /// [`Engine::quit`] is called
    pub fn run<A: Application + ?Sized, W: WindowSource + ?Sized>(
        &mut self,
        app: &mut A,
        window: &mut W,
    ) -> Result<(), EngineError> {
        app.initialize(self)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");
        while self.running {
            let Some(input) = window.next_frame() else { break };

            app.update(self, input.delta_time)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {e}")))?;
            self.frame(input);
        }

        app.cleanup(self);
        log::info!(
            "Engine shutdown complete after {} frames ({:.1} fps average)",
            self.clock.frame_count(),
            self.clock.average_fps()
        );
        Ok(())
    }

    /// Advance one frame: apply a viewport change, update the active scene
    /// and render it from its default camera
    pub fn frame(&mut self, input: FrameInput) -> Option<&FrameStats> {
        if input.viewport != self.viewport {
            self.resize(input);
        }
        self.clock.advance(input.delta_time);
        self.scenes.update(self.clock.delta_time());

        self.last_stats = self
            .scenes
            .active_scene()
            .and_then(|scene| self.renderer.render_scene(scene, self.backend.as_mut()));
        self.last_stats.as_ref()
    }

    fn resize(&mut self, input: FrameInput) {
        self.viewport = input.viewport;
        match input.aspect_ratio() {
            Some(aspect_ratio) => {
                log::debug!("Viewport resized to {}x{}", input.viewport.0, input.viewport.1);
                self.scenes.set_aspect_ratio(aspect_ratio);
            }
            None => log::debug!("Viewport minimized, keeping camera aspect ratios"),
        }
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// True until [`Engine::quit`] is called
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Get the renderer
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Get the renderer mutably
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// Get the graphics backend
    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    /// Get the graphics backend mutably
    pub fn backend_mut(&mut self) -> &mut dyn RenderBackend {
        self.backend.as_mut()
    }

    /// Frame clock
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current framebuffer size
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Statistics of the last rendered frame
    pub fn last_frame_stats(&self) -> Option<&FrameStats> {
        self.last_stats.as_ref()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("scenes", &self.scenes)
            .field("renderer", &self.renderer)
            .field("viewport", &self.viewport)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    /// Renderer bring-up or backend failure
    #[error("Rendering error: {0}")]
    RenderError(#[from] RenderError),

    /// Application callback failed
    #[error("Application error: {0}")]
    ApplicationError(String),
}
