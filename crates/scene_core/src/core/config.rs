//! # Engine Configuration
//!
//! Serializable configuration for the engine context, the renderer and the
//! window collaborator. Every struct has sensible defaults, `with_*` builder
//! methods and a `validate()` step run by [`crate::Engine::new`].
//!
//! ## Example (TOML)
//!
//! ```toml
//! application_name = "Scene Demo"
//! log_level = "debug"
//!
//! [window]
//! width = 1280
//! height = 720
//!
//! [renderer]
//! clear_color = [0.1, 0.1, 0.12, 1.0]
//! sort_transparent = true
//!
//! [renderer.fallback_shader]
//! vertex_shader_path = "shaders/fallback.vert"
//! fragment_shader_path = "shaders/fallback.frag"
//! defines = []
//! ```

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};

/// # Shader Configuration
///
/// Source paths and preprocessor defines identifying one shader program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderConfig {
    /// Path to the vertex shader source
    pub vertex_shader_path: String,
    /// Path to the fragment shader source
    pub fragment_shader_path: String,
    /// Preprocessor defines passed to the shader manager
    #[serde(default)]
    pub defines: Vec<String>,
}

impl ShaderConfig {
    /// Create a new shader configuration
    pub fn new(vertex_path: impl Into<String>, fragment_path: impl Into<String>) -> Self {
        Self {
            vertex_shader_path: vertex_path.into(),
            fragment_shader_path: fragment_path.into(),
            defines: Vec::new(),
        }
    }

    /// Add a preprocessor define
    pub fn with_define(mut self, define: impl Into<String>) -> Self {
        self.defines.push(define.into());
        self
    }

    /// Validate that both paths are present
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vertex_shader_path.trim().is_empty() {
            return Err(ConfigError::Invalid("Vertex shader path cannot be empty".to_string()));
        }
        if self.fragment_shader_path.trim().is_empty() {
            return Err(ConfigError::Invalid("Fragment shader path cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self::new("shaders/fallback.vert", "shaders/fallback.frag")
    }
}

/// # Renderer Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Framebuffer clear color (RGBA)
    pub clear_color: [f32; 4],
    /// Sort the transparent pass back-to-front
    pub sort_transparent: bool,
    /// Shader used for any material without a resolved shader of its own
    pub fallback_shader: ShaderConfig,
}

impl RendererConfig {
    /// Set the fallback shader
    pub fn with_fallback_shader(mut self, shader: ShaderConfig) -> Self {
        self.fallback_shader = shader;
        self
    }

    /// Set the clear color
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fallback_shader.validate()?;
        if self.clear_color.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::Invalid("Clear color must be finite".to_string()));
        }
        Ok(())
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.1, 0.1, 0.12, 1.0],
            sort_transparent: true,
            fallback_shader: ShaderConfig::default(),
        }
    }
}

/// # Window Configuration
///
/// Initial viewport handed to the window collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
    /// Window title
    pub title: String,
}

impl WindowConfig {
    /// Aspect ratio of the configured viewport
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Scene Core".to_string(),
        }
    }
}

/// # Engine Configuration
///
/// Top-level configuration applications hand to [`crate::Engine::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Application name, used in log output
    pub application_name: String,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Window configuration
    pub window: WindowConfig,
    /// Renderer configuration
    pub renderer: RendererConfig,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new(application_name: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            log_level: "info".to_string(),
            window: WindowConfig::default(),
            renderer: RendererConfig::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the initial viewport size
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Set the renderer configuration
    pub fn with_renderer(mut self, renderer: RendererConfig) -> Self {
        self.renderer = renderer;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.application_name.is_empty() {
            return Err(ConfigError::Invalid("Application name cannot be empty".to_string()));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "Viewport must be non-empty, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        self.renderer.validate()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new("Scene Core Application")
    }
}

impl Config for EngineConfig {}
