//! Scene environment: ambient lighting and sky

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::render::backend::TextureHandle;

/// Scene-wide lighting environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Ambient light color
    pub ambient_color: Vec3,
    /// Ambient light intensity
    pub ambient_intensity: f32,
    /// Cube map drawn behind the scene, if any
    #[serde(default)]
    pub skybox: Option<TextureHandle>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::new(1.0, 1.0, 1.0),
            ambient_intensity: 0.1,
            skybox: None,
        }
    }
}

impl Environment {
    /// Builder: set the ambient term
    pub fn with_ambient(mut self, color: Vec3, intensity: f32) -> Self {
        self.ambient_color = color;
        self.ambient_intensity = intensity;
        self
    }

    /// Builder: set the skybox texture
    pub fn with_skybox(mut self, skybox: TextureHandle) -> Self {
        self.skybox = Some(skybox);
        self
    }
}
