//! # Materials
//!
//! A material is a named bag of shader inputs. Each property maps a name to
//! a tagged [`UniformValue`] and the uniform it feeds. Materials optionally
//! carry a custom shader descriptor; until that shader is compiled the
//! resolved handle stays at [`ShaderHandle::INVALID`] and the renderer uses
//! its fallback shader instead.
//!
//! Materials are shared (`Rc<RefCell<Material>>`) between every entity that
//! draws with them, so an edit made through one handle is visible to all of
//! them on the next frame.
//!
//! ## Transparency
//! Transparency is derived from the properties rather than stored: a
//! material is transparent when its `transparency` or `alpha` float is below
//! `1.0`, or its `use_transparency` flag is set.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Mat3, Mat4, Vec2, Vec3, Vec4};
use crate::render::backend::{RenderBackend, ShaderHandle, TextureHandle};
use crate::render::shader::{ShaderKey, ShaderManager};

/// Property name holding a 0..1 transparency value
pub const TRANSPARENCY: &str = "transparency";
/// Property name holding a 0..1 alpha value
pub const ALPHA: &str = "alpha";
/// Boolean property forcing the transparent pass
pub const USE_TRANSPARENCY: &str = "use_transparency";

/// A value that can be pushed to a shader uniform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum UniformValue {
    /// Scalar float
    Float(f32),
    /// 2-component vector
    Vec2(Vec2),
    /// 3-component vector
    Vec3(Vec3),
    /// 4-component vector
    Vec4(Vec4),
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i32),
    /// 3x3 matrix
    Mat3(Mat3),
    /// 4x4 matrix
    Mat4(Mat4),
    /// Texture reference, bound to a texture unit at draw time
    Texture(TextureHandle),
}

/// One entry of a material's property bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperty {
    /// Current value
    pub value: UniformValue,
    /// Uniform the value is written to
    pub uniform: String,
}

/// Custom shader program requested by a material
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShaderDescriptor {
    /// Vertex shader source path
    pub vertex_path: String,
    /// Fragment shader source path
    pub fragment_path: String,
    /// Preprocessor defines
    #[serde(default)]
    pub defines: BTreeSet<String>,
    /// Property name to uniform name overrides for this shader
    #[serde(default)]
    pub uniform_overrides: BTreeMap<String, String>,
}

impl ShaderDescriptor {
    /// Create a descriptor from source paths
    pub fn new(vertex_path: impl Into<String>, fragment_path: impl Into<String>) -> Self {
        Self {
            vertex_path: vertex_path.into(),
            fragment_path: fragment_path.into(),
            ..Self::default()
        }
    }

    /// Add a preprocessor define
    pub fn with_define(mut self, define: impl Into<String>) -> Self {
        self.defines.insert(define.into());
        self
    }

    /// Route `property` to `uniform` instead of its default uniform
    pub fn with_uniform_override(mut self, property: impl Into<String>, uniform: impl Into<String>) -> Self {
        self.uniform_overrides.insert(property.into(), uniform.into());
        self
    }

    /// Cache key identifying the compiled program
    pub fn key(&self) -> ShaderKey {
        ShaderKey::new(&self.vertex_path, &self.fragment_path, self.defines.iter().cloned())
    }
}

/// Named property bag bound to shader uniforms at draw time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Material name; materials with the same name are shared on scene load
    pub name: String,
    properties: BTreeMap<String, MaterialProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_shader: Option<ShaderDescriptor>,
    #[serde(skip)]
    shader: ShaderHandle,
}

/// Materials are shared between every entity drawing with them
pub type SharedMaterial = Rc<RefCell<Material>>;

impl Material {
    /// Create an empty material
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
            custom_shader: None,
            shader: ShaderHandle::INVALID,
        }
    }

    /// Wrap into a shared handle
    pub fn into_shared(self) -> SharedMaterial {
        Rc::new(RefCell::new(self))
    }

    /// Builder: add a property feeding the default uniform `u_<name>`
    pub fn with_property(mut self, name: impl Into<String>, value: UniformValue) -> Self {
        self.set_property(name, value);
        self
    }

    /// Builder: install a custom shader
    pub fn with_shader(mut self, shader: ShaderDescriptor) -> Self {
        self.set_custom_shader(Some(shader));
        self
    }

    /// Set a property. Existing properties keep their uniform name; new
    /// ones default to `u_<name>`.
    pub fn set_property(&mut self, name: impl Into<String>, value: UniformValue) {
        let name = name.into();
        match self.properties.get_mut(&name) {
            Some(property) => property.value = value,
            None => {
                let uniform = default_uniform_name(&name);
                self.properties.insert(name, MaterialProperty { value, uniform });
            }
        }
    }

    /// Set a property together with the uniform it feeds
    pub fn set_property_with_uniform(
        &mut self,
        name: impl Into<String>,
        uniform: impl Into<String>,
        value: UniformValue,
    ) {
        self.properties.insert(name.into(), MaterialProperty { value, uniform: uniform.into() });
    }

    /// Current value of a property
    pub fn property(&self, name: &str) -> Option<&UniformValue> {
        self.properties.get(name).map(|property| &property.value)
    }

    /// Remove a property, returning its value
    pub fn remove_property(&mut self, name: &str) -> Option<UniformValue> {
        self.properties.remove(name).map(|property| property.value)
    }

    /// Iterate properties in name order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &MaterialProperty)> {
        self.properties.iter().map(|(name, property)| (name.as_str(), property))
    }

    /// Uniform a property is written to, honoring custom shader overrides
    pub fn uniform_name<'a>(&'a self, name: &str) -> Option<&'a str> {
        let property = self.properties.get(name)?;
        let overridden = self
            .custom_shader
            .as_ref()
            .and_then(|shader| shader.uniform_overrides.get(name));
        Some(overridden.unwrap_or(&property.uniform).as_str())
    }

    /// Custom shader descriptor, if any
    pub fn custom_shader(&self) -> Option<&ShaderDescriptor> {
        self.custom_shader.as_ref()
    }

    /// Replace the custom shader; the resolved handle is reset
    pub fn set_custom_shader(&mut self, shader: Option<ShaderDescriptor>) {
        self.custom_shader = shader;
        self.shader = ShaderHandle::INVALID;
    }

    /// Resolved shader handle; invalid until the first successful bind
    pub fn shader(&self) -> ShaderHandle {
        self.shader
    }

    /// Whether the material belongs in the transparent pass
    pub fn is_transparent(&self) -> bool {
        let below_one = |name: &str| matches!(self.property(name), Some(UniformValue::Float(v)) if *v < 1.0);
        below_one(TRANSPARENCY)
            || below_one(ALPHA)
            || matches!(self.property(USE_TRANSPARENCY), Some(UniformValue::Bool(true)))
    }

    /// Resolve the custom shader through the shader manager on first use.
    ///
    /// Returns the material's own handle, which stays invalid when there is
    /// no custom shader or compilation failed; callers substitute their
    /// fallback shader in that case.
    pub fn resolve_shader(&mut self, shaders: &mut ShaderManager, backend: &mut dyn RenderBackend) -> ShaderHandle {
        if !self.shader.is_valid() {
            if let Some(descriptor) = &self.custom_shader {
                self.shader = shaders.get_or_compile(&descriptor.key(), backend);
            }
        }
        self.shader
    }

    /// Push every property to the currently bound shader.
    ///
    /// Textures take consecutive units starting at `first_texture_unit`; the
    /// sampler uniform receives the unit index. Invalid texture handles are
    /// skipped so the shader samples whatever default it binds.
    pub fn bind_properties(&self, backend: &mut dyn RenderBackend, first_texture_unit: u32) {
        let mut unit = first_texture_unit;
        for name in self.properties.keys() {
            let Some(uniform) = self.uniform_name(name) else { continue };
            let value = &self.properties[name].value;
            match *value {
                UniformValue::Texture(texture) if !texture.is_valid() => {
                    log::trace!("Material '{}' texture '{name}' unresolved, skipping", self.name);
                }
                UniformValue::Texture(texture) => {
                    backend.bind_texture(unit, texture);
                    backend.set_uniform(uniform, &UniformValue::Int(i32::try_from(unit).unwrap_or(i32::MAX)));
                    unit += 1;
                }
                _ => backend.set_uniform(uniform, value),
            }
        }
    }
}

fn default_uniform_name(property: &str) -> String {
    let sanitized: String = property
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("u_{sanitized}")
}
