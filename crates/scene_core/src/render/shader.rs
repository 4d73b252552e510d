//! Shader manager
//!
//! Maps a (vertex path, fragment path, defines) triple to a compiled
//! program handle and caches the result, failures included, so a broken
//! shader is reported once instead of every frame. Source loading and
//! preprocessing live in the backend.

use std::collections::{BTreeSet, HashMap};

use crate::core::config::ShaderConfig;
use crate::render::backend::{RenderBackend, ShaderHandle};
use crate::render::RenderError;

/// Cache key identifying one compiled program
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderKey {
    /// Vertex shader source path
    pub vertex: String,
    /// Fragment shader source path
    pub fragment: String,
    /// Preprocessor defines; order-insensitive
    pub defines: BTreeSet<String>,
}

impl ShaderKey {
    /// Build a key
    pub fn new(
        vertex: impl Into<String>,
        fragment: impl Into<String>,
        defines: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
            defines: defines.into_iter().collect(),
        }
    }
}

impl From<&ShaderConfig> for ShaderKey {
    fn from(config: &ShaderConfig) -> Self {
        Self::new(
            &config.vertex_shader_path,
            &config.fragment_shader_path,
            config.defines.iter().cloned(),
        )
    }
}

/// Caching front-end over [`RenderBackend::compile_shader`]
#[derive(Debug, Default)]
pub struct ShaderManager {
    cache: HashMap<ShaderKey, ShaderHandle>,
    fallback: ShaderHandle,
}

impl ShaderManager {
    /// Create an empty manager with no fallback shader
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile the fallback shader.
    ///
    /// Failure here is fatal for the caller: nothing can be drawn without it.
    pub fn initialize_fallback(
        &mut self,
        config: &ShaderConfig,
        backend: &mut dyn RenderBackend,
    ) -> Result<ShaderHandle, RenderError> {
        let key = ShaderKey::from(config);
        let handle = backend
            .compile_shader(&key)
            .map_err(|e| RenderError::FallbackShaderUnavailable(format!("{}: {e}", key.fragment)))?;
        if !handle.is_valid() {
            return Err(RenderError::FallbackShaderUnavailable(format!(
                "{} compiled to an invalid handle",
                key.fragment
            )));
        }
        log::info!("Fallback shader ready ({} / {})", key.vertex, key.fragment);
        self.cache.insert(key, handle);
        self.fallback = handle;
        Ok(handle)
    }

    /// Fallback shader handle; invalid until [`Self::initialize_fallback`] succeeds
    pub fn fallback(&self) -> ShaderHandle {
        self.fallback
    }

    /// Look up or compile a program.
    ///
    /// Compilation errors are logged and yield [`ShaderHandle::INVALID`];
    /// the failure is cached.
    pub fn get_or_compile(&mut self, key: &ShaderKey, backend: &mut dyn RenderBackend) -> ShaderHandle {
        if let Some(handle) = self.cache.get(key) {
            return *handle;
        }
        let handle = match backend.compile_shader(key) {
            Ok(handle) => {
                log::debug!("Compiled shader {} / {} -> {:?}", key.vertex, key.fragment, handle);
                handle
            }
            Err(e) => {
                log::error!("Shader {} / {} failed to compile: {e}", key.vertex, key.fragment);
                ShaderHandle::INVALID
            }
        };
        self.cache.insert(key.clone(), handle);
        handle
    }

    /// Number of cached entries, failures included
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Forget every cached program except the fallback
    pub fn clear(&mut self) {
        let fallback = self.fallback;
        self.cache.retain(|_, handle| *handle == fallback && fallback.is_valid());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::HeadlessBackend;

    #[test]
    fn test_cache_is_keyed_by_triple() {
        let mut backend = HeadlessBackend::new();
        let mut shaders = ShaderManager::new();

        let plain = ShaderKey::new("a.vert", "a.frag", []);
        let fog = ShaderKey::new("a.vert", "a.frag", ["FOG".to_string()]);
        let fog_duplicated = ShaderKey::new("a.vert", "a.frag", ["FOG".to_string(), "FOG".to_string()]);

        let first = shaders.get_or_compile(&plain, &mut backend);
        let second = shaders.get_or_compile(&fog, &mut backend);
        assert_ne!(first, second);
        assert_eq!(shaders.get_or_compile(&plain, &mut backend), first);
        assert_eq!(shaders.get_or_compile(&fog_duplicated, &mut backend), second);
        assert_eq!(backend.compiled_shader_count(), 2);
    }

    #[test]
    fn test_failure_is_cached_as_invalid() {
        let mut backend = HeadlessBackend::new().with_failing_shader("bad.frag");
        let mut shaders = ShaderManager::new();
        let key = ShaderKey::new("a.vert", "bad.frag", []);

        assert_eq!(shaders.get_or_compile(&key, &mut backend), ShaderHandle::INVALID);
        assert_eq!(shaders.get_or_compile(&key, &mut backend), ShaderHandle::INVALID);
        assert_eq!(backend.compile_attempts(), 1);
    }

    #[test]
    fn test_fallback_failure_is_fatal() {
        let mut backend = HeadlessBackend::new().with_failing_shader("fallback.frag");
        let mut shaders = ShaderManager::new();
        let result = shaders.initialize_fallback(&ShaderConfig::new("fallback.vert", "fallback.frag"), &mut backend);
        assert!(matches!(result, Err(RenderError::FallbackShaderUnavailable(_))));
        assert!(!shaders.fallback().is_valid());
    }

    #[test]
    fn test_clear_keeps_fallback() {
        let mut backend = HeadlessBackend::new();
        let mut shaders = ShaderManager::new();
        let fallback = shaders.initialize_fallback(&ShaderConfig::default(), &mut backend).unwrap();
        shaders.get_or_compile(&ShaderKey::new("x.vert", "x.frag", []), &mut backend);
        assert_eq!(shaders.cached_count(), 2);

        shaders.clear();
        assert_eq!(shaders.cached_count(), 1);
        assert_eq!(shaders.fallback(), fallback);
    }
}
