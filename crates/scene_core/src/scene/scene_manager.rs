//! Named scene collection with a single active scene
//!
//! Only the active scene is updated each frame. Switching scenes flips the
//! [`SceneState`] of the outgoing and incoming scene and runs the optional
//! activation callback; it does not initialize the scene, so callers decide
//! when scripts see `on_init`.

use std::collections::HashMap;

use crate::scene::scene::{Scene, SceneState};

/// Callback invoked with the newly activated scene
pub type ActivationCallback = Box<dyn FnMut(&mut Scene)>;

/// Owns every loaded scene and tracks which one is active
#[derive(Default)]
pub struct SceneManager {
    scenes: HashMap<String, Scene>,
    active: Option<String>,
    on_activate: Option<ActivationCallback>,
}

impl SceneManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scene, replacing any scene with the same name. The replaced
    /// scene is returned; if it was active, the new scene takes its place
    /// as active.
    pub fn add_scene(&mut self, mut scene: Scene) -> Option<Scene> {
        let name = scene.name().to_string();
        let is_active = self.active.as_deref() == Some(name.as_str());
        if is_active {
            scene.set_state(SceneState::Active);
        }
        log::debug!("Adding scene '{name}'");
        let previous = self.scenes.insert(name, scene);
        if is_active {
            self.run_activation();
        }
        previous
    }

    /// Remove a scene by name. Removing the active scene leaves no scene
    /// active.
    pub fn remove_scene(&mut self, name: &str) -> Option<Scene> {
        let mut scene = self.scenes.remove(name)?;
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
        scene.set_state(SceneState::Inactive);
        Some(scene)
    }

    /// Borrow a scene by name
    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.get(name)
    }

    /// Mutably borrow a scene by name
    pub fn scene_mut(&mut self, name: &str) -> Option<&mut Scene> {
        self.scenes.get_mut(name)
    }

    /// Number of loaded scenes
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// True if no scenes are loaded
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Names of every loaded scene, sorted
    pub fn scene_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scenes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Install the callback run whenever a scene becomes active
    pub fn set_on_activate(&mut self, callback: impl FnMut(&mut Scene) + 'static) {
        self.on_activate = Some(Box::new(callback));
    }

    /// Make `name` the active scene. Returns `false` if no such scene is
    /// loaded; activating the already-active scene does nothing.
    pub fn set_active(&mut self, name: &str) -> bool {
        if !self.scenes.contains_key(name) {
            log::warn!("Cannot activate unknown scene '{name}'");
            return false;
        }
        if self.active.as_deref() == Some(name) {
            return true;
        }
        if let Some(previous) = self.active.take() {
            if let Some(scene) = self.scenes.get_mut(&previous) {
                scene.set_state(SceneState::Inactive);
            }
        }
        if let Some(scene) = self.scenes.get_mut(name) {
            scene.set_state(SceneState::Active);
        }
        self.active = Some(name.to_string());
        log::info!("Activated scene '{name}'");
        self.run_activation();
        true
    }

    fn run_activation(&mut self) {
        let Some(name) = self.active.as_deref() else { return };
        if let (Some(callback), Some(scene)) = (self.on_activate.as_mut(), self.scenes.get_mut(name)) {
            callback(scene);
        }
    }

    /// Name of the active scene
    pub fn active_scene_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Borrow the active scene
    pub fn active_scene(&self) -> Option<&Scene> {
        self.scenes.get(self.active.as_deref()?)
    }

    /// Mutably borrow the active scene
    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        let name = self.active.as_deref()?;
        self.scenes.get_mut(name)
    }

    /// Update the active scene only
    pub fn update(&mut self, delta_time: f32) {
        if let Some(scene) = self.active_scene_mut() {
            scene.update(delta_time);
        }
    }

    /// Forward a viewport resize to the cameras of every loaded scene
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        for scene in self.scenes.values_mut() {
            scene.set_aspect_ratio(aspect_ratio);
        }
    }
}

impl std::fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneManager")
            .field("scenes", &self.scene_names())
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_set_active_switches_state() {
        let mut manager = SceneManager::new();
        manager.add_scene(Scene::new("menu"));
        manager.add_scene(Scene::new("level"));

        assert!(manager.set_active("menu"));
        assert_eq!(manager.scene("menu").unwrap().state(), SceneState::Active);

        assert!(manager.set_active("level"));
        assert_eq!(manager.scene("menu").unwrap().state(), SceneState::Inactive);
        assert_eq!(manager.scene("level").unwrap().state(), SceneState::Active);
        assert_eq!(manager.active_scene_name(), Some("level"));

        assert!(!manager.set_active("missing"));
        assert_eq!(manager.active_scene_name(), Some("level"));
        assert_eq!(manager.scene_names(), vec!["level", "menu"]);
    }

    #[test]
    fn test_activation_callback_does_not_initialize() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut manager = SceneManager::new();
        let sink = Rc::clone(&seen);
        manager.set_on_activate(move |scene| {
            sink.borrow_mut().push((scene.name().to_string(), scene.is_initialized()));
        });
        manager.add_scene(Scene::new("a"));

        manager.set_active("a");
        manager.set_active("a");
        assert_eq!(*seen.borrow(), vec![("a".to_string(), false)]);
        assert!(!manager.active_scene().unwrap().is_initialized());
    }

    #[test]
    fn test_update_only_touches_active_scene() {
        let mut manager = SceneManager::new();
        let mut idle = Scene::new("idle");
        let idle_entity = idle.create_entity("e");
        idle.entity_mut(idle_entity).unwrap().transform_mut().set_position(Vec3::x());
        manager.add_scene(idle);
        manager.add_scene(Scene::new("busy"));
        manager.set_active("busy");

        manager.update(0.1);
        let idle = manager.scene("idle").unwrap();
        assert_eq!(idle.entity(idle_entity).unwrap().transform().world_position(), Vec3::zeros());
    }

    #[test]
    fn test_remove_active_scene() {
        let mut manager = SceneManager::new();
        manager.add_scene(Scene::new("a"));
        manager.set_active("a");
        let removed = manager.remove_scene("a").unwrap();
        assert_eq!(removed.state(), SceneState::Inactive);
        assert!(manager.active_scene().is_none());
        assert!(manager.is_empty());
    }
}
