//! JSON scene documents
//!
//! A scene serializes to
//!
//! ```text
//! { "name": ..., "default_camera": id, "environment": {...},
//!   "materials": [ {...}, ... ],
//!   "entities": [ { "id", "name", "components": [ { "_type": tag, ... } ],
//!                   "children": [ id, ... ] }, ... ] }
//! ```
//!
//! Entities are listed flat in pre-order and refer to their children by
//! document id, so the JSON nesting depth does not grow with the hierarchy.
//! An entity that no other entity lists as a child is a root.
//!
//! Materials live once in the `materials` table and renderers refer to them
//! by index. Two renderers share a material after loading exactly when they
//! shared the same material when saved; equal names never merge materials.
//!
//! Components go through a [`ComponentRegistry`] keyed by their type tag.
//! Ids in a document are only meaningful inside that document: loading
//! allocates fresh ids and rewires children and the default camera through
//! a remap table. Scripts are behavior, not data, and are never written.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::assets::MeshLibrary;
use crate::ecs::components::{CameraComponent, InstancedRenderer, LightComponent, MeshRenderer, TransformComponent};
use crate::ecs::{Component, Entity, EntityId};
use crate::foundation::math::Mat4;
use crate::render::material::{Material, SharedMaterial};
use crate::render::mesh::SharedMesh;
use crate::scene::environment::Environment;
use crate::scene::scene::Scene;
use crate::scene::SceneError;

/// Key holding the component type tag inside each component object
pub const TYPE_KEY: &str = "_type";

/// Turns a component into a JSON object (without the type tag)
pub type EncodeFn = fn(&dyn Component, &mut SaveContext) -> Result<Value, SceneError>;

/// Rebuilds a component from its JSON object (type tag already removed)
pub type DecodeFn = fn(Value, &mut LoadContext<'_>) -> Result<Box<dyn Component>, SceneError>;

/// Encoder/decoder pair for one component type
#[derive(Clone, Copy)]
pub struct ComponentCodec {
    /// Component to JSON
    pub encode: EncodeFn,
    /// JSON to component
    pub decode: DecodeFn,
}

/// Shared state while saving one document
#[derive(Debug, Default)]
pub struct SaveContext {
    materials: Vec<Material>,
    indices: HashMap<*const RefCell<Material>, usize>,
}

impl SaveContext {
    /// Index of `material` in the document's material table, adding it on
    /// first use. Every handle to one shared material gets the same index.
    pub fn material(&mut self, material: &SharedMaterial) -> usize {
        let materials = &mut self.materials;
        *self.indices.entry(Rc::as_ptr(material)).or_insert_with(|| {
            materials.push(material.borrow().clone());
            materials.len() - 1
        })
    }

    fn into_materials(self) -> Vec<Material> {
        self.materials
    }
}

/// Shared state while loading one document
pub struct LoadContext<'a> {
    meshes: &'a MeshLibrary,
    materials: Vec<SharedMaterial>,
}

impl<'a> LoadContext<'a> {
    fn new(meshes: &'a MeshLibrary, materials: Vec<Material>) -> Self {
        Self {
            meshes,
            materials: materials.into_iter().map(Material::into_shared).collect(),
        }
    }

    /// Resolve a mesh by name; unknown names are logged and yield `None`
    pub fn mesh(&self, name: &str) -> Option<SharedMesh> {
        let mesh = self.meshes.get(name);
        if mesh.is_none() {
            log::warn!("Scene references unknown mesh '{name}'");
        }
        mesh
    }

    /// Material `index` of the document's material table. Every reference
    /// to the same index gets the same shared material.
    pub fn material(&self, index: usize) -> Option<SharedMaterial> {
        let material = self.materials.get(index).map(Rc::clone);
        if material.is_none() {
            log::warn!("Scene references material {index}, but the table holds {}", self.materials.len());
        }
        material
    }
}

/// Type-tag keyed set of component codecs
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    codecs: HashMap<String, ComponentCodec>,
}

impl ComponentRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with codecs for every built-in component
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register::<TransformComponent>("Transform");
        registry.register::<CameraComponent>("Camera");
        registry.register::<LightComponent>("Light");
        registry.register_codec(
            "MeshRenderer",
            ComponentCodec {
                encode: encode_mesh_renderer,
                decode: decode_mesh_renderer,
            },
        );
        registry.register_codec(
            "InstancedRenderer",
            ComponentCodec {
                encode: encode_instanced_renderer,
                decode: decode_instanced_renderer,
            },
        );
        registry
    }

    /// Register a plain serde component under `tag`, which must match the
    /// component's [`Component::type_tag`]
    pub fn register<T>(&mut self, tag: &str)
    where
        T: Component + Serialize + DeserializeOwned,
    {
        self.register_codec(
            tag,
            ComponentCodec {
                encode: encode_serde::<T>,
                decode: decode_serde::<T>,
            },
        );
    }

    /// Register a hand-written codec
    pub fn register_codec(&mut self, tag: &str, codec: ComponentCodec) {
        if self.codecs.insert(tag.to_string(), codec).is_some() {
            log::debug!("Replaced codec for component '{tag}'");
        }
    }

    /// True if `tag` has a codec
    pub fn contains(&self, tag: &str) -> bool {
        self.codecs.contains_key(tag)
    }

    fn encode(&self, component: &dyn Component, context: &mut SaveContext) -> Result<Option<Value>, SceneError> {
        let tag = component.type_tag();
        let Some(codec) = self.codecs.get(tag) else {
            log::debug!("Not serializing component '{tag}': no codec registered");
            return Ok(None);
        };
        let value = match (codec.encode)(component, context)? {
            Value::Object(mut object) => {
                object.insert(TYPE_KEY.to_string(), Value::String(tag.to_string()));
                Value::Object(object)
            }
            other => {
                let mut object = Map::new();
                object.insert(TYPE_KEY.to_string(), Value::String(tag.to_string()));
                object.insert("value".to_string(), other);
                Value::Object(object)
            }
        };
        Ok(Some(value))
    }

    fn decode(
        &self,
        value: Value,
        entity: &str,
        context: &mut LoadContext<'_>,
    ) -> Result<Option<Box<dyn Component>>, SceneError> {
        let Value::Object(mut object) = value else {
            return Err(SceneError::MissingTypeTag { entity: entity.to_string() });
        };
        let tag = match object.remove(TYPE_KEY) {
            Some(Value::String(tag)) => tag,
            _ => return Err(SceneError::MissingTypeTag { entity: entity.to_string() }),
        };
        let Some(codec) = self.codecs.get(&tag) else {
            log::warn!("Skipping unknown component '{tag}' on '{entity}'");
            return Ok(None);
        };
        (codec.decode)(Value::Object(object), context).map(Some)
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<&str> = self.codecs.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("ComponentRegistry").field("tags", &tags).finish()
    }
}

fn codec_error(tag: &str, message: impl ToString) -> SceneError {
    SceneError::Component {
        tag: tag.to_string(),
        message: message.to_string(),
    }
}

fn encode_serde<T: Component + Serialize>(
    component: &dyn Component,
    _context: &mut SaveContext,
) -> Result<Value, SceneError> {
    let typed = component
        .downcast_ref::<T>()
        .ok_or_else(|| codec_error(component.type_tag(), "codec registered for another type"))?;
    Ok(serde_json::to_value(typed)?)
}

fn decode_serde<T: Component + DeserializeOwned>(
    value: Value,
    _context: &mut LoadContext<'_>,
) -> Result<Box<dyn Component>, SceneError> {
    let component: T = serde_json::from_value(value)?;
    Ok(Box::new(component))
}

#[derive(Serialize, Deserialize)]
struct MeshRendererData {
    #[serde(default)]
    mesh: Option<String>,
    #[serde(default)]
    material: Option<usize>,
    #[serde(default = "visible_by_default")]
    visible: bool,
}

#[derive(Serialize, Deserialize)]
struct InstancedRendererData {
    #[serde(default)]
    mesh: Option<String>,
    #[serde(default)]
    material: Option<usize>,
    #[serde(default)]
    instances: Vec<Mat4>,
    #[serde(default = "visible_by_default")]
    visible: bool,
}

fn visible_by_default() -> bool {
    true
}

fn encode_mesh_renderer(component: &dyn Component, context: &mut SaveContext) -> Result<Value, SceneError> {
    let renderer = component
        .downcast_ref::<MeshRenderer>()
        .ok_or_else(|| codec_error("MeshRenderer", "unexpected component type"))?;
    let data = MeshRendererData {
        mesh: renderer.mesh.as_ref().map(|mesh| mesh.name.clone()),
        material: renderer.material.as_ref().map(|material| context.material(material)),
        visible: renderer.visible,
    };
    Ok(serde_json::to_value(data)?)
}

fn decode_mesh_renderer(value: Value, context: &mut LoadContext<'_>) -> Result<Box<dyn Component>, SceneError> {
    let data: MeshRendererData = serde_json::from_value(value)?;
    Ok(Box::new(MeshRenderer {
        mesh: data.mesh.and_then(|name| context.mesh(&name)),
        material: data.material.and_then(|index| context.material(index)),
        visible: data.visible,
    }))
}

fn encode_instanced_renderer(component: &dyn Component, context: &mut SaveContext) -> Result<Value, SceneError> {
    let renderer = component
        .downcast_ref::<InstancedRenderer>()
        .ok_or_else(|| codec_error("InstancedRenderer", "unexpected component type"))?;
    let data = InstancedRendererData {
        mesh: renderer.mesh.as_ref().map(|mesh| mesh.name.clone()),
        material: renderer.material.as_ref().map(|material| context.material(material)),
        instances: renderer.instances.clone(),
        visible: renderer.visible,
    };
    Ok(serde_json::to_value(data)?)
}

fn decode_instanced_renderer(value: Value, context: &mut LoadContext<'_>) -> Result<Box<dyn Component>, SceneError> {
    let data: InstancedRendererData = serde_json::from_value(value)?;
    Ok(Box::new(InstancedRenderer {
        mesh: data.mesh.and_then(|name| context.mesh(&name)),
        material: data.material.and_then(|index| context.material(index)),
        instances: data.instances,
        visible: data.visible,
    }))
}

/// Serialized scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Scene name
    pub name: String,
    /// Default camera, as a document id
    #[serde(default)]
    pub default_camera: Option<EntityId>,
    /// Scene environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    /// Materials referenced by index from renderer components
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<Material>,
    /// Every entity, pre-order
    pub entities: Vec<EntityDocument>,
}

/// Serialized entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    /// Id at save time
    pub id: EntityId,
    /// Entity name
    pub name: String,
    /// Component objects, each tagged with `_type`
    #[serde(default)]
    pub components: Vec<Value>,
    /// Document ids of the children, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EntityId>,
}

impl SceneDocument {
    /// Total number of entities in the document
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

/// Converts scenes to and from JSON documents
#[derive(Debug, Clone)]
pub struct SceneSerializer {
    registry: ComponentRegistry,
}

impl Default for SceneSerializer {
    fn default() -> Self {
        Self::new(ComponentRegistry::with_defaults())
    }
}

impl SceneSerializer {
    /// Serializer using `registry` for components
    pub fn new(registry: ComponentRegistry) -> Self {
        Self { registry }
    }

    /// Component registry
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Mutable component registry, for registering custom components
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Capture `scene` as a document
    pub fn to_document(&self, scene: &Scene) -> Result<SceneDocument, SceneError> {
        let mut context = SaveContext::default();
        let mut entities = Vec::with_capacity(scene.len());
        for entity in scene.pre_order() {
            let mut components = Vec::new();
            for component in entity.components() {
                if let Some(value) = self.registry.encode(component, &mut context)? {
                    components.push(value);
                }
            }
            entities.push(EntityDocument {
                id: entity.id(),
                name: entity.name().to_string(),
                components,
                children: scene.children(entity.id()).to_vec(),
            });
        }
        Ok(SceneDocument {
            name: scene.name().to_string(),
            default_camera: scene.default_camera(),
            environment: scene.environment().cloned(),
            materials: context.into_materials(),
            entities,
        })
    }

    /// Serialize `scene` to pretty-printed JSON
    pub fn to_json(&self, scene: &Scene) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(&self.to_document(scene)?)?)
    }

    /// Build a new, uninitialized scene from a document. Meshes are resolved
    /// by name through `meshes`.
    ///
    /// Children that are unknown, already claimed by another parent, or that
    /// would close a cycle are logged and left where they are.
    pub fn from_document(&self, document: SceneDocument, meshes: &MeshLibrary) -> Result<Scene, SceneError> {
        let mut scene = Scene::new(document.name);
        scene.set_environment(document.environment);

        let mut context = LoadContext::new(meshes, document.materials);
        let mut remap = HashMap::with_capacity(document.entities.len());
        let mut links = Vec::with_capacity(document.entities.len());
        for entity in document.entities {
            let EntityDocument { id: saved, name, components, children } = entity;
            if remap.contains_key(&saved) {
                return Err(SceneError::DuplicateId(saved));
            }
            let id = self.load_entity(&mut scene, name, components, &mut context)?;
            remap.insert(saved, id);
            links.push((id, children));
        }

        for (parent, children) in links {
            for saved in children {
                let Some(&child) = remap.get(&saved) else {
                    log::warn!("Ignoring child {saved}: not in the document");
                    continue;
                };
                if scene.parent(child).is_some() {
                    log::warn!("Ignoring child {saved}: already listed under another parent");
                    continue;
                }
                if !scene.set_parent(child, Some(parent)) {
                    log::warn!("Ignoring child {saved}: it would close a cycle");
                }
            }
        }

        if let Some(saved) = document.default_camera {
            match remap.get(&saved) {
                Some(&camera) => {
                    if !scene.set_default_camera(camera) {
                        log::warn!("Saved default camera {saved} has no camera component");
                    }
                }
                None => log::warn!("Saved default camera {saved} is not in the document"),
            }
        }
        scene.update_world_matrices();
        log::info!("Loaded scene '{}' with {} entities", scene.name(), scene.len());
        Ok(scene)
    }

    fn load_entity(
        &self,
        scene: &mut Scene,
        name: String,
        components: Vec<Value>,
        context: &mut LoadContext<'_>,
    ) -> Result<EntityId, SceneError> {
        let id = scene.create_entity(name);
        let mut decoded = Vec::with_capacity(components.len());
        {
            let name = scene.entity(id).map_or("", Entity::name);
            for value in components {
                if let Some(component) = self.registry.decode(value, name, context)? {
                    decoded.push(component);
                }
            }
        }
        if let Some(entity) = scene.entity_mut(id) {
            for component in decoded {
                entity.add_boxed_component(component);
            }
        }
        Ok(id)
    }

    /// Parse JSON into a new scene
    pub fn from_json(&self, json: &str, meshes: &MeshLibrary) -> Result<Scene, SceneError> {
        let document: SceneDocument = serde_json::from_str(json)?;
        self.from_document(document, meshes)
    }

    /// Write `scene` to a JSON file
    pub fn save_to_file(&self, scene: &Scene, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let path = path.as_ref();
        fs::write(path, self.to_json(scene)?)?;
        log::info!("Saved scene '{}' to {}", scene.name(), path.display());
        Ok(())
    }

    /// Read a scene from a JSON file
    pub fn load_from_file(&self, path: impl AsRef<Path>, meshes: &MeshLibrary) -> Result<Scene, SceneError> {
        let json = fs::read_to_string(path)?;
        self.from_json(&json, meshes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::LightFactory;
    use crate::foundation::math::Vec3;
    use crate::render::material::{UniformValue, ALPHA};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Health {
        hp: i32,
    }

    impl Component for Health {
        fn type_tag(&self) -> &'static str {
            "Health"
        }
    }

    fn shared_material_scene(library: &MeshLibrary) -> Scene {
        let mut scene = Scene::new("shared");
        let mesh = library.get("cube").unwrap();
        let material = Material::new("stone")
            .with_property("alpha", UniformValue::Float(1.0))
            .into_shared();
        for name in ["a", "b"] {
            let id = scene.create_entity(name);
            scene.add_component(id, MeshRenderer::new(Rc::clone(&mesh), Rc::clone(&material)));
        }
        scene
    }

    #[test]
    fn test_document_shape() {
        let mut scene = Scene::new("shape");
        let root = scene.create_entity("root");
        let child = scene.create_entity("child");
        scene.set_parent(child, Some(root));
        scene.add_component(child, LightFactory::point(Vec3::new(1.0, 0.5, 0.0), 2.0, 10.0));

        let json: Value = serde_json::from_str(&SceneSerializer::default().to_json(&scene).unwrap()).unwrap();
        assert_eq!(json["name"], "shape");
        assert_eq!(json["entities"].as_array().unwrap().len(), 2);
        assert_eq!(json["entities"][0]["children"][0], json["entities"][1]["id"]);
        let child_doc = &json["entities"][1];
        assert_eq!(child_doc["name"], "child");
        assert_eq!(child_doc["components"][0][TYPE_KEY], "Transform");
        assert_eq!(child_doc["components"][1][TYPE_KEY], "Light");
        assert!(json.get("materials").is_none());
    }

    #[test]
    fn test_deep_hierarchy_round_trip() {
        let mut scene = Scene::new("chain");
        let mut parent = None;
        for depth in 0..150 {
            let id = scene.create_entity(format!("link {depth}"));
            scene.set_transform(id, TransformComponent::from_position(Vec3::new(1.0, 0.0, 0.0)));
            scene.set_parent(id, parent);
            parent = Some(id);
        }

        let serializer = SceneSerializer::default();
        let json = serializer.to_json(&scene).unwrap();
        let loaded = serializer.from_json(&json, &MeshLibrary::new()).unwrap();

        assert_eq!(loaded.len(), 150);
        assert_eq!(loaded.roots().len(), 1);
        let deepest = loaded.find_entity_by_name("link 149").unwrap();
        let mut depth = 0;
        let mut current = loaded.parent(deepest);
        while let Some(id) = current {
            depth += 1;
            current = loaded.parent(id);
        }
        assert_eq!(depth, 149);
        let world = loaded.entity(deepest).unwrap().transform().world_position();
        assert!((world.x - 150.0).abs() < 1e-3);
    }

    #[test]
    fn test_same_named_materials_stay_distinct() {
        let library = MeshLibrary::with_primitives();
        let mesh = library.get("cube").unwrap();
        let opaque = Material::new("default")
            .with_property("color", UniformValue::Vec3(Vec3::x()))
            .into_shared();
        let glass = Material::new("default")
            .with_property(ALPHA, UniformValue::Float(0.3))
            .into_shared();
        let mut scene = Scene::new("materials");
        for (name, material) in [("a", &opaque), ("b", &glass), ("c", &glass)] {
            let id = scene.create_entity(name);
            scene.add_component(id, MeshRenderer::new(Rc::clone(&mesh), Rc::clone(material)));
        }

        let serializer = SceneSerializer::default();
        let document = serializer.to_document(&scene).unwrap();
        assert_eq!(document.materials.len(), 2);
        let loaded = serializer.from_document(document, &library).unwrap();

        let renderer = |name: &str| loaded.get_component::<MeshRenderer>(loaded.find_entity_by_name(name).unwrap()).unwrap();
        let transparent = |name: &str| renderer(name).material.as_ref().unwrap().borrow().is_transparent();
        assert!(!transparent("a"));
        assert!(transparent("b"));
        assert!(renderer("b").shares_material_with(renderer("c")));
        assert!(!renderer("a").shares_material_with(renderer("b")));
    }

    #[test]
    fn test_bad_child_links_are_ignored() {
        let json = r#"{
            "name": "links",
            "entities": [
                { "id": 1, "name": "a", "children": [2, 9] },
                { "id": 2, "name": "b", "children": [1] },
                { "id": 3, "name": "c", "children": [2] }
            ]
        }"#;
        let scene = SceneSerializer::default().from_json(json, &MeshLibrary::new()).unwrap();
        let a = scene.find_entity_by_name("a").unwrap();
        let b = scene.find_entity_by_name("b").unwrap();
        let c = scene.find_entity_by_name("c").unwrap();
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.parent(b), Some(a));
        assert_eq!(scene.parent(a), None);
        assert!(scene.children(c).is_empty());
        assert_eq!(scene.roots(), &[a, c][..]);
    }

    #[test]
    fn test_missing_material_index_is_dropped() {
        let json = r#"{
            "name": "m",
            "entities": [
                { "id": 1, "name": "e",
                  "components": [ { "_type": "MeshRenderer", "mesh": "cube", "material": 4 } ] }
            ]
        }"#;
        let scene = SceneSerializer::default().from_json(json, &MeshLibrary::with_primitives()).unwrap();
        let renderer = scene.get_component::<MeshRenderer>(scene.roots()[0]).unwrap();
        assert!(renderer.mesh.is_some());
        assert!(renderer.material.is_none());
    }

    #[test]
    fn test_materials_shared_after_load() {
        let library = MeshLibrary::with_primitives();
        let serializer = SceneSerializer::default();
        let json = serializer.to_json(&shared_material_scene(&library)).unwrap();
        let loaded = serializer.from_json(&json, &library).unwrap();

        let a = loaded.get_component::<MeshRenderer>(loaded.find_entity_by_name("a").unwrap()).unwrap();
        let b = loaded.get_component::<MeshRenderer>(loaded.find_entity_by_name("b").unwrap()).unwrap();
        assert!(a.shares_material_with(b));
        assert!(Rc::ptr_eq(a.mesh.as_ref().unwrap(), &library.get("cube").unwrap()));
    }

    #[test]
    fn test_unknown_component_is_skipped() {
        let json = r#"{
            "name": "odd",
            "entities": [
                { "id": 7, "name": "thing",
                  "components": [ { "_type": "Teleporter", "range": 3 } ] }
            ]
        }"#;
        let scene = SceneSerializer::default().from_json(json, &MeshLibrary::new()).unwrap();
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.entity(scene.roots()[0]).unwrap().components().count(), 1);
    }

    #[test]
    fn test_malformed_documents_error() {
        let serializer = SceneSerializer::default();
        let library = MeshLibrary::new();
        assert!(matches!(serializer.from_json("{ not json", &library), Err(SceneError::Json(_))));

        let untagged = r#"{ "name": "s", "entities": [ { "id": 1, "name": "e", "components": [ { "hp": 3 } ] } ] }"#;
        assert!(matches!(serializer.from_json(untagged, &library), Err(SceneError::MissingTypeTag { .. })));

        let duplicate = r#"{ "name": "s", "entities": [ { "id": 1, "name": "a" }, { "id": 1, "name": "b" } ] }"#;
        assert!(matches!(serializer.from_json(duplicate, &library), Err(SceneError::DuplicateId(_))));
    }

    #[test]
    fn test_custom_component_registration() {
        let mut serializer = SceneSerializer::default();
        serializer.registry_mut().register::<Health>("Health");
        let mut scene = Scene::new("custom");
        let id = scene.create_entity("hero");
        scene.add_component(id, Health { hp: 42 });

        let json = serializer.to_json(&scene).unwrap();
        let loaded = serializer.from_json(&json, &MeshLibrary::new()).unwrap();
        let hero = loaded.find_entity_by_name("hero").unwrap();
        assert_eq!(loaded.get_component::<Health>(hero), Some(&Health { hp: 42 }));
        assert_ne!(hero, id);
    }

    #[test]
    fn test_unregistered_component_not_written() {
        let mut scene = Scene::new("custom");
        let id = scene.create_entity("hero");
        scene.add_component(id, Health { hp: 1 });
        let document = SceneSerializer::default().to_document(&scene).unwrap();
        assert_eq!(document.entities[0].components.len(), 1);
    }

    #[test]
    fn test_file_round_trip() {
        let library = MeshLibrary::with_primitives();
        let serializer = SceneSerializer::default();
        let mut scene = shared_material_scene(&library);
        scene.set_environment(Some(Environment::default().with_ambient(Vec3::new(0.2, 0.2, 0.3), 0.5)));
        let path = std::env::temp_dir().join(format!("scene_round_trip_{}.json", std::process::id()));

        serializer.save_to_file(&scene, &path).unwrap();
        let loaded = serializer.load_from_file(&path, &library).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.environment(), scene.environment());
        std::fs::remove_file(&path).ok();
    }
}
