//! Tests spanning the scene, serialization and render modules

use crate::assets::MeshLibrary;
use crate::ecs::components::{CameraComponent, LightFactory, MeshRenderer, TransformComponent};
use crate::foundation::math::Vec3;
use crate::render::{BackendCall, HeadlessBackend, Material, Mesh, Renderer, UniformValue, MAX_POINT_LIGHTS};
use crate::render::material::ALPHA;
use crate::core::config::RendererConfig;
use crate::scene::{Scene, SceneSerializer};
use approx::assert_relative_eq;
use std::rc::Rc;

fn named_mesh(name: &str) -> Mesh {
    let mut mesh = Mesh::cube();
    mesh.name = name.to_string();
    mesh
}

fn scene_with_camera() -> Scene {
    let mut scene = Scene::new("S");
    let camera = scene.create_entity("Camera");
    scene.set_transform(camera, TransformComponent::from_position(Vec3::new(0.0, 0.0, 10.0)));
    scene.add_component(camera, CameraComponent::perspective(70.0, 1.777, 0.1, 1000.0));
    assert!(scene.set_default_camera(camera));
    scene
}

#[test]
fn test_json_round_trip_preserves_hierarchy_and_camera() {
    let mut scene = scene_with_camera();
    let group = scene.create_entity("Group");
    scene.set_transform(group, TransformComponent::from_position(Vec3::new(5.0, 0.0, 0.0)));
    let cube = scene.create_entity("Cube");
    scene.set_transform(cube, TransformComponent::from_position(Vec3::new(1.0, 2.0, 3.0)));
    scene.add_component(
        cube,
        MeshRenderer::new(Rc::new(Mesh::cube()), Material::new("red").with_property("color", UniformValue::Vec3(Vec3::x())).into_shared()),
    );
    assert!(scene.set_parent(cube, Some(group)));

    let serializer = SceneSerializer::default();
    let json = serializer.to_json(&scene).unwrap();
    let loaded = serializer.from_json(&json, &MeshLibrary::with_primitives()).unwrap();

    assert_eq!(loaded.name(), "S");
    assert_eq!(loaded.len(), scene.len());

    let cube = loaded.find_entity_by_name("Cube").unwrap();
    let group = loaded.find_entity_by_name("Group").unwrap();
    assert_eq!(loaded.parent(cube), Some(group));
    let world = loaded.entity(cube).unwrap().transform().world_position();
    assert_relative_eq!(world, Vec3::new(6.0, 2.0, 3.0), epsilon = 1e-5);

    let renderer = loaded.get_component::<MeshRenderer>(cube).unwrap();
    assert_eq!(renderer.mesh.as_ref().map(|mesh| mesh.name.as_str()), Some("cube"));

    let camera = loaded.default_camera().unwrap();
    assert_eq!(loaded.entity(camera).unwrap().name(), "Camera");
    let fov = loaded.get_component::<CameraComponent>(camera).and_then(CameraComponent::fov).unwrap();
    assert_relative_eq!(fov, 70.0, epsilon = 1e-4);
}

#[test]
fn test_frame_draws_opaque_then_transparent() {
    let mut scene = scene_with_camera();
    let far_glass = scene.create_entity("far glass");
    scene.set_transform(far_glass, TransformComponent::from_position(Vec3::new(0.0, 0.0, -20.0)));
    let near_glass = scene.create_entity("near glass");
    scene.set_transform(near_glass, TransformComponent::from_position(Vec3::new(0.0, 0.0, 0.0)));
    let solid = scene.create_entity("solid");
    scene.set_transform(solid, TransformComponent::from_position(Vec3::new(0.0, 0.0, -5.0)));

    let glass = Material::new("glass").with_property(ALPHA, UniformValue::Float(0.4)).into_shared();
    scene.add_component(far_glass, MeshRenderer::new(Rc::new(named_mesh("far")), Rc::clone(&glass)));
    scene.add_component(near_glass, MeshRenderer::new(Rc::new(named_mesh("near")), glass));
    scene.add_component(solid, MeshRenderer::new(Rc::new(named_mesh("solid")), Material::new("stone").into_shared()));
    scene.initialize();

    let mut backend = HeadlessBackend::new();
    let mut renderer = Renderer::new(RendererConfig::default());
    renderer.initialize(&mut backend).unwrap();
    let stats = renderer.render_scene(&scene, &mut backend).unwrap();

    assert_eq!(stats.opaque_draws, 1);
    assert_eq!(stats.transparent_draws, 2);
    let order: Vec<&str> = backend
        .draws()
        .filter_map(|call| match call {
            BackendCall::Draw { mesh, .. } => Some(mesh.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(order, ["solid", "far", "near"]);
}

#[test]
fn test_point_lights_beyond_capacity_are_dropped() {
    let mut scene = scene_with_camera();
    for i in 0..MAX_POINT_LIGHTS + 3 {
        let light = scene.create_entity(format!("light {i}"));
        scene.add_component(light, LightFactory::point(Vec3::new(1.0, 1.0, 1.0), 1.0, 10.0));
    }
    let cube = scene.create_entity("cube");
    scene.add_component(cube, MeshRenderer::new(Rc::new(Mesh::cube()), Material::new("m").into_shared()));
    scene.update_world_matrices();

    let mut backend = HeadlessBackend::new();
    let mut renderer = Renderer::new(RendererConfig::default());
    renderer.initialize(&mut backend).unwrap();
    let stats = renderer.render_scene(&scene, &mut backend).unwrap();

    assert_eq!(stats.lights, MAX_POINT_LIGHTS);
    assert_eq!(stats.dropped_lights, 3);
    assert_eq!(renderer.light_context().point_count(), MAX_POINT_LIGHTS);
}
