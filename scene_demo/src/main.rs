//! Spinning cubes demo
//!
//! Builds a small scene (camera, sun, a group of randomly spinning cubes and
//! a glass pane), runs it for a few seconds on the headless backend and
//! writes the resulting scene out as JSON.

use rand::Rng;
use scene_core::config::Config;
use scene_core::foundation::logging;
use scene_core::prelude::*;
use scene_core::render::material::ALPHA;
use std::rc::Rc;

const CUBE_COUNT: usize = 12;
const FRAMES: u64 = 300;

/// Rotates its entity around a fixed axis, paused by a `toggle_spin` event
struct Spin {
    degrees_per_second: Vec3,
    paused: bool,
}

impl Script for Spin {
    fn on_init(&mut self, entity: &mut Entity) {
        log::debug!("Spin attached to '{}'", entity.name());
    }

    fn on_update(&mut self, entity: &mut Entity, delta_time: f32) {
        if self.paused {
            return;
        }
        let transform = entity.transform_mut();
        let rotation = transform.rotation() + self.degrees_per_second * delta_time;
        transform.set_rotation(rotation.map(|angle| angle % 360.0));
    }

    fn on_event(&mut self, _entity: &mut Entity, name: &str, _data: &EventData) {
        if name == "toggle_spin" {
            self.paused = !self.paused;
        }
    }
}

struct SpinningCubes {
    group: Option<EntityId>,
    elapsed: f32,
    toggled: bool,
}

impl SpinningCubes {
    fn new() -> Self {
        Self {
            group: None,
            elapsed: 0.0,
            toggled: false,
        }
    }

    fn build_scene(&mut self, aspect_ratio: f32) -> Scene {
        let mut rng = rand::thread_rng();
        let mut scene = Scene::new("spinning_cubes");

        let camera = scene.create_entity("camera");
        let mut lens = CameraComponent::perspective(60.0, aspect_ratio, 0.1, 500.0);
        lens.look_at(Vec3::new(0.0, 4.0, 18.0), Vec3::zeros());
        scene.set_transform(camera, TransformComponent::from_position(Vec3::new(0.0, 4.0, 18.0)));
        scene.add_component(camera, lens);
        scene.set_default_camera(camera);

        let sun = scene.create_entity("sun");
        scene.add_component(
            sun,
            LightFactory::directional(Vec3::new(-0.3, -1.0, -0.4), Vec3::new(1.0, 0.95, 0.9), 1.2),
        );

        let cube_mesh = Rc::new(Mesh::cube());
        let group = scene.create_entity("cubes");
        for i in 0..CUBE_COUNT {
            let color = Vec3::new(rng.gen_range(0.2..1.0), rng.gen_range(0.2..1.0), rng.gen_range(0.2..1.0));
            let material = Material::new(format!("cube_{i}"))
                .with_property("color", UniformValue::Vec3(color))
                .into_shared();
            let position = Vec3::new(rng.gen_range(-8.0..8.0), rng.gen_range(-3.0..3.0), rng.gen_range(-8.0..2.0));
            let template = EntityTemplate::new(format!("cube_{i}"))
                .with_transform(TransformComponent::from_position(position).with_uniform_scale(0.5))
                .with_component(MeshRenderer::new(Rc::clone(&cube_mesh), material));

            let cube = scene.instantiate(template, Some(group));
            scene.add_script(
                cube,
                Spin {
                    degrees_per_second: Vec3::new(
                        rng.gen_range(-90.0..90.0),
                        rng.gen_range(-90.0..90.0),
                        rng.gen_range(-90.0..90.0),
                    ),
                    paused: false,
                },
            );
        }
        scene.add_script(
            group,
            Spin {
                degrees_per_second: Vec3::new(0.0, 15.0, 0.0),
                paused: false,
            },
        );

        let glass = scene.create_entity("glass");
        scene.set_transform(glass, TransformComponent::from_position(Vec3::new(0.0, 0.0, 6.0)).with_uniform_scale(4.0));
        scene.add_component(
            glass,
            MeshRenderer::new(
                Rc::new(Mesh::quad()),
                Material::new("glass").with_property(ALPHA, UniformValue::Float(0.35)).into_shared(),
            ),
        );

        self.group = Some(group);
        scene
    }
}

impl Application for SpinningCubes {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let aspect_ratio = engine.config().window.aspect_ratio();
        let scene = self.build_scene(aspect_ratio);
        log::info!("Built scene '{}' with {} entities", scene.name(), scene.len());

        engine.scenes.set_on_activate(|scene| {
            if !scene.is_initialized() {
                scene.initialize();
            }
        });
        engine.scenes.add_scene(scene);
        if !engine.scenes.set_active("spinning_cubes") {
            return Err(AppError::Custom("scene 'spinning_cubes' missing".to_string()));
        }
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError> {
        self.elapsed += delta_time;
        if !self.toggled && self.elapsed >= 2.5 {
            self.toggled = true;
            if let (Some(group), Some(scene)) = (self.group, engine.scenes.active_scene_mut()) {
                log::info!("Pausing cube spin");
                scene.broadcast_event(group, "toggle_spin", &EventData::None, true);
            }
        }

        if let Some(stats) = engine.last_frame_stats() {
            if engine.clock().frame_count() % 60 == 0 {
                log::info!(
                    "Frame {}: {} draws ({} transparent), {} lights, {:.3} ms",
                    engine.clock().frame_count(),
                    stats.draw_count(),
                    stats.transparent_draws,
                    stats.lights,
                    stats.cpu_time_ms
                );
            }
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        let Some(scene) = engine.scenes.active_scene() else { return };
        let path = std::env::temp_dir().join("spinning_cubes.json");
        match SceneSerializer::default().save_to_file(scene, &path) {
            Ok(()) => log::info!("Saved scene to {}", path.display()),
            Err(e) => log::error!("Failed to save scene: {e}"),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load_or_default("scene_demo.toml");
    logging::init_with_level(&config.log_level);

    let (width, height) = (config.window.width, config.window.height);
    let mut engine = Engine::new(config, Box::new(HeadlessBackend::new()))?;
    let mut window = FixedStepWindow::new(FRAMES, 1.0 / 60.0, (width, height)).with_resize(150, (1920, 1080));

    let mut app = SpinningCubes::new();
    engine.run(&mut app, &mut window)?;
    Ok(())
}
