//! Lighting component
//!
//! Pure data: the renderer reads light components while walking the scene
//! and places them using the owning entity's world matrix. Position comes
//! from the world translation, direction is the local direction rotated by
//! the world matrix.

use serde::{Deserialize, Serialize};

use crate::ecs::Component;
use crate::foundation::math::{Mat4, Vec3};

/// Light data attached to an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightComponent {
    /// The type of light (directional, point, or spot)
    pub light_type: LightType,
    /// RGB color values for the light (0.0 to 1.0 range)
    pub color: Vec3,
    /// Light intensity multiplier
    pub intensity: f32,
    /// Direction in the entity's local space, for directional/spot lights
    pub direction: Vec3,
    /// Maximum range for point/spot lights
    pub range: f32,
    /// Inner cone angle for spot lights in radians
    pub inner_cone: f32,
    /// Outer cone angle for spot lights in radians
    pub outer_cone: f32,
    /// Disabled lights are skipped during collection
    pub enabled: bool,
}

/// Types of lights supported by the lighting system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightType {
    /// Directional light (like sunlight) with parallel rays
    Directional,
    /// Point light that radiates in all directions from a position
    Point,
    /// Spot light that creates a cone of light from a position
    Spot,
}

impl Component for LightComponent {
    fn type_tag(&self) -> &'static str {
        "Light"
    }
}

impl LightComponent {
    /// World-space direction given the owner's world matrix.
    ///
    /// Falls back to straight down when the transformed direction collapses.
    pub fn world_direction(&self, world: &Mat4) -> Vec3 {
        world
            .transform_vector(&self.direction)
            .try_normalize(1e-6)
            .unwrap_or_else(|| Vec3::new(0.0, -1.0, 0.0))
    }
}

/// Factory functions for creating light components
pub struct LightFactory;

impl LightFactory {
    /// Create a directional light
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> LightComponent {
        LightComponent {
            light_type: LightType::Directional,
            color,
            intensity,
            direction: normalized_or_down(direction),
            range: 0.0,
            inner_cone: 0.0,
            outer_cone: 0.0,
            enabled: true,
        }
    }

    /// Create a point light; it sits at the owning entity's world position
    pub fn point(color: Vec3, intensity: f32, range: f32) -> LightComponent {
        LightComponent {
            light_type: LightType::Point,
            color,
            intensity,
            direction: Vec3::new(0.0, -1.0, 0.0), // Irrelevant for point lights
            range,
            inner_cone: 0.0,
            outer_cone: 0.0,
            enabled: true,
        }
    }

    /// Create a spot light
    pub fn spot(
        direction: Vec3,
        color: Vec3,
        intensity: f32,
        range: f32,
        inner_cone: f32,
        outer_cone: f32,
    ) -> LightComponent {
        LightComponent {
            light_type: LightType::Spot,
            color,
            intensity,
            direction: normalized_or_down(direction),
            range,
            inner_cone,
            outer_cone: outer_cone.max(inner_cone),
            enabled: true,
        }
    }
}

fn normalized_or_down(direction: Vec3) -> Vec3 {
    direction.try_normalize(1e-6).unwrap_or_else(|| {
        log::warn!("Light direction {direction:?} has zero length, pointing straight down");
        Vec3::new(0.0, -1.0, 0.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4Ext;

    const EPSILON: f32 = 0.001;

    fn assert_vec3_approx_eq(a: Vec3, b: Vec3) {
        assert!((a.x - b.x).abs() < EPSILON, "X mismatch: {} != {}", a.x, b.x);
        assert!((a.y - b.y).abs() < EPSILON, "Y mismatch: {} != {}", a.y, b.y);
        assert!((a.z - b.z).abs() < EPSILON, "Z mismatch: {} != {}", a.z, b.z);
    }

    #[test]
    fn test_directional_light_parameters() {
        let direction = Vec3::new(-0.7, -1.0, 0.3);
        let color = Vec3::new(1.0, 0.95, 0.9);
        let light = LightFactory::directional(direction, color, 1.5);

        assert_vec3_approx_eq(light.direction, direction.normalize());
        assert_vec3_approx_eq(light.color, color);
        assert!((light.intensity - 1.5).abs() < EPSILON);
        assert_eq!(light.light_type, LightType::Directional);
        assert!(light.enabled);
    }

    #[test]
    fn test_zero_direction_falls_back_to_down() {
        let light = LightFactory::directional(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), 1.0);
        assert_vec3_approx_eq(light.direction, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_spot_outer_cone_never_smaller_than_inner() {
        let light = LightFactory::spot(Vec3::z(), Vec3::x(), 1.0, 10.0, 0.5, 0.2);
        assert!(light.outer_cone >= light.inner_cone);
    }

    #[test]
    fn test_world_direction_follows_rotation() {
        let light = LightFactory::directional(Vec3::new(0.0, 0.0, -1.0), Vec3::x(), 1.0);
        let world = Mat4::new_translation(&Vec3::new(3.0, 0.0, 0.0))
            * Mat4::rotation_y(std::f32::consts::FRAC_PI_2);
        assert_vec3_approx_eq(light.world_direction(&world), Vec3::new(-1.0, 0.0, 0.0));
    }
}
