//! Per-frame light context
//!
//! The renderer walks the scene once per frame and pushes every enabled
//! light into a [`LightContext`]. Lights are stored in fixed-capacity arrays
//! matching the shader's uniform block; lights beyond a type's capacity are
//! dropped silently (a trace message is emitted) and never overwrite other
//! fields.

use bytemuck::{Pod, Zeroable};

use crate::ecs::components::{LightComponent, LightType};
use crate::foundation::math::{utils, Mat4, Vec3};

/// Maximum number of directional lights per frame
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;
/// Maximum number of point lights per frame
pub const MAX_POINT_LIGHTS: usize = 8;
/// Maximum number of spot lights per frame
pub const MAX_SPOT_LIGHTS: usize = 4;

/// GPU layout of a directional light
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DirectionalLightData {
    /// World direction (xyz) and intensity (w)
    pub direction: [f32; 4],
    /// RGB color (w unused)
    pub color: [f32; 4],
}

/// GPU layout of a point light
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointLightData {
    /// World position (xyz) and range (w)
    pub position: [f32; 4],
    /// RGB color (xyz) and intensity (w)
    pub color: [f32; 4],
}

/// GPU layout of a spot light
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpotLightData {
    /// World position (xyz) and range (w)
    pub position: [f32; 4],
    /// World direction (xyz) and intensity (w)
    pub direction: [f32; 4],
    /// RGB color (w unused)
    pub color: [f32; 4],
    /// Cosine of inner and outer cone angles (zw unused)
    pub cone_angles: [f32; 4],
}

/// Uniform block holding every light of a frame
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightBlock {
    /// Ambient RGB (xyz) and intensity (w)
    pub ambient_color: [f32; 4],
    /// Camera world position (xyz)
    pub camera_position: [f32; 4],
    /// Directional, point and spot light counts (w unused)
    pub counts: [u32; 4],
    /// Directional lights; only the first `counts[0]` are meaningful
    pub directional: [DirectionalLightData; MAX_DIRECTIONAL_LIGHTS],
    /// Point lights; only the first `counts[1]` are meaningful
    pub point: [PointLightData; MAX_POINT_LIGHTS],
    /// Spot lights; only the first `counts[2]` are meaningful
    pub spot: [SpotLightData; MAX_SPOT_LIGHTS],
}

/// Lights and camera position collected for one frame
#[derive(Debug, Clone)]
pub struct LightContext {
    block: LightBlock,
    dropped: usize,
}

impl Default for LightContext {
    fn default() -> Self {
        Self::new()
    }
}

impl LightContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self {
            block: LightBlock::zeroed(),
            dropped: 0,
        }
    }

    /// Start a new frame
    pub fn reset(&mut self, ambient_color: Vec3, ambient_intensity: f32, camera_position: Vec3) {
        self.block = LightBlock::zeroed();
        self.block.ambient_color = [ambient_color.x, ambient_color.y, ambient_color.z, ambient_intensity];
        self.block.camera_position = [camera_position.x, camera_position.y, camera_position.z, 1.0];
        self.dropped = 0;
    }

    /// Add a light owned by an entity with world matrix `world`.
    ///
    /// Returns `false` if the light is disabled or its type is full.
    pub fn push(&mut self, light: &LightComponent, world: &Mat4) -> bool {
        if !light.enabled {
            return false;
        }
        let position = utils::translation_of(world);
        let direction = light.world_direction(world);
        let color = light.color;

        let stored = match light.light_type {
            LightType::Directional => self.push_directional(DirectionalLightData {
                direction: [direction.x, direction.y, direction.z, light.intensity],
                color: [color.x, color.y, color.z, 0.0],
            }),
            LightType::Point => self.push_point(PointLightData {
                position: [position.x, position.y, position.z, light.range],
                color: [color.x, color.y, color.z, light.intensity],
            }),
            LightType::Spot => self.push_spot(SpotLightData {
                position: [position.x, position.y, position.z, light.range],
                direction: [direction.x, direction.y, direction.z, light.intensity],
                color: [color.x, color.y, color.z, 0.0],
                cone_angles: [light.inner_cone.cos(), light.outer_cone.cos(), 0.0, 0.0],
            }),
        };

        if !stored {
            self.dropped += 1;
            log::trace!("{:?} light capacity reached, dropping light", light.light_type);
        }
        stored
    }

    fn push_directional(&mut self, data: DirectionalLightData) -> bool {
        let count = self.block.counts[0] as usize;
        if count >= MAX_DIRECTIONAL_LIGHTS {
            return false;
        }
        self.block.directional[count] = data;
        self.block.counts[0] += 1;
        true
    }

    fn push_point(&mut self, data: PointLightData) -> bool {
        let count = self.block.counts[1] as usize;
        if count >= MAX_POINT_LIGHTS {
            return false;
        }
        self.block.point[count] = data;
        self.block.counts[1] += 1;
        true
    }

    fn push_spot(&mut self, data: SpotLightData) -> bool {
        let count = self.block.counts[2] as usize;
        if count >= MAX_SPOT_LIGHTS {
            return false;
        }
        self.block.spot[count] = data;
        self.block.counts[2] += 1;
        true
    }

    /// Number of directional lights collected
    pub fn directional_count(&self) -> usize {
        self.block.counts[0] as usize
    }

    /// Number of point lights collected
    pub fn point_count(&self) -> usize {
        self.block.counts[1] as usize
    }

    /// Number of spot lights collected
    pub fn spot_count(&self) -> usize {
        self.block.counts[2] as usize
    }

    /// Lights dropped because their type was full
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    /// Camera world position recorded for this frame
    pub fn camera_position(&self) -> Vec3 {
        let [x, y, z, _] = self.block.camera_position;
        Vec3::new(x, y, z)
    }

    /// The uniform block as uploaded to the backend
    pub fn block(&self) -> &LightBlock {
        &self.block
    }

    /// Raw bytes of the uniform block
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::LightFactory;

    fn white() -> Vec3 {
        Vec3::new(1.0, 1.0, 1.0)
    }

    #[test]
    fn test_directional_capacity_clamp() {
        let mut context = LightContext::new();
        context.reset(Vec3::new(0.1, 0.1, 0.1), 0.5, Vec3::new(0.0, 0.0, 10.0));

        let point = LightFactory::point(white(), 2.0, 15.0);
        assert!(context.push(&point, &Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0))));

        for i in 0..5 {
            let light = LightFactory::directional(Vec3::new(0.0, -1.0, 0.0), white(), i as f32);
            let stored = context.push(&light, &Mat4::identity());
            assert_eq!(stored, i < MAX_DIRECTIONAL_LIGHTS);
        }

        assert_eq!(context.directional_count(), MAX_DIRECTIONAL_LIGHTS);
        assert_eq!(context.dropped_count(), 1);
        // The first four survive in order; the fifth never lands anywhere.
        for (i, light) in context.block().directional.iter().enumerate() {
            assert_eq!(light.direction[3], i as f32);
        }
        // Neighbouring fields are untouched.
        assert_eq!(context.point_count(), 1);
        assert_eq!(context.block().point[0].position, [1.0, 2.0, 3.0, 15.0]);
        assert_eq!(context.block().ambient_color, [0.1, 0.1, 0.1, 0.5]);
        assert_eq!(context.camera_position(), Vec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn test_point_and_spot_capacity() {
        let mut context = LightContext::new();
        for _ in 0..10 {
            context.push(&LightFactory::point(white(), 1.0, 5.0), &Mat4::identity());
        }
        for _ in 0..6 {
            context.push(&LightFactory::spot(Vec3::z(), white(), 1.0, 5.0, 0.2, 0.4), &Mat4::identity());
        }
        assert_eq!(context.point_count(), MAX_POINT_LIGHTS);
        assert_eq!(context.spot_count(), MAX_SPOT_LIGHTS);
        assert_eq!(context.dropped_count(), 4);
    }

    #[test]
    fn test_disabled_lights_are_skipped() {
        let mut context = LightContext::new();
        let mut light = LightFactory::point(white(), 1.0, 5.0);
        light.enabled = false;
        assert!(!context.push(&light, &Mat4::identity()));
        assert_eq!(context.point_count(), 0);
        assert_eq!(context.dropped_count(), 0);
    }

    #[test]
    fn test_reset_clears_previous_frame() {
        let mut context = LightContext::new();
        context.push(&LightFactory::point(white(), 1.0, 5.0), &Mat4::identity());
        context.reset(Vec3::zeros(), 0.0, Vec3::zeros());
        assert_eq!(context.point_count(), 0);
        assert_eq!(context.block().point[0], PointLightData::zeroed());
    }

    #[test]
    fn test_block_bytes_match_layout() {
        let context = LightContext::new();
        assert_eq!(context.as_bytes().len(), std::mem::size_of::<LightBlock>());
        assert_eq!(std::mem::size_of::<LightBlock>() % 16, 0);
    }
}
