//! Transform component
//!
//! Local position, rotation and scale composed as `T * R * S`. Each channel
//! can alternatively be driven by an explicit matrix (used when orientation
//! is derived from camera vectors); an explicit matrix always wins over the
//! scalar field of its channel. The local matrix is cached and rebuilt only
//! after a setter marks it stale.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::ecs::Component;
use crate::foundation::math::{constants::AXIS_EPSILON, Mat4, Mat4Ext, Vec3};

/// Rotation around an arbitrary axis, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisAngle {
    /// Rotation axis; need not be normalized
    pub axis: Vec3,
    /// Angle in degrees
    pub angle: f32,
}

/// Local transform of an entity plus its propagated world matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "TransformData", into = "TransformData")]
pub struct TransformComponent {
    position: Vec3,
    /// Euler angles in degrees, applied as `Rx * Ry * Rz`
    rotation: Vec3,
    axis_angle: Option<AxisAngle>,
    scale: Vec3,

    translation_matrix: Option<Mat4>,
    rotation_matrix: Option<Mat4>,
    scale_matrix: Option<Mat4>,

    local: Cell<Mat4>,
    dirty: Cell<bool>,
    world: Mat4,
}

impl Component for TransformComponent {
    fn type_tag(&self) -> &'static str {
        "Transform"
    }
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            axis_angle: None,
            scale: Vec3::new(1.0, 1.0, 1.0),
            translation_matrix: None,
            rotation_matrix: None,
            scale_matrix: None,
            local: Cell::new(Mat4::identity()),
            dirty: Cell::new(false),
            world: Mat4::identity(),
        }
    }
}

impl PartialEq for TransformComponent {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.rotation == other.rotation
            && self.axis_angle == other.axis_angle
            && self.scale == other.scale
            && self.translation_matrix == other.translation_matrix
            && self.rotation_matrix == other.rotation_matrix
            && self.scale_matrix == other.scale_matrix
    }
}

impl TransformComponent {
    /// Create identity transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self::new().with_position(position)
    }

    /// Builder: set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.set_position(position);
        self
    }

    /// Builder: set Euler rotation in degrees
    pub fn with_rotation(mut self, degrees: Vec3) -> Self {
        self.set_rotation(degrees);
        self
    }

    /// Builder: set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.set_scale(scale);
        self
    }

    /// Builder: set uniform scale
    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(Vec3::new(scale, scale, scale))
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Euler rotation in degrees
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Axis-angle rotation, if that representation is active
    pub fn axis_angle(&self) -> Option<AxisAngle> {
        self.axis_angle
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Set local position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.mark_dirty();
    }

    /// Set Euler rotation in degrees. Switches the rotation channel back from
    /// axis-angle if that was active.
    pub fn set_rotation(&mut self, degrees: Vec3) {
        self.rotation = degrees;
        self.axis_angle = None;
        self.mark_dirty();
    }

    /// Set rotation as `angle` degrees around `axis`.
    ///
    /// An axis shorter than 1e-4 means no rotation.
    pub fn set_rotation_axis_angle(&mut self, axis: Vec3, angle: f32) {
        self.axis_angle = Some(AxisAngle { axis, angle });
        self.mark_dirty();
    }

    /// Set local scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.mark_dirty();
    }

    /// Drive the translation channel with an explicit matrix
    pub fn set_translation_matrix(&mut self, matrix: Mat4) {
        self.translation_matrix = Some(matrix);
        self.mark_dirty();
    }

    /// Drive the rotation channel with an explicit matrix
    pub fn set_rotation_matrix(&mut self, matrix: Mat4) {
        self.rotation_matrix = Some(matrix);
        self.mark_dirty();
    }

    /// Drive the scale channel with an explicit matrix
    pub fn set_scale_matrix(&mut self, matrix: Mat4) {
        self.scale_matrix = Some(matrix);
        self.mark_dirty();
    }

    /// Return the translation channel to the position field
    pub fn clear_translation_matrix(&mut self) {
        self.translation_matrix = None;
        self.mark_dirty();
    }

    /// Return the rotation channel to the Euler/axis-angle fields
    pub fn clear_rotation_matrix(&mut self) {
        self.rotation_matrix = None;
        self.mark_dirty();
    }

    /// Return the scale channel to the scale field
    pub fn clear_scale_matrix(&mut self) {
        self.scale_matrix = None;
        self.mark_dirty();
    }

    /// Explicit rotation matrix, if one is installed
    pub fn rotation_matrix(&self) -> Option<&Mat4> {
        self.rotation_matrix.as_ref()
    }

    /// Orient the rotation channel so local -Z points at `target`.
    ///
    /// Ignored when the target coincides with the position or the direction
    /// is parallel to `up`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let direction = target - self.position;
        if direction.magnitude() < AXIS_EPSILON {
            log::trace!("look_at target coincides with position, ignoring");
            return;
        }
        let forward = direction.normalize();
        let right = forward.cross(&up);
        if right.magnitude() < AXIS_EPSILON {
            log::trace!("look_at direction parallel to up vector, ignoring");
            return;
        }
        let right = right.normalize();
        let adjusted_up = right.cross(&forward);

        #[rustfmt::skip]
        let rotation = Mat4::new(
            right.x, adjusted_up.x, -forward.x, 0.0,
            right.y, adjusted_up.y, -forward.y, 0.0,
            right.z, adjusted_up.z, -forward.z, 0.0,
            0.0,     0.0,           0.0,        1.0,
        );
        self.set_rotation_matrix(rotation);
    }

    /// Local matrix, rebuilt as `T * R * S` if any channel changed
    pub fn local_matrix(&self) -> Mat4 {
        if self.dirty.get() {
            self.local.set(self.compose());
            self.dirty.set(false);
        }
        self.local.get()
    }

    /// Combine with the parent's world matrix: `world = parent * local`,
    /// or `world = local` for a root. Returns the new world matrix.
    pub fn update_world_matrix(&mut self, parent_world: Option<&Mat4>) -> Mat4 {
        let local = self.local_matrix();
        self.world = match parent_world {
            Some(parent) => parent * local,
            None => local,
        };
        self.world
    }

    /// World matrix from the last propagation pass
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world
    }

    /// World-space position from the last propagation pass
    pub fn world_position(&self) -> Vec3 {
        crate::foundation::math::utils::translation_of(&self.world)
    }

    pub(crate) fn set_world_matrix(&mut self, world: Mat4) {
        self.world = world;
    }

    fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    fn compose(&self) -> Mat4 {
        let translation = self
            .translation_matrix
            .unwrap_or_else(|| Mat4::new_translation(&self.position));
        let scale = self
            .scale_matrix
            .unwrap_or_else(|| Mat4::new_nonuniform_scaling(&self.scale));

        let rotation = match (&self.rotation_matrix, &self.axis_angle) {
            (Some(matrix), _) => Some(*matrix),
            (None, Some(axis_angle)) => Mat4::axis_angle_degrees(&axis_angle.axis, axis_angle.angle),
            (None, None) => Some(Mat4::euler_degrees(&self.rotation)),
        };

        match rotation {
            Some(rotation) => translation * rotation * scale,
            None => translation * scale,
        }
    }
}

/// Serialized form of [`TransformComponent`]
#[derive(Serialize, Deserialize)]
struct TransformData {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    axis_angle: Option<AxisAngle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    translation_matrix: Option<Mat4>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rotation_matrix: Option<Mat4>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale_matrix: Option<Mat4>,
}

impl From<TransformData> for TransformComponent {
    fn from(data: TransformData) -> Self {
        let transform = Self {
            position: data.position,
            rotation: data.rotation,
            axis_angle: data.axis_angle,
            scale: data.scale,
            translation_matrix: data.translation_matrix,
            rotation_matrix: data.rotation_matrix,
            scale_matrix: data.scale_matrix,
            ..Self::default()
        };
        transform.mark_dirty();
        transform
    }
}

impl From<TransformComponent> for TransformData {
    fn from(transform: TransformComponent) -> Self {
        Self {
            position: transform.position,
            rotation: transform.rotation,
            scale: transform.scale,
            axis_angle: transform.axis_angle,
            translation_matrix: transform.translation_matrix,
            rotation_matrix: transform.rotation_matrix,
            scale_matrix: transform.scale_matrix,
        }
    }
}
