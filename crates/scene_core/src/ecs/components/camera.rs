//! # Camera Component
//!
//! Perspective or orthographic projection plus a yaw/pitch orientation.
//! The camera's position is the owning entity's world position, so a camera
//! parented under a moving entity follows it.
//!
//! ## Conventions
//! - Right-handed, Y-up, OpenGL clip space (`nalgebra::Matrix4::new_perspective`)
//! - Yaw -90° with pitch 0° looks down -Z
//! - Angles are stored in degrees; pitch is clamped to ±89° so the view
//!   basis never degenerates at the poles
//!
//! ## Self-healing parameters
//! Invalid projection parameters (non-positive near plane, far plane not
//! beyond near, field of view outside (0°, 180°), non-positive aspect ratio,
//! empty orthographic bounds) are corrected in place and reported through
//! `log::warn!`. They never fail.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::ecs::Component;
use crate::foundation::math::{utils, Mat4, Point3, Vec3};

/// Pitch limit in degrees
pub const MAX_PITCH: f32 = 89.0;

const MIN_NEAR: f32 = 1e-3;
const MIN_FOV: f32 = 1.0;
const MAX_FOV: f32 = 179.0;
const DEFAULT_FOV: f32 = 60.0;

/// Projection model of a camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Projection {
    /// Perspective projection
    Perspective {
        /// Vertical field of view in degrees
        fov: f32,
        /// Width / height
        aspect: f32,
        /// Near clip plane distance
        near: f32,
        /// Far clip plane distance
        far: f32,
    },
    /// Orthographic projection
    Orthographic {
        /// Left bound
        left: f32,
        /// Right bound
        right: f32,
        /// Bottom bound
        bottom: f32,
        /// Top bound
        top: f32,
        /// Near clip plane distance
        near: f32,
        /// Far clip plane distance
        far: f32,
    },
}

impl Projection {
    /// Correct invalid parameters in place, warning about each fix
    fn sanitize(&mut self) {
        match self {
            Self::Perspective { fov, aspect, near, far } => {
                if !fov.is_finite() || *fov < MIN_FOV || *fov > MAX_FOV {
                    let fixed = if fov.is_finite() { utils::clamp(*fov, MIN_FOV, MAX_FOV) } else { DEFAULT_FOV };
                    log::warn!("Camera fov {fov} out of range, using {fixed}");
                    *fov = fixed;
                }
                if !aspect.is_finite() || *aspect <= 0.0 {
                    log::warn!("Camera aspect ratio {aspect} invalid, using 1.0");
                    *aspect = 1.0;
                }
                sanitize_clip_planes(near, far);
            }
            Self::Orthographic { left, right, bottom, top, near, far } => {
                if !(*right - *left).is_normal() {
                    log::warn!("Orthographic width is empty ({left}..{right}), widening");
                    *right = *left + 1.0;
                }
                if !(*top - *bottom).is_normal() {
                    log::warn!("Orthographic height is empty ({bottom}..{top}), widening");
                    *top = *bottom + 1.0;
                }
                sanitize_clip_planes(near, far);
            }
        }
    }

    fn matrix(&self) -> Mat4 {
        match *self {
            Self::Perspective { fov, aspect, near, far } => {
                Mat4::new_perspective(aspect, utils::deg_to_rad(fov), near, far)
            }
            Self::Orthographic { left, right, bottom, top, near, far } => {
                Mat4::new_orthographic(left, right, bottom, top, near, far)
            }
        }
    }
}

fn sanitize_clip_planes(near: &mut f32, far: &mut f32) {
    if !near.is_finite() || *near <= 0.0 {
        log::warn!("Camera near plane {near} must be positive, using {MIN_NEAR}");
        *near = MIN_NEAR;
    }
    if !far.is_finite() || *far <= *near {
        let fixed = *near * 1000.0;
        log::warn!("Camera far plane {far} must exceed near plane {near}, using {fixed}");
        *far = fixed;
    }
}

/// Camera component
///
/// The projection matrix is computed lazily: every setter raises a dirty
/// flag and the next [`CameraComponent::projection_matrix`] call rebuilds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "CameraData", into = "CameraData")]
pub struct CameraComponent {
    projection: Projection,
    yaw: f32,
    pitch: f32,
    up: Vec3,
    cached_projection: Cell<Mat4>,
    dirty: Cell<bool>,
}

impl Component for CameraComponent {
    fn type_tag(&self) -> &'static str {
        "Camera"
    }
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self::perspective(DEFAULT_FOV, 16.0 / 9.0, 0.1, 1000.0)
    }
}

impl CameraComponent {
    /// Create a perspective camera
    ///
    /// # Arguments
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    ///
    /// # Example
    /// ```rust
    /// use scene_core::ecs::components::CameraComponent;
    ///
    /// let camera = CameraComponent::perspective(70.0, 16.0 / 9.0, 0.1, 1000.0);
    /// assert_eq!(camera.fov(), Some(70.0));
    /// ```
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::with_projection(Projection::Perspective { fov: fov_degrees, aspect, near, far })
    }

    /// Create an orthographic camera
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self::with_projection(Projection::Orthographic { left, right, bottom, top, near, far })
    }

    fn with_projection(mut projection: Projection) -> Self {
        projection.sanitize();
        Self {
            projection,
            yaw: -90.0,
            pitch: 0.0,
            up: Vec3::y(),
            cached_projection: Cell::new(Mat4::identity()),
            dirty: Cell::new(true),
        }
    }

    /// Current projection parameters
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Replace the projection parameters
    pub fn set_projection(&mut self, mut projection: Projection) {
        projection.sanitize();
        self.projection = projection;
        self.dirty.set(true);
    }

    /// Field of view in degrees, for perspective cameras
    pub fn fov(&self) -> Option<f32> {
        match self.projection {
            Projection::Perspective { fov, .. } => Some(fov),
            Projection::Orthographic { .. } => None,
        }
    }

    /// Aspect ratio, for perspective cameras
    pub fn aspect_ratio(&self) -> Option<f32> {
        match self.projection {
            Projection::Perspective { aspect, .. } => Some(aspect),
            Projection::Orthographic { .. } => None,
        }
    }

    /// Set the vertical field of view in degrees. Ignored for orthographic cameras.
    pub fn set_fov(&mut self, fov_degrees: f32) {
        if let Projection::Perspective { aspect, near, far, .. } = self.projection {
            self.set_projection(Projection::Perspective { fov: fov_degrees, aspect, near, far });
        }
    }

    /// Update the aspect ratio after a viewport resize.
    ///
    /// Orthographic cameras keep their height and rescale their width around
    /// the horizontal center.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        match self.projection {
            Projection::Perspective { fov, aspect, near, far } => {
                if (aspect - aspect_ratio).abs() > 0.01 {
                    log::debug!("Camera aspect ratio changed from {aspect:.3} to {aspect_ratio:.3}");
                }
                self.set_projection(Projection::Perspective { fov, aspect: aspect_ratio, near, far });
            }
            Projection::Orthographic { left, right, bottom, top, near, far } => {
                if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
                    log::warn!("Ignoring invalid aspect ratio {aspect_ratio} for orthographic camera");
                    return;
                }
                let center = (left + right) * 0.5;
                let half_width = (top - bottom) * aspect_ratio * 0.5;
                self.set_projection(Projection::Orthographic {
                    left: center - half_width,
                    right: center + half_width,
                    bottom,
                    top,
                    near,
                    far,
                });
            }
        }
    }

    /// Set near and far clip planes
    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        let projection = match self.projection {
            Projection::Perspective { fov, aspect, .. } => Projection::Perspective { fov, aspect, near, far },
            Projection::Orthographic { left, right, bottom, top, .. } => {
                Projection::Orthographic { left, right, bottom, top, near, far }
            }
        };
        self.set_projection(projection);
    }

    /// Projection matrix, rebuilt only when a parameter changed
    pub fn projection_matrix(&self) -> Mat4 {
        if self.dirty.get() {
            self.cached_projection.set(self.projection.matrix());
            self.dirty.set(false);
        }
        self.cached_projection.get()
    }

    /// Yaw in degrees
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Set yaw in degrees. Non-finite values are ignored.
    pub fn set_yaw(&mut self, yaw: f32) {
        if !yaw.is_finite() {
            log::warn!("Ignoring non-finite camera yaw {yaw}");
            return;
        }
        self.yaw = yaw;
    }

    /// Set pitch in degrees, clamped to ±89°. Non-finite values are ignored.
    pub fn set_pitch(&mut self, pitch: f32) {
        if !pitch.is_finite() {
            log::warn!("Ignoring non-finite camera pitch {pitch}");
            return;
        }
        self.pitch = utils::clamp(pitch, -MAX_PITCH, MAX_PITCH);
    }

    /// World up vector used to build the view basis
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Unit view direction from yaw and pitch
    pub fn front(&self) -> Vec3 {
        let yaw = utils::deg_to_rad(self.yaw);
        let pitch = utils::deg_to_rad(self.pitch);
        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
    }

    /// Point the camera at `target` from `position`, back-solving yaw and pitch.
    ///
    /// Ignored when the two points coincide or either is not finite.
    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        let direction = target - position;
        if !direction.iter().all(|c| c.is_finite()) {
            log::warn!("Ignoring camera look_at with non-finite points {position:?} -> {target:?}");
            return;
        }
        if direction.magnitude() < 1e-6 {
            log::trace!("Camera look_at target equals position, ignoring");
            return;
        }
        let direction = direction.normalize();
        self.set_pitch(utils::rad_to_deg(direction.y.asin()));
        self.yaw = utils::rad_to_deg(direction.z.atan2(direction.x));
    }

    /// View matrix for a camera located at `position`
    pub fn view_matrix(&self, position: Vec3) -> Mat4 {
        let eye = Point3::from(position);
        let target = Point3::from(position + self.front());
        Mat4::look_at_rh(&eye, &target, &self.up)
    }
}

/// Serialized form of [`CameraComponent`]
#[derive(Serialize, Deserialize)]
struct CameraData {
    projection: Projection,
    yaw: f32,
    pitch: f32,
}

impl From<CameraData> for CameraComponent {
    fn from(data: CameraData) -> Self {
        let mut camera = Self::with_projection(data.projection);
        camera.set_yaw(data.yaw);
        camera.set_pitch(data.pitch);
        camera
    }
}

impl From<CameraComponent> for CameraData {
    fn from(camera: CameraComponent) -> Self {
        Self {
            projection: camera.projection,
            yaw: camera.yaw,
            pitch: camera.pitch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_front_looks_down_negative_z() {
        let camera = CameraComponent::default();
        assert_relative_eq!(camera.front(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_projection_matches_nalgebra() {
        let camera = CameraComponent::perspective(70.0, 1.777, 0.1, 1000.0);
        let expected = Mat4::new_perspective(1.777, utils::deg_to_rad(70.0), 0.1, 1000.0);
        assert_relative_eq!(camera.projection_matrix(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_projection_recomputed_after_setter() {
        let mut camera = CameraComponent::perspective(60.0, 1.0, 0.1, 100.0);
        let before = camera.projection_matrix();
        camera.set_aspect_ratio(2.0);
        let after = camera.projection_matrix();
        assert_ne!(before, after);
        assert_relative_eq!(after, Mat4::new_perspective(2.0, utils::deg_to_rad(60.0), 0.1, 100.0), epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_parameters_are_clamped() {
        let camera = CameraComponent::perspective(0.0, -2.0, -1.0, -5.0);
        match *camera.projection() {
            Projection::Perspective { fov, aspect, near, far } => {
                assert_eq!(fov, MIN_FOV);
                assert_eq!(aspect, 1.0);
                assert!(near > 0.0);
                assert!(far > near);
            }
            Projection::Orthographic { .. } => panic!("projection kind changed"),
        }
        assert!(utils::is_finite(&camera.projection_matrix()));
    }

    #[test]
    fn test_degenerate_orthographic_bounds_are_widened() {
        let camera = CameraComponent::orthographic(1.0, 1.0, -1.0, 1.0, 0.1, 10.0);
        assert!(utils::is_finite(&camera.projection_matrix()));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = CameraComponent::default();
        camera.set_pitch(120.0);
        assert_eq!(camera.pitch(), MAX_PITCH);
        camera.set_pitch(-120.0);
        assert_eq!(camera.pitch(), -MAX_PITCH);
    }

    #[test]
    fn test_look_at_back_solves_angles() {
        let mut camera = CameraComponent::default();
        let position = Vec3::new(0.0, 0.0, 10.0);
        camera.look_at(position, Vec3::new(10.0, 0.0, 10.0));
        assert_relative_eq!(camera.yaw(), 0.0, epsilon = 1e-4);
        assert_relative_eq!(camera.front(), Vec3::x(), epsilon = 1e-5);

        camera.look_at(position, Vec3::new(0.0, 100.0, 10.0));
        assert_eq!(camera.pitch(), MAX_PITCH);
    }

    #[test]
    fn test_non_finite_angles_keep_previous_orientation() {
        let mut camera = CameraComponent::default();
        camera.set_yaw(30.0);
        camera.set_pitch(10.0);

        camera.set_pitch(f32::NAN);
        camera.set_yaw(f32::INFINITY);
        camera.look_at(Vec3::zeros(), Vec3::new(f32::NAN, 1.0, 0.0));
        camera.look_at(Vec3::new(f32::NEG_INFINITY, 0.0, 0.0), Vec3::zeros());

        assert_eq!(camera.pitch(), 10.0);
        assert_eq!(camera.yaw(), 30.0);
        let view = camera.view_matrix(Vec3::new(0.0, 0.0, 10.0));
        assert!(view.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_view_matrix_moves_origin_in_front() {
        let camera = CameraComponent::default();
        let view = camera.view_matrix(Vec3::new(0.0, 0.0, 10.0));
        let origin = view.transform_point(&Point3::origin());
        assert_relative_eq!(origin.coords, Vec3::new(0.0, 0.0, -10.0), epsilon = 1e-5);
    }

    #[test]
    fn test_orthographic_resize_keeps_height() {
        let mut camera = CameraComponent::orthographic(-1.0, 1.0, -1.0, 1.0, 0.1, 10.0);
        camera.set_aspect_ratio(2.0);
        match *camera.projection() {
            Projection::Orthographic { left, right, bottom, top, .. } => {
                assert_relative_eq!(right - left, 4.0);
                assert_relative_eq!(top - bottom, 2.0);
            }
            Projection::Perspective { .. } => panic!("projection kind changed"),
        }
    }
}
