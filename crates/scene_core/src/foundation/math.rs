//! Math utilities and types
//!
//! Provides the fundamental math types used by the scene graph and renderer.
//! All matrices are column-major `nalgebra` matrices using the right-handed,
//! OpenGL-style clip space conventions.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;

    /// Axes shorter than this are treated as "no rotation"
    pub const AXIS_EPSILON: f32 = 1e-4;
}

/// Math utility functions
pub mod utils {
    use super::*;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }

    /// Translation column of an affine matrix
    pub fn translation_of(matrix: &Mat4) -> Vec3 {
        Vec3::new(matrix.m14, matrix.m24, matrix.m34)
    }

    /// Inverse-transpose of the upper 3x3 block, used to transform normals.
    ///
    /// Falls back to identity when the block is singular (e.g. a zero scale
    /// axis), so a degenerate transform never pushes NaNs to a shader.
    pub fn normal_matrix(model: &Mat4) -> Mat3 {
        let upper: Mat3 = model.fixed_view::<3, 3>(0, 0).into_owned();
        upper
            .try_inverse()
            .map_or_else(Mat3::identity, |inverse| inverse.transpose())
    }

    /// Returns true when every element of the matrix is finite
    pub fn is_finite(matrix: &Mat4) -> bool {
        matrix.iter().all(|value| value.is_finite())
    }
}

/// Extension trait for Mat4 with additional convenience constructors
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis (radians)
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis (radians)
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis (radians)
    fn rotation_z(angle: f32) -> Mat4;

    /// Euler rotation from degrees, composed as `Rx * Ry * Rz`
    fn euler_degrees(degrees: &Vec3) -> Mat4;

    /// Rotation of `angle_degrees` around `axis`.
    ///
    /// Returns `None` when the axis is too short to normalize.
    fn axis_angle_degrees(axis: &Vec3, angle_degrees: f32) -> Option<Mat4>;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn euler_degrees(degrees: &Vec3) -> Mat4 {
        Self::rotation_x(utils::deg_to_rad(degrees.x))
            * Self::rotation_y(utils::deg_to_rad(degrees.y))
            * Self::rotation_z(utils::deg_to_rad(degrees.z))
    }

    fn axis_angle_degrees(axis: &Vec3, angle_degrees: f32) -> Option<Mat4> {
        if axis.magnitude() < constants::AXIS_EPSILON {
            return None;
        }
        let axis = Unit::new_normalize(*axis);
        Some(Mat4::from_axis_angle(&axis, utils::deg_to_rad(angle_degrees)))
    }
}
