//! Math types and helpers
//!
//! Re-exports the nalgebra types the engine is built on and provides the
//! TRS compose/decompose routines the transform system relies on.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Scale components below this magnitude are treated as degenerate when
/// decomposing a matrix.
pub const DEGENERATE_SCALE: f32 = 1e-8;

/// Compose a TRS matrix from position, rotation, and scale.
///
/// Column-vector convention: scale is applied first, then rotation, then
/// translation.
pub fn compose_trs(position: Vec3, rotation: &Quat, scale: Vec3) -> Mat4 {
    Mat4::new_translation(&position)
        * rotation.to_homogeneous()
        * Mat4::new_nonuniform_scaling(&scale)
}

/// Extract the translation component of a TRS matrix.
pub fn extract_translation(matrix: &Mat4) -> Vec3 {
    Vec3::new(matrix.m14, matrix.m24, matrix.m34)
}

/// Extract the scale components of a TRS matrix as the lengths of the
/// upper 3x3 basis columns.
pub fn extract_scale(matrix: &Mat4) -> Vec3 {
    Vec3::new(
        Vec3::new(matrix.m11, matrix.m21, matrix.m31).magnitude(),
        Vec3::new(matrix.m12, matrix.m22, matrix.m32).magnitude(),
        Vec3::new(matrix.m13, matrix.m23, matrix.m33).magnitude(),
    )
}

/// Extract the rotation component of a TRS matrix.
///
/// Each basis column is normalized by its scale length before building the
/// quaternion. A column with near-zero scale carries no usable direction, so
/// it falls back to the canonical axis instead of dividing by zero.
pub fn extract_rotation(matrix: &Mat4) -> Quat {
    let scale = extract_scale(matrix);

    let x_axis = if scale.x > DEGENERATE_SCALE {
        Vec3::new(matrix.m11, matrix.m21, matrix.m31) / scale.x
    } else {
        Vec3::x()
    };
    let y_axis = if scale.y > DEGENERATE_SCALE {
        Vec3::new(matrix.m12, matrix.m22, matrix.m32) / scale.y
    } else {
        Vec3::y()
    };
    let z_axis = if scale.z > DEGENERATE_SCALE {
        Vec3::new(matrix.m13, matrix.m23, matrix.m33) / scale.z
    } else {
        Vec3::z()
    };

    let basis = Mat3::from_columns(&[x_axis, y_axis, z_axis]);
    Quat::from_matrix(&basis)
}

/// Build a quaternion from Euler angles in radians (roll, pitch, yaw packed
/// as x, y, z).
pub fn quat_from_euler(euler: Vec3) -> Quat {
    Quat::from_euler_angles(euler.x, euler.y, euler.z)
}

/// Convert a quaternion to Euler angles in radians (roll, pitch, yaw packed
/// as x, y, z).
pub fn euler_from_quat(rotation: &Quat) -> Vec3 {
    let (roll, pitch, yaw) = rotation.euler_angles();
    Vec3::new(roll, pitch, yaw)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}
