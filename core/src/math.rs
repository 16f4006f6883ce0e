//! Pose types and render-matrix conversions.
//!
//! SLAM poses are stored camera-from-world: a world point maps into the
//! camera frame as `p_cam = R * p_world + t`. The drawing backend consumes
//! world-from-camera matrices as 16 column-major `f32` values. The conversion
//! is a rigid inverse (`Rᵗ`, `-Rᵗt`), valid only for orthonormal rotations.

pub use nalgebra;

use nalgebra::{Matrix3, Matrix3x4, Matrix4, RealField, Vector3};

// ===== Rendering math (always f32) =====

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 3x3 matrix (f32).
pub type Mat3 = nalgebra::Matrix3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// 3D vector (f64), used by object poses.
pub type Vec3d = nalgebra::Vector3<f64>;

/// Camera and keyframe poses use single precision.
pub type CameraPose = Pose<f32>;

/// Object poses are estimated in double precision.
pub type ObjectPose = Pose<f64>;

/// Scalar types a [`Pose`] can be stored in.
///
/// Render matrices are always `f32`; the conversion happens after the
/// inversion so the math runs at the pose's own precision.
pub trait PoseScalar: RealField + Copy {
    /// Narrow to the render precision.
    fn to_f32(self) -> f32;
}

impl PoseScalar for f32 {
    #[inline]
    fn to_f32(self) -> f32 {
        self
    }
}

impl PoseScalar for f64 {
    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }
}

/// Rigid transform: 3x3 rotation plus translation.
///
/// For cameras and keyframes this is camera-from-world, for objects
/// object-from-world. The rotation is assumed orthonormal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose<T: PoseScalar> {
    pub rotation: Matrix3<T>,
    pub translation: Vector3<T>,
}

impl<T: PoseScalar> Pose<T> {
    /// Create a pose from a rotation and a translation.
    pub fn new(rotation: Matrix3<T>, translation: Vector3<T>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Identity pose: no rotation, no translation.
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Take the rotation and translation from the top three rows of a
    /// homogeneous 4x4 matrix. The bottom row is ignored.
    pub fn from_homogeneous(m: &Matrix4<T>) -> Self {
        Self {
            rotation: m.fixed_view::<3, 3>(0, 0).into_owned(),
            translation: m.fixed_view::<3, 1>(0, 3).into_owned(),
        }
    }

    /// Build a pose from a 3x4 `[R | t]` matrix.
    pub fn from_matrix3x4(m: &Matrix3x4<T>) -> Self {
        Self {
            rotation: m.fixed_view::<3, 3>(0, 0).into_owned(),
            translation: m.column(3).into_owned(),
        }
    }

    /// Homogeneous 4x4 form with bottom row `(0, 0, 0, 1)`.
    pub fn to_homogeneous(&self) -> Matrix4<T> {
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rotation);
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        m
    }

    /// Rigid inverse: `(Rᵗ, -Rᵗt)`.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.transpose();
        let translation = -(rotation * self.translation);
        Self {
            rotation,
            translation,
        }
    }

    /// Origin of the pose's frame expressed in world coordinates (`-Rᵗt`).
    ///
    /// For a camera-from-world pose this is the camera center.
    pub fn camera_center(&self) -> Vector3<T> {
        -(self.rotation.transpose() * self.translation)
    }

    /// Apply the transform to a point: `R * p + t`.
    pub fn transform_point(&self, p: &Vector3<T>) -> Vector3<T> {
        self.rotation * p + self.translation
    }
}

impl<T: PoseScalar> Default for Pose<T> {
    fn default() -> Self {
        Self::identity()
    }
}

/// World-from-camera (or world-from-object) matrix for the drawing backend.
///
/// 16 `f32` values in column-major order: `m[0..4]` is the first column,
/// `m[12..15]` the translation.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderMatrix(pub [f32; 16]);

impl RenderMatrix {
    /// The identity matrix.
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// Returns the identity matrix.
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// Column-major values.
    pub fn as_slice(&self) -> &[f32; 16] {
        &self.0
    }

    /// Element at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[col * 4 + row]
    }

    /// Convert from an nalgebra matrix (nalgebra storage is column-major).
    pub fn from_mat4(m: &Mat4) -> Self {
        let mut values = [0.0; 16];
        values.copy_from_slice(m.as_slice());
        Self(values)
    }

    /// Convert to an nalgebra matrix.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_column_slice(&self.0)
    }

    /// Columns as `[[f32; 4]; 4]`, the layout uniform buffers expect.
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        let s = &self.0;
        [
            [s[0], s[1], s[2], s[3]],
            [s[4], s[5], s[6], s[7]],
            [s[8], s[9], s[10], s[11]],
            [s[12], s[13], s[14], s[15]],
        ]
    }

    /// Translation column, i.e. where the frame's origin lands in world space.
    pub fn origin(&self) -> Vec3 {
        Vec3::new(self.0[12], self.0[13], self.0[14])
    }

    /// Transform a point (w = 1).
    pub fn transform_point(&self, p: &Vec3) -> Vec3 {
        let m = &self.0;
        Vec3::new(
            m[0] * p.x + m[4] * p.y + m[8] * p.z + m[12],
            m[1] * p.x + m[5] * p.y + m[9] * p.z + m[13],
            m[2] * p.x + m[6] * p.y + m[10] * p.z + m[14],
        )
    }

    /// Matrix product `self * rhs`.
    pub fn multiply(&self, rhs: &RenderMatrix) -> RenderMatrix {
        Self::from_mat4(&(self.to_mat4() * rhs.to_mat4()))
    }

    /// `self * diag(sx, sy, sz, 1)`: scales the first three columns.
    pub fn scaled(&self, scale: [f32; 3]) -> RenderMatrix {
        let mut values = self.0;
        for (col, s) in scale.into_iter().enumerate() {
            for row in 0..4 {
                values[col * 4 + row] *= s;
            }
        }
        Self(values)
    }

    /// Recover the camera-from-world pose from a rigid world-from-camera
    /// matrix. Inverse of [`render_matrix`].
    pub fn to_pose(&self) -> CameraPose {
        let rwc = Mat3::from_fn(|row, col| self.get(row, col));
        let rcw = rwc.transpose();
        let tcw = -(rcw * self.origin());
        CameraPose::new(rcw, tcw)
    }
}

impl Default for RenderMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn pack<T: PoseScalar>(rotation: &Matrix3<T>, translation: &Vector3<T>) -> RenderMatrix {
    let mut m = [0.0f32; 16];
    for col in 0..3 {
        for row in 0..3 {
            m[col * 4 + row] = rotation[(row, col)].to_f32();
        }
    }
    m[12] = translation.x.to_f32();
    m[13] = translation.y.to_f32();
    m[14] = translation.z.to_f32();
    m[15] = 1.0;
    RenderMatrix(m)
}

/// Convert a camera-from-world pose into a world-from-camera render matrix.
///
/// Upper-left 3x3 is `Rᵗ`, the translation column is `-Rᵗt`, the bottom
/// row is `(0, 0, 0, 1)`.
pub fn render_matrix<T: PoseScalar>(pose: &Pose<T>) -> RenderMatrix {
    let rwc = pose.rotation.transpose();
    let twc = -(rwc * pose.translation);
    pack(&rwc, &twc)
}

/// Pack a pose into a render matrix without inverting it.
///
/// Use for poses that are already world-from-X.
pub fn placement_matrix<T: PoseScalar>(pose: &Pose<T>) -> RenderMatrix {
    pack(&pose.rotation, &pose.translation)
}
