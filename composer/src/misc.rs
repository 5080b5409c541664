// Common typedefs and small geometric helpers shared across the composer.

use nalgebra::{Rotation3, Translation3, UnitQuaternion};

pub type Point2 = nalgebra::Point2<f32>;
pub type Point3 = nalgebra::Point3<f32>;
pub type Vector3 = nalgebra::Vector3<f32>;
pub type Matrix4 = nalgebra::Matrix4<f32>;
pub type Isometry3 = nalgebra::Isometry3<f32>;

/// Builds a rigid transform from a column-major 4×4 matrix.
///
/// Only the upper-left rotation block and the translation column are read;
/// any scale or projective terms in the source are ignored.
pub fn isometry_from_columns(columns: &[f32; 16]) -> Isometry3 {
    let m = Matrix4::from_column_slice(columns);
    let block = m.fixed_slice::<3, 3>(0, 0).into_owned();
    let rotation = Rotation3::from_matrix_unchecked(block);
    let translation =
        Translation3::from(m.fixed_slice::<3, 1>(0, 3).into_owned());
    Isometry3::from_parts(
        translation,
        UnitQuaternion::from_rotation_matrix(&rotation),
    )
}

pub fn isometry_to_columns(isometry: &Isometry3) -> [f32; 16] {
    let mut columns = [0.0; 16];
    columns.copy_from_slice(isometry.to_homogeneous().as_slice());
    columns
}

pub fn translation_distance(a: &Isometry3, b: &Isometry3) -> f32 {
    (a.translation.vector - b.translation.vector).norm()
}
