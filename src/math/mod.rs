pub mod aabb;
pub mod orientation;
pub mod triangle;

pub use aabb::Aabb;
pub use orientation::{axis_aligned_rotations, random_small_rotation};
pub use triangle::Triangle;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Rigid motion: a unit-quaternion rotation followed by a translation.
///
/// No scale or reflection can be expressed, so every transform preserves shape.
pub type RigidTransform = nalgebra::Isometry3<f64>;

/// Rotation part of a [`RigidTransform`].
pub type Rotation = nalgebra::UnitQuaternion<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;
