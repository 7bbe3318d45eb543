use rand::Rng;
use rand_distr::{Distribution, UnitSphere};

use super::{Rotation, Vector3};

/// Returns the 24 rotations that map the coordinate axes onto coordinate axes.
///
/// The first entry is the identity. Order is fixed, so indices into the list
/// are stable across runs.
#[must_use]
pub fn axis_aligned_rotations() -> Vec<Rotation> {
    const PERMUTATIONS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    let mut rotations = Vec::with_capacity(24);
    for perm in PERMUTATIONS {
        for signs in 0..8u8 {
            let mut m = nalgebra::Matrix3::<f64>::zeros();
            for (row, &col) in perm.iter().enumerate() {
                m[(row, col)] = if signs & (1 << row) == 0 { 1.0 } else { -1.0 };
            }
            // Reject reflections.
            if m.determinant() > 0.0 {
                let rot = nalgebra::Rotation3::from_matrix_unchecked(m);
                rotations.push(Rotation::from_rotation_matrix(&rot));
            }
        }
    }
    rotations
}

/// Draws a rotation about a uniformly random axis by an angle uniform in
/// `[-max_angle, max_angle]` radians.
pub fn random_small_rotation<R: Rng + ?Sized>(rng: &mut R, max_angle: f64) -> Rotation {
    let [x, y, z]: [f64; 3] = UnitSphere.sample(rng);
    let axis = nalgebra::Unit::new_normalize(Vector3::new(x, y, z));
    let angle = if max_angle > 0.0 {
        rng.gen_range(-max_angle..=max_angle)
    } else {
        0.0
    };
    Rotation::from_axis_angle(&axis, angle)
}
