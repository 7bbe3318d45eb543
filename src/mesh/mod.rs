use crate::error::{MeshError, Result};
use crate::math::{Aabb, Point3, RigidTransform, Triangle, Vector3};

/// An ordered list of triangles.
///
/// Packing shares one mesh between many placed items through `Arc<Mesh>`;
/// the triangle data itself is never copied per instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    triangles: Vec<Triangle>,
}

impl Mesh {
    /// Creates a mesh from a triangle list.
    #[must_use]
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Creates a mesh from shared vertices and index triples.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::NonFiniteVertex`] if a vertex has a NaN or
    /// infinite coordinate, or [`MeshError::IndexOutOfRange`] if an index
    /// does not address a vertex.
    pub fn from_indexed(vertices: &[Point3], indices: &[[u32; 3]]) -> Result<Self> {
        if let Some(index) = vertices
            .iter()
            .position(|v| !v.coords.iter().all(|c| c.is_finite()))
        {
            return Err(MeshError::NonFiniteVertex { index }.into());
        }

        let fetch = |index: u32| -> std::result::Result<Point3, MeshError> {
            vertices
                .get(index as usize)
                .copied()
                .ok_or(MeshError::IndexOutOfRange {
                    index,
                    len: vertices.len(),
                })
        };

        let triangles = indices
            .iter()
            .map(|&[a, b, c]| Ok(Triangle::new(fetch(a)?, fetch(b)?, fetch(c)?)))
            .collect::<std::result::Result<Vec<_>, MeshError>>()?;
        Ok(Self { triangles })
    }

    /// Creates an axis-aligned box mesh (12 triangles, outward winding).
    #[must_use]
    pub fn cuboid(min: Point3, max: Point3) -> Self {
        // Corner bit layout: x = bit 0, y = bit 1, z = bit 2.
        const FACES: [[usize; 4]; 6] = [
            [0, 2, 3, 1], // -z
            [4, 5, 7, 6], // +z
            [0, 1, 5, 4], // -y
            [2, 6, 7, 3], // +y
            [0, 4, 6, 2], // -x
            [1, 3, 7, 5], // +x
        ];
        let corners = Aabb::new(min, max).corners();
        let triangles = FACES
            .iter()
            .flat_map(|&[a, b, c, d]| {
                [
                    Triangle::new(corners[a], corners[b], corners[c]),
                    Triangle::new(corners[a], corners[c], corners[d]),
                ]
            })
            .collect();
        Self { triangles }
    }

    /// Creates the unit cube `[0, 1]^3`.
    #[must_use]
    pub fn cube() -> Self {
        Self::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    /// Returns the triangles.
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Returns the number of triangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Returns `true` if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Returns the bounding box of all vertices.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.triangles
            .iter()
            .fold(Aabb::empty(), |acc, t| acc.union(&t.bounds()))
    }

    /// Applies a rigid transform to every vertex in place.
    pub fn transform(&mut self, transform: &RigidTransform) {
        for t in &mut self.triangles {
            *t = t.transformed(transform);
        }
    }

    /// Returns a transformed copy of the mesh.
    #[must_use]
    pub fn transformed(&self, transform: &RigidTransform) -> Self {
        Self {
            triangles: self
                .triangles
                .iter()
                .map(|t| t.transformed(transform))
                .collect(),
        }
    }

    /// Uniformly scales the mesh about the origin.
    pub fn scale(&mut self, factor: f64) {
        for t in &mut self.triangles {
            for v in &mut t.vertices {
                *v = Point3::from(v.coords * factor);
            }
        }
    }

    /// Centers the mesh on the origin and scales it uniformly so that its
    /// longest edge spans `[-1, 1]`. Empty and zero-size meshes are only
    /// centered.
    pub fn bi_unit_cube(&mut self) {
        let bounds = self.bounds();
        if bounds.is_empty() {
            return;
        }
        let offset: Vector3 = -bounds.center().coords;
        self.transform(&RigidTransform::translation(offset.x, offset.y, offset.z));
        let extent = bounds.size().max();
        if extent > 0.0 {
            self.scale(2.0 / extent);
        }
    }

    /// Appends all triangles of `other`.
    pub fn merge(&mut self, other: &Mesh) {
        self.triangles.extend_from_slice(&other.triangles);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::PackError;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn cube_has_twelve_triangles_and_unit_bounds() {
        let cube = Mesh::cube();
        assert_eq!(cube.len(), 12);
        assert_relative_eq!(cube.bounds().volume(), 1.0);
        assert!(cube.triangles().iter().all(|t| !t.is_degenerate()));
    }

    #[test]
    fn cube_winding_points_outward() {
        let cube = Mesh::cube();
        let center = p(0.5, 0.5, 0.5);
        for t in cube.triangles() {
            let outward = t.centroid() - center;
            assert!(t.normal().dot(&outward) > 0.0);
        }
    }

    #[test]
    fn from_indexed_builds_triangles() {
        let vertices = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0)];
        let indices = [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
        let mesh = Mesh::from_indexed(&vertices, &indices).unwrap();
        assert_eq!(mesh.len(), 4);
        assert_eq!(mesh.triangles()[0].vertices, [vertices[0], vertices[2], vertices[1]]);
        assert_relative_eq!(mesh.bounds().volume(), 1.0);
    }

    #[test]
    fn from_indexed_rejects_bad_index() {
        let vertices = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        let result = Mesh::from_indexed(&vertices, &[[0, 1, 3]]);
        assert!(matches!(
            result,
            Err(PackError::Mesh(MeshError::IndexOutOfRange { index: 3, len: 3 }))
        ));
    }

    #[test]
    fn from_indexed_rejects_nan() {
        let vertices = [p(0.0, 0.0, 0.0), p(f64::NAN, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        let result = Mesh::from_indexed(&vertices, &[[0, 1, 2]]);
        assert!(matches!(
            result,
            Err(PackError::Mesh(MeshError::NonFiniteVertex { index: 1 }))
        ));
    }

    #[test]
    fn bi_unit_cube_normalizes_longest_edge() {
        let mut mesh = Mesh::cuboid(p(10.0, 10.0, 10.0), p(14.0, 12.0, 11.0));
        mesh.bi_unit_cube();
        let b = mesh.bounds();
        assert_relative_eq!(b.min.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(b.max.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(b.max.y, 0.5, epsilon = 1e-12);
        assert_relative_eq!(b.max.z, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn empty_mesh_has_empty_bounds() {
        let mut mesh = Mesh::default();
        assert!(mesh.is_empty());
        assert!(mesh.bounds().is_empty());
        mesh.bi_unit_cube();
        assert!(mesh.is_empty());
    }

    #[test]
    fn merge_and_transform() {
        let mut a = Mesh::cube();
        let b = Mesh::cube().transformed(&RigidTransform::translation(2.0, 0.0, 0.0));
        a.merge(&b);
        assert_eq!(a.len(), 24);
        assert_relative_eq!(a.bounds().max.x, 3.0);
        assert_relative_eq!(a.bounds().volume(), 3.0);
    }
}
