use super::{Aabb, Point3, RigidTransform, Vector3, TOLERANCE};

/// A triangle given by three vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// The vertices, in winding order.
    pub vertices: [Point3; 3],
}

impl Triangle {
    /// Creates a triangle from three vertices.
    #[must_use]
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Returns the bounding box of the triangle.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }

    /// Returns the centroid of the triangle.
    #[must_use]
    pub fn centroid(&self) -> Point3 {
        let [a, b, c] = self.vertices;
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }

    /// Returns the (non-normalized) normal `(b - a) x (c - a)`.
    #[must_use]
    pub fn normal(&self) -> Vector3 {
        let [a, b, c] = self.vertices;
        (b - a).cross(&(c - a))
    }

    /// Returns the area of the triangle.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.normal().norm() * 0.5
    }

    /// Returns `true` if the vertices are collinear (zero area).
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.area() < TOLERANCE
    }

    /// Returns the triangle moved by a rigid transform.
    #[must_use]
    pub fn transformed(&self, transform: &RigidTransform) -> Self {
        Self {
            vertices: self.vertices.map(|v| transform * v),
        }
    }

    fn edges(&self) -> [Vector3; 3] {
        let [a, b, c] = self.vertices;
        [b - a, c - b, a - c]
    }

    /// Returns `true` if the two triangles share at least one point.
    ///
    /// Separating axis test over both face normals, the nine edge/edge cross
    /// products and the in-plane edge normals (needed for coplanar pairs).
    /// Touching triangles count as intersecting.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        if !self.bounds().intersects(&other.bounds()) {
            return false;
        }

        let n1 = self.normal();
        let n2 = other.normal();
        let e1 = self.edges();
        let e2 = other.edges();

        let mut axes: Vec<Vector3> = Vec::with_capacity(17);
        axes.push(n1);
        axes.push(n2);
        for a in &e1 {
            for b in &e2 {
                axes.push(a.cross(b));
            }
        }
        for e in &e1 {
            axes.push(n1.cross(e));
        }
        for e in &e2 {
            axes.push(n2.cross(e));
        }

        // Tolerance on the projections scales with the triangles' extent.
        let scale = self
            .bounds()
            .union(&other.bounds())
            .diagonal()
            .max(1.0);

        !axes.iter().any(|axis| {
            let len = axis.norm();
            if len < TOLERANCE {
                return false;
            }
            let axis = axis / len;
            let (min1, max1) = project(&self.vertices, &axis);
            let (min2, max2) = project(&other.vertices, &axis);
            let eps = TOLERANCE * scale;
            max1 < min2 - eps || max2 < min1 - eps
        })
    }
}

/// Projects points onto an axis, returning the covered interval.
fn project(points: &[Point3; 3], axis: &Vector3) -> (f64, f64) {
    points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        let d = p.coords.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn xy_triangle() -> Triangle {
        Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0))
    }

    #[test]
    fn bounds_and_centroid() {
        let t = Triangle::new(p(0.0, 0.0, 0.0), p(3.0, 0.0, 0.0), p(0.0, 3.0, 3.0));
        let b = t.bounds();
        assert_eq!(b.min, p(0.0, 0.0, 0.0));
        assert_eq!(b.max, p(3.0, 3.0, 3.0));
        assert_relative_eq!(t.centroid(), p(1.0, 1.0, 1.0));
    }

    #[test]
    fn area_of_right_triangle() {
        assert_relative_eq!(xy_triangle().area(), 0.5);
        assert!(!xy_triangle().is_degenerate());
        let line = Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), p(2.0, 2.0, 2.0));
        assert!(line.is_degenerate());
    }

    #[test]
    fn identical_triangles_intersect() {
        let t = xy_triangle();
        assert!(t.intersects(&t));
    }

    #[test]
    fn piercing_triangles_intersect() {
        let a = xy_triangle();
        let b = Triangle::new(p(0.25, 0.25, -1.0), p(0.25, 0.25, 1.0), p(0.25, -1.0, 0.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn parallel_offset_triangles_do_not_intersect() {
        let a = xy_triangle();
        let b = a.transformed(&RigidTransform::translation(0.0, 0.0, 0.5));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn coplanar_separated_triangles_do_not_intersect() {
        // Boxes overlap but the hypotenuse separates them.
        let a = xy_triangle();
        let b = Triangle::new(p(1.0, 1.0, 0.0), p(0.6, 1.0, 0.0), p(1.0, 0.6, 0.0));
        assert!(a.bounds().intersects(&b.bounds()));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn coplanar_overlapping_triangles_intersect() {
        let a = xy_triangle();
        let b = Triangle::new(p(0.2, 0.2, 0.0), p(2.0, 0.2, 0.0), p(0.2, 2.0, 0.0));
        assert!(a.intersects(&b));
    }

    #[test]
    fn transformed_preserves_area() {
        let t = xy_triangle().transformed(&RigidTransform::new(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(0.3, -0.2, 0.9),
        ));
        assert_relative_eq!(t.area(), 0.5, epsilon = 1e-12);
    }
}
