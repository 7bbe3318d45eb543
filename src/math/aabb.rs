use super::{Point3, RigidTransform, Vector3};

/// An axis-aligned bounding box.
///
/// The empty box ([`Aabb::empty`]) has `min = +inf` and `max = -inf`: it has
/// zero volume, overlaps nothing and is contained by every box, which makes it
/// the identity for [`Aabb::union`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    /// Creates the box spanned by two opposite corners, in any order.
    #[must_use]
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Returns the empty box.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Returns the smallest box containing every point, or the empty box.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        points
            .into_iter()
            .fold(Self::empty(), |acc, p| acc.include_point(p))
    }

    /// Returns this box grown to include `point`.
    #[must_use]
    pub fn include_point(&self, point: &Point3) -> Self {
        Self {
            min: self.min.inf(point),
            max: self.max.sup(point),
        }
    }

    /// Returns `true` if the box encloses no point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    /// Returns the edge lengths, or zero for the empty box.
    #[must_use]
    pub fn size(&self) -> Vector3 {
        if self.is_empty() {
            Vector3::zeros()
        } else {
            self.max - self.min
        }
    }

    /// Returns the center point. Meaningless for the empty box.
    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns the volume, or zero for the empty box.
    #[must_use]
    pub fn volume(&self) -> f64 {
        let size = self.size();
        size.x * size.y * size.z
    }

    /// Returns the length of the box diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        self.size().norm()
    }

    /// Returns the index (0 = x, 1 = y, 2 = z) of the longest edge.
    ///
    /// Ties resolve to the lowest axis.
    #[must_use]
    pub fn longest_axis(&self) -> usize {
        let size = self.size();
        let mut axis = 0;
        for i in 1..3 {
            if size[i] > size[axis] {
                axis = i;
            }
        }
        axis
    }

    /// Returns the smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Returns `true` if the boxes share at least one point.
    ///
    /// Intervals are closed, so boxes that only touch overlap.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        (0..3).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }

    /// Returns `true` if `other` lies entirely inside this box.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        if other.is_empty() {
            return true;
        }
        if self.is_empty() {
            return false;
        }
        (0..3).all(|i| self.min[i] <= other.min[i] && other.max[i] <= self.max[i])
    }

    /// Returns the eight corner points.
    #[must_use]
    pub fn corners(&self) -> [Point3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Returns the axis-aligned box enclosing this box after a rigid motion.
    ///
    /// Exact for rotations that map axes onto axes, conservative otherwise.
    #[must_use]
    pub fn transformed(&self, transform: &RigidTransform) -> Self {
        if self.is_empty() {
            return Self::empty();
        }
        let corners = self.corners().map(|c| transform * c);
        Self::from_points(&corners)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;
    use crate::math::Rotation;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn unit() -> Aabb {
        Aabb::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
    }

    #[test]
    fn new_orders_corners() {
        let b = Aabb::new(p(1.0, -2.0, 3.0), p(-1.0, 2.0, 0.0));
        assert_eq!(b.min, p(-1.0, -2.0, 0.0));
        assert_eq!(b.max, p(1.0, 2.0, 3.0));
        assert_relative_eq!(b.volume(), 24.0);
    }

    #[test]
    fn union_contains_both_operands() {
        let a = unit();
        let b = Aabb::new(p(3.0, -1.0, 0.5), p(4.0, 0.0, 2.0));
        let u = a.union(&b);
        assert!(u.contains(&a));
        assert!(u.contains(&b));
        assert_eq!(u.min, p(0.0, -1.0, 0.0));
        assert_eq!(u.max, p(4.0, 1.0, 2.0));
    }

    #[test]
    fn empty_box_is_union_identity() {
        let e = Aabb::empty();
        assert!(e.is_empty());
        assert_relative_eq!(e.volume(), 0.0);
        assert_eq!(e.union(&unit()), unit());
        assert!(unit().contains(&e));
        assert!(e.union(&unit()).contains(&e));
        assert!(!e.intersects(&unit()));
        assert!(!e.contains(&unit()));
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = unit();
        let b = Aabb::new(p(1.0, 0.0, 0.0), p(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn separated_boxes_do_not_intersect() {
        let a = unit();
        let b = Aabb::new(p(0.5, 0.5, 1.001), p(2.0, 2.0, 2.0));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn flat_boxes_can_intersect() {
        let a = Aabb::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.0));
        assert!(a.intersects(&a));
        assert_relative_eq!(a.volume(), 0.0);
    }

    #[test]
    fn longest_axis_picks_largest_extent() {
        assert_eq!(Aabb::new(p(0.0, 0.0, 0.0), p(1.0, 3.0, 2.0)).longest_axis(), 1);
        assert_eq!(Aabb::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 5.0)).longest_axis(), 2);
        assert_eq!(unit().longest_axis(), 0);
    }

    #[test]
    fn transformed_by_quarter_turn() {
        let b = Aabb::new(p(1.0, 0.0, 0.0), p(2.0, 1.0, 1.0));
        let t = RigidTransform::from_parts(
            Vector3::new(0.0, 0.0, 10.0).into(),
            Rotation::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let r = b.transformed(&t);
        assert_relative_eq!(r.min.x, -1.0, epsilon = 1e-9);
        assert_relative_eq!(r.max.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(r.min.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(r.max.y, 2.0, epsilon = 1e-9);
        assert_relative_eq!(r.min.z, 10.0, epsilon = 1e-9);
        assert_relative_eq!(r.volume(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn transformed_empty_stays_empty() {
        let t = RigidTransform::translation(1.0, 2.0, 3.0);
        assert!(Aabb::empty().transformed(&t).is_empty());
    }
}
