use std::ops::Range;

use super::{Bvh, BvhNode, NodeId};
use crate::math::{Aabb, RigidTransform};

/// How a pair of overlapping leaves is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionMode {
    /// Overlapping leaf boxes count as a collision. Conservative: also reports
    /// one mesh nested inside another, which surface tests cannot see.
    #[default]
    Bounds,
    /// Leaf triangles are tested pairwise with an exact triangle/triangle test.
    Triangles,
}

impl Bvh {
    /// Returns `true` if this tree placed by `transform` overlaps `other`
    /// placed by `other_transform`.
    ///
    /// Both trees are descended together in this tree's local frame, skipping
    /// any pair of nodes whose boxes are disjoint. Stops at the first hit.
    /// An empty tree never intersects anything.
    #[must_use]
    pub fn intersects(
        &self,
        other: &Bvh,
        transform: &RigidTransform,
        other_transform: &RigidTransform,
        mode: CollisionMode,
    ) -> bool {
        let (Some(a), Some(b)) = (self.root, other.root) else {
            return false;
        };
        let relative = transform.inv_mul(other_transform);
        PairQuery {
            a: self,
            b: other,
            relative,
            mode,
        }
        .nodes_intersect(a, b)
    }
}

/// Simultaneous descent of two trees; `relative` maps `b`'s frame into `a`'s.
struct PairQuery<'a> {
    a: &'a Bvh,
    b: &'a Bvh,
    relative: RigidTransform,
    mode: CollisionMode,
}

impl PairQuery<'_> {
    fn nodes_intersect(&self, a: NodeId, b: NodeId) -> bool {
        let node_a = &self.a.nodes[a];
        let node_b = &self.b.nodes[b];
        let box_a = *node_a.bounds();
        let box_b = node_b.bounds().transformed(&self.relative);
        if !box_a.intersects(&box_b) {
            return false;
        }

        match (node_a, node_b) {
            (BvhNode::Leaf { range: ra, .. }, BvhNode::Leaf { range: rb, .. }) => match self.mode
            {
                CollisionMode::Bounds => true,
                CollisionMode::Triangles => self.leaves_intersect(ra, rb, &box_a),
            },
            (BvhNode::Internal { left, right, .. }, BvhNode::Leaf { .. }) => {
                self.nodes_intersect(*left, b) || self.nodes_intersect(*right, b)
            }
            (BvhNode::Leaf { .. }, BvhNode::Internal { left, right, .. }) => {
                self.nodes_intersect(a, *left) || self.nodes_intersect(a, *right)
            }
            (
                BvhNode::Internal {
                    left: la,
                    right: ra,
                    ..
                },
                BvhNode::Internal {
                    left: lb,
                    right: rb,
                    ..
                },
            ) => {
                // Descend the larger box first.
                if box_a.volume() >= box_b.volume() {
                    self.nodes_intersect(*la, b) || self.nodes_intersect(*ra, b)
                } else {
                    self.nodes_intersect(a, *lb) || self.nodes_intersect(a, *rb)
                }
            }
        }
    }

    fn leaves_intersect(&self, ra: &Range<usize>, rb: &Range<usize>, box_a: &Aabb) -> bool {
        let tris_a = self.a.mesh.triangles();
        let tris_b = self.b.mesh.triangles();
        self.b.order[rb.clone()]
            .iter()
            .map(|&j| tris_b[j].transformed(&self.relative))
            .filter(|tb| tb.bounds().intersects(box_a))
            .any(|tb| {
                self.a.order[ra.clone()]
                    .iter()
                    .any(|&i| tris_a[i].intersects(&tb))
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_4;
    use std::sync::Arc;

    use super::*;
    use crate::math::{Point3, Vector3};
    use crate::mesh::Mesh;

    fn cube_bvh() -> Bvh {
        Bvh::build(Arc::new(Mesh::cube()))
    }

    fn at(x: f64, y: f64, z: f64) -> RigidTransform {
        RigidTransform::translation(x, y, z)
    }

    const MODES: [CollisionMode; 2] = [CollisionMode::Bounds, CollisionMode::Triangles];

    #[test]
    fn identical_placements_intersect() {
        let bvh = cube_bvh();
        let t = RigidTransform::new(Vector3::new(3.0, -1.0, 2.0), Vector3::new(0.2, 0.4, 0.1));
        for mode in MODES {
            assert!(bvh.intersects(&bvh, &t, &t, mode), "{mode:?}");
        }
    }

    #[test]
    fn disjoint_placements_do_not_intersect() {
        let bvh = cube_bvh();
        for mode in MODES {
            assert!(!bvh.intersects(&bvh, &at(0.0, 0.0, 0.0), &at(1.5, 0.0, 0.0), mode));
            assert!(!bvh.intersects(&bvh, &at(0.0, 0.0, 0.0), &at(0.0, 0.0, -1.01), mode));
        }
    }

    #[test]
    fn partially_overlapping_cubes_intersect() {
        let bvh = cube_bvh();
        for mode in MODES {
            assert!(bvh.intersects(&bvh, &at(0.0, 0.0, 0.0), &at(0.5, 0.5, 0.5), mode));
        }
    }

    /// Unit cube spun 45 degrees about its vertical center line; its corners
    /// stick out by (sqrt(2) - 1) / 2 on each side.
    fn spun() -> RigidTransform {
        RigidTransform::translation(0.5, 0.5, 0.0)
            * RigidTransform::new(Vector3::zeros(), Vector3::new(0.0, 0.0, FRAC_PI_4))
            * RigidTransform::translation(-0.5, -0.5, 0.0)
    }

    #[test]
    fn exact_query_sees_rotated_corner() {
        let bvh = cube_bvh();
        let mode = CollisionMode::Triangles;
        assert!(bvh.intersects(&bvh, &spun(), &at(1.1, 0.0, 0.0), mode));
        assert!(!bvh.intersects(&bvh, &spun(), &at(1.25, 0.0, 0.0), mode));
    }

    #[test]
    fn exact_query_is_symmetric() {
        let bvh = cube_bvh();
        let mode = CollisionMode::Triangles;
        for x in [1.1, 1.25, 0.5, 3.0] {
            let other = at(x, 0.0, 0.0);
            assert_eq!(
                bvh.intersects(&bvh, &spun(), &other, mode),
                bvh.intersects(&bvh, &other, &spun(), mode),
                "x = {x}"
            );
        }
    }

    #[test]
    fn bounds_query_is_conservative_under_rotation() {
        let bvh = cube_bvh();
        let mode = CollisionMode::Bounds;
        assert!(bvh.intersects(&bvh, &spun(), &at(1.1, 0.0, 0.0), mode));
        // Rotated boxes are enlarged, so a near miss still reports a hit.
        assert!(bvh.intersects(&bvh, &spun(), &at(1.25, 0.0, 0.0), mode));
        assert!(!bvh.intersects(&bvh, &spun(), &at(2.0, 0.0, 0.0), mode));
    }

    #[test]
    fn nested_mesh_only_seen_by_bounds() {
        let big = Bvh::build(Arc::new(Mesh::cuboid(
            Point3::new(-2.0, -2.0, -2.0),
            Point3::new(2.0, 2.0, 2.0),
        )));
        let small = cube_bvh();
        let id = RigidTransform::identity();
        assert!(big.intersects(&small, &id, &id, CollisionMode::Bounds));
        assert!(!big.intersects(&small, &id, &id, CollisionMode::Triangles));
    }

    #[test]
    fn empty_tree_never_intersects() {
        let empty = Bvh::build(Arc::new(Mesh::default()));
        let cube = cube_bvh();
        let id = RigidTransform::identity();
        for mode in MODES {
            assert!(!empty.intersects(&cube, &id, &id, mode));
            assert!(!cube.intersects(&empty, &id, &id, mode));
            assert!(!empty.intersects(&empty, &id, &id, mode));
        }
    }
}
