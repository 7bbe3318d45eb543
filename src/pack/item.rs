use std::sync::Arc;

use crate::bvh::{Bvh, CollisionMode};
use crate::math::{Aabb, RigidTransform};
use crate::mesh::Mesh;

/// One placed copy of a mesh.
///
/// The mesh and its local-space BVH are shared with every other copy of the
/// same mesh; only the transform belongs to the item.
#[derive(Debug, Clone)]
pub struct Item {
    bvh: Arc<Bvh>,
    transform: RigidTransform,
}

impl Item {
    /// Creates an item at the identity transform.
    #[must_use]
    pub fn new(bvh: Arc<Bvh>) -> Self {
        Self {
            bvh,
            transform: RigidTransform::identity(),
        }
    }

    /// Returns the shared mesh.
    #[must_use]
    pub fn mesh(&self) -> &Arc<Mesh> {
        self.bvh.mesh()
    }

    /// Returns the shared local-space hierarchy.
    #[must_use]
    pub fn bvh(&self) -> &Arc<Bvh> {
        &self.bvh
    }

    /// Returns the placement of the item.
    #[must_use]
    pub fn transform(&self) -> &RigidTransform {
        &self.transform
    }

    pub(crate) fn set_transform(&mut self, transform: RigidTransform) {
        self.transform = transform;
    }

    /// Returns the world-space box around the placed item.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.bvh.bounds().transformed(&self.transform)
    }

    /// Returns `true` if the two placed items overlap.
    #[must_use]
    pub fn intersects(&self, other: &Item, mode: CollisionMode) -> bool {
        self.bvh
            .intersects(&other.bvh, &self.transform, &other.transform, mode)
    }

    /// Returns a copy of the mesh moved to the item's placement.
    #[must_use]
    pub fn transformed_mesh(&self) -> Mesh {
        self.mesh().transformed(&self.transform)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn copies_share_mesh_and_tree() {
        let bvh = Arc::new(Bvh::build(Arc::new(Mesh::cube())));
        let a = Item::new(Arc::clone(&bvh));
        let mut b = a.clone();
        b.set_transform(RigidTransform::translation(5.0, 0.0, 0.0));
        assert!(Arc::ptr_eq(a.mesh(), b.mesh()));
        assert!(Arc::ptr_eq(a.bvh(), b.bvh()));
        assert_eq!(*a.transform(), RigidTransform::identity());
        assert_relative_eq!(b.bounds().min.x, 5.0);
        assert!(!a.intersects(&b, CollisionMode::Bounds));
    }

    #[test]
    fn transformed_mesh_follows_placement() {
        let mut item = Item::new(Arc::new(Bvh::build(Arc::new(Mesh::cube()))));
        item.set_transform(RigidTransform::translation(0.0, -2.0, 1.0));
        let mesh = item.transformed_mesh();
        assert_eq!(mesh.bounds(), item.bounds());
        assert_relative_eq!(mesh.bounds().min.y, -2.0);
    }
}
