mod query;

pub use query::CollisionMode;

use std::ops::Range;
use std::sync::Arc;

use slotmap::SlotMap;
use tracing::debug;

use crate::math::{Aabb, Point3};
use crate::mesh::Mesh;

/// Maximum number of triangles stored in a leaf unless configured otherwise.
pub const DEFAULT_LEAF_SIZE: usize = 8;

slotmap::new_key_type! {
    /// Unique identifier for a node in a [`Bvh`].
    pub struct NodeId;
}

/// A node of the hierarchy.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// A group of triangles, addressed as a range of [`Bvh::triangle_order`].
    Leaf { bounds: Aabb, range: Range<usize> },
    /// Two child subtrees.
    Internal {
        bounds: Aabb,
        left: NodeId,
        right: NodeId,
    },
}

impl BvhNode {
    /// Returns the box enclosing every triangle below this node.
    #[must_use]
    pub fn bounds(&self) -> &Aabb {
        match self {
            Self::Leaf { bounds, .. } | Self::Internal { bounds, .. } => bounds,
        }
    }
}

/// Binary bounding volume hierarchy over a shared mesh.
///
/// Built once in the mesh's local frame and shared by every placed copy.
/// Overlap queries take both rigid transforms and never rebuild either tree.
#[derive(Debug)]
pub struct Bvh {
    mesh: Arc<Mesh>,
    nodes: SlotMap<NodeId, BvhNode>,
    root: Option<NodeId>,
    order: Vec<usize>,
    leaf_size: usize,
}

impl Bvh {
    /// Builds a hierarchy with [`DEFAULT_LEAF_SIZE`].
    #[must_use]
    pub fn build(mesh: Arc<Mesh>) -> Self {
        Self::build_with_leaf_size(mesh, DEFAULT_LEAF_SIZE)
    }

    /// Builds a hierarchy whose leaves hold at most `leaf_size` triangles.
    ///
    /// Each node splits its triangles at the count median of their centroids
    /// along the longest axis of the node's box. The sort is stable, so the
    /// tree shape depends only on the triangle order. A `leaf_size` of zero is
    /// treated as one.
    #[must_use]
    pub fn build_with_leaf_size(mesh: Arc<Mesh>, leaf_size: usize) -> Self {
        let leaf_size = leaf_size.max(1);
        let triangles = mesh.triangles();
        let bounds: Vec<Aabb> = triangles.iter().map(|t| t.bounds()).collect();
        let centroids: Vec<Point3> = triangles.iter().map(|t| t.centroid()).collect();

        let mut order: Vec<usize> = (0..triangles.len()).collect();
        let mut nodes = SlotMap::with_key();
        let root = if order.is_empty() {
            None
        } else {
            let mut builder = Builder {
                nodes: &mut nodes,
                order: &mut order,
                bounds: &bounds,
                centroids: &centroids,
                leaf_size,
            };
            Some(builder.build(0..triangles.len()))
        };

        let bvh = Self {
            mesh,
            nodes,
            root,
            order,
            leaf_size,
        };
        debug!(
            triangles = bvh.order.len(),
            nodes = bvh.node_count(),
            depth = bvh.depth(),
            "built bvh"
        );
        bvh
    }

    /// Returns the mesh this hierarchy was built over.
    #[must_use]
    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    /// Returns the root node, or `None` for an empty mesh.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Returns a node by ID.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&BvhNode> {
        self.nodes.get(id)
    }

    /// Returns the triangle indices in leaf order; leaves address ranges of it.
    #[must_use]
    pub fn triangle_order(&self) -> &[usize] {
        &self.order
    }

    /// Returns the configured leaf size.
    #[must_use]
    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    /// Returns the root box in the mesh's local frame, or the empty box.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.root
            .map_or_else(Aabb::empty, |root| *self.nodes[root].bounds())
    }

    /// Returns the volume of the root box.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.bounds().volume()
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of levels; zero for an empty tree.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.map_or(0, |root| self.depth_of(root))
    }

    fn depth_of(&self, id: NodeId) -> usize {
        match &self.nodes[id] {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Internal { left, right, .. } => {
                1 + self.depth_of(*left).max(self.depth_of(*right))
            }
        }
    }

    /// Returns the box of every leaf in depth-first, left-to-right order.
    #[must_use]
    pub fn leaf_bounds(&self) -> Vec<Aabb> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            match &self.nodes[id] {
                BvhNode::Leaf { bounds, .. } => out.push(*bounds),
                BvhNode::Internal { left, right, .. } => {
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }
        out
    }
}

/// Recursive top-down construction state.
struct Builder<'a> {
    nodes: &'a mut SlotMap<NodeId, BvhNode>,
    order: &'a mut [usize],
    bounds: &'a [Aabb],
    centroids: &'a [Point3],
    leaf_size: usize,
}

impl Builder<'_> {
    fn build(&mut self, range: Range<usize>) -> NodeId {
        let bounds = self.order[range.clone()]
            .iter()
            .fold(Aabb::empty(), |acc, &i| acc.union(&self.bounds[i]));

        if range.len() <= self.leaf_size {
            return self.nodes.insert(BvhNode::Leaf { bounds, range });
        }

        let axis = bounds.longest_axis();
        let centroids = self.centroids;
        self.order[range.clone()]
            .sort_by(|&a, &b| centroids[a][axis].total_cmp(&centroids[b][axis]));

        let mid = range.start + range.len() / 2;
        let left = self.build(range.start..mid);
        let right = self.build(mid..range.end);
        self.nodes.insert(BvhNode::Internal {
            bounds,
            left,
            right,
        })
    }
}
