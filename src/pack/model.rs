use std::sync::Arc;

use rand::Rng;
use rand_distr::StandardNormal;
use tracing::{trace, warn};

use super::{Item, PackParams, RotationMode};
use crate::anneal::{Anneal, AnnealState};
use crate::bvh::Bvh;
use crate::error::Result;
use crate::math::{
    axis_aligned_rotations, random_small_rotation, Aabb, RigidTransform, Rotation, Vector3,
};
use crate::mesh::Mesh;

/// Spiral candidates tried before an item is parked beyond the model bounds.
const MAX_PLACEMENT_CANDIDATES: usize = 64;

/// Radius growth between successive spiral candidates.
const PLACEMENT_GROWTH: f64 = 1.2;

/// Record of one move: which item moved and where it was before.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Undo {
    /// Index of the moved item.
    pub index: usize,
    /// Transform of the item before the move.
    pub transform: RigidTransform,
}

/// A packing configuration: an ordered set of placed items.
///
/// Energy is the volume of the box around all items plus a penalty for every
/// overlapping pair, so overlap-free configurations always beat overlapping
/// ones of the same or larger volume.
#[derive(Debug, Clone)]
pub struct PackModel {
    items: Vec<Item>,
    params: PackParams,
    rotations: Arc<[Rotation]>,
    min_volume: f64,
    max_volume: f64,
    deviation: f64,
}

impl Default for PackModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PackModel {
    /// Creates an empty model with default parameters.
    #[must_use]
    pub fn new() -> Self {
        let params = PackParams::default();
        Self {
            items: Vec::new(),
            params,
            rotations: axis_aligned_rotations().into(),
            min_volume: 0.0,
            max_volume: 0.0,
            deviation: params.deviation,
        }
    }

    /// Creates an empty model with custom parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters fail [`PackParams::validate`].
    pub fn with_params(params: PackParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            deviation: params.deviation,
            ..Self::new()
        })
    }

    /// Returns the parameters.
    #[must_use]
    pub fn params(&self) -> &PackParams {
        &self.params
    }

    /// Returns the items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the model has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the largest local box volume of any single item.
    #[must_use]
    pub fn min_volume(&self) -> f64 {
        self.min_volume
    }

    /// Returns the sum of all items' local box volumes.
    #[must_use]
    pub fn max_volume(&self) -> f64 {
        self.max_volume
    }

    /// Returns the current translation step.
    #[must_use]
    pub fn deviation(&self) -> f64 {
        self.deviation
    }

    /// Adds `count` copies of `mesh`.
    ///
    /// One BVH is built for the mesh and shared by all copies. Each copy is
    /// placed so that it overlaps none of the items already in the model.
    pub fn add(&mut self, mesh: Arc<Mesh>, count: usize) {
        if count == 0 {
            return;
        }
        let bvh = Arc::new(Bvh::build_with_leaf_size(mesh, self.params.leaf_size));
        let volume = bvh.volume();
        for _ in 0..count {
            self.items.push(Item::new(Arc::clone(&bvh)));
            self.place(self.items.len() - 1);
            self.min_volume = self.min_volume.max(volume);
            self.max_volume += volume;
        }
    }

    /// Moves every item back to the identity and places them again in order.
    pub fn reset(&mut self) {
        self.deviation = self.params.deviation;
        let all = std::mem::take(&mut self.items);
        for mut item in all {
            item.set_transform(RigidTransform::identity());
            self.items.push(item);
            self.place(self.items.len() - 1);
        }
    }

    /// Moves item `index` outwards along a golden-angle spiral until it
    /// overlaps nothing, starting at its current placement.
    fn place(&mut self, index: usize) {
        let start = *self.items[index].transform();
        let step = self.items[index].bvh().bounds().diagonal();
        let step = if step > 0.0 { step } else { 1.0 };

        let mut radius = 0.0;
        for k in 0..MAX_PLACEMENT_CANDIDATES {
            let offset = spiral_direction(k) * radius;
            let candidate = RigidTransform::from_parts(
                (start.translation.vector + offset).into(),
                start.rotation,
            );
            self.items[index].set_transform(candidate);
            if self.is_valid_change(index) {
                return;
            }
            radius = if k == 0 { step } else { radius * PLACEMENT_GROWTH };
        }

        // Park the item past the +x face of everything else; disjoint boxes
        // cannot overlap.
        let others = self
            .items
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != index)
            .fold(Aabb::empty(), |acc, (_, item)| acc.union(&item.bounds()));
        self.items[index].set_transform(start);
        let own = self.items[index].bounds();
        let shift = others.max.x - own.min.x + step;
        let parked = RigidTransform::from_parts(
            (start.translation.vector + Vector3::new(shift, 0.0, 0.0)).into(),
            start.rotation,
        );
        self.items[index].set_transform(parked);
        warn!(index, "spiral placement exhausted, parked item beyond model bounds");
    }

    /// Returns `true` if item `index` overlaps no other item.
    #[must_use]
    pub fn is_valid_change(&self, index: usize) -> bool {
        let item = &self.items[index];
        self.items
            .iter()
            .enumerate()
            .all(|(j, other)| j == index || !item.intersects(other, self.params.collision))
    }

    /// Returns the number of unordered item pairs that overlap.
    #[must_use]
    pub fn overlapping_pairs(&self) -> usize {
        let mode = self.params.collision;
        let mut count = 0;
        for (i, a) in self.items.iter().enumerate() {
            for b in &self.items[i + 1..] {
                if a.intersects(b, mode) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Returns the box around every placed item.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.items
            .iter()
            .fold(Aabb::empty(), |acc, item| acc.union(&item.bounds()))
    }

    /// Returns the volume of [`bounds`](Self::bounds).
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.bounds().volume()
    }

    /// Returns the energy added by each overlapping pair.
    #[must_use]
    pub fn penalty_per_pair(&self) -> f64 {
        self.params.overlap_penalty * (1.0 + self.max_volume)
    }

    /// Returns `volume() + overlapping_pairs() * penalty_per_pair()`.
    #[must_use]
    pub fn energy(&self) -> f64 {
        let volume = self.volume();
        let pairs = self.overlapping_pairs();
        if pairs == 0 {
            return volume;
        }
        #[allow(clippy::cast_precision_loss)]
        let penalty = pairs as f64 * self.penalty_per_pair();
        volume + penalty
    }

    /// Anneals the model with temperatures scaled to its total item volume
    /// and returns the best configuration found.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Anneal::execute`].
    pub fn pack(&self, steps: usize, seed: u64) -> Result<Self> {
        let scale = if self.max_volume > 0.0 {
            self.max_volume
        } else {
            1.0
        };
        Anneal::new(0.5 * scale, 0.5e-4 * scale, steps)
            .with_seed(seed)
            .execute(self.clone())
    }

    /// Returns all items' meshes moved to their placements, merged into one.
    #[must_use]
    pub fn merged_mesh(&self) -> Mesh {
        let mut out = Mesh::default();
        for item in &self.items {
            out.merge(&item.transformed_mesh());
        }
        out
    }

    /// Draws a new transform for an item currently at `prior`.
    fn propose<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        item: &Item,
        prior: &RigidTransform,
    ) -> RigidTransform {
        let rotate = self.params.rotation != RotationMode::Fixed
            && rng.gen_bool(self.params.rotation_probability);
        if rotate {
            let rotation = match self.params.rotation {
                RotationMode::Free { max_angle } => {
                    random_small_rotation(rng, max_angle) * prior.rotation
                }
                RotationMode::AxisAligned | RotationMode::Fixed => {
                    self.rotations[rng.gen_range(0..self.rotations.len())]
                }
            };
            rotate_about_center(item, prior, rotation)
        } else {
            let axis = rng.gen_range(0..3);
            let step: f64 = rng.sample(StandardNormal);
            let mut next = *prior;
            next.translation.vector[axis] += step * self.deviation;
            next
        }
    }
}

/// Replaces the rotation of `prior` while keeping the item's local box center
/// at the same world position.
fn rotate_about_center(item: &Item, prior: &RigidTransform, rotation: Rotation) -> RigidTransform {
    let local = item.bvh().bounds();
    if local.is_empty() {
        return RigidTransform::from_parts(prior.translation, rotation);
    }
    let center = local.center().coords;
    let world = prior.translation.vector + prior.rotation * center;
    RigidTransform::from_parts((world - rotation * center).into(), rotation)
}

/// Unit direction of the `k`-th point of a golden-angle spiral on the sphere.
#[allow(clippy::cast_precision_loss)]
fn spiral_direction(k: usize) -> Vector3 {
    const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;
    const INV_PHI: f64 = 0.618_033_988_749_895;
    let z = 1.0 - 2.0 * ((k as f64 + 0.5) * INV_PHI).fract();
    let r = (1.0 - z * z).max(0.0).sqrt();
    let theta = k as f64 * GOLDEN_ANGLE;
    Vector3::new(r * theta.cos(), r * theta.sin(), z)
}

impl AnnealState for PackModel {
    type Undo = Undo;

    fn energy(&self) -> f64 {
        PackModel::energy(self)
    }

    /// Moves one uniformly chosen item. With `reject_overlapping_moves`, a
    /// move that creates an overlap is reverted and re-drawn; once the
    /// attempts run out the item stays where it was.
    fn do_move<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Undo {
        if self.items.is_empty() {
            return Undo {
                index: 0,
                transform: RigidTransform::identity(),
            };
        }

        let index = rng.gen_range(0..self.items.len());
        let prior = *self.items[index].transform();
        let attempts = if self.params.reject_overlapping_moves {
            self.params.max_move_attempts
        } else {
            1
        };

        for _ in 0..attempts {
            let candidate = self.propose(rng, &self.items[index], &prior);
            self.items[index].set_transform(candidate);
            if !self.params.reject_overlapping_moves || self.is_valid_change(index) {
                return Undo {
                    index,
                    transform: prior,
                };
            }
        }

        self.items[index].set_transform(prior);
        trace!(index, attempts, "no overlap-free move found");
        Undo {
            index,
            transform: prior,
        }
    }

    fn undo_move(&mut self, undo: Undo) {
        if let Some(item) = self.items.get_mut(undo.index) {
            item.set_transform(undo.transform);
        }
    }

    fn cool(&mut self, progress: f64) {
        self.deviation = self.params.deviation * self.params.min_deviation_ratio.powf(progress);
    }
}
