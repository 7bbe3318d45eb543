use crate::bvh::{CollisionMode, DEFAULT_LEAF_SIZE};
use crate::error::ParamsError;

/// How moves may change an item's orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RotationMode {
    /// Items keep their initial orientation.
    Fixed,
    /// Items snap to one of the 24 orientations that keep axes on axes. Item
    /// boxes stay tight under these rotations.
    #[default]
    AxisAligned,
    /// Items turn by a random angle of at most `max_angle` radians about a
    /// random axis.
    Free { max_angle: f64 },
}

/// Parameters controlling a [`PackModel`](super::PackModel).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackParams {
    /// Leaf resolution of overlap queries.
    pub collision: CollisionMode,
    /// Orientation changes allowed by moves.
    pub rotation: RotationMode,
    /// Chance that a move rotates instead of translating.
    pub rotation_probability: f64,
    /// Standard deviation of a translation move at the start of a run.
    pub deviation: f64,
    /// Fraction of `deviation` left at the end of a run.
    pub min_deviation_ratio: f64,
    /// Weight of one overlapping pair, in units of `1 + max_volume`.
    pub overlap_penalty: f64,
    /// Re-draw moves that would create an overlap instead of scoring them.
    pub reject_overlapping_moves: bool,
    /// Re-draws allowed per move before the item is left where it was.
    pub max_move_attempts: usize,
    /// Maximum number of triangles per BVH leaf.
    pub leaf_size: usize,
}

impl Default for PackParams {
    fn default() -> Self {
        Self {
            collision: CollisionMode::Bounds,
            rotation: RotationMode::AxisAligned,
            rotation_probability: 0.25,
            deviation: 1.0,
            min_deviation_ratio: 0.01,
            overlap_penalty: 1.0,
            reject_overlapping_moves: true,
            max_move_attempts: 64,
            leaf_size: DEFAULT_LEAF_SIZE,
        }
    }
}

impl PackParams {
    /// Sets the collision mode.
    #[must_use]
    pub fn with_collision(mut self, collision: CollisionMode) -> Self {
        self.collision = collision;
        self
    }

    /// Sets the rotation mode.
    #[must_use]
    pub fn with_rotation(mut self, rotation: RotationMode) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the initial translation step.
    #[must_use]
    pub fn with_deviation(mut self, deviation: f64) -> Self {
        self.deviation = deviation;
        self
    }

    /// Sets whether overlapping moves are re-drawn.
    #[must_use]
    pub fn with_reject_overlapping_moves(mut self, reject: bool) -> Self {
        self.reject_overlapping_moves = reject;
        self
    }

    /// Checks every numeric parameter against its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError::OutOfRange`] naming the first offending
    /// parameter.
    pub fn validate(&self) -> Result<(), ParamsError> {
        check("deviation", self.deviation, f64::MIN_POSITIVE, f64::MAX)?;
        check(
            "min_deviation_ratio",
            self.min_deviation_ratio,
            f64::MIN_POSITIVE,
            1.0,
        )?;
        check("overlap_penalty", self.overlap_penalty, f64::MIN_POSITIVE, f64::MAX)?;
        check("rotation_probability", self.rotation_probability, 0.0, 1.0)?;
        if let RotationMode::Free { max_angle } = self.rotation {
            check("max_angle", max_angle, 0.0, std::f64::consts::PI)?;
        }
        if self.max_move_attempts == 0 {
            return Err(ParamsError::OutOfRange {
                parameter: "max_move_attempts",
                value: 0.0,
                min: 1.0,
                max: f64::MAX,
            });
        }
        Ok(())
    }
}

fn check(parameter: &'static str, value: f64, min: f64, max: f64) -> Result<(), ParamsError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ParamsError::OutOfRange {
            parameter,
            value,
            min,
            max,
        })
    }
}
