pub mod anneal;
pub mod bvh;
pub mod error;
pub mod math;
pub mod mesh;
pub mod pack;

pub use anneal::{Anneal, AnnealState, CoolingSchedule};
pub use bvh::{Bvh, CollisionMode};
pub use error::{PackError, Result};
pub use mesh::Mesh;
pub use pack::{Item, PackModel, PackParams, RotationMode};
