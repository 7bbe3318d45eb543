mod item;
mod model;
mod params;

pub use item::Item;
pub use model::{PackModel, Undo};
pub use params::{PackParams, RotationMode};
