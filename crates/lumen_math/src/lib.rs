// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod bounding_box;
mod color;
mod ray;

pub use bounding_box::BoundingBox;
pub use color::{Color, ColorExt, BLACK_EPSILON};
pub use ray::Ray;
