//! Primitive trait and Intersection for ray-object queries.

use lumen_core::Material;
use lumen_math::{BoundingBox, Ray, Vec2, Vec3};

/// A ray-surface hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Ray parameter of the hit, never negative
    pub distance: f32,
    /// Unit shading normal at the hit point
    pub normal: Vec3,
    /// Interpolated texture coordinates, if the primitive has them
    pub uv: Option<Vec2>,
}

/// Trait for geometry that can be stored in the BVH.
pub trait Primitive: Send + Sync {
    /// Test the ray against this primitive. Returns `None` on a miss.
    fn intersect(&self, ray: &Ray) -> Option<Intersection>;

    /// Axis-aligned bounds, computed once at construction.
    fn bounds(&self) -> &BoundingBox;

    /// Material at the surface.
    fn material(&self) -> &Material;

    /// True if hits on this primitive carry texture coordinates.
    fn has_texture_coordinates(&self) -> bool;
}
