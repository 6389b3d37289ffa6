//! Light sources for direct illumination.

use std::sync::Arc;

use lumen_math::{Color, Vec3};
use rand::RngCore;

use crate::primitive::Primitive;
use crate::sampling;
use crate::triangle::Triangle;

/// A point sampled on a light, with the radiance it sends towards the
/// shading point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    pub position: Vec3,
    pub radiance: Color,
}

/// Trait for lights that can be sampled from a shading point.
pub trait Light: Send + Sync {
    /// Sample a point on the light as seen from `point`.
    fn sample(&self, point: Vec3, rng: &mut dyn RngCore) -> LightSample;
}

/// An emissive triangle.
///
/// Shares the triangle with the BVH, so the light never outlives the
/// geometry it illuminates from.
pub struct AreaLight {
    triangle: Arc<Triangle>,
}

impl AreaLight {
    pub fn new(triangle: Arc<Triangle>) -> Self {
        Self { triangle }
    }
}

impl Light for AreaLight {
    /// Uniform point on the triangle, weighted by the solid angle it covers.
    ///
    /// The result is clamped so that no channel exceeds the peak emission,
    /// which keeps samples taken right next to the light from blowing up.
    fn sample(&self, point: Vec3, rng: &mut dyn RngCore) -> LightSample {
        let [a, b, c] = self.triangle.positions();
        let position = sampling::triangle(a, b, c, rng);

        let to_point = point - position;
        let r = to_point.length();
        let d = to_point.normalize_or_zero();

        let mut n = (a - b).cross(a - c).normalize_or_zero();
        if n.dot(d) < 0.0 {
            n = -n;
        }
        let cos = n.dot(d);

        let emission = self.triangle.material().emission;
        let mut radiance = if r > 0.0 {
            emission * (cos * self.triangle.area() / (r * r))
        } else {
            emission
        };

        let peak = emission.max_element();
        let max = radiance.max_element();
        if max > peak {
            radiance *= peak / max;
        }

        LightSample { position, radiance }
    }
}
