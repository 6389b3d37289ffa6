//! Random direction and point samplers.

use std::f32::consts::PI;

use lumen_math::Vec3;
use rand::{Rng, RngCore};

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Direction in the cosine-weighted hemisphere about unit normal `n` for
/// the sample pair `(s, t)` in [0, 1]².
///
/// `t` is the squared cosine of the angle to `n`, `s` the azimuth as a
/// fraction of a full turn.
pub fn cos_weighted_hemi(n: Vec3, s: f32, t: f32) -> Vec3 {
    debug_assert!((0.0..=1.0).contains(&s));
    debug_assert!((0.0..=1.0).contains(&t));

    // Tangent frame around n
    let x = if n.x.abs() > n.y.abs() {
        Vec3::new(n.z, 0.0, -n.x) / (n.x * n.x + n.z * n.z).sqrt()
    } else {
        Vec3::new(0.0, -n.z, n.y) / (n.y * n.y + n.z * n.z).sqrt()
    };
    let z = n.cross(x);

    let phi = 2.0 * PI * s;
    let r = (1.0 - t).sqrt();

    x * (r * phi.cos()) + n * t.sqrt() + z * (r * phi.sin())
}

/// Random cosine-weighted hemisphere direction about `n`.
pub fn random_cos_weighted_hemi(n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let s = gen_f32(rng);
    let t = gen_f32(rng);
    cos_weighted_hemi(n, s, t)
}

/// Cosine-weighted hemisphere direction about `n` squeezed towards `n`.
///
/// `variance` in [0, 1]: 0 always returns `n`, 1 is the full cosine lobe.
pub fn var_cos_weighted_hemi(n: Vec3, variance: f32, rng: &mut dyn RngCore) -> Vec3 {
    debug_assert!((0.0..=1.0).contains(&variance));

    let t = 1.0 - gen_f32(rng) * variance;
    let s = gen_f32(rng);
    cos_weighted_hemi(n, s, t)
}

/// Uniform point on triangle `abc` by rejection sampling barycentrics.
pub fn triangle(a: Vec3, b: Vec3, c: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let (u, v) = loop {
        let u = gen_f32(rng);
        let v = gen_f32(rng);
        if u + v <= 1.0 {
            break (u, v);
        }
    };
    let w = 1.0 - u - v;

    a * u + b * v + c * w
}
