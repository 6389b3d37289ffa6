//! Recursive Monte Carlo path tracer.
//!
//! Diffuse surfaces combine one explicit light sample with one cosine
//! weighted bounce. Indirect bounces hide emission so light sources are not
//! counted twice. Specular and dielectric surfaces follow a single
//! stochastic branch. Paths longer than `bounces` are culled by Russian
//! roulette and always end at twice that depth.

use lumen_core::config::{DebugConfig, RenderingConfig};
use lumen_core::Config;
use lumen_math::{Color, ColorExt, Ray, Vec3, BLACK_EPSILON};
use rand::{Rng, RngCore};

use crate::sampling::{gen_f32, random_cos_weighted_hemi, var_cos_weighted_hemi};
use crate::scene::Scene;

/// How a surface scatters light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shading {
    Diffuse,
    Reflective,
    Dielectric,
}

/// Path tracing integrator.
#[derive(Debug, Clone)]
pub struct PathTracer {
    /// Depth at which Russian roulette starts
    bounces: f32,
    epsilon: f32,
    background: Color,
    debug: DebugConfig,
}

impl PathTracer {
    pub fn new(rendering: &RenderingConfig, debug: &DebugConfig) -> Self {
        Self {
            bounces: rendering.bounces as f32,
            epsilon: rendering.epsilon,
            background: rendering.background,
            debug: debug.clone(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.rendering, &config.debug)
    }

    /// Radiance arriving at the origin of `ray`.
    pub fn trace(&self, scene: &Scene, ray: &Ray, rng: &mut dyn RngCore) -> Color {
        self.trace_depth(scene, ray, 0.0, true, rng)
    }

    fn trace_depth(
        &self,
        scene: &Scene,
        ray: &Ray,
        depth: f32,
        emission_visible: bool,
        rng: &mut dyn RngCore,
    ) -> Color {
        let Some(hit) = scene.bvh.intersect(ray) else {
            return self.background;
        };

        let material = hit.primitive.material();
        let inter = hit.intersection;

        let textured = hit.primitive.has_texture_coordinates() && material.diffuse_texture.is_some();
        let kd = material.diffuse_at(inter.uv);
        let transparent = kd.w.abs() < BLACK_EPSILON;
        let kd = kd.truncate();

        if self.debug.normals {
            return (inter.normal + Vec3::ONE) * 0.5;
        }
        if self.debug.diffuse && !transparent {
            return kd;
        }
        if material.is_emissive() {
            return if emission_visible {
                material.emission
            } else {
                Color::ZERO
            };
        }

        let shading = if !kd.is_black() || textured {
            Shading::Diffuse
        } else if !material.specular.is_black() && material.transmission.is_black() {
            Shading::Reflective
        } else if !material.specular.is_black() {
            Shading::Dielectric
        } else {
            return Color::ZERO;
        };

        let mut weight = 1.0;
        if depth > self.bounces {
            let mut p = match shading {
                Shading::Diffuse => kd.max_element(),
                Shading::Reflective => material.specular.max_element(),
                Shading::Dielectric => material
                    .specular
                    .max_element()
                    .max(material.transmission.max_element()),
            };
            if depth > 2.0 * self.bounces {
                p = 0.0;
            }

            if gen_f32(rng) < p {
                weight = 1.0 / p;
            } else {
                return Color::ZERO;
            }
        }

        let p = ray.at(inter.distance);
        let n = if inter.normal.dot(ray.direction) < 0.0 {
            inter.normal
        } else {
            -inter.normal
        };
        let outward = p + self.epsilon * n;

        // Holes in cut-out textures: carry on as if the surface was not there.
        if transparent && textured {
            let through = Ray::new(p + ray.direction * self.epsilon, ray.direction);
            let depth = depth + 2.0 * gen_f32(rng);
            return self.trace_depth(scene, &through, depth, emission_visible, rng);
        }

        match shading {
            Shading::Diffuse => {
                let direct = self.direct_light(scene, outward, n, rng);
                let bounce = Ray::new(outward, random_cos_weighted_hemi(n, rng));
                let indirect = self.trace_depth(scene, &bounce, depth + 1.0, false, rng);
                kd * (direct + indirect) * weight
            }
            Shading::Reflective => {
                let r = glossy_reflect(inter.normal, ray.direction, material.roughness, rng);
                let bounced = self.trace_depth(scene, &Ray::new(outward, r), depth + 1.0, true, rng);
                material.specular * weight * bounced
            }
            Shading::Dielectric => {
                let kr = fresnel(inter.normal, ray.direction, material.ior);

                if gen_f32(rng) < kr {
                    let r = glossy_reflect(inter.normal, ray.direction, material.roughness, rng);
                    let bounced =
                        self.trace_depth(scene, &Ray::new(outward, r), depth + 1.0, true, rng);
                    material.specular * weight * bounced
                } else {
                    let Some(t) = refract(inter.normal, ray.direction, material.ior) else {
                        return Color::ZERO;
                    };
                    let inward = p - self.epsilon * n;
                    let bounced =
                        self.trace_depth(scene, &Ray::new(inward, t), depth + 1.0, true, rng);
                    material.transmission * weight * bounced
                }
            }
        }
    }

    /// One light sample, picked uniformly over all lights and divided by
    /// the pick probability.
    fn direct_light(&self, scene: &Scene, origin: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Color {
        if scene.lights.is_empty() {
            return Color::ZERO;
        }

        let light = &scene.lights[rng.gen_range(0..scene.lights.len())];
        let sample = light.sample(origin, rng);

        let to_light = sample.position - origin;
        let distance = to_light.length();
        let d = to_light.normalize_or_zero();
        let cos = n.dot(d);
        if cos < 0.0 || d == Vec3::ZERO {
            return Color::ZERO;
        }

        match scene.bvh.intersect(&Ray::new(origin, d)) {
            Some(shadow) if shadow.intersection.distance + self.epsilon <= distance => Color::ZERO,
            _ => sample.radiance * cos * scene.lights.len() as f32,
        }
    }
}

/// Mirror `i` about `n`.
#[inline]
fn reflect(n: Vec3, i: Vec3) -> Vec3 {
    i - 2.0 * n * i.dot(n)
}

/// Mirror direction spread by a cosine lobe whose width grows with
/// `roughness`.
fn glossy_reflect(n: Vec3, i: Vec3, roughness: f32, rng: &mut dyn RngCore) -> Vec3 {
    var_cos_weighted_hemi(reflect(n, i), roughness.clamp(0.0, 1.0), rng)
}

/// Fraction of light reflected at a dielectric boundary with outward
/// normal `n`, for incident direction `i`.
///
/// Returns 1 under total internal reflection.
fn fresnel(n: Vec3, i: Vec3, ior: f32) -> f32 {
    let exiting = i.dot(n) > 0.0;

    let cosi = i.dot(n).abs().min(1.0);
    let (etai, etat) = if exiting { (ior, 1.0) } else { (1.0, ior) };

    let k = 1.0 - etai * etai * (1.0 - cosi * cosi);
    if k < 0.0 {
        return 1.0;
    }

    let sint = (etai / etat) * (1.0 - cosi * cosi).sqrt();
    let cost = (1.0 - sint * sint).max(0.0).sqrt();

    let perpendicular = (etat * cosi - etai * cost) / (etat * cosi + etai * cost);
    let parallel = (etat * cost - etai * cosi) / (etat * cost + etai * cosi);

    0.5 * (perpendicular * perpendicular + parallel * parallel)
}

/// Refracted direction through a boundary with outward normal `n`, or
/// `None` under total internal reflection.
fn refract(n: Vec3, i: Vec3, ior: f32) -> Option<Vec3> {
    let exiting = n.dot(i) > 0.0;
    let (n, eta) = if exiting { (-n, ior) } else { (n, 1.0 / ior) };

    let cos = n.dot(i);
    let k = 1.0 - eta * eta * (1.0 - cos * cos);
    if k < 0.0 {
        return None;
    }

    Some(eta * i - (eta * cos + k.sqrt()) * n)
}
