//! Pinhole camera for primary ray generation.

use lumen_core::config::CameraConfig;
use lumen_math::{Ray, Vec3};
use rand::RngCore;

use crate::sampling::gen_f32;

/// Pinhole camera with tent-filtered pixel sampling.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,

    position: Vec3,
    /// Right
    u: Vec3,
    /// Up
    v: Vec3,
    /// Forward
    w: Vec3,
    /// Vertical field of view in radians
    fovy: f32,
}

impl Camera {
    /// Camera at the origin looking down -Z with a 45 degree field of view.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            position: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: -Vec3::Z,
            fovy: 45f32.to_radians(),
        }
    }

    /// Camera described by a job configuration.
    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.width, config.height)
            .with_position(config.position, config.center, config.up)
            .with_fovy(config.fovy)
    }

    /// Place the camera at `position` looking at `center`.
    pub fn with_position(mut self, position: Vec3, center: Vec3, up: Vec3) -> Self {
        self.position = position;
        self.w = (center - position).normalize();
        self.u = self.w.cross(up).normalize();
        self.v = self.u.cross(self.w).normalize();
        self
    }

    /// Set the vertical field of view in degrees.
    pub fn with_fovy(mut self, degrees: f32) -> Self {
        self.fovy = degrees.to_radians();
        self
    }

    /// Number of pixels in the image.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Random ray through pixel `(x, y)`, row 0 at the top.
    ///
    /// The offset inside the pixel follows a tent distribution, so samples
    /// cluster at the pixel center and overlap neighbouring pixels slightly.
    pub fn pixel_ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
        let hw = self.width as f32 / 2.0;
        let hh = self.height as f32 / 2.0;

        let tan_y = (self.fovy * 0.5).tan();
        let tan_x = tan_y * hw / hh;

        let xr = tent(2.0 * gen_f32(rng));
        let yr = tent(2.0 * gen_f32(rng));

        let a = tan_x * (x as f32 + 0.5 + xr - hw) / hw;
        let b = tan_y * (hh - 0.5 - y as f32 - yr) / hh;

        Ray::new(self.position, a * self.u + b * self.v + self.w)
    }
}

/// Inverse CDF of the tent filter on [-0.5, 0.5] for `r` in [0, 2).
#[inline]
fn tent(r: f32) -> f32 {
    let offset = if r < 1.0 {
        r.sqrt() - 1.0
    } else {
        1.0 - (2.0 - r).sqrt()
    };
    offset * 0.5
}
