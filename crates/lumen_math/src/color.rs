//! Linear RGB colour helpers.
//!
//! Colours are plain `Vec3`s, as in the rest of the renderer. Alpha only
//! matters for textures and is carried separately there.

use crate::Vec3;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Per-channel threshold below which a colour counts as black.
pub const BLACK_EPSILON: f32 = 0.05;

/// Colour predicates and read-out transforms.
pub trait ColorExt {
    /// True if every channel is within [`BLACK_EPSILON`] of zero.
    fn is_black(&self) -> bool;

    /// Clamp every channel into [0, 1].
    fn clamp01(&self) -> Self;

    /// Apply `c^(1 / gamma)` per channel.
    fn gamma(&self, gamma: f32) -> Self;
}

impl ColorExt for Color {
    fn is_black(&self) -> bool {
        self.x.abs() < BLACK_EPSILON && self.y.abs() < BLACK_EPSILON && self.z.abs() < BLACK_EPSILON
    }

    fn clamp01(&self) -> Self {
        self.clamp(Vec3::ZERO, Vec3::ONE)
    }

    fn gamma(&self, gamma: f32) -> Self {
        let inv = 1.0 / gamma;
        Vec3::new(self.x.powf(inv), self.y.powf(inv), self.z.powf(inv))
    }
}
