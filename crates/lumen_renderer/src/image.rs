//! Shared accumulation image.
//!
//! Workers blend new samples into pixels while the autosave thread reads
//! them out. Channels are stored as `f32` bits in relaxed atomics: a
//! concurrent read may see a pixel halfway through an update, which only
//! shows up as noise in an intermediate save.

use std::sync::atomic::{AtomicU32, Ordering};

use lumen_math::{Color, ColorExt};
use rayon::prelude::*;

use crate::DEFAULT_GAMMA;

/// Linear RGB pixels shared across render threads.
#[derive(Debug)]
pub struct Image {
    width: u32,
    height: u32,
    gamma: f32,
    /// Three channels per pixel, row-major
    channels: Vec<AtomicU32>,
}

impl Image {
    /// A black image.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * 3;
        Self {
            width,
            height,
            gamma: DEFAULT_GAMMA,
            channels: (0..len).map(|_| AtomicU32::new(0f32.to_bits())).collect(),
        }
    }

    /// Set the display gamma used by [`Image::to_rgba8`].
    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.channels.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Pixel by linear index `y * width + x`.
    pub fn get(&self, index: usize) -> Color {
        let c = &self.channels[index * 3..index * 3 + 3];
        Color::new(load(&c[0]), load(&c[1]), load(&c[2]))
    }

    /// Pixel at `(x, y)`, row 0 at the top.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.get(y as usize * self.width as usize + x as usize)
    }

    /// Overwrite a pixel.
    pub fn set(&self, index: usize, color: Color) {
        let c = &self.channels[index * 3..index * 3 + 3];
        store(&c[0], color.x);
        store(&c[1], color.y);
        store(&c[2], color.z);
    }

    /// Fold a new sample into the running average of a pixel that already
    /// holds the mean of `samples` earlier samples.
    pub fn blend(&self, index: usize, sample: Color, samples: u32) {
        let keep = samples as f32 / (samples as f32 + 1.0);
        let current = self.get(index);
        self.set(index, current * keep + sample * (1.0 - keep));
    }

    /// 8-bit RGBA bytes after clamping and gamma, alpha always opaque.
    pub fn to_rgba8(&self) -> Vec<u8> {
        (0..self.len())
            .into_par_iter()
            .flat_map_iter(|i| {
                let c = self.get(i).clamp01().gamma(self.gamma);
                [to_byte(c.x), to_byte(c.y), to_byte(c.z), 255]
            })
            .collect()
    }
}

#[inline]
fn load(channel: &AtomicU32) -> f32 {
    f32::from_bits(channel.load(Ordering::Relaxed))
}

#[inline]
fn store(channel: &AtomicU32, value: f32) {
    channel.store(value.to_bits(), Ordering::Relaxed);
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (255.0 * v) as u8
}
