//! Texture loading and caching for materials.
//!
//! Provides a texture cache that loads images from disk once and shares
//! them between every material that references the same file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lumen_math::{Vec2, Vec4};
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture {0} has no pixels")]
    Empty(PathBuf),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A loaded texture with pixel data.
///
/// Stores the file's bytes scaled to 0-1 RGBA floats, with no transfer
/// curve applied. Alpha is kept so that the renderer
/// can treat cut-out regions as holes in the surface.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Pixel data in RGBA format (0-1 range), row-major order
    pub pixels: Vec<Vec4>,

    /// Original file path (for debugging)
    pub path: String,
}

impl Texture {
    /// Create a new texture from pixel data.
    ///
    /// `pixels` must hold exactly `width * height` entries.
    pub fn new(width: u32, height: u32, pixels: Vec<Vec4>, path: impl Into<String>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Vec4) -> Self {
        Self::new(1, 1, vec![color], "<solid>")
    }

    /// Look up the pixel under UV coordinates, nearest neighbour.
    ///
    /// `(0, 0)` is the bottom-left corner; coordinates outside [0, 1) wrap
    /// around so textures repeat.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let x = (uv.x * self.width as f32).floor() as i64;
        let y = ((1.0 - uv.y) * self.height as f32).floor() as i64;

        let x = x.rem_euclid(self.width as i64) as u32;
        let y = y.rem_euclid(self.height as i64) as u32;

        self.get_pixel(x, y)
    }

    /// Get pixel at integer coordinates.
    pub fn get_pixel(&self, x: u32, y: u32) -> Vec4 {
        let idx = (y * self.width + x) as usize;
        self.pixels.get(idx).copied().unwrap_or(Vec4::W)
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<Vec4>()
    }
}

/// Cache for loaded textures.
///
/// Textures are loaded on-demand and cached for reuse.
pub struct TextureCache {
    /// Cached textures by file path
    textures: HashMap<PathBuf, Arc<Texture>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    /// Create a new empty texture cache.
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using cache if available.
    pub fn load(&mut self, path: impl AsRef<Path>) -> TextureResult<Arc<Texture>> {
        let full_path = self.resolve_path(path.as_ref());

        if let Some(texture) = self.textures.get(&full_path) {
            return Ok(texture.clone());
        }

        let texture = Arc::new(load_texture_file(&full_path)?);
        self.textures.insert(full_path, texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            texture.path,
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );

        Ok(texture)
    }

    /// Get the number of cached textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Resolve a path relative to the base directory.
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(base) = &self.base_dir {
            base.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a texture from a file path.
fn load_texture_file(path: &Path) -> TextureResult<Texture> {
    let img = image::open(path).map_err(|source| TextureError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureError::Empty(path.to_path_buf()));
    }

    let pixels: Vec<Vec4> = rgba
        .pixels()
        .map(|p| Vec4::from_array(p.0.map(|c| c as f32 / 255.0)))
        .collect();

    Ok(Texture::new(
        width,
        height,
        pixels,
        path.to_string_lossy().to_string(),
    ))
}
