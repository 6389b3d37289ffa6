//! Surface material description.
//!
//! Coefficients follow the Wavefront MTL conventions (`Ke`, `Ka`, `Kd`,
//! `Ks`, `Kt`/`Tf`, `Ni`, `Pr`) so a loaded `.mtl` maps onto it directly.

use std::fmt;
use std::sync::Arc;

use lumen_math::{Color, ColorExt, Vec2, Vec4};

use crate::texture::Texture;

/// A material definition shared by every triangle that references it.
#[derive(Clone)]
pub struct Material {
    /// Material name (from the MTL `newmtl` statement)
    pub name: String,

    /// Emitted radiance (`Ke`). Anything not black makes the surface a light.
    pub emission: Color,

    /// Ambient color (`Ka`). Loaded for completeness, unused by transport.
    pub ambient: Color,

    /// Diffuse/albedo color (`Kd`)
    pub diffuse: Color,

    /// Specular reflection color (`Ks`)
    pub specular: Color,

    /// Transmission color (`Kt` / `Tf`)
    pub transmission: Color,

    /// Index of refraction (`Ni`)
    pub ior: f32,

    /// Roughness of the specular lobe in [0, 1] (`Pr`), 0 = perfect mirror
    pub roughness: f32,

    /// Optional diffuse texture (`map_Kd`)
    pub diffuse_texture: Option<Arc<Texture>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            emission: Color::ZERO,
            ambient: Color::ZERO,
            diffuse: Color::ZERO,
            specular: Color::ZERO,
            transmission: Color::ZERO,
            ior: 1.0,
            roughness: 0.0,
            diffuse_texture: None,
        }
    }
}

impl Material {
    /// Create a new material with just a name and diffuse color.
    pub fn diffuse(name: impl Into<String>, diffuse: Color) -> Self {
        Self {
            name: name.into(),
            diffuse,
            ..Default::default()
        }
    }

    /// Create an emissive material.
    pub fn emissive(name: impl Into<String>, emission: Color) -> Self {
        Self {
            name: name.into(),
            emission,
            ..Default::default()
        }
    }

    /// Material used for faces without a valid material reference.
    ///
    /// It glows red so that unassigned geometry is obvious in renders.
    pub fn fallback() -> Self {
        Self::emissive("<fallback>", Color::new(1.0, 0.0, 0.0))
    }

    /// True if the material emits light.
    pub fn is_emissive(&self) -> bool {
        !self.emission.is_black()
    }

    /// Diffuse color at `uv` as RGBA.
    ///
    /// Uses the texture when both a texture and texture coordinates are
    /// available, otherwise the flat diffuse coefficient with opaque alpha.
    pub fn diffuse_at(&self, uv: Option<Vec2>) -> Vec4 {
        match (&self.diffuse_texture, uv) {
            (Some(texture), Some(uv)) => texture.sample(uv),
            _ => self.diffuse.extend(1.0),
        }
    }
}

impl fmt::Debug for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Material")
            .field("name", &self.name)
            .field("emission", &self.emission)
            .field("diffuse", &self.diffuse)
            .field("specular", &self.specular)
            .field("transmission", &self.transmission)
            .field("ior", &self.ior)
            .field("roughness", &self.roughness)
            .field(
                "diffuse_texture",
                &self.diffuse_texture.as_ref().map(|t| t.path.as_str()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_emissive_red() {
        let m = Material::fallback();
        assert!(m.is_emissive());
        assert_eq!(m.emission, Color::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_dim_emission_is_not_a_light() {
        let m = Material::emissive("dim", Color::splat(0.01));
        assert!(!m.is_emissive());
    }

    #[test]
    fn test_diffuse_at_uses_texture_only_with_uv() {
        let mut m = Material::diffuse("d", Color::new(0.2, 0.3, 0.4));
        assert_eq!(m.diffuse_at(Some(Vec2::ZERO)), Vec4::new(0.2, 0.3, 0.4, 1.0));

        m.diffuse_texture = Some(Arc::new(Texture::solid_color(Vec4::new(1.0, 1.0, 1.0, 0.0))));
        assert_eq!(m.diffuse_at(None), Vec4::new(0.2, 0.3, 0.4, 1.0));
        assert_eq!(m.diffuse_at(Some(Vec2::new(0.5, 0.5))), Vec4::new(1.0, 1.0, 1.0, 0.0));
    }
}
