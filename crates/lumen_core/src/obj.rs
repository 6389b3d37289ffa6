//! Wavefront OBJ/MTL scene loading.
//!
//! The loader reads triangulated OBJ files with `tobj`, merges every
//! object and group into a single [`Mesh`] and maps MTL statements onto
//! [`Material`]. Statements `tobj` does not interpret itself (`Ke`, `Kt`,
//! `Tf`, `Pr`) are read from the material's unknown parameters.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use lumen_math::{Color, Vec2, Vec3};
use thiserror::Error;

use crate::config::LoaderConfig;
use crate::material::Material;
use crate::mesh::{Mesh, Vertex};
use crate::texture::{TextureCache, TextureError};

/// Errors that can occur while loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load OBJ: {0}")]
    Obj(#[source] tobj::LoadError),

    #[error("Failed to load materials: {0}")]
    Material(#[source] tobj::LoadError),

    #[error("Object '{model}' contains a face with {arity} vertices, only triangles are supported")]
    NonTriangularFace { model: String, arity: u32 },

    #[error(transparent)]
    Texture(#[from] TextureError),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Loads OBJ scenes into a [`Mesh`].
///
/// Textures are cached across loads, so a loader reused for several scenes
/// decodes each image file once.
pub struct ObjLoader {
    options: LoaderConfig,
    textures: TextureCache,
}

impl ObjLoader {
    pub fn new(options: LoaderConfig) -> Self {
        Self {
            options,
            textures: TextureCache::new(),
        }
    }

    /// Load `scene`, resolving `mtllib` and texture paths against
    /// `materials_dir`.
    pub fn load(
        &mut self,
        scene: impl AsRef<Path>,
        materials_dir: impl AsRef<Path>,
    ) -> SceneResult<Mesh> {
        let scene = scene.as_ref();
        log::info!("Loading {}...", scene.display());

        let file = File::open(scene).map_err(|source| SceneError::Open {
            path: scene.to_path_buf(),
            source,
        })?;
        self.load_from_reader(&mut BufReader::new(file), materials_dir)
    }

    /// Load OBJ text from any buffered reader.
    pub fn load_from_reader(
        &mut self,
        reader: &mut impl BufRead,
        materials_dir: impl AsRef<Path>,
    ) -> SceneResult<Mesh> {
        let materials_dir = materials_dir.as_ref();

        let (models, materials) = tobj::load_obj_buf(
            reader,
            &tobj::LoadOptions {
                single_index: false,
                triangulate: false,
                ..Default::default()
            },
            |path| tobj::load_mtl(materials_dir.join(path)),
        )
        .map_err(SceneError::Obj)?;
        let materials = materials.map_err(SceneError::Material)?;

        let materials = materials
            .iter()
            .map(|m| self.convert_material(m, materials_dir))
            .collect::<SceneResult<Vec<_>>>()?;

        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut texcoords = Vec::new();
        for model in &models {
            let m = &model.mesh;
            positions.extend(m.positions.chunks_exact(3).map(Vec3::from_slice));
            normals.extend(m.normals.chunks_exact(3).map(Vec3::from_slice));
            texcoords.extend(m.texcoords.chunks_exact(2).map(Vec2::from_slice));
        }

        log::info!("Loaded {} vertices.", positions.len());
        log::info!("Loaded {} normals.", normals.len());
        log::info!("Loaded {} texture coordinates.", texcoords.len());

        let mut mesh = Mesh::new(positions, normals, texcoords, materials);
        log::info!("Loaded {} materials.", mesh.materials.len());

        let (mut position_base, mut normal_base, mut texcoord_base) = (0u32, 0u32, 0u32);
        for model in &models {
            self.append_faces(&mut mesh, model, [position_base, normal_base, texcoord_base])?;

            let m = &model.mesh;
            position_base += (m.positions.len() / 3) as u32;
            normal_base += (m.normals.len() / 3) as u32;
            texcoord_base += (m.texcoords.len() / 2) as u32;
        }

        if !self.options.normals {
            mesh.strip_normals();
        }

        log::info!("Loaded {} triangles.", mesh.triangle_count());
        Ok(mesh)
    }

    fn append_faces(&self, mesh: &mut Mesh, model: &tobj::Model, base: [u32; 3]) -> SceneResult<()> {
        let m = &model.mesh;

        if let Some(&arity) = m.face_arities.iter().find(|&&arity| arity != 3) {
            return Err(SceneError::NonTriangularFace {
                model: model.name.clone(),
                arity,
            });
        }

        let has_normals = m.normal_indices.len() == m.indices.len();
        let has_texcoords = m.texcoord_indices.len() == m.indices.len();

        // Material 0 of the mesh is the fallback, file materials follow it.
        let material = m.material_id.map(|id| id + 1);
        if material.map_or(true, |id| id >= mesh.materials.len()) {
            log::warn!(
                "Object '{}' has no valid material, using the fallback material",
                model.name
            );
        }

        for (face, corners) in m.indices.chunks_exact(3).enumerate() {
            let vertices: [Vertex; 3] = std::array::from_fn(|k| {
                let i = face * 3 + k;
                Vertex {
                    position: base[0] + corners[k],
                    normal: has_normals.then(|| base[1] + m.normal_indices[i]),
                    texcoord: has_texcoords.then(|| base[2] + m.texcoord_indices[i]),
                }
            });

            if !mesh.add_face(vertices, material) {
                log::error!("Face {} of object '{}' has an invalid vertex.", face, model.name);
            }
        }

        Ok(())
    }

    fn convert_material(&mut self, m: &tobj::Material, dir: &Path) -> SceneResult<Material> {
        let diffuse_texture = match &m.diffuse_texture {
            Some(name) if self.options.textures && !name.is_empty() => {
                Some(self.textures.load(dir.join(name))?)
            }
            _ => None,
        };

        let transmission = param_color(m, "Kt").or_else(|| param_color(m, "Tf"));

        Ok(Material {
            name: m.name.clone(),
            emission: m
                .emissive
                .map(Color::from)
                .or_else(|| param_color(m, "Ke"))
                .unwrap_or(Color::ZERO),
            ambient: m.ambient.map(Color::from).unwrap_or(Color::ZERO),
            diffuse: m.diffuse.map(Color::from).unwrap_or(Color::ZERO),
            specular: m.specular.map(Color::from).unwrap_or(Color::ZERO),
            transmission: transmission.unwrap_or(Color::ZERO),
            ior: m.optical_density.unwrap_or(1.0),
            roughness: param_scalar(m, "Pr").unwrap_or(0.0),
            diffuse_texture,
        })
    }
}

/// Load an OBJ scene with the given loader options.
pub fn load_obj(
    scene: impl AsRef<Path>,
    materials_dir: impl AsRef<Path>,
    options: &LoaderConfig,
) -> SceneResult<Mesh> {
    ObjLoader::new(options.clone()).load(scene, materials_dir)
}

/// Parse an MTL color statement left uninterpreted by `tobj`.
///
/// Accepts `r g b` or a single grey value. Other forms (`xyz`, `spectral`)
/// are not supported and are ignored with a warning.
fn param_color(m: &tobj::Material, key: &str) -> Option<Color> {
    let raw = m.unknown_param.get(key)?;
    let values: Result<Vec<f32>, _> = raw.split_whitespace().map(str::parse).collect();

    match values.as_deref() {
        Ok([r, g, b]) => Some(Color::new(*r, *g, *b)),
        Ok([v]) => Some(Color::splat(*v)),
        _ => {
            log::warn!("Material '{}': ignoring unsupported {} '{}'", m.name, key, raw);
            None
        }
    }
}

fn param_scalar(m: &tobj::Material, key: &str) -> Option<f32> {
    let raw = m.unknown_param.get(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Material '{}': ignoring unsupported {} '{}'", m.name, key, raw);
            None
        }
    }
}
