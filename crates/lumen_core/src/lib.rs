//! Lumen Core - scene data for the Lumen path tracer.
//!
//! This crate provides:
//!
//! - **Geometry**: indexed triangle `Mesh` with shared vertex attributes
//! - **Materials**: MTL-style `Material` and cached diffuse `Texture`s
//! - **Loading**: Wavefront OBJ/MTL import and JSON job `Config`
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{load_obj, Config};
//!
//! let config = Config::from_file("config.json")?;
//! let mesh = load_obj("scene.obj", "materials/", &config.loader)?;
//! println!("Loaded {} triangles", mesh.triangle_count());
//! ```

pub mod config;
pub mod material;
pub mod mesh;
pub mod obj;
pub mod texture;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use material::Material;
pub use mesh::{Face, Mesh, Vertex};
pub use obj::{load_obj, ObjLoader, SceneError};
pub use texture::{Texture, TextureCache, TextureError};
